//! Deletion Pipeline (§4.9): rewrites files atomically so only the first
//! occurrence (by FileId order, then in-file position) of each
//! NormalizedKey survives.

use std::collections::{HashMap, HashSet};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::context::RunContext;
use crate::error::UnitError;
use crate::model::{DuplicateHashFiles, FileId, Hash64, InputFile};
use crate::normalizer::{normalize_key, trim_ascii};

/// Run both stages and return every per-file failure encountered; each
/// failure is already logged by the time it's returned (§4.9 failure
/// semantics, §7).
pub fn run_deletion_pipeline(
    files: &[InputFile],
    duplicate_hash_files: &DuplicateHashFiles,
    ctx: &RunContext,
) -> Vec<UnitError> {
    let mut errors = Vec::new();
    let delete_sets = build_delete_sets(duplicate_hash_files);

    for file in files {
        let Some(delete_set) = delete_sets.get(&file.id) else {
            continue;
        };
        if delete_set.is_empty() {
            continue;
        }
        match stage_a(file, delete_set, ctx) {
            Ok(()) => info!(
                file = %file.basename,
                removed_hashes = delete_set.len(),
                "deletion stage A complete"
            ),
            Err(e) => {
                warn!(file = %file.basename, error = %e, "deletion stage A failed, leaving backup in place");
                errors.push(e);
            }
        }
    }

    for file in files {
        if let Err(e) = stage_b(file, ctx) {
            warn!(file = %file.basename, error = %e, "deletion stage B failed, leaving backup in place");
            errors.push(e);
        }
    }

    errors
}

/// Invert `duplicate_hash_files` into a per-file delete-set: every file
/// other than the lowest-FileId holder of a duplicate hash must drop all
/// lines hashing to it (§4.9 Stage A).
fn build_delete_sets(duplicate_hash_files: &DuplicateHashFiles) -> HashMap<FileId, HashSet<Hash64>> {
    let mut delete_sets: HashMap<FileId, HashSet<Hash64>> = HashMap::new();
    for (&hash, file_ids) in duplicate_hash_files {
        if file_ids.len() <= 1 {
            continue;
        }
        let Some(&keep) = file_ids.iter().min() else {
            continue;
        };
        for &id in file_ids {
            if id != keep {
                delete_sets.entry(id).or_default().insert(hash);
            }
        }
    }
    delete_sets
}

fn stage_a(file: &InputFile, delete_set: &HashSet<Hash64>, ctx: &RunContext) -> Result<(), UnitError> {
    atomic_rewrite(&file.path, |writer, reader| {
        rewrite_preserving_header(reader, writer, |raw| !should_drop(raw, ctx, delete_set))
    })
    .map_err(|source| UnitError::Deletion {
        file: file.path.clone(),
        source,
    })
}

fn stage_b(file: &InputFile, ctx: &RunContext) -> Result<(), UnitError> {
    atomic_rewrite(&file.path, |writer, reader| {
        let mut seen: HashSet<Hash64> = HashSet::new();
        rewrite_preserving_header(reader, writer, move |raw| {
            let trimmed = trim_ascii(raw);
            if trimmed.is_empty() {
                return true;
            }
            let key = normalize_key(raw, ctx.config.hash_delimiter, ctx.config.hash_fields);
            let hash = ctx.hasher.hash(key);
            seen.insert(hash)
        })
    })
    .map_err(|source| UnitError::Deletion {
        file: file.path.clone(),
        source,
    })
}

fn should_drop(raw: &[u8], ctx: &RunContext, delete_set: &HashSet<Hash64>) -> bool {
    let trimmed = trim_ascii(raw);
    if trimmed.is_empty() {
        return false;
    }
    let key = normalize_key(raw, ctx.config.hash_delimiter, ctx.config.hash_fields);
    let hash = ctx.hasher.hash(key);
    delete_set.contains(&hash)
}

/// Stream `reader` line by line below the Scanner's contract: the header is
/// copied through untouched, and every subsequent raw line (blank lines
/// included) is copied through iff `keep` returns true for it.
fn rewrite_preserving_header(
    reader: BufReader<File>,
    writer: &mut dyn Write,
    mut keep: impl FnMut(&[u8]) -> bool,
) -> std::io::Result<()> {
    let mut lines = reader.split(b'\n');

    if let Some(header) = lines.next() {
        writer.write_all(&header?)?;
        writer.write_all(b"\n")?;
    }

    for line in lines {
        let raw = line?;
        if keep(&raw) {
            writer.write_all(&raw)?;
            writer.write_all(b"\n")?;
        }
    }

    Ok(())
}

/// Write-to-temp-then-rename-over, with a short-lived `.backup` copy that
/// is removed only once the rewrite succeeds (§4.9).
fn atomic_rewrite(
    path: &Path,
    build: impl FnOnce(&mut dyn Write, BufReader<File>) -> std::io::Result<()>,
) -> std::io::Result<()> {
    let backup_path = sibling_with_suffix(path, ".backup");
    fs::copy(path, &backup_path)?;

    let temp_path = sibling_with_suffix(path, ".rewrite.tmp");
    let reader = BufReader::new(File::open(path)?);
    {
        let out = File::create(&temp_path)?;
        let mut writer = BufWriter::new(out);
        build(&mut writer, reader)?;
        writer.flush()?;
    }
    fs::rename(&temp_path, path)?;
    fs::remove_file(&backup_path)?;
    Ok(())
}

fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}
