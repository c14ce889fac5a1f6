//! SAFE engine (§4.6): two passes over each file, never holding more than
//! one file's keys in memory at a time.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use rayon::prelude::*;
use tracing::warn;

use crate::context::RunContext;
use crate::model::{truncate_display_prefix, EngineOutput, FileId, Hash64, InputFile};
use crate::normalizer::normalize_key;
use crate::scanner::FileScanner;

fn scan_counts(file: &InputFile, ctx: &RunContext) -> std::io::Result<HashMap<Hash64, u64>> {
    let mut scanner = FileScanner::open(&file.path)?;
    let mut counts: HashMap<Hash64, u64> = HashMap::new();
    while let Some(line) = scanner.next_line()? {
        let key = normalize_key(line.as_bytes(), ctx.config.hash_delimiter, ctx.config.hash_fields);
        let hash = ctx.hasher.hash(key);
        *counts.entry(hash).or_insert(0) += 1;
    }
    Ok(counts)
}

fn scan_prefixes(
    file: &InputFile,
    ctx: &RunContext,
    duplicate_hashes: &HashSet<Hash64>,
) -> std::io::Result<HashMap<Hash64, String>> {
    let mut scanner = FileScanner::open(&file.path)?;
    let mut prefixes: HashMap<Hash64, String> = HashMap::new();
    while let Some(line) = scanner.next_line()? {
        let key = normalize_key(line.as_bytes(), ctx.config.hash_delimiter, ctx.config.hash_fields);
        let hash = ctx.hasher.hash(key);
        if duplicate_hashes.contains(&hash) {
            prefixes
                .entry(hash)
                .or_insert_with(|| truncate_display_prefix(&line, ctx.config.write_length));
        }
    }
    Ok(prefixes)
}

/// Run the SAFE engine: pass 1 builds per-hash file counters, pass 2
/// recovers display prefixes only for hashes already known to be
/// duplicates (§4.6).
pub fn run(files: &[InputFile], ctx: &RunContext) -> EngineOutput {
    let pass1: Vec<(FileId, Result<HashMap<Hash64, u64>, std::io::Error>)> = files
        .par_iter()
        .map(|file| (file.id, scan_counts(file, ctx)))
        .collect();

    let mut hash_to_file_counts: HashMap<Hash64, HashMap<FileId, u64>> = HashMap::new();
    let mut failed_files: Vec<PathBuf> = Vec::new();

    for (id, result) in pass1 {
        let path = &files[id.index()].path;
        match result {
            Ok(counts) => {
                for (hash, count) in counts {
                    *hash_to_file_counts.entry(hash).or_default().entry(id).or_insert(0) += count;
                }
            }
            Err(e) => {
                warn!(file = %path.display(), error = %e, "SAFE engine pass 1: file scan failed, skipping");
                failed_files.push(path.clone());
            }
        }
    }

    let duplicate_hashes: HashSet<Hash64> = hash_to_file_counts
        .iter()
        .filter(|(_, counts)| counts.values().sum::<u64>() > 1)
        .map(|(&hash, _)| hash)
        .collect();

    if duplicate_hashes.is_empty() {
        return EngineOutput {
            entries: Vec::new(),
            duplicate_hash_files: Default::default(),
            failed_files,
        };
    }

    let pass2: Vec<(FileId, Result<HashMap<Hash64, String>, std::io::Error>)> = files
        .par_iter()
        .map(|file| (file.id, scan_prefixes(file, ctx, &duplicate_hashes)))
        .collect();

    // Lowest-FileId-wins, per the resolved open question in §9: merge in
    // ascending FileId order, first writer keeps the prefix.
    let mut ordered = pass2;
    ordered.sort_by_key(|(id, _)| *id);

    let mut hash_to_prefix: HashMap<Hash64, String> = HashMap::new();
    for (id, result) in ordered {
        let path = &files[id.index()].path;
        match result {
            Ok(prefixes) => {
                for (hash, prefix) in prefixes {
                    hash_to_prefix.entry(hash).or_insert(prefix);
                }
            }
            Err(e) => {
                warn!(file = %path.display(), error = %e, "SAFE engine pass 2: file scan failed, skipping");
            }
        }
    }

    let (entries, duplicate_hash_files) = super::finalize_entries(hash_to_prefix, hash_to_file_counts, files);
    EngineOutput {
        entries,
        duplicate_hash_files,
        failed_files,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::fs;

    fn ctx() -> RunContext {
        RunContext::new(Config::default(), chrono::Local::now())
    }

    fn write_file(dir: &std::path::Path, name: &str, contents: &str, id: u32) -> InputFile {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        InputFile {
            id: FileId(id),
            path,
            basename: name.to_string(),
            size: contents.len() as u64,
        }
    }

    #[test]
    fn finds_inter_file_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_file(dir.path(), "a.csv", "header\n010;HO;1O01;2024;0450273881;000002;xxx\nunique_a\n", 0);
        let b = write_file(dir.path(), "b.csv", "header\n010;HO;1O01;2024;0450273881;000002;xxx\nunique_b\n", 1);
        let files = vec![a, b];

        let out = run(&files, &ctx());
        assert_eq!(out.entries.len(), 1);
        assert_eq!(out.entries[0].basenames, vec!["a.csv".to_string(), "b.csv".to_string()]);
    }

    #[test]
    fn no_duplicates_yields_no_entries() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_file(dir.path(), "a.csv", "header\nunique_a\n", 0);
        let files = vec![a];
        let out = run(&files, &ctx());
        assert!(out.entries.is_empty());
    }
}
