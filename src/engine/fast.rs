//! FAST engine (§4.5): single pass, one worker per file, merged by the
//! driver into a global occurrence table.

use std::collections::HashMap;
use std::path::PathBuf;

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::context::RunContext;
use crate::model::{truncate_display_prefix, EngineOutput, FileId, Hash64, InputFile};
use crate::normalizer::normalize_key;
use crate::scanner::FileScanner;

/// Hash64 → (first-seen DisplayPrefix in this file, occurrence count).
type LocalMap = HashMap<Hash64, (String, u64)>;

fn scan_file(file: &InputFile, ctx: &RunContext) -> std::io::Result<LocalMap> {
    let mut scanner = FileScanner::open(&file.path)?;
    let mut map: LocalMap = HashMap::new();

    while let Some(line) = scanner.next_line()? {
        let key = normalize_key(line.as_bytes(), ctx.config.hash_delimiter, ctx.config.hash_fields);
        let hash = ctx.hasher.hash(key);
        let entry = map
            .entry(hash)
            .or_insert_with(|| (truncate_display_prefix(&line, ctx.config.write_length), 0));
        entry.1 += 1;
    }

    Ok(map)
}

/// Run the FAST engine over `files` using `ctx`'s configured hasher and
/// worker pool. One worker per file; a worker's failure is logged and that
/// file contributes nothing (§4.5).
pub fn run(files: &[InputFile], ctx: &RunContext) -> EngineOutput {
    let scanned: Vec<(FileId, Result<LocalMap, std::io::Error>)> = files
        .par_iter()
        .map(|file| (file.id, scan_file(file, ctx)))
        .collect();

    // Merge in FileId order (not completion order) so "first file to claim a
    // prefix for a hash" is deterministic across repeated runs.
    let mut ordered = scanned;
    ordered.sort_by_key(|(id, _)| *id);

    let mut hash_to_prefix: HashMap<Hash64, String> = HashMap::new();
    let mut hash_to_file_counts: HashMap<Hash64, HashMap<FileId, u64>> = HashMap::new();
    let mut failed_files: Vec<PathBuf> = Vec::new();

    for (id, result) in ordered {
        let path = &files[id.index()].path;
        match result {
            Ok(map) => {
                debug!(file = %files[id.index()].basename, records = map.len(), "FAST scanned file");
                for (hash, (prefix, count)) in map {
                    hash_to_prefix.entry(hash).or_insert(prefix);
                    *hash_to_file_counts.entry(hash).or_default().entry(id).or_insert(0) += count;
                }
            }
            Err(e) => {
                warn!(file = %path.display(), error = %e, "FAST engine: file scan failed, skipping");
                failed_files.push(path.clone());
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

    fn write_file(dir: &std::path::Path, name: &str, contents: &str) -> InputFile {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        InputFile {
            id: FileId(0),
            path,
            basename: name.to_string(),
            size: contents.len() as u64,
        }
    }

    #[test]
    fn finds_inter_file_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = write_file(dir.path(), "a.csv", "header\n010;HO;1O01;2024;0450273881;000002;xxx\nunique_a\n");
        let mut b = write_file(dir.path(), "b.csv", "header\n010;HO;1O01;2024;0450273881;000002;xxx\nunique_b\n");
        a.id = FileId(0);
        b.id = FileId(1);
        let files = vec![a, b];

        let out = run(&files, &ctx());
        assert_eq!(out.entries.len(), 1);
        assert_eq!(out.entries[0].basenames, vec!["a.csv".to_string(), "b.csv".to_string()]);
    }

    #[test]
    fn intra_file_duplicate_is_single_basename() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = write_file(dir.path(), "a.csv", "header\nline;x\nline;x\n");
        a.id = FileId(0);
        let files = vec![a];

        let out = run(&files, &ctx());
        assert_eq!(out.entries.len(), 1);
        assert!(out.entries[0].is_intra_file_only());
    }

    #[test]
    fn missing_file_is_recorded_as_failed_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let missing = InputFile {
            id: FileId(0),
            path: dir.path().join("missing.csv"),
            basename: "missing.csv".to_string(),
            size: 0,
        };
        let files = vec![missing];
        let out = run(&files, &ctx());
        assert_eq!(out.failed_files.len(), 1);
        assert!(out.entries.is_empty());
    }
}
