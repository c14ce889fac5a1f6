//! File enumeration and `FileId` assignment (§3, Invariant 3; §6 filesystem
//! layout).

use std::path::Path;

use glob::Pattern;

use crate::error::StartupError;
use crate::model::{FileId, InputFile};

/// Enumerate files directly under `dir` (non-recursive) whose basename
/// matches `pattern`, and assign the run's total `FileId` order: ascending
/// file size, ties broken by basename lexicographic order.
pub fn enumerate_input_files(dir: &Path, pattern: &str) -> Result<Vec<InputFile>, StartupError> {
    if !dir.exists() {
        return Err(StartupError::MissingInputDirectory(dir.to_path_buf()));
    }
    if !dir.is_dir() {
        return Err(StartupError::NotADirectory(dir.to_path_buf()));
    }

    let glob_pattern = Pattern::new(pattern).map_err(|source| StartupError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })?;

    let entries = std::fs::read_dir(dir).map_err(|source| StartupError::Enumeration {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut candidates: Vec<(String, u64, std::path::PathBuf)> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| StartupError::Enumeration {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let basename = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name.to_string(),
            None => continue,
        };
        if !glob_pattern.matches(&basename) {
            continue;
        }
        let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
        candidates.push((basename, size, path));
    }

    // Invariant 3: ascending size, ties broken by basename.
    candidates.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));

    let files = candidates
        .into_iter()
        .enumerate()
        .map(|(i, (basename, size, path))| InputFile {
            id: FileId(i as u32),
            path,
            basename,
            size,
        })
        .collect();

    Ok(files)
}
