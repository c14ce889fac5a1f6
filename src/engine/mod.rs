//! The three execution engines (§4.5–§4.7) and the aggregation logic shared
//! by FAST and SAFE.

pub mod disk;
pub mod fast;
pub mod safe_engine;

use std::collections::{BTreeSet, HashMap};

use crate::model::{DuplicateEntry, DuplicateHashFiles, FileId, Hash64, InputFile};

/// Sorted, deduplicated basenames for a set of FileIds.
pub(crate) fn basenames_for(ids: &BTreeSet<FileId>, files: &[InputFile]) -> Vec<String> {
    let mut names: Vec<String> = ids.iter().map(|id| files[id.index()].basename.clone()).collect();
    names.sort();
    names
}

/// Turn a hash→prefix map and a hash→(file→count) map into the ordered
/// `DuplicateEntry` list and the `DuplicateHashFiles` index, the shared tail
/// of both FAST (§4.5) and SAFE (§4.6).
pub(crate) fn finalize_entries(
    hash_to_prefix: HashMap<Hash64, String>,
    hash_to_file_counts: HashMap<Hash64, HashMap<FileId, u64>>,
    files: &[InputFile],
) -> (Vec<DuplicateEntry>, DuplicateHashFiles) {
    let mut entries = Vec::new();
    let mut duplicate_hash_files = DuplicateHashFiles::new();

    for (hash, counts) in hash_to_file_counts {
        let total: u64 = counts.values().sum();
        if total <= 1 {
            continue;
        }
        let Some(prefix) = hash_to_prefix.get(&hash) else {
            continue;
        };
        let distinct: BTreeSet<FileId> = counts
            .iter()
            .filter(|(_, &count)| count > 0)
            .map(|(&id, _)| id)
            .collect();
        let basenames = basenames_for(&distinct, files);
        entries.push(DuplicateEntry {
            prefix: prefix.clone(),
            basenames,
        });
        duplicate_hash_files.insert(hash, distinct);
    }

    entries.sort_by(|a, b| a.prefix.cmp(&b.prefix));
    (entries, duplicate_hash_files)
}
