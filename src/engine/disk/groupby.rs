//! DISK phase 3 (§4.7): stream the final merged run, grouping adjacent
//! records with identical hash into `DuplicateEntry`/`DuplicateHashFiles`.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::model::{DuplicateEntry, DuplicateHashFiles, FileId, Hash64, InputFile};

struct Group {
    hash: Hash64,
    prefix: String,
    files: BTreeSet<FileId>,
    count: u64,
}

fn flush_group(
    group: Group,
    files: &[InputFile],
    entries: &mut Vec<DuplicateEntry>,
    duplicate_hash_files: &mut DuplicateHashFiles,
) {
    // A group of size > 1 is a duplicate regardless of how many distinct
    // files it spans — this also classifies intra-file-only duplicates
    // correctly (§9 resolution 4).
    if group.count > 1 {
        let mut basenames: Vec<String> = group.files.iter().map(|id| files[id.index()].basename.clone()).collect();
        basenames.sort();
        entries.push(DuplicateEntry {
            prefix: group.prefix,
            basenames,
        });
        duplicate_hash_files.insert(group.hash, group.files);
    }
}

pub fn group_final_run(path: &Path, files: &[InputFile]) -> io::Result<(Vec<DuplicateEntry>, DuplicateHashFiles)> {
    let reader = BufReader::new(File::open(path)?);

    let mut entries = Vec::new();
    let mut duplicate_hash_files = DuplicateHashFiles::new();
    let mut current: Option<Group> = None;

    for line in reader.lines() {
        let line = line?;
        let mut parts = line.splitn(3, '\t');
        let hex = parts.next().unwrap_or("");
        let fid_str = parts.next().unwrap_or("");
        let prefix = parts.next().unwrap_or("");

        let (Some(hash), Ok(fid)) = (Hash64::from_hex(hex), fid_str.parse::<u32>()) else {
            continue;
        };
        let fid = FileId(fid);

        match current.take() {
            Some(mut group) if group.hash == hash => {
                group.count += 1;
                group.files.insert(fid);
                current = Some(group);
            }
            Some(finished) => {
                flush_group(finished, files, &mut entries, &mut duplicate_hash_files);
                let mut new_files = BTreeSet::new();
                new_files.insert(fid);
                current = Some(Group {
                    hash,
                    prefix: prefix.to_string(),
                    files: new_files,
                    count: 1,
                });
            }
            None => {
                let mut new_files = BTreeSet::new();
                new_files.insert(fid);
                current = Some(Group {
                    hash,
                    prefix: prefix.to_string(),
                    files: new_files,
                    count: 1,
                });
            }
        }
    }

    if let Some(group) = current {
        flush_group(group, files, &mut entries, &mut duplicate_hash_files);
    }

    entries.sort_by(|a, b| a.prefix.cmp(&b.prefix));
    Ok((entries, duplicate_hash_files))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn files() -> Vec<InputFile> {
        vec![
            InputFile {
                id: FileId(0),
                path: PathBuf::from("a.csv"),
                basename: "a.csv".to_string(),
                size: 10,
            },
            InputFile {
                id: FileId(1),
                path: PathBuf::from("b.csv"),
                basename: "b.csv".to_string(),
                size: 20,
            },
        ]
    }

    #[test]
    fn groups_adjacent_equal_hashes_across_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("merged.tmp");
        fs::write(&path, "0000000000000001\t0\tfoo\n0000000000000001\t1\tfoo\n0000000000000002\t0\tbar\n").unwrap();

        let (entries, index) = group_final_run(&path, &files()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].basenames, vec!["a.csv".to_string(), "b.csv".to_string()]);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn intra_file_group_counted_as_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("merged.tmp");
        fs::write(&path, "0000000000000001\t0\tfoo\n0000000000000001\t0\tfoo\n").unwrap();

        let (entries, _) = group_final_run(&path, &files()).unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].is_intra_file_only());
    }

    #[test]
    fn singleton_hash_is_not_a_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("merged.tmp");
        fs::write(&path, "0000000000000001\t0\tfoo\n").unwrap();

        let (entries, _) = group_final_run(&path, &files()).unwrap();
        assert!(entries.is_empty());
    }
}
