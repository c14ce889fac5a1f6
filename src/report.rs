//! Report Writer (§4.8): emits the ordered `duplicates.txt`.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::model::DuplicateEntry;

const INTRA_FILE_MARKER: &str = "(Fájlon belüli duplikátumok) ";
const NO_DUPLICATES_LINE: &str = "Nem található duplikátum.";

/// Write `entries` (already sorted ascending by DisplayPrefix, per every
/// engine's contract) to `path` in the report format.
pub fn write_report(path: &Path, entries: &[DuplicateEntry]) -> io::Result<()> {
    let file = File::create(path)?;
    let mut writer = io::BufWriter::new(file);

    if entries.is_empty() {
        writeln!(writer, "{NO_DUPLICATES_LINE}")?;
        return writer.flush();
    }

    for entry in entries {
        if entry.is_intra_file_only() {
            writeln!(writer, "{INTRA_FILE_MARKER}{}", entry.prefix)?;
        } else {
            writeln!(writer, "{}", entry.prefix)?;
        }
        for basename in &entry.basenames {
            writeln!(writer, "    - {basename}")?;
        }
    }

    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_duplicates_writes_single_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("duplicates.txt");
        write_report(&path, &[]).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "Nem található duplikátum.\n");
    }

    #[test]
    fn inter_file_entry_has_no_marker() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("duplicates.txt");
        let entries = vec![DuplicateEntry {
            prefix: "010;HO".to_string(),
            basenames: vec!["a.csv".to_string(), "b.csv".to_string()],
        }];
        write_report(&path, &entries).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "010;HO\n    - a.csv\n    - b.csv\n");
    }

    #[test]
    fn intra_file_entry_gets_marker() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("duplicates.txt");
        let entries = vec![DuplicateEntry {
            prefix: "010;HO".to_string(),
            basenames: vec!["a.csv".to_string()],
        }];
        write_report(&path, &entries).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "(Fájlon belüli duplikátumok) 010;HO\n    - a.csv\n");
    }

    #[test]
    fn entries_already_sorted_are_emitted_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("duplicates.txt");
        let entries = vec![
            DuplicateEntry {
                prefix: "aaa".to_string(),
                basenames: vec!["a.csv".to_string()],
            },
            DuplicateEntry {
                prefix: "zzz".to_string(),
                basenames: vec!["b.csv".to_string()],
            },
        ];
        write_report(&path, &entries).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        let first_line = contents.lines().next().unwrap();
        assert!(first_line.ends_with("aaa"));
    }
}
