//! Core data types shared by every engine (§3 of the spec).

use std::collections::BTreeSet;
use std::path::PathBuf;

/// Dense, nonnegative, per-run identifier for an input file.
///
/// Ordering is defined once, at enumeration time, by ascending file size
/// with basename as the tiebreaker (Invariant 3). Every later component
/// (engines, report writer, deletion pipeline) trusts that order instead
/// of re-deriving it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileId(pub u32);

impl FileId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A file under consideration for this run.
#[derive(Debug, Clone)]
pub struct InputFile {
    pub id: FileId,
    pub path: PathBuf,
    pub basename: String,
    pub size: u64,
}

/// 64-bit fixed-seed hash of a normalized key (§4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hash64(pub u64);

impl Hash64 {
    /// Lowercase, fixed-width 16-hex-digit encoding used in DISK run files.
    pub fn to_hex(self) -> String {
        format!("{:016x}", self.0)
    }

    pub fn from_hex(s: &str) -> Option<Self> {
        u64::from_str_radix(s, 16).ok().map(Hash64)
    }
}

/// First L bytes of a trimmed raw line, truncated to a UTF-8 character
/// boundary. Used purely for reporting — never hashed, never compared.
pub type DisplayPrefix = String;

/// Truncate `line` to at most `max_bytes` bytes without splitting a UTF-8
/// code point, per the resolution of open question 1 in §9.
pub fn truncate_display_prefix(line: &str, max_bytes: usize) -> DisplayPrefix {
    if line.len() <= max_bytes {
        return line.to_string();
    }
    let mut end = max_bytes;
    while end > 0 && !line.is_char_boundary(end) {
        end -= 1;
    }
    line[..end].to_string()
}

/// A row in a DISK-tier sorted run file: the fields written as
/// `HEX_HASH\tFID\tPREFIX\n`.
#[derive(Debug, Clone)]
pub struct HashRecord {
    pub hash: Hash64,
    pub file: FileId,
    pub prefix: DisplayPrefix,
}

/// One line of the final `duplicates.txt` report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateEntry {
    pub prefix: DisplayPrefix,
    /// Basenames, already sorted ascending.
    pub basenames: Vec<String>,
}

impl DuplicateEntry {
    /// Pure intra-file duplication: every occurrence lives in the same file.
    pub fn is_intra_file_only(&self) -> bool {
        self.basenames.len() == 1
    }
}

/// Hash64 → distinct FileIds, restricted to hashes whose total occurrence
/// count across the corpus is greater than one. Handed from an engine to
/// the deletion pipeline; deliberately does not carry DisplayPrefix or
/// per-file counts since deletion needs neither.
pub type DuplicateHashFiles = std::collections::HashMap<Hash64, BTreeSet<FileId>>;

/// What an engine hands back to the driver.
#[derive(Debug, Clone, Default)]
pub struct EngineOutput {
    pub entries: Vec<DuplicateEntry>,
    pub duplicate_hash_files: DuplicateHashFiles,
    /// Files that produced zero usable occurrences due to a per-file error.
    pub failed_files: Vec<PathBuf>,
}
