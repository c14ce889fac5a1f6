//! The File Scanner component (§4.3): streams record lines from an input
//! file, skipping a discarded header row.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Buffered read size, matching the teacher's `256 * 1024` convention for
/// line-oriented tools.
const SCAN_BUF_SIZE: usize = 256 * 1024;

/// Streams record lines out of one input file.
///
/// Opens the file, discards the first line (the header), then yields each
/// subsequent line: trailing newline stripped, surrounding whitespace
/// trimmed, lossily decoded as UTF-8. Lines that become empty after
/// trimming are skipped — they never reach a caller.
pub struct FileScanner {
    reader: BufReader<File>,
    raw: Vec<u8>,
    header_skipped: bool,
}

impl FileScanner {
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        Ok(FileScanner {
            reader: BufReader::with_capacity(SCAN_BUF_SIZE, file),
            raw: Vec::with_capacity(512),
            header_skipped: false,
        })
    }

    /// Read and discard the header line once. A no-op if already done or if
    /// the file is empty.
    fn skip_header(&mut self) -> io::Result<()> {
        if !self.header_skipped {
            self.raw.clear();
            self.reader.read_until(b'\n', &mut self.raw)?;
            self.header_skipped = true;
        }
        Ok(())
    }

    /// Read the next non-empty (after trim) record line, or `None` at EOF.
    /// An I/O error here is fatal for *this file only* — the caller should
    /// log it with the file's identity and stop iterating, keeping whatever
    /// lines were already produced (§4.3, §7).
    pub fn next_line(&mut self) -> io::Result<Option<String>> {
        self.skip_header()?;

        loop {
            self.raw.clear();
            let n = self.reader.read_until(b'\n', &mut self.raw)?;
            if n == 0 {
                return Ok(None);
            }

            let decoded = String::from_utf8_lossy(&self.raw);
            let trimmed = decoded.trim();
            if trimmed.is_empty() {
                continue;
            }
            return Ok(Some(trimmed.to_string()));
        }
    }
}

/// Collect every scanned line from `path`, stopping early (and keeping
/// whatever was already read) if an I/O error occurs mid-file.
pub fn scan_all(path: &Path) -> io::Result<Vec<String>> {
    let mut scanner = FileScanner::open(path)?;
    let mut lines = Vec::new();
    loop {
        match scanner.next_line() {
            Ok(Some(line)) => lines.push(line),
            Ok(None) => break,
            Err(e) => return Err(e),
        }
    }
    Ok(lines)
}
