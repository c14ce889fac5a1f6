//! DISK phase 1 (§4.7): scan each file in byte-bounded chunks, stable-sort
//! each chunk by Hash64, write it out as a sorted run file.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::warn;

use crate::context::RunContext;
use crate::model::{truncate_display_prefix, FileId, HashRecord, InputFile};
use crate::normalizer::normalize_key;
use crate::scanner::FileScanner;

use super::{CHUNK_BYTES, DISK_MODE_DELIMITER};

/// Scan every file in parallel, producing sorted run files in `temp_dir`.
/// Returns the run file paths and the list of files that failed outright.
pub fn write_sorted_runs(
    files: &[InputFile],
    ctx: &RunContext,
    temp_dir: &Path,
) -> std::io::Result<(Vec<PathBuf>, Vec<PathBuf>)> {
    let results: Vec<(PathBuf, std::io::Result<Vec<PathBuf>>)> = files
        .par_iter()
        .map(|file| (file.path.clone(), write_runs_for_file(file, ctx, temp_dir)))
        .collect();

    let mut run_files = Vec::new();
    let mut failed_files = Vec::new();
    for (path, result) in results {
        match result {
            Ok(mut paths) => run_files.append(&mut paths),
            Err(e) => {
                warn!(file = %path.display(), error = %e, "DISK phase 1: file scan failed, skipping");
                failed_files.push(path);
            }
        }
    }
    Ok((run_files, failed_files))
}

fn write_runs_for_file(file: &InputFile, ctx: &RunContext, temp_dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut scanner = FileScanner::open(&file.path)?;
    let mut chunk: Vec<HashRecord> = Vec::new();
    let mut chunk_bytes: u64 = 0;
    let mut chunk_index: u32 = 0;
    let mut outputs = Vec::new();

    while let Some(line) = scanner.next_line()? {
        let key = normalize_key(line.as_bytes(), ctx.config.hash_delimiter, ctx.config.hash_fields);
        let hash = ctx.hasher.hash(key);
        let prefix = sanitize_prefix(truncate_display_prefix(&line, ctx.config.write_length));

        chunk_bytes += line.len() as u64;
        chunk.push(HashRecord {
            hash,
            file: file.id,
            prefix,
        });

        if chunk_bytes >= CHUNK_BYTES {
            outputs.push(write_chunk(&mut chunk, file.id, chunk_index, temp_dir)?);
            chunk_index += 1;
            chunk_bytes = 0;
        }
    }

    if !chunk.is_empty() {
        outputs.push(write_chunk(&mut chunk, file.id, chunk_index, temp_dir)?);
    }

    Ok(outputs)
}

/// The DisplayPrefix may not itself contain the run-file field separator.
fn sanitize_prefix(prefix: String) -> String {
    if prefix.as_bytes().contains(&DISK_MODE_DELIMITER) {
        prefix.replace(DISK_MODE_DELIMITER as char, " ")
    } else {
        prefix
    }
}

fn write_chunk(
    chunk: &mut Vec<HashRecord>,
    file_id: FileId,
    chunk_index: u32,
    temp_dir: &Path,
) -> std::io::Result<PathBuf> {
    // Stable sort: equal-hash records keep scan order, so "first record of
    // a group" downstream matches the earliest-scanned line (§9 resolution 3).
    chunk.sort_by(|a, b| a.hash.cmp(&b.hash));

    let path = temp_dir.join(format!("hashes_{}_chunk_{}.tmp", file_id.0, chunk_index));
    let file = File::create(&path)?;
    let mut writer = BufWriter::new(file);
    for record in chunk.drain(..) {
        writeln!(writer, "{}\t{}\t{}", record.hash.to_hex(), record.file.0, record.prefix)?;
    }
    writer.flush()?;
    Ok(path)
}
