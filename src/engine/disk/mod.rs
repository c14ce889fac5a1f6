//! DISK engine (§4.7): chunked per-file external sort, cascading k-way
//! merge, streaming group-by. Used when neither FAST nor SAFE fits the
//! memory budget.

pub mod groupby;
pub mod merge;
pub mod run;

use std::fs;
use std::path::Path;

use tracing::{info, warn};

use crate::context::RunContext;
use crate::error::RunError;
use crate::model::{EngineOutput, InputFile};

/// Target size of a phase-1 chunk before it is sorted and flushed (§4.7).
pub const CHUNK_BYTES: u64 = 128 * 1024 * 1024;

/// The run-file field separator. DisplayPrefixes that happen to contain
/// this byte have it replaced with a space before writing (§4.7 phase 1).
pub const DISK_MODE_DELIMITER: u8 = b'\t';

/// Run the DISK engine end to end: prepare the temp directory, run phases
/// 1–3, then remove the temp directory regardless of outcome (§4.7
/// cleanup, §6 filesystem layout).
pub fn run(files: &[InputFile], ctx: &RunContext) -> Result<EngineOutput, RunError> {
    let temp_dir = ctx.config.temp_dir.clone();
    prepare_temp_dir(&temp_dir)
        .map_err(|e| RunError::DiskAborted(format!("failed to prepare temp directory: {e}")))?;

    let result = run_inner(files, ctx, &temp_dir);

    if let Err(e) = cleanup_temp_dir(&temp_dir) {
        warn!(error = %e, "failed to remove temp directory after DISK run");
    }

    result
}

fn run_inner(files: &[InputFile], ctx: &RunContext, temp_dir: &Path) -> Result<EngineOutput, RunError> {
    let (run_files, failed_files) = run::write_sorted_runs(files, ctx, temp_dir)
        .map_err(|e| RunError::DiskAborted(format!("phase 1 failed: {e}")))?;
    info!(run_file_count = run_files.len(), "DISK phase 1 complete");

    if run_files.is_empty() {
        return Ok(EngineOutput {
            entries: Vec::new(),
            duplicate_hash_files: Default::default(),
            failed_files,
        });
    }

    let merged = merge::cascading_merge(run_files, temp_dir, ctx.config.merge_batch_size)
        .map_err(|e| RunError::DiskAborted(format!("phase 2 (merge) failed: {e}")))?;
    info!(merged_file = %merged.display(), "DISK phase 2 complete");

    let (entries, duplicate_hash_files) = groupby::group_final_run(&merged, files)
        .map_err(|e| RunError::DiskAborted(format!("phase 3 (group-by) failed: {e}")))?;
    info!(entry_count = entries.len(), "DISK phase 3 complete");

    let _ = fs::remove_file(&merged);

    Ok(EngineOutput {
        entries,
        duplicate_hash_files,
        failed_files,
    })
}

fn prepare_temp_dir(dir: &Path) -> std::io::Result<()> {
    if dir.exists() {
        fs::remove_dir_all(dir)?;
    }
    fs::create_dir_all(dir)
}

fn cleanup_temp_dir(dir: &Path) -> std::io::Result<()> {
    if dir.exists() {
        fs::remove_dir_all(dir)?;
    }
    Ok(())
}
