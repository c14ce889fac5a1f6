//! Driver (§2, §7): enumerates input files, selects a strategy, runs the
//! chosen engine, optionally runs deletion, writes the report, and decides
//! the run's exit status.

use tracing::{error, info, warn};

use crate::config::{Config, StrategyThresholds};
use crate::context::RunContext;
use crate::error::{RunError, RunResult};
use crate::fileset::enumerate_input_files;
use crate::model::EngineOutput;
use crate::report::write_report;
use crate::strategy::{select_engine, ChosenEngine};
use crate::{deletion, engine};

/// Summary of one run, enough to decide the process exit code (§6, §7):
/// zero iff no fatal error occurred and no file/stage recorded a failure.
pub struct RunSummary {
    pub duplicate_entry_count: usize,
    pub failed_file_count: usize,
    pub deletion_error_count: usize,
}

impl RunSummary {
    pub fn had_any_failure(&self) -> bool {
        self.failed_file_count > 0 || self.deletion_error_count > 0
    }
}

pub fn run(ctx: &RunContext) -> RunResult<RunSummary> {
    let files = enumerate_input_files(&ctx.config.input_dir, &ctx.config.file_pattern)?;
    info!(file_count = files.len(), "enumerated input files");

    if files.is_empty() {
        warn!("no input files matched the configured pattern");
        write_report(&ctx.config.output_path, &[]).map_err(RunError::Report)?;
        return Ok(RunSummary {
            duplicate_entry_count: 0,
            failed_file_count: 0,
            deletion_error_count: 0,
        });
    }

    let thresholds = StrategyThresholds::default();
    let chosen = select_engine(ctx.config.strategy, &files, thresholds);
    info!(engine = chosen.name(), workers = ctx.config.workers, "running engine");

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(ctx.config.workers.max(1))
        .build()
        .map_err(|e| RunError::WorkerPool(e.to_string()))?;
    let output = pool.install(|| run_engine(chosen, &files, ctx))?;

    for failed in &output.failed_files {
        error!(file = %failed.display(), "file contributed no data due to a scan failure");
    }

    let mut deletion_error_count = 0;
    if ctx.config.delete_duplicates {
        let errors = deletion::run_deletion_pipeline(&files, &output.duplicate_hash_files, ctx);
        deletion_error_count = errors.len();
    }

    write_report(&ctx.config.output_path, &output.entries).map_err(RunError::Report)?;
    info!(
        duplicate_entries = output.entries.len(),
        failed_files = output.failed_files.len(),
        deletion_errors = deletion_error_count,
        "run complete"
    );

    Ok(RunSummary {
        duplicate_entry_count: output.entries.len(),
        failed_file_count: output.failed_files.len(),
        deletion_error_count,
    })
}

fn run_engine(chosen: ChosenEngine, files: &[crate::model::InputFile], ctx: &RunContext) -> RunResult<EngineOutput> {
    match chosen {
        ChosenEngine::Fast => Ok(engine::fast::run(files, ctx)),
        ChosenEngine::Safe => Ok(engine::safe_engine::run(files, ctx)),
        ChosenEngine::Disk => engine::disk::run(files, ctx),
    }
}

/// Convenience for the CLI binary: build a `RunContext` from a resolved
/// `Config` and execute the full driver.
pub fn run_with_config(config: Config) -> RunResult<RunSummary> {
    let started_at = chrono::Local::now();
    let ctx = RunContext::new(config, started_at);
    run(&ctx)
}
