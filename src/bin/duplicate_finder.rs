use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::error;

use duplicate_finder_core::config::{Config, Strategy};
use duplicate_finder_core::context::RunContext;
use duplicate_finder_core::driver;
use duplicate_finder_core::logging;

#[derive(Parser)]
#[command(
    name = "duplicate_finder",
    about = "Find and optionally remove duplicate records across delimited text files"
)]
struct Cli {
    /// Input directory to scan
    #[arg(short = 'i', long = "input", default_value = "input")]
    input: PathBuf,

    /// Engine selection: auto, fast, safe, disk
    #[arg(short = 's', long = "strategy", default_value = "auto")]
    strategy: String,

    /// DisplayPrefix length, in bytes
    #[arg(short = 'l', long = "write-length", default_value_t = 47)]
    write_length: usize,

    /// Number of leading delimiter-separated fields that make up the key
    #[arg(long = "hash-fields", default_value_t = 6)]
    hash_fields: usize,

    /// Field delimiter character
    #[arg(short = 'd', long = "hash-delimiter", default_value = ";")]
    hash_delimiter: char,

    /// Glob pattern used to select input files
    #[arg(short = 'p', long = "file-pattern", default_value = "*.csv")]
    file_pattern: String,

    /// Maximum number of sorted runs merged at once on the DISK engine
    #[arg(long = "merge-batch-size", default_value_t = 256)]
    merge_batch_size: usize,

    /// Remove duplicate records in place after finding them. Accepts an
    /// optional explicit value (`--deleteduplicates true`), not just the
    /// bare flag, since the bare form alone can't express `false` on a
    /// command line that also wants a non-default value.
    #[arg(
        long = "deleteduplicates",
        num_args = 0..=1,
        default_value_t = false,
        default_missing_value = "true",
        value_parser = clap::value_parser!(bool)
    )]
    delete_duplicates: bool,

    /// Mirror debug-level logs to the console
    #[arg(short = 'v', long = "verbose", default_value_t = false)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let strategy: Strategy = cli.strategy.parse().unwrap_or_else(|e| {
        eprintln!("duplicate_finder: {e}");
        process::exit(1);
    });

    let config = Config {
        input_dir: cli.input,
        strategy,
        write_length: cli.write_length,
        hash_fields: cli.hash_fields,
        hash_delimiter: cli.hash_delimiter as u8,
        file_pattern: cli.file_pattern,
        merge_batch_size: cli.merge_batch_size,
        delete_duplicates: cli.delete_duplicates,
        verbose: cli.verbose,
        ..Config::default()
    };

    let started_at = chrono::Local::now();
    let ctx = RunContext::new(config.clone(), started_at);

    let _logging_handle = match logging::init_logging(&config.log_dir, &ctx.timestamp_tag(), config.verbose) {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("duplicate_finder: failed to initialize logging: {e}");
            process::exit(1);
        }
    };

    match driver::run(&ctx) {
        Ok(summary) => {
            if summary.had_any_failure() {
                process::exit(1);
            }
        }
        Err(e) => {
            error!(error = %e, "run aborted");
            eprintln!("duplicate_finder: {e}");
            process::exit(1);
        }
    }
}
