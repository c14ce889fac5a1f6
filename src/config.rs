//! Resolved run configuration (§6). The CLI parser (`src/bin/duplicate_finder.rs`)
//! is the only place that knows about `clap`; everything below it consumes
//! this plain struct.

use std::path::PathBuf;

/// Engine selection (`-s` / `--strategy`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Auto,
    Fast,
    Safe,
    Disk,
}

impl std::str::FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Strategy::Auto),
            "fast" => Ok(Strategy::Fast),
            "safe" => Ok(Strategy::Safe),
            "disk" => Ok(Strategy::Disk),
            other => Err(format!("unknown strategy '{other}'")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub input_dir: PathBuf,
    pub strategy: Strategy,
    pub write_length: usize,
    pub hash_fields: usize,
    pub hash_delimiter: u8,
    pub file_pattern: String,
    pub merge_batch_size: usize,
    pub delete_duplicates: bool,
    pub verbose: bool,
    /// Number of parallel workers, applied as a scoped rayon thread pool
    /// around the chosen engine (`driver::run`). Defaults to max(1, cpus - 1) (§5).
    pub workers: usize,
    pub output_path: PathBuf,
    pub temp_dir: PathBuf,
    pub log_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            input_dir: PathBuf::from("input"),
            strategy: Strategy::Auto,
            write_length: 47,
            hash_fields: 6,
            hash_delimiter: b';',
            file_pattern: "*.csv".to_string(),
            merge_batch_size: 256,
            delete_duplicates: false,
            verbose: false,
            workers: default_worker_count(),
            output_path: PathBuf::from("duplicates.txt"),
            temp_dir: PathBuf::from("temp_duplicate_finder"),
            log_dir: PathBuf::from("logs"),
        }
    }
}

/// max(1, cpus - 1), the default worker pool size used by every engine (§5).
pub fn default_worker_count() -> usize {
    num_cpus::get().saturating_sub(1).max(1)
}

/// Tunables for the Strategy Selector (§4.4). Not user-configurable in this
/// build — the spec fixes their defaults — but kept as a distinct struct so
/// `strategy::select` and its tests don't need a full `Config`.
#[derive(Debug, Clone, Copy)]
pub struct StrategyThresholds {
    pub ram_usage_threshold: f64,
    pub fast_factor: f64,
    pub safe_factor: f64,
}

impl Default for StrategyThresholds {
    fn default() -> Self {
        StrategyThresholds {
            ram_usage_threshold: 0.70,
            fast_factor: 0.4,
            safe_factor: 0.1,
        }
    }
}
