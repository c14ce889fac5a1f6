//! `RunContext`: the handful of values every component needs, threaded
//! through instead of re-derived (resolution of design note 9 in SPEC_FULL.md
//! §9 — read access to config, the chosen hasher, and the run's start time
//! live in one place).

use chrono::{DateTime, Local};

use crate::config::Config;
use crate::hasher::{default_hasher, KeyHasher};

pub struct RunContext {
    pub config: Config,
    pub hasher: Box<dyn KeyHasher>,
    pub started_at: DateTime<Local>,
}

impl RunContext {
    pub fn new(config: Config, started_at: DateTime<Local>) -> Self {
        RunContext {
            config,
            hasher: Box::new(default_hasher()),
            started_at,
        }
    }

    /// Build with an explicit hasher, for callers that compiled in the
    /// `crypto-hash-fallback` feature and want that algorithm instead.
    pub fn with_hasher(config: Config, started_at: DateTime<Local>, hasher: Box<dyn KeyHasher>) -> Self {
        RunContext {
            config,
            hasher,
            started_at,
        }
    }

    /// Timestamp string used for the run's log filename:
    /// `duplicate_finder_<YYYYMMDD_HHMMSS>.log`.
    pub fn timestamp_tag(&self) -> String {
        self.started_at.format("%Y%m%d_%H%M%S").to_string()
    }
}
