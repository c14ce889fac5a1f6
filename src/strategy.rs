//! The Strategy Selector (§4.4): picks FAST, SAFE, or DISK from an a-priori
//! memory budget model, or honors an explicit `--strategy` override.

use tracing::{info, warn};

use crate::config::{Strategy, StrategyThresholds};
use crate::model::InputFile;

/// The engine actually chosen for this run, after resolving `Strategy::Auto`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChosenEngine {
    Fast,
    Safe,
    Disk,
}

impl ChosenEngine {
    pub fn name(self) -> &'static str {
        match self {
            ChosenEngine::Fast => "FAST",
            ChosenEngine::Safe => "SAFE",
            ChosenEngine::Disk => "DISK",
        }
    }
}

/// A snapshot of the decision inputs, logged verbatim so a run is
/// reproducible from its log file alone.
#[derive(Debug, Clone, Copy)]
pub struct MemoryProbe {
    pub available_bytes: u64,
    pub total_bytes: u64,
}

/// Probe available system memory via `sysinfo`. Returns `None` if the probe
/// itself fails (no swap/memory info could be read), in which case the
/// caller must fall back to SAFE (§4.4).
pub fn probe_memory() -> Option<MemoryProbe> {
    let mut sys = sysinfo::System::new();
    sys.refresh_memory();
    let total = sys.total_memory();
    if total == 0 {
        return None;
    }
    Some(MemoryProbe {
        available_bytes: sys.available_memory(),
        total_bytes: total,
    })
}

/// Sum of input file sizes, in bytes.
pub fn total_input_bytes(files: &[InputFile]) -> u64 {
    files.iter().map(|f| f.size).sum()
}

/// Choose an engine.
///
/// When `requested` is anything other than `Auto`, that choice is honored
/// unconditionally — an explicit `--strategy` flag always wins, the model
/// below only applies to `Auto` (§4.4, §5).
///
/// The `Auto` model: probe available RAM; if the probe fails, fall back to
/// SAFE outright. Otherwise compute a usable memory budget `C` as
/// `available_bytes * ram_usage_threshold`, estimate the cost of each
/// in-memory engine as `total_input_bytes * factor`, and pick:
///   - FAST if `total_input_bytes * fast_factor < C`
///   - SAFE if that doesn't hold but `total_input_bytes * safe_factor < C`
///   - DISK otherwise
///
/// `fast_factor` is deliberately larger than `safe_factor` (FAST holds every
/// record's key in memory at once; SAFE never holds more than one file's
/// worth), so FAST's projected cost clears the budget first and SAFE's is
/// only consulted once FAST is ruled out.
pub fn select_engine(
    requested: Strategy,
    files: &[InputFile],
    thresholds: StrategyThresholds,
) -> ChosenEngine {
    match requested {
        Strategy::Fast => {
            info!(strategy = "FAST", reason = "explicit override", "strategy selected");
            return ChosenEngine::Fast;
        }
        Strategy::Safe => {
            info!(strategy = "SAFE", reason = "explicit override", "strategy selected");
            return ChosenEngine::Safe;
        }
        Strategy::Disk => {
            info!(strategy = "DISK", reason = "explicit override", "strategy selected");
            return ChosenEngine::Disk;
        }
        Strategy::Auto => {}
    }

    let total_bytes = total_input_bytes(files);

    let probe = match probe_memory() {
        Some(p) => p,
        None => {
            warn!("memory probe failed; falling back to SAFE");
            return ChosenEngine::Safe;
        }
    };

    let usable = (probe.available_bytes as f64) * thresholds.ram_usage_threshold;
    let fast_cost = (total_bytes as f64) * thresholds.fast_factor;
    let safe_cost = (total_bytes as f64) * thresholds.safe_factor;

    info!(
        available_bytes = probe.available_bytes,
        total_bytes = probe.total_bytes,
        usable_bytes = usable as u64,
        fast_cost_bytes = fast_cost as u64,
        safe_cost_bytes = safe_cost as u64,
        total_input_bytes = total_bytes,
        "memory probe"
    );

    let chosen = if fast_cost < usable {
        ChosenEngine::Fast
    } else if safe_cost < usable {
        ChosenEngine::Safe
    } else {
        ChosenEngine::Disk
    };

    info!(strategy = chosen.name(), reason = "auto model", "strategy selected");
    chosen
}
