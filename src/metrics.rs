//! Vendor-agnostic metrics collection via a pluggable sink.
//!
//! Every call to [`crate::minimize`] reports a [`MinimizeStats`] snapshot to
//! the installed [`MetricsSink`], so consumers can track how much their
//! documents shrink without tying this crate to a metrics backend.
//!
//! ## Usage
//!
//! ```
//! use policy_minimizer::metrics::{MetricsSink, MinimizeStats};
//! use std::sync::atomic::{AtomicU64, Ordering};
//! use std::sync::Arc;
//!
//! struct MergeCounter {
//!     merges: AtomicU64,
//! }
//!
//! impl MetricsSink for MergeCounter {
//!     fn on_minimize(&self, stats: &MinimizeStats) {
//!         self.merges.fetch_add(stats.merges as u64, Ordering::Relaxed);
//!     }
//! }
//!
//! policy_minimizer::metrics::set_sink(Arc::new(MergeCounter { merges: AtomicU64::new(0) }));
//! ```

use serde::Serialize;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::warn;

/// Snapshot of one minimization run, passed to [`MetricsSink::on_minimize`].
#[derive(Debug, Clone, Serialize)]
pub struct MinimizeStats {
    /// Total wall-clock time of the run
    pub duration: Duration,
    /// Statements handed to the minimizer
    pub statements_in: usize,
    /// Statements left after minimization
    pub statements_out: usize,
    /// Pairwise merges performed (duplicates included)
    pub merges: usize,
    /// Full or partial pair scans, including the final scan that found nothing
    pub passes: usize,
}

impl MinimizeStats {
    /// Statements removed by the run.
    pub fn removed(&self) -> usize {
        self.statements_in.saturating_sub(self.statements_out)
    }
}

/// Time spent per phase of a run, in milliseconds.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MinimizePhases {
    /// Dropping exact duplicates before merging
    pub pre_winnow_ms: f64,
    /// The merge loop
    pub fixpoint_ms: f64,
    /// Deduplicating fields and dropping subsumed statements afterwards
    pub post_winnow_ms: f64,
    /// Whole run
    pub total_ms: f64,
}

impl MinimizePhases {
    /// Time not accounted for by the measured phases.
    pub fn overhead_ms(&self) -> f64 {
        self.total_ms - (self.pre_winnow_ms + self.fixpoint_ms + self.post_winnow_ms)
    }
}

/// Consumer of minimization metrics.
///
/// Implementations must be thread-safe and should return quickly; they are
/// called synchronously at the end of every run.
pub trait MetricsSink: Send + Sync {
    fn on_minimize(&self, stats: &MinimizeStats);

    /// Per-phase timings. Ignored unless overridden.
    fn on_minimize_phases(&self, _stats: &MinimizeStats, _phases: &MinimizePhases) {}
}

struct NoOpSink;

impl MetricsSink for NoOpSink {
    fn on_minimize(&self, _stats: &MinimizeStats) {}
}

static SINK: OnceLock<Arc<dyn MetricsSink>> = OnceLock::new();

fn sink() -> Arc<dyn MetricsSink> {
    SINK.get_or_init(|| Arc::new(NoOpSink)).clone()
}

/// Install the process-wide sink.
///
/// The sink can be set once, before the first run; later calls are ignored
/// with a warning.
pub fn set_sink(sink: Arc<dyn MetricsSink>) {
    if SINK.set(sink).is_err() {
        warn!(
            "Metrics sink was already initialized. Ignoring subsequent set_sink call. Set the sink before the first minimization."
        );
    }
}

pub(crate) fn record_minimize(stats: &MinimizeStats, phases: &MinimizePhases) {
    let sink = sink();
    sink.on_minimize(stats);
    sink.on_minimize_phases(stats, phases);
}
