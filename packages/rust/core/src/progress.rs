//! Per-record progress reporting.

use titlescout_shared::{EnrichmentOutcome, TargetField};

use crate::summary::RunSummary;

/// Progress callback invoked by the orchestrator.
///
/// Infallible by construction: methods return `()`, so a failing reporter
/// cannot abort the run. Implementors handle their own I/O errors; the
/// orchestrator never depends on anything a reporter does.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each per-record enrichment attempt.
    /// `current` is 1-based; `total` is the phase's candidate count.
    fn record(&self, field: TargetField, current: usize, total: usize, outcome: &EnrichmentOutcome);
    /// Called when the run completes.
    fn done(&self, summary: &RunSummary);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn record(
        &self,
        _field: TargetField,
        _current: usize,
        _total: usize,
        _outcome: &EnrichmentOutcome,
    ) {
    }
    fn done(&self, _summary: &RunSummary) {}
}
