//! End-of-run statistics.

use std::time::Duration;

use chrono::{DateTime, Utc};
use titlescout_shared::EnrichmentOutcome;

/// Counters for one target field, owned by the orchestrator for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldStats {
    /// Rows whose field was missing at phase start.
    pub candidates: usize,
    /// Candidates that resolved to a value.
    pub resolved: usize,
    /// Candidates that stayed unresolved.
    pub unresolved: usize,
    /// Rows whose field was already present, never passed to an enricher.
    pub already_complete: usize,
}

impl FieldStats {
    /// Count one enrichment attempt.
    pub fn record(&mut self, outcome: &EnrichmentOutcome) {
        if outcome.is_resolved() {
            self.resolved += 1;
        } else {
            self.unresolved += 1;
        }
    }
}

/// Aggregated counts produced at the end of a run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Total rows in the table.
    pub total_rows: usize,
    /// County phase counters.
    pub county: FieldStats,
    /// Owner phase counters.
    pub owner: FieldStats,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// Total run duration.
    pub elapsed: Duration,
}
