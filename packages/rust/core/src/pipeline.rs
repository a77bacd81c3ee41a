//! End-to-end enrichment pipeline: load → counties → owners → persist → summary.
//!
//! Fully sequential: records are processed in stable row order within each
//! phase, and county enrichment for all rows completes before owner
//! enrichment for any row begins, because owner dispatch may depend on a
//! just-resolved county. Resolved values are applied to the table
//! immediately, so a mid-run failure still preserves partial progress.

use std::path::PathBuf;
use std::time::Instant;

use chrono::Utc;
use titlescout_geocode::{AddressQuery, Geocoder};
use titlescout_owners::OwnerProvider;
use titlescout_shared::{Result, TableConfig, TargetField};
use titlescout_table::AddressTable;
use tracing::{info, instrument};

use crate::enrich::{GeocodeEnricher, OwnerEnricher};
use crate::progress::ProgressReporter;
use crate::summary::{FieldStats, RunSummary};

/// Configuration for one enrichment run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Input CSV path.
    pub input: PathBuf,
    /// Output CSV path.
    pub output: PathBuf,
    /// Table settings (column names, sentinel).
    pub table: TableConfig,
    /// Minimum seconds between geocoder calls.
    pub geocode_delay_secs: f64,
    /// Minimum seconds between owner-lookup calls.
    pub owner_delay_secs: f64,
    /// Skip the county phase entirely.
    pub skip_county: bool,
    /// Skip the owner phase entirely.
    pub skip_owner: bool,
}

/// Run the full enrichment pipeline.
///
/// Per-record failures never abort the run; only startup/configuration and
/// I/O errors propagate. A completed run always produces a [`RunSummary`]
/// and a best-effort output table — partial success is the expected common
/// case, not an error state.
#[instrument(skip_all, fields(input = %config.input.display()))]
pub async fn run(
    config: &RunConfig,
    geocoder: &dyn Geocoder,
    owners: &mut dyn OwnerProvider,
    progress: &dyn ProgressReporter,
) -> Result<RunSummary> {
    let start = Instant::now();
    let started_at = Utc::now();

    progress.phase("Loading table");
    let mut table = AddressTable::load(&config.input, &config.table)?;

    let mut summary = RunSummary {
        total_rows: table.len(),
        county: FieldStats::default(),
        owner: FieldStats::default(),
        started_at,
        elapsed: std::time::Duration::ZERO,
    };

    info!(rows = table.len(), "starting enrichment run");

    // --- County phase ---
    if config.skip_county {
        info!("county phase skipped");
    } else {
        progress.phase("Detecting missing counties");
        let candidates: Vec<usize> = table.missing(TargetField::County).collect();
        summary.county.candidates = candidates.len();
        summary.county.already_complete = table.len() - candidates.len();
        info!(
            candidates = candidates.len(),
            already_complete = summary.county.already_complete,
            "county detection complete"
        );

        progress.phase("Resolving counties");
        let enricher = GeocodeEnricher::new(geocoder, config.geocode_delay_secs);
        let total = candidates.len();
        for (i, row) in candidates.into_iter().enumerate() {
            let query = AddressQuery {
                street: table.street(row).to_string(),
                city: table.city(row).to_string(),
                state: table.state(row).to_string(),
                zip: table.zip(row).to_string(),
            };
            let outcome = enricher.enrich(&query).await;
            if let Some(county) = outcome.value() {
                table.set_county(row, county);
            }
            summary.county.record(&outcome);
            progress.record(TargetField::County, i + 1, total, &outcome);
        }
    }

    // --- Owner phase ---
    if config.skip_owner {
        info!("owner phase skipped");
    } else {
        progress.phase("Detecting missing owners");
        // Detection runs after the county phase so rows whose county was
        // just resolved dispatch with it.
        let candidates: Vec<usize> = table.missing(TargetField::Owner).collect();
        summary.owner.candidates = candidates.len();
        summary.owner.already_complete = table.len() - candidates.len();
        info!(
            candidates = candidates.len(),
            already_complete = summary.owner.already_complete,
            "owner detection complete"
        );

        if !candidates.is_empty() {
            progress.phase("Resolving owners");
            // The session spans the rest of the run and is released exactly
            // once, on every exit path.
            owners.open()?;

            let enricher = OwnerEnricher::new(&*owners, config.owner_delay_secs);
            let total = candidates.len();
            for (i, row) in candidates.into_iter().enumerate() {
                let outcome = enricher
                    .enrich(table.county(row), table.street(row), table.city(row))
                    .await;
                if let Some(owner) = outcome.value() {
                    table.set_owner(row, owner);
                }
                summary.owner.record(&outcome);
                progress.record(TargetField::Owner, i + 1, total, &outcome);
            }

            owners.close();
        }
    }

    // --- Persist ---
    progress.phase("Writing output");
    table.save(&config.output)?;

    summary.elapsed = start.elapsed();
    progress.done(&summary);

    info!(
        county_resolved = summary.county.resolved,
        county_unresolved = summary.county.unresolved,
        owner_resolved = summary.owner.resolved,
        owner_unresolved = summary.owner.unresolved,
        elapsed_ms = summary.elapsed.as_millis(),
        "enrichment run complete"
    );

    Ok(summary)
}
