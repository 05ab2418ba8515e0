// src/pipeline/tasks.rs

//! Entry points that wire storage, configuration and the clock into the
//! individual pipeline stages.

use crate::error::{AppError, Result};
use crate::models::{Config, Statistics, Summary};
use crate::services::SourceControl;
use crate::storage::{DocumentStorage, LocalStorage, RecordStore};
use crate::utils::time::Clock;

use super::changelog::ChangelogRenderer;
use super::diff::{ChangeSummary, DiffCalculator};
use super::history::HistoryLedger;
use super::release::{ReleaseOutcome, ReleaseWorkflow};
use super::validate::{Validator, record_file_staged};
use super::{ids, stats, timestamps};

/// Result of a change-log run.
#[derive(Debug, Clone, Default)]
pub struct ChangelogRun {
    pub summary: ChangeSummary,
    /// Ledger length after the append, `None` when nothing was persisted
    pub ledger_len: Option<usize>,
    pub warning: Option<String>,
}

/// Outcome of `run_validation`.
#[derive(Debug, Clone)]
pub enum ValidationRun {
    Valid(Summary),
    /// Incremental mode and the record document wasn't staged
    Skipped,
}

/// Diff the record store against the last snapshot and, when anything
/// changed, append a snapshot and re-render the change log.
pub fn run_changelog<S: DocumentStorage, C: Clock + Clone>(
    config: &Config,
    storage: &S,
    clock: C,
) -> Result<ChangelogRun> {
    let store = RecordStore::new(storage, config.paths.records.as_str());
    let records = store.load()?;
    log::info!("Loaded {} records from {}", records.len(), store.location());

    let ledger = HistoryLedger::new(
        storage,
        config.paths.history.as_str(),
        config.history.max_snapshots,
        clock.clone(),
    );
    let loaded = ledger.load();
    let changes = DiffCalculator::new(clock.clone()).calculate(&records, loaded.last());
    let summary = ChangeSummary::of(&changes);

    if !summary.has_changes() {
        log::info!("No changes detected");
        return Ok(ChangelogRun {
            summary,
            ledger_len: None,
            warning: loaded.warning,
        });
    }

    log::info!(
        "{} change(s): {} added, {} removed, {} status changed",
        summary.change_count(),
        summary.added,
        summary.removed,
        summary.status_changed
    );

    let report = ledger.append(&records, &changes)?;

    let existing = storage.read_text(&config.paths.changelog)?;
    let document = ChangelogRenderer::new(clock).render(&changes, existing.as_deref());
    storage.write_text(&config.paths.changelog, &document)?;
    log::info!("Change log written to {}", storage.location(&config.paths.changelog));

    Ok(ChangelogRun {
        summary,
        ledger_len: Some(report.len),
        warning: report.warning,
    })
}

/// Compute and persist the statistics document.
pub fn run_stats<S: DocumentStorage, C: Clock>(
    config: &Config,
    storage: &S,
    clock: &C,
) -> Result<Statistics> {
    let records = RecordStore::new(storage, config.paths.records.as_str()).load()?;
    let statistics = stats::aggregate(&records, clock.now());
    storage.write_json(&config.paths.statistics, &statistics)?;
    log::info!(
        "Statistics for {} records written to {}",
        statistics.total_classificados,
        storage.location(&config.paths.statistics)
    );
    Ok(statistics)
}

/// Build the validator for the configured schema, relative paths resolved
/// against the storage root.
pub fn build_validator(config: &Config, storage: &LocalStorage) -> Result<Validator> {
    match &config.paths.schema {
        Some(path) => {
            let path = storage.root().join(path);
            log::debug!("Using schema at {}", path.display());
            Validator::from_path(&path)
        }
        None => Validator::new(),
    }
}

/// Validate the record document. Every violation is logged before failing.
pub fn run_validation<S: DocumentStorage, G: SourceControl>(
    config: &Config,
    storage: &S,
    validator: &Validator,
    incremental: Option<&G>,
) -> Result<ValidationRun> {
    if let Some(scm) = incremental {
        if !record_file_staged(scm, &config.paths.records) {
            log::info!("{} not staged, nothing to validate", config.paths.records);
            return Ok(ValidationRun::Skipped);
        }
    }

    let document = RecordStore::new(storage, config.paths.records.as_str()).load_document()?;
    match validator.validate(&document) {
        Ok(summary) => Ok(ValidationRun::Valid(summary)),
        Err(report) => {
            for line in report.lines() {
                log::error!("{line}");
            }
            Err(AppError::Invalid(report.len()))
        }
    }
}

/// Backfill (or with `touch_active`, refresh) timestamps and save when
/// anything changed. Returns the number of records modified.
pub fn run_timestamps<S: DocumentStorage, C: Clock>(
    config: &Config,
    storage: &S,
    clock: &C,
    touch_active: bool,
) -> Result<usize> {
    let store = RecordStore::new(storage, config.paths.records.as_str());
    let mut records = store.load_raw()?;

    let changed = if touch_active {
        timestamps::touch_active(&mut records, clock.now())
    } else {
        timestamps::normalize(&mut records, clock.now())
    };

    if changed > 0 {
        store.save_raw(&records)?;
        log::info!("Updated timestamps on {changed} record(s)");
    } else {
        log::info!("No timestamp updates needed");
    }
    Ok(changed)
}

/// Assign ids to records missing one and save when any were assigned.
pub fn run_ids<S: DocumentStorage>(config: &Config, storage: &S) -> Result<usize> {
    let store = RecordStore::new(storage, config.paths.records.as_str());
    let mut records = store.load_raw()?;

    let assigned = ids::assign_missing(&mut records);
    if assigned > 0 {
        store.save_raw(&records)?;
        log::info!("Assigned {assigned} new id(s)");
    } else {
        log::info!("Every record already has an id");
    }
    Ok(assigned)
}

pub fn run_release<S: DocumentStorage, G: SourceControl>(
    config: &Config,
    storage: &S,
    scm: &G,
    dry_run: bool,
) -> Result<ReleaseOutcome> {
    ReleaseWorkflow::new(
        scm,
        storage,
        &config.release,
        &config.paths.records,
        &config.paths.manifest,
    )
    .run(dry_run)
}
