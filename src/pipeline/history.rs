//! Capped, append-only snapshot ledger.
//!
//! The ledger is a derived cache of past runs: a missing, unreadable or
//! corrupt ledger file is replaced by an empty sequence and reported as a
//! warning instead of failing the run.

use crate::error::Result;
use crate::models::{Change, Record, Snapshot, SnapshotRecord};
use crate::storage::DocumentStorage;
use crate::utils::time::{Clock, format_date, format_timestamp};

/// Snapshots read from storage plus the recovery warning, if one was needed.
#[derive(Debug, Clone, Default)]
pub struct LoadedLedger {
    pub snapshots: Vec<Snapshot>,
    pub warning: Option<String>,
}

impl LoadedLedger {
    pub fn last(&self) -> Option<&Snapshot> {
        self.snapshots.last()
    }
}

/// Outcome of a single append.
#[derive(Debug, Clone)]
pub struct AppendReport {
    pub snapshot: Snapshot,
    /// Ledger length after the append
    pub len: usize,
    /// Oldest entries dropped to respect the cap
    pub evicted: usize,
    pub warning: Option<String>,
}

pub struct HistoryLedger<'a, S: DocumentStorage, C: Clock> {
    storage: &'a S,
    key: String,
    cap: usize,
    clock: C,
}

impl<'a, S: DocumentStorage, C: Clock> HistoryLedger<'a, S, C> {
    pub fn new(storage: &'a S, key: impl Into<String>, cap: usize, clock: C) -> Self {
        Self {
            storage,
            key: key.into(),
            cap: cap.max(1),
            clock,
        }
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Read the ledger, falling back to an empty one when it can't be used.
    pub fn load(&self) -> LoadedLedger {
        let parsed = self.storage.read_bytes(&self.key).and_then(|bytes| match bytes {
            Some(bytes) => Ok(serde_json::from_slice::<Vec<Snapshot>>(&bytes)?),
            None => Ok(Vec::new()),
        });

        match parsed {
            Ok(snapshots) => LoadedLedger {
                snapshots,
                warning: None,
            },
            Err(e) => {
                let warning = format!(
                    "History at {} could not be read ({}), starting a new one",
                    self.storage.location(&self.key),
                    e
                );
                log::warn!("{warning}");
                LoadedLedger {
                    snapshots: Vec::new(),
                    warning: Some(warning),
                }
            }
        }
    }

    /// Capture the full current record set together with `changes`.
    pub fn build_snapshot(&self, records: &[Record], changes: &[Change]) -> Snapshot {
        let now = self.clock.now();
        Snapshot {
            date: format_date(now.date_naive()),
            timestamp: format_timestamp(now),
            total: records.len(),
            active_count: records.iter().filter(|r| r.is_active()).count(),
            records: records.iter().map(SnapshotRecord::from).collect(),
            changes: changes.to_vec(),
        }
    }

    /// Append a new snapshot and rewrite the ledger, evicting the oldest
    /// entries beyond the cap. Repeated calls are not deduplicated.
    pub fn append(&self, records: &[Record], changes: &[Change]) -> Result<AppendReport> {
        let LoadedLedger {
            mut snapshots,
            warning,
        } = self.load();

        let snapshot = self.build_snapshot(records, changes);
        snapshots.push(snapshot.clone());

        let evicted = snapshots.len().saturating_sub(self.cap);
        if evicted > 0 {
            snapshots.drain(..evicted);
            log::debug!("History cap {} reached, dropped {} snapshot(s)", self.cap, evicted);
        }

        self.storage.write_json(&self.key, &snapshots)?;

        Ok(AppendReport {
            snapshot,
            len: snapshots.len(),
            evicted,
            warning,
        })
    }
}
