//! Change detection between the last snapshot and the current records.
//!
//! Records are matched by `id`. Output is grouped by kind
//! (add → remove → status_change) and keeps input order inside each group.

use std::collections::{HashMap, HashSet};

use crate::models::{Change, Record, Snapshot, SnapshotRecord};
use crate::utils::time::{Clock, format_date};

/// Per-kind counts of a change list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeSummary {
    pub added: usize,
    pub removed: usize,
    pub status_changed: usize,
}

impl ChangeSummary {
    pub fn of(changes: &[Change]) -> Self {
        changes.iter().fold(Self::default(), |mut acc, change| {
            match change {
                Change::Add { .. } => acc.added += 1,
                Change::Remove { .. } => acc.removed += 1,
                Change::StatusChange { .. } => acc.status_changed += 1,
            }
            acc
        })
    }

    /// Check if there are any changes.
    pub fn has_changes(&self) -> bool {
        self.change_count() > 0
    }

    /// Get the total number of changes.
    pub fn change_count(&self) -> usize {
        self.added + self.removed + self.status_changed
    }
}

/// Calculator for computing changes against the previous snapshot.
#[derive(Debug, Clone)]
pub struct DiffCalculator<C: Clock> {
    clock: C,
}

impl<C: Clock> DiffCalculator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    /// Changes dated with the clock's current day.
    pub fn calculate(&self, current: &[Record], previous: Option<&Snapshot>) -> Vec<Change> {
        calculate_changes(current, previous, &format_date(self.clock.today()))
    }
}

/// Compute the classified change list, stamping every change with `date`.
///
/// Without a previous snapshot the baseline is empty: every record is an
/// addition and no status comparison happens.
pub fn calculate_changes(
    current: &[Record],
    previous: Option<&Snapshot>,
    date: &str,
) -> Vec<Change> {
    let baseline: &[SnapshotRecord] = previous
        .map(|s| s.records.as_slice())
        .unwrap_or_default();

    let prev_map: HashMap<&str, &SnapshotRecord> =
        baseline.iter().map(|r| (r.id.as_str(), r)).collect();
    let curr_ids: HashSet<&str> = current.iter().map(|r| r.id.as_str()).collect();

    let mut changes = Vec::new();

    // Added: in current but not in previous
    changes.extend(
        current
            .iter()
            .filter(|r| !prev_map.contains_key(r.id.as_str()))
            .map(|r| Change::added(date, r)),
    );

    // Removed: in previous but not in current
    changes.extend(
        baseline
            .iter()
            .filter(|r| !curr_ids.contains(r.id.as_str()))
            .map(|r| Change::removed(date, r)),
    );

    // Status changed: in both with a different status
    if previous.is_some() {
        for record in current {
            if let Some(prev) = prev_map.get(record.id.as_str()) {
                if prev.status != record.status {
                    changes.push(Change::status_changed(date, record, prev.status));
                }
            }
        }
    }

    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Location, Status};
    use crate::utils::time::FixedClock;

    const TODAY: &str = "2025-05-10";

    fn make_record(id: &str, title: &str, status: Status) -> Record {
        let mut record = Record::new(id, title);
        record.status = status;
        record.funcoes = vec!["guitarra".into()];
        record.local = Location::new("Recife", "PE");
        record
    }

    fn snapshot_of(records: &[Record]) -> Snapshot {
        Snapshot {
            date: "2025-05-01".into(),
            timestamp: "2025-05-01T09:00:00.000Z".into(),
            total: records.len(),
            active_count: records.iter().filter(|r| r.is_active()).count(),
            records: records.iter().map(SnapshotRecord::from).collect(),
            changes: Vec::new(),
        }
    }

    #[test]
    fn test_no_changes() {
        let records = vec![
            make_record("a1", "Guitarrista", Status::Ativo),
            make_record("b2", "Baixista", Status::Pausado),
        ];
        let previous = snapshot_of(&records);

        let changes = calculate_changes(&records, Some(&previous), TODAY);
        assert!(changes.is_empty());
        assert!(!ChangeSummary::of(&changes).has_changes());
    }

    #[test]
    fn test_single_addition() {
        let prev = vec![make_record("a1", "Guitarrista", Status::Ativo)];
        let curr = vec![
            make_record("a1", "Guitarrista", Status::Ativo),
            make_record("b2", "Baixista", Status::Ativo),
        ];

        let changes = calculate_changes(&curr, Some(&snapshot_of(&prev)), TODAY);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].kind(), "add");
        assert_eq!(changes[0].id(), "b2");
        assert_eq!(changes[0].message(), "Novo classificado: Baixista");

        let summary = ChangeSummary::of(&changes);
        assert_eq!(summary.removed, 0);
        assert_eq!(summary.status_changed, 0);
    }

    #[test]
    fn test_status_change_carries_transition() {
        let prev = vec![make_record("a1", "Guitarrista", Status::Ativo)];
        let curr = vec![make_record("a1", "Guitarrista", Status::Pausado)];

        let changes = calculate_changes(&curr, Some(&snapshot_of(&prev)), TODAY);
        assert_eq!(changes.len(), 1);
        match &changes[0] {
            Change::StatusChange { details, .. } => {
                assert_eq!(details.from, Status::Ativo);
                assert_eq!(details.to, Status::Pausado);
            }
            other => panic!("expected status change, got {other:?}"),
        }
    }

    #[test]
    fn test_removal_carries_id_and_title_only() {
        let prev = vec![
            make_record("a1", "Guitarrista", Status::Ativo),
            make_record("z9", "Vocalista", Status::Ativo),
        ];
        let curr = vec![make_record("a1", "Guitarrista", Status::Ativo)];

        let changes = calculate_changes(&curr, Some(&snapshot_of(&prev)), TODAY);
        assert_eq!(changes.len(), 1);
        let json = serde_json::to_value(&changes[0]).unwrap();
        assert_eq!(json["type"], "remove");
        assert_eq!(json["classificado"], serde_json::json!({"id": "z9", "titulo": "Vocalista"}));
    }

    #[test]
    fn test_grouped_by_kind_in_input_order() {
        let prev = vec![
            make_record("keep", "Keep", Status::Ativo),
            make_record("old1", "Old 1", Status::Ativo),
            make_record("flip", "Flip", Status::Ativo),
            make_record("old2", "Old 2", Status::Ativo),
        ];
        let curr = vec![
            make_record("new2", "New 2", Status::Ativo),
            make_record("flip", "Flip", Status::Finalizado),
            make_record("keep", "Keep", Status::Ativo),
            make_record("new1", "New 1", Status::Ativo),
        ];

        let changes = calculate_changes(&curr, Some(&snapshot_of(&prev)), TODAY);
        let got: Vec<(&str, &str)> = changes.iter().map(|c| (c.kind(), c.id())).collect();
        assert_eq!(
            got,
            vec![
                ("add", "new2"),
                ("add", "new1"),
                ("remove", "old1"),
                ("remove", "old2"),
                ("status_change", "flip"),
            ]
        );
        assert!(changes.iter().all(|c| c.date() == TODAY));
    }

    #[test]
    fn test_empty_baseline_only_adds() {
        let curr = vec![
            make_record("a1", "Guitarrista", Status::Pausado),
            make_record("b2", "Baixista", Status::Finalizado),
        ];

        let changes = calculate_changes(&curr, None, TODAY);
        assert_eq!(ChangeSummary::of(&changes).added, 2);
        assert_eq!(changes.len(), 2);
    }

    #[test]
    fn test_full_to_empty() {
        let prev = vec![make_record("a1", "Guitarrista", Status::Ativo)];
        let changes = calculate_changes(&[], Some(&snapshot_of(&prev)), TODAY);

        assert_eq!(ChangeSummary::of(&changes).removed, 1);
        assert_eq!(changes.len(), 1);
    }

    #[test]
    fn test_completeness_over_mixed_sets() {
        let prev: Vec<Record> = (0..20)
            .map(|i| make_record(&format!("id{i}"), &format!("T{i}"), Status::Ativo))
            .collect();
        let curr: Vec<Record> = (10..30)
            .map(|i| make_record(&format!("id{i}"), &format!("T{i}"), Status::Ativo))
            .collect();

        let changes = calculate_changes(&curr, Some(&snapshot_of(&prev)), TODAY);
        let summary = ChangeSummary::of(&changes);
        assert_eq!(summary.added, 10);
        assert_eq!(summary.removed, 10);
        assert_eq!(summary.status_changed, 0);

        for i in 20..30 {
            let id = format!("id{i}");
            assert_eq!(
                changes.iter().filter(|c| c.kind() == "add" && c.id() == id).count(),
                1
            );
        }
    }

    #[test]
    fn test_calculator_is_deterministic() {
        let calculator = DiffCalculator::new(FixedClock::at("2025-05-10T18:30:00Z"));
        let prev = vec![make_record("a1", "Guitarrista", Status::Ativo)];
        let curr = vec![
            make_record("a1", "Guitarrista", Status::Pausado),
            make_record("b2", "Baixista", Status::Ativo),
        ];
        let snapshot = snapshot_of(&prev);

        let first = serde_json::to_string(&calculator.calculate(&curr, Some(&snapshot))).unwrap();
        let second = serde_json::to_string(&calculator.calculate(&curr, Some(&snapshot))).unwrap();
        assert_eq!(first, second);
        assert!(first.contains("\"date\":\"2025-05-10\""));
    }
}
