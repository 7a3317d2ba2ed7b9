// ============================================================================
// Record Store: Snapshot + Working Set
// ============================================================================
//
// The snapshot is the last state the server confirmed; the working set is
// what the user currently sees and edits. Both always hold the same ids in
// the same order: they are only ever replaced together, and the only
// in-place mutations are field writes on the working side, per-row reverts
// from the snapshot, and promotion of the whole working set after a save.
//
// ============================================================================

use crate::core::{ChangeRecord, Record, RecordId};
use crate::edit::Edit;
use std::collections::HashMap;
use tracing::warn;

#[derive(Debug, Default)]
pub struct RecordStore {
    snapshot: Vec<Record>,
    working: Vec<Record>,
    index: HashMap<RecordId, usize>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace both sides from one server response.
    ///
    /// When an id occurs twice the first occurrence is kept.
    pub fn replace_all(&mut self, records: Vec<Record>) {
        let mut index = HashMap::with_capacity(records.len());
        let mut working = Vec::with_capacity(records.len());

        for record in records {
            if index.contains_key(&record.id) {
                warn!(id = %record.id, "duplicate record id in response, dropping");
                continue;
            }
            index.insert(record.id.clone(), working.len());
            working.push(record);
        }

        self.snapshot = working.clone();
        self.working = working;
        self.index = index;
    }

    pub fn len(&self) -> usize {
        self.working.len()
    }

    pub fn is_empty(&self) -> bool {
        self.working.is_empty()
    }

    pub fn contains(&self, id: &RecordId) -> bool {
        self.index.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &RecordId> {
        self.working.iter().map(|r| &r.id)
    }

    /// Last confirmed copy of a record.
    pub fn snapshot(&self, id: &RecordId) -> Option<&Record> {
        self.index.get(id).map(|&i| &self.snapshot[i])
    }

    /// Live copy of a record.
    pub fn working(&self, id: &RecordId) -> Option<&Record> {
        self.index.get(id).map(|&i| &self.working[i])
    }

    /// Live copies in page order.
    pub fn records(&self) -> &[Record] {
        &self.working
    }

    /// Write one editable field of the live copy.
    pub fn write(&mut self, id: &RecordId, edit: Edit) -> Option<&Record> {
        let i = *self.index.get(id)?;
        let record = &mut self.working[i];
        match edit {
            Edit::PaymentStatus(status) => record.payment_status = status,
            Edit::PaymentDate(date) => record.payment_date = date,
        }
        Some(&self.working[i])
    }

    /// Restore the editable fields of the live copy from the snapshot.
    pub fn revert(&mut self, id: &RecordId) -> Option<&Record> {
        let i = *self.index.get(id)?;
        let confirmed = &self.snapshot[i];
        let record = &mut self.working[i];
        record.payment_status = confirmed.payment_status;
        record.payment_date = confirmed.payment_date;
        Some(&self.working[i])
    }

    /// Accept the whole working set as the new confirmed state.
    pub fn promote(&mut self) {
        self.snapshot = self.working.clone();
    }

    /// Records whose editable fields differ from the snapshot, in page order.
    pub fn diff(&self) -> Vec<ChangeRecord> {
        self.working
            .iter()
            .zip(&self.snapshot)
            .filter(|(live, confirmed)| !live.same_payment(confirmed))
            .map(|(live, _)| ChangeRecord::from(live))
            .collect()
    }

    pub fn is_dirty(&self, id: &RecordId) -> bool {
        match (self.working(id), self.snapshot(id)) {
            (Some(live), Some(confirmed)) => !live.same_payment(confirmed),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PaymentStatus;
    use chrono::NaiveDate;

    fn sample() -> Vec<Record> {
        vec![
            Record::new("A1")
                .with_status(PaymentStatus::No)
                .with_field("employees", "Ana"),
            Record::new("B2").with_status(PaymentStatus::Yes),
            Record::new("C3"),
        ]
    }

    #[test]
    fn test_replace_all_starts_clean() {
        let mut store = RecordStore::new();
        store.replace_all(sample());

        assert_eq!(store.len(), 3);
        assert!(store.diff().is_empty());
        assert_eq!(store.snapshot(&"A1".into()), store.working(&"A1".into()));
    }

    #[test]
    fn test_working_writes_do_not_touch_snapshot() {
        let mut store = RecordStore::new();
        store.replace_all(sample());
        let id = RecordId::from("A1");

        store.write(&id, Edit::PaymentStatus(PaymentStatus::Yes));

        assert_eq!(store.working(&id).unwrap().payment_status, PaymentStatus::Yes);
        assert_eq!(store.snapshot(&id).unwrap().payment_status, PaymentStatus::No);
        assert!(store.is_dirty(&id));
    }

    #[test]
    fn test_diff_in_page_order() {
        let mut store = RecordStore::new();
        store.replace_all(sample());
        let date = NaiveDate::from_ymd_opt(2025, 1, 2);

        store.write(&"C3".into(), Edit::PaymentDate(date));
        store.write(&"A1".into(), Edit::PaymentStatus(PaymentStatus::Canceled));

        let diff = store.diff();
        let ids: Vec<_> = diff.iter().map(|c| c.id.to_string()).collect();
        assert_eq!(ids, vec!["A1", "C3"]);
        assert_eq!(diff[1].payment_date, date);
    }

    #[test]
    fn test_writing_the_same_value_is_not_a_change() {
        let mut store = RecordStore::new();
        store.replace_all(sample());

        store.write(&"B2".into(), Edit::PaymentStatus(PaymentStatus::Yes));
        assert!(store.diff().is_empty());
    }

    #[test]
    fn test_revert_and_promote() {
        let mut store = RecordStore::new();
        store.replace_all(sample());
        let id = RecordId::from("A1");

        store.write(&id, Edit::PaymentStatus(PaymentStatus::Yes));
        store.revert(&id);
        assert!(store.diff().is_empty());

        store.write(&id, Edit::PaymentStatus(PaymentStatus::Yes));
        store.promote();
        assert!(store.diff().is_empty());
        assert_eq!(store.snapshot(&id).unwrap().payment_status, PaymentStatus::Yes);
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let mut store = RecordStore::new();
        store.replace_all(vec![
            Record::new("A1").with_status(PaymentStatus::No),
            Record::new("A1").with_status(PaymentStatus::Yes),
        ]);

        assert_eq!(store.len(), 1);
        assert_eq!(
            store.working(&"A1".into()).unwrap().payment_status,
            PaymentStatus::No
        );
    }

    #[test]
    fn test_unknown_id() {
        let mut store = RecordStore::new();
        store.replace_all(sample());
        let missing = RecordId::Number(9);

        assert!(store.write(&missing, Edit::PaymentDate(None)).is_none());
        assert!(store.revert(&missing).is_none());
        assert!(!store.is_dirty(&missing));
    }
}
