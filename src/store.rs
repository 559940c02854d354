use crate::records::SensorRecord;
use std::sync::Mutex;
use tracing::debug;

/// In-memory holder for the most recently fetched record set. Each poll
/// replaces the whole set, last writer wins.
pub struct RecordStore {
    records: Mutex<Vec<SensorRecord>>,
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
        }
    }

    pub fn replace(&self, records: Vec<SensorRecord>) {
        let mut guard = self.records.lock().unwrap();
        debug!(old = guard.len(), new = records.len(), "Replaced record set");
        *guard = records;
    }

    /// A cloned snapshot of the current record set.
    pub fn snapshot(&self) -> Vec<SensorRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::empty_record;
    use chrono::Utc;

    #[test]
    fn replace_is_last_writer_wins() {
        let store = RecordStore::new();
        assert!(store.is_empty());

        store.replace(vec![empty_record(Utc::now()); 3]);
        assert_eq!(store.len(), 3);

        store.replace(vec![empty_record(Utc::now())]);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn snapshot_is_detached_from_the_store() {
        let store = RecordStore::new();
        store.replace(vec![empty_record(Utc::now()); 2]);

        let snapshot = store.snapshot();
        store.replace(Vec::new());
        assert_eq!(snapshot.len(), 2);
        assert!(store.is_empty());
    }
}
