//! Windowed join index for one side of a stream-stream join.
//!
//! Records are stored in a two-level structure:
//! - Outer: `HashMap<KeyedEvent, TimeIndex>` for O(1) key lookup
//! - Inner: `BTreeMap<EventTime, VecDeque<Arc<StreamRecord>>>` for
//!   O(log n) time range queries
//!
//! The store is self-evicting: an entry whose age exceeds the window width
//! relative to the latest observed event time on this side is discarded.
//! Eviction is driven by event-time advancement, not wall-clock time, so
//! replaying the same input reproduces the same results.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Arc;

use crate::rillstream::sql::error::SqlResult;
use crate::rillstream::sql::execution::join::keyed_event::KeyedEvent;
use crate::rillstream::sql::execution::types::StreamRecord;
use crate::rillstream::sql::schema::TypedField;

/// Records at a single key, indexed by event time. Each event time can hold
/// multiple records, kept in arrival order.
type TimeIndex = BTreeMap<i64, VecDeque<Arc<StreamRecord>>>;

/// Record count at which the store starts logging capacity warnings.
const CAPACITY_WARN_THRESHOLD: usize = 1_000_000;

/// Windowed, self-evicting index for one side of a join.
#[derive(Debug)]
pub struct WindowStore {
    /// Records indexed by join key, then by event time
    records: HashMap<KeyedEvent, TimeIndex>,
    /// This side's ordered key-field list; every wrapper this store creates
    /// shares this allocation
    key_fields: Arc<Vec<TypedField>>,
    /// Window width in milliseconds
    window_ms: i64,
    /// Latest event time observed on this side
    latest_event_time: i64,
    /// Running record count
    record_count: usize,
    /// Whether the capacity warning has been logged
    capacity_warning_logged: bool,
}

impl WindowStore {
    /// Create a store for one join side.
    pub fn new(key_fields: Arc<Vec<TypedField>>, window_ms: i64) -> Self {
        Self {
            records: HashMap::new(),
            key_fields,
            window_ms,
            latest_event_time: i64::MIN,
            record_count: 0,
            capacity_warning_logged: false,
        }
    }

    /// Wrap a record with this side's key-field list.
    ///
    /// Extraction failure here is fatal (the hash path) and propagates.
    pub fn wrap(&self, record: Arc<StreamRecord>) -> SqlResult<KeyedEvent> {
        KeyedEvent::new(record, Arc::clone(&self.key_fields))
    }

    /// Insert a wrapped record, advancing this side's event-time high-water
    /// mark and evicting entries that have aged out of the window.
    pub fn insert(&mut self, event: KeyedEvent) {
        let event_time = event.event_time();
        let record = Arc::clone(event.record());

        self.records
            .entry(event)
            .or_default()
            .entry(event_time)
            .or_default()
            .push_back(record);
        self.record_count += 1;

        if event_time > self.latest_event_time {
            self.latest_event_time = event_time;
            self.evict_expired();
        }

        if self.record_count >= CAPACITY_WARN_THRESHOLD && !self.capacity_warning_logged {
            log::warn!(
                "WindowStore holding {} records within a {} ms window; \
                 upstream event times may not be advancing",
                self.record_count,
                self.window_ms
            );
            self.capacity_warning_logged = true;
        }
    }

    /// All stored records matching the probe key whose event times fall
    /// within the window around `probe_time` (boundary inclusive).
    ///
    /// The probe wrapper comes from the *other* side; it only hits entries
    /// here when both sides share the same key-field-list allocation and
    /// the key values compare equal.
    pub fn probe(&self, probe: &KeyedEvent, probe_time: i64) -> Vec<Arc<StreamRecord>> {
        let lower = probe_time.saturating_sub(self.window_ms);
        let upper = probe_time.saturating_add(self.window_ms);
        self.records
            .get(probe)
            .map(|time_index| {
                time_index
                    .range(lower..=upper)
                    .flat_map(|(_, entries)| entries.iter().cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Drop entries older than the window relative to the latest observed
    /// event time on this side.
    fn evict_expired(&mut self) {
        let cutoff = self.latest_event_time.saturating_sub(self.window_ms);
        let mut evicted = 0usize;
        self.records.retain(|_, time_index| {
            // split_off keeps everything >= cutoff in the index
            let keep = time_index.split_off(&cutoff);
            evicted += time_index.values().map(|e| e.len()).sum::<usize>();
            *time_index = keep;
            !time_index.is_empty()
        });
        self.record_count = self.record_count.saturating_sub(evicted);
    }

    /// Latest event time observed on this side.
    pub fn latest_event_time(&self) -> i64 {
        self.latest_event_time
    }

    /// The key-field list shared by all wrappers of this side.
    pub fn key_fields(&self) -> &Arc<Vec<TypedField>> {
        &self.key_fields
    }

    /// Total records currently stored.
    pub fn record_count(&self) -> usize {
        self.record_count
    }

    /// Number of distinct keys currently stored.
    pub fn key_count(&self) -> usize {
        self.records.len()
    }

    /// True if the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop all state. A torn-down store can complete no pending match.
    pub fn clear(&mut self) {
        self.records.clear();
        self.record_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rillstream::sql::execution::types::FieldValue;
    use crate::rillstream::sql::schema::FieldType;
    use std::collections::HashMap;

    fn id_key() -> Arc<Vec<TypedField>> {
        Arc::new(vec![TypedField::new("id", FieldType::Integer)])
    }

    fn record(id: i64, timestamp: i64) -> Arc<StreamRecord> {
        let mut fields = HashMap::new();
        fields.insert("id".to_string(), FieldValue::Integer(id));
        Arc::new(StreamRecord::with_timestamp(fields, timestamp))
    }

    #[test]
    fn test_insert_and_probe_within_window() {
        let keys = id_key();
        let mut store = WindowStore::new(Arc::clone(&keys), 5);

        let stored = store.wrap(record(1, 10)).unwrap();
        store.insert(stored);

        // Boundary inclusive: |15 - 10| == 5 matches.
        let probe = KeyedEvent::new(record(1, 15), Arc::clone(&keys)).unwrap();
        assert_eq!(store.probe(&probe, 15).len(), 1);

        // |16 - 10| > 5 does not.
        let probe = KeyedEvent::new(record(1, 16), Arc::clone(&keys)).unwrap();
        assert!(store.probe(&probe, 16).is_empty());
    }

    #[test]
    fn test_probe_misses_different_key_value() {
        let keys = id_key();
        let mut store = WindowStore::new(Arc::clone(&keys), 5);
        store.insert(store.wrap(record(1, 10)).unwrap());

        let probe = KeyedEvent::new(record(2, 10), Arc::clone(&keys)).unwrap();
        assert!(store.probe(&probe, 10).is_empty());
    }

    #[test]
    fn test_event_time_advancement_evicts_old_entries() {
        let keys = id_key();
        let mut store = WindowStore::new(Arc::clone(&keys), 5);

        store.insert(store.wrap(record(1, 10)).unwrap());
        assert_eq!(store.record_count(), 1);

        // Advancing to t=16 ages the t=10 entry out of the 5 ms window.
        store.insert(store.wrap(record(2, 16)).unwrap());
        assert_eq!(store.record_count(), 1);
        assert!(store.keys_contain_only(2));
    }

    #[test]
    fn test_out_of_order_insert_does_not_evict() {
        let keys = id_key();
        let mut store = WindowStore::new(Arc::clone(&keys), 5);

        store.insert(store.wrap(record(1, 20)).unwrap());
        // Older than latest but still within the window from t=20.
        store.insert(store.wrap(record(2, 17)).unwrap());
        assert_eq!(store.record_count(), 2);
    }

    #[test]
    fn test_multiple_records_per_key_and_time() {
        let keys = id_key();
        let mut store = WindowStore::new(Arc::clone(&keys), 100);

        store.insert(store.wrap(record(1, 10)).unwrap());
        store.insert(store.wrap(record(1, 10)).unwrap());
        store.insert(store.wrap(record(1, 12)).unwrap());

        let probe = KeyedEvent::new(record(1, 11), Arc::clone(&keys)).unwrap();
        assert_eq!(store.probe(&probe, 11).len(), 3);
    }

    #[test]
    fn test_clear_drops_everything() {
        let keys = id_key();
        let mut store = WindowStore::new(Arc::clone(&keys), 5);
        store.insert(store.wrap(record(1, 10)).unwrap());

        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.record_count(), 0);
    }

    impl WindowStore {
        fn keys_contain_only(&self, id: i64) -> bool {
            self.records.keys().all(|k| {
                k.record().fields.get("id") == Some(&FieldValue::Integer(id))
            })
        }
    }
}
