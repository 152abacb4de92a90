//! Keyed event wrappers.
//!
//! Wraps a record for use as a hash-table key, with hash and equality
//! defined over a configurable ordered subset of the record's fields.
//!
//! ## Failure asymmetry
//!
//! Hashing assumes well-typed input: a key field that fails typed extraction
//! makes [`KeyedEvent::new`] fail, and the event never enters an index. An
//! extraction failure during an *equality* check instead reports "not a
//! match" and never propagates, so one malformed stored event cannot poison
//! lookups for subsequent events. Correctness favors under-matching over
//! crashing. This asymmetry is deliberate; do not "fix" one side to match
//! the other.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::rillstream::sql::error::SqlResult;
use crate::rillstream::sql::execution::types::{FieldValue, StreamRecord};
use crate::rillstream::sql::schema::TypedField;

/// A record paired with an ordered key-field list, hashable and comparable
/// by the key fields' extracted values only.
///
/// Two wrappers compare equal only when they were built from the *same*
/// key-field-list allocation (`Arc` identity) and every key field's value
/// compares equal pairwise, with null equal only to null. Wrappers built
/// against different list instances are never equal, even with identical
/// values.
#[derive(Debug, Clone)]
pub struct KeyedEvent {
    record: Arc<StreamRecord>,
    key_fields: Arc<Vec<TypedField>>,
    /// XOR of the per-field value hashes, computed at wrap time
    hash: u64,
}

impl KeyedEvent {
    /// Wrap a record with its side's ordered key-field list.
    ///
    /// The hash is the XOR of each key field's value hash in field-list
    /// order; a missing or null value contributes zero. Extraction failure
    /// here is fatal and propagates.
    pub fn new(record: Arc<StreamRecord>, key_fields: Arc<Vec<TypedField>>) -> SqlResult<Self> {
        let mut hash = 0u64;
        for field in key_fields.iter() {
            if let Some(value) = record.get_typed(field)? {
                hash ^= Self::value_hash(value);
            }
        }
        Ok(Self {
            record,
            key_fields,
            hash,
        })
    }

    /// The wrapped record.
    pub fn record(&self) -> &Arc<StreamRecord> {
        &self.record
    }

    /// The key-field list this wrapper was built against.
    pub fn key_fields(&self) -> &Arc<Vec<TypedField>> {
        &self.key_fields
    }

    /// Event time of the wrapped record.
    pub fn event_time(&self) -> i64 {
        self.record.timestamp
    }

    fn value_hash(value: &FieldValue) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }
}

impl Hash for KeyedEvent {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

impl PartialEq for KeyedEvent {
    fn eq(&self, other: &Self) -> bool {
        // Only comparable when built against the identical field-list object.
        if !Arc::ptr_eq(&self.key_fields, &other.key_fields) {
            return false;
        }

        for field in self.key_fields.iter() {
            let mine = match self.record.get_typed(field) {
                Ok(v) => v,
                // Soft failure: report "not a match" rather than erroring.
                Err(_) => return false,
            };
            let theirs = match other.record.get_typed(field) {
                Ok(v) => v,
                Err(_) => return false,
            };
            match (mine, theirs) {
                (None, None) => {}
                (Some(a), Some(b)) if a == b => {}
                _ => return false,
            }
        }
        true
    }
}

impl Eq for KeyedEvent {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rillstream::sql::schema::FieldType;

    fn record(fields: Vec<(&str, FieldValue)>) -> Arc<StreamRecord> {
        Arc::new(StreamRecord::new(
            fields
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        ))
    }

    fn id_key() -> Arc<Vec<TypedField>> {
        Arc::new(vec![TypedField::new("id", FieldType::Integer)])
    }

    fn hash_of(event: &KeyedEvent) -> u64 {
        let mut hasher = DefaultHasher::new();
        event.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_equal_keys_same_field_list() {
        let keys = id_key();
        let a = KeyedEvent::new(record(vec![("id", FieldValue::Integer(1))]), Arc::clone(&keys))
            .unwrap();
        let b = KeyedEvent::new(record(vec![("id", FieldValue::Integer(1))]), Arc::clone(&keys))
            .unwrap();

        assert_eq!(a, a); // reflexive
        assert_eq!(a, b);
        assert_eq!(b, a); // symmetric
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn test_different_field_list_instances_never_equal() {
        let a = KeyedEvent::new(record(vec![("id", FieldValue::Integer(1))]), id_key()).unwrap();
        let b = KeyedEvent::new(record(vec![("id", FieldValue::Integer(1))]), id_key()).unwrap();

        // Identical values, distinct list allocations.
        assert_ne!(a, b);
    }

    #[test]
    fn test_unequal_values_not_equal() {
        let keys = id_key();
        let a = KeyedEvent::new(record(vec![("id", FieldValue::Integer(1))]), Arc::clone(&keys))
            .unwrap();
        let b = KeyedEvent::new(record(vec![("id", FieldValue::Integer(2))]), Arc::clone(&keys))
            .unwrap();

        assert_ne!(a, b);
        assert_ne!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn test_null_equals_only_null() {
        let keys = id_key();
        let null_a =
            KeyedEvent::new(record(vec![("id", FieldValue::Null)]), Arc::clone(&keys)).unwrap();
        let null_b =
            KeyedEvent::new(record(vec![("id", FieldValue::Null)]), Arc::clone(&keys)).unwrap();
        let one = KeyedEvent::new(record(vec![("id", FieldValue::Integer(1))]), Arc::clone(&keys))
            .unwrap();

        assert_eq!(null_a, null_b);
        assert_ne!(null_a, one);
    }

    #[test]
    fn test_null_contributes_zero_to_hash() {
        let keys = Arc::new(vec![
            TypedField::new("id", FieldType::Integer),
            TypedField::new("tag", FieldType::String),
        ]);
        let with_null = KeyedEvent::new(
            record(vec![
                ("id", FieldValue::Integer(1)),
                ("tag", FieldValue::Null),
            ]),
            Arc::clone(&keys),
        )
        .unwrap();
        let missing = KeyedEvent::new(
            record(vec![("id", FieldValue::Integer(1))]),
            Arc::clone(&keys),
        )
        .unwrap();

        assert_eq!(hash_of(&with_null), hash_of(&missing));
    }

    #[test]
    fn test_extraction_failure_is_fatal_for_hash() {
        let err = KeyedEvent::new(
            record(vec![("id", FieldValue::String("bad".to_string()))]),
            id_key(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            crate::rillstream::sql::error::SqlError::KeyExtraction { .. }
        ));
    }

    #[test]
    fn test_extraction_failure_is_soft_for_equality() {
        let keys = id_key();
        let good = KeyedEvent::new(record(vec![("id", FieldValue::Integer(1))]), Arc::clone(&keys))
            .unwrap();

        // Build a wrapper around a well-typed record, then corrupt a clone of
        // the underlying record to simulate an ill-typed stored event.
        let mut corrupted = (*good.record().clone()).clone();
        corrupted
            .fields
            .insert("id".to_string(), FieldValue::String("bad".to_string()));
        let bad = KeyedEvent {
            record: Arc::new(corrupted),
            key_fields: Arc::clone(&keys),
            hash: 0,
        };

        // Not a match, not a panic.
        assert_ne!(good, bad);
    }
}
