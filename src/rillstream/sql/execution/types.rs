//! Core streaming data types.
//!
//! This module contains the fundamental data types used throughout the
//! engine:
//! - [`FieldValue`] - the value type system for stream fields
//! - [`StreamRecord`] - the record format for streaming data

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::rillstream::sql::error::{SqlError, SqlResult};
use crate::rillstream::sql::schema::{FieldType, TypedField};

/// A value in a stream record field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    /// 64-bit signed integer
    Integer(i64),
    /// 64-bit floating point number
    Float(f64),
    /// UTF-8 string
    String(String),
    /// Boolean value
    Boolean(bool),
    /// Timestamp value
    Timestamp(NaiveDateTime),
    /// SQL NULL
    Null,
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Integer(i) => write!(f, "{}", i),
            FieldValue::Float(v) => write!(f, "{}", v),
            FieldValue::String(s) => write!(f, "{}", s),
            FieldValue::Boolean(b) => write!(f, "{}", b),
            FieldValue::Timestamp(t) => write!(f, "{}", t),
            FieldValue::Null => write!(f, "NULL"),
        }
    }
}

/// Hash implementation for [`FieldValue`].
///
/// Floats hash by bit representation so that NaN and -0.0 behave
/// deterministically. The discriminant is hashed first to distinguish
/// variants.
impl Hash for FieldValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            FieldValue::Integer(i) => i.hash(state),
            FieldValue::Float(v) => v.to_bits().hash(state),
            FieldValue::String(s) => s.hash(state),
            FieldValue::Boolean(b) => b.hash(state),
            FieldValue::Timestamp(t) => t.hash(state),
            FieldValue::Null => {}
        }
    }
}

impl FieldValue {
    /// Whether this value conforms to the given declared type. NULL
    /// conforms to every type.
    pub fn matches_type(&self, field_type: FieldType) -> bool {
        matches!(
            (self, field_type),
            (FieldValue::Integer(_), FieldType::Integer)
                | (FieldValue::Float(_), FieldType::Float)
                | (FieldValue::String(_), FieldType::String)
                | (FieldValue::Boolean(_), FieldType::Boolean)
                | (FieldValue::Timestamp(_), FieldType::Timestamp)
                | (FieldValue::Null, _)
        )
    }

    /// Runtime type name, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Integer(_) => "INTEGER",
            FieldValue::Float(_) => "FLOAT",
            FieldValue::String(_) => "STRING",
            FieldValue::Boolean(_) => "BOOLEAN",
            FieldValue::Timestamp(_) => "TIMESTAMP",
            FieldValue::Null => "NULL",
        }
    }

    /// Convert to a JSON value for sink output.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            FieldValue::Integer(i) => serde_json::Value::from(*i),
            FieldValue::Float(v) => serde_json::Value::from(*v),
            FieldValue::String(s) => serde_json::Value::from(s.clone()),
            FieldValue::Boolean(b) => serde_json::Value::from(*b),
            FieldValue::Timestamp(t) => serde_json::Value::from(t.to_string()),
            FieldValue::Null => serde_json::Value::Null,
        }
    }
}

/// A single event flowing through the operator graph.
///
/// Carries named field values plus the event time in milliseconds. Event
/// time drives window eligibility and state eviction in the join runtime,
/// keeping results reproducible under replay of the same input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamRecord {
    /// Named field values
    pub fields: HashMap<String, FieldValue>,
    /// Event time (milliseconds)
    pub timestamp: i64,
}

impl StreamRecord {
    /// Create a record with event time 0.
    pub fn new(fields: HashMap<String, FieldValue>) -> Self {
        Self {
            fields,
            timestamp: 0,
        }
    }

    /// Create a record with the given event time.
    pub fn with_timestamp(fields: HashMap<String, FieldValue>, timestamp: i64) -> Self {
        Self { fields, timestamp }
    }

    /// Extract a field value checked against its declared type.
    ///
    /// Returns `Ok(None)` for a missing field or an explicit NULL, and
    /// [`SqlError::KeyExtraction`] when the stored value does not conform
    /// to the descriptor's type.
    pub fn get_typed(&self, field: &TypedField) -> SqlResult<Option<&FieldValue>> {
        match self.fields.get(&field.name) {
            None | Some(FieldValue::Null) => Ok(None),
            Some(value) => {
                if value.matches_type(field.field_type) {
                    Ok(Some(value))
                } else {
                    Err(SqlError::key_extraction(
                        &field.name,
                        format!(
                            "expected {}, got {}",
                            field.field_type,
                            value.type_name()
                        ),
                    ))
                }
            }
        }
    }
}
