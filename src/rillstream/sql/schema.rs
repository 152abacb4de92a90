//! Typed field descriptors and stream schemas.
//!
//! A [`Schema`] describes the shape of a stream at one point in the operator
//! graph: a stream name plus an ordered list of typed fields. Schemas are
//! built by whichever planning step creates them and immutable afterward.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::rillstream::sql::error::{SqlError, SqlResult};
use crate::rillstream::sql::scope::SymbolTable;

/// Declared type of a stream field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    /// 64-bit signed integer
    Integer,
    /// 64-bit floating point number
    Float,
    /// UTF-8 string
    String,
    /// Boolean value
    Boolean,
    /// Timestamp (naive, millisecond precision)
    Timestamp,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Integer => write!(f, "INTEGER"),
            FieldType::Float => write!(f, "FLOAT"),
            FieldType::String => write!(f, "STRING"),
            FieldType::Boolean => write!(f, "BOOLEAN"),
            FieldType::Timestamp => write!(f, "TIMESTAMP"),
        }
    }
}

/// A named, typed field descriptor.
///
/// These double as the symbols held in a [`SymbolTable`] and as the key
/// descriptors handed to the windowed join runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedField {
    /// Field name
    pub name: String,
    /// Declared type
    pub field_type: FieldType,
}

impl TypedField {
    /// Create a new typed field descriptor.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }
}

impl fmt::Display for TypedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.field_type)
    }
}

/// Named, typed field list describing a stream at one point in the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Name of the stream this schema describes
    pub stream_name: String,
    /// Ordered field descriptors
    pub fields: Vec<TypedField>,
}

impl Schema {
    /// Create a new schema.
    pub fn new(stream_name: impl Into<String>, fields: Vec<TypedField>) -> Self {
        Self {
            stream_name: stream_name.into(),
            fields,
        }
    }

    /// Build a schema over the given field names, each resolved against the
    /// supplied scope. Fails with [`SqlError::UnresolvedField`] if any name
    /// is not visible.
    pub fn from_scope(
        stream_name: impl Into<String>,
        field_names: &[String],
        scope: &SymbolTable,
    ) -> SqlResult<Self> {
        let mut fields = Vec::with_capacity(field_names.len());
        for name in field_names {
            fields.push(scope.resolve(name)?);
        }
        Ok(Self::new(stream_name, fields))
    }

    /// Field names in declared order.
    pub fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }

    /// Number of fields.
    pub fn width(&self) -> usize {
        self.fields.len()
    }
}

/// Registry mapping stream names to their schemas.
///
/// Stands in for the external ingestion binding at the planning boundary:
/// a named stream in a FROM clause resolves here. Owned by the execution
/// driver and shared with the compiler by reference, never globally
/// reachable.
#[derive(Debug, Clone, Default)]
pub struct StreamCatalog {
    streams: std::collections::HashMap<String, Schema>,
}

impl StreamCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a stream schema, replacing any previous registration.
    pub fn register(&mut self, schema: Schema) {
        self.streams.insert(schema.stream_name.clone(), schema);
    }

    /// Look up a stream schema by name.
    pub fn schema(&self, stream_name: &str) -> Option<&Schema> {
        self.streams.get(stream_name)
    }

    /// Look up a stream schema, erroring if unknown.
    pub fn require(&self, stream_name: &str) -> SqlResult<&Schema> {
        self.schema(stream_name)
            .ok_or_else(|| SqlError::stream_error(stream_name, "stream is not registered"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn orders_schema() -> Schema {
        Schema::new(
            "orders",
            vec![
                TypedField::new("order_id", FieldType::Integer),
                TypedField::new("amount", FieldType::Float),
            ],
        )
    }

    #[test]
    fn test_from_scope_resolves_in_order() {
        let mut scope = SymbolTable::new();
        scope.add_symbol(TypedField::new("a", FieldType::Integer));
        scope.add_symbol(TypedField::new("b", FieldType::String));
        let scope = Arc::new(scope);

        let schema =
            Schema::from_scope("s", &["b".to_string(), "a".to_string()], &scope).unwrap();
        assert_eq!(schema.field_names(), vec!["b", "a"]);
    }

    #[test]
    fn test_from_scope_unresolved_field() {
        let scope = SymbolTable::new();
        let err = Schema::from_scope("s", &["missing".to_string()], &scope).unwrap_err();
        assert_eq!(
            err,
            SqlError::UnresolvedField {
                name: "missing".to_string()
            }
        );
    }

    #[test]
    fn test_catalog_lookup() {
        let mut catalog = StreamCatalog::new();
        catalog.register(orders_schema());

        assert!(catalog.schema("orders").is_some());
        assert!(catalog.require("shipments").is_err());
    }
}
