/*!
# SQL Error Handling

Error types for query compilation and join execution. All compilation errors
abort the query immediately and surface to the submitter with a descriptive
message; no partial plan is ever returned.

## Error Categories

- **Unsupported Feature**: constructs the compiler cannot plan (e.g. `*`)
- **Unresolved Field**: a name not found anywhere in the scope chain
- **Schema Errors**: field/type validation failures during planning
- **Stream Errors**: references to streams the catalog does not know
- **Key Extraction**: a join key field could not be read from an event
- **Execution Errors**: runtime failures in instantiated operators

Key extraction deserves a note: during hash computation an extraction failure
is fatal and propagates as this error, while during an equality check the same
failure silently degrades to "not a match". The windowed index stays usable
for subsequent events either way.
*/

use std::fmt;

/// Error type for SQL planning and execution operations.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlError {
    /// A query construct the planner does not support.
    ///
    /// This is a hard failure, never a silent degradation. The canonical
    /// case is the `*` field list, which the planner cannot expand because
    /// it has no mechanism to enumerate a source's full field set.
    UnsupportedFeature {
        /// Description of the unsupported construct
        message: String,
    },

    /// A field name that could not be resolved in the scope chain.
    UnresolvedField {
        /// The name that failed to resolve
        name: String,
    },

    /// Schema validation errors during query planning.
    SchemaError {
        /// Description of the schema validation failure
        message: String,
        /// Name of the field that caused the error, if applicable
        column: Option<String>,
    },

    /// Stream registration and access errors.
    StreamError {
        /// Name of the stream that caused the error
        stream_name: String,
        /// Description of the stream-related failure
        message: String,
    },

    /// A join key field could not be extracted from an event.
    KeyExtraction {
        /// Name of the key field
        field: String,
        /// Description of the extraction failure
        message: String,
    },

    /// Runtime errors in instantiated operators.
    ExecutionError {
        /// Description of the execution failure
        message: String,
    },
}

impl fmt::Display for SqlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlError::UnsupportedFeature { message } => {
                write!(f, "Unsupported feature: {}", message)
            }
            SqlError::UnresolvedField { name } => {
                write!(f, "Could not resolve field '{}'", name)
            }
            SqlError::SchemaError { message, column } => {
                if let Some(col) = column {
                    write!(f, "Schema error for field '{}': {}", col, message)
                } else {
                    write!(f, "Schema error: {}", message)
                }
            }
            SqlError::StreamError {
                stream_name,
                message,
            } => {
                write!(f, "Stream error for '{}': {}", stream_name, message)
            }
            SqlError::KeyExtraction { field, message } => {
                write!(f, "Key extraction error for field '{}': {}", field, message)
            }
            SqlError::ExecutionError { message } => {
                write!(f, "Execution error: {}", message)
            }
        }
    }
}

impl std::error::Error for SqlError {}

impl SqlError {
    /// Create an unsupported-feature error
    pub fn unsupported_feature(message: impl Into<String>) -> Self {
        SqlError::UnsupportedFeature {
            message: message.into(),
        }
    }

    /// Create an unresolved-field error
    pub fn unresolved_field(name: impl Into<String>) -> Self {
        SqlError::UnresolvedField { name: name.into() }
    }

    /// Create a schema error
    pub fn schema_error(message: impl Into<String>, column: Option<String>) -> Self {
        SqlError::SchemaError {
            message: message.into(),
            column,
        }
    }

    /// Create a stream error
    pub fn stream_error(stream_name: impl Into<String>, message: impl Into<String>) -> Self {
        SqlError::StreamError {
            stream_name: stream_name.into(),
            message: message.into(),
        }
    }

    /// Create a key-extraction error
    pub fn key_extraction(field: impl Into<String>, message: impl Into<String>) -> Self {
        SqlError::KeyExtraction {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an execution error
    pub fn execution_error(message: impl Into<String>) -> Self {
        SqlError::ExecutionError {
            message: message.into(),
        }
    }
}

/// Result type for SQL operations
pub type SqlResult<T> = Result<T, SqlError>;
