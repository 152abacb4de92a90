// Streaming SQL module for rillstream
// Compiles parsed SELECT statements into operator graphs and provides the
// runtime contract for windowed stream-stream joins.

pub mod ast;
pub mod error;
pub mod execution;
pub mod plan;
pub mod schema;
pub mod scope;

// Re-export main API
pub use ast::Statement;
pub use error::{SqlError, SqlResult};
pub use execution::{FieldValue, StreamRecord};
pub use plan::{plan_query, FlowGraph, PlanNode};
pub use schema::{Schema, StreamCatalog, TypedField};
pub use scope::SymbolTable;
