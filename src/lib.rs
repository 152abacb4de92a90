//! # rillstream
//!
//! A streaming SQL engine front-end: compiles declarative SELECT statements over
//! continuous, unbounded event streams into an executable operator graph, and
//! provides the windowed hash-join runtime that matches events across two live
//! streams within a bounded time interval.
//!
//! ## Features
//!
//! - **Recursive query compilation**: nested sub-SELECTs compile into spliced
//!   subgraphs with correctly propagated schemas and name scopes
//! - **Typed operator descriptors**: every plan node carries its own strongly
//!   typed parameters, no attribute bags
//! - **Windowed equi-joins**: time-bounded key matching over two event feeds,
//!   with event-time-driven state eviction for reproducible replay
//! - **Flexible output routing**: root queries stream to the console or to a
//!   named in-memory buffer owned by the execution driver
//!
//! ## Quick Start
//!
//! ```rust
//! use rillstream::rillstream::config::EngineConfig;
//! use rillstream::rillstream::sql::ast::{FieldList, SelectStatement, Statement, StreamStatement};
//! use rillstream::rillstream::sql::plan::plan_query;
//! use rillstream::rillstream::sql::schema::{FieldType, Schema, StreamCatalog, TypedField};
//! use std::sync::Arc;
//!
//! let mut catalog = StreamCatalog::new();
//! catalog.register(Schema::new(
//!     "orders",
//!     vec![
//!         TypedField::new("order_id", FieldType::Integer),
//!         TypedField::new("amount", FieldType::Float),
//!     ],
//! ));
//!
//! let stmt = Statement::Select(SelectStatement::new(
//!     FieldList::named(vec!["order_id", "amount"]),
//!     StreamStatement::NamedStream("orders".to_string()),
//!     None,
//! ));
//!
//! let graph = plan_query(&stmt, Arc::new(EngineConfig::new()), Arc::new(catalog)).unwrap();
//! assert!(!graph.is_empty());
//! ```

pub mod rillstream;

// Re-export main API at crate root for easy access
pub use rillstream::config::EngineConfig;
pub use rillstream::sql::ast::{
    DescribeStatement, FieldList, JoinedSource, SelectStatement, Statement, StreamStatement,
    WhereConditions,
};
pub use rillstream::sql::error::{SqlError, SqlResult};
pub use rillstream::sql::execution::join::WindowedJoinOperator;
pub use rillstream::sql::execution::{FieldValue, StreamRecord};
pub use rillstream::sql::plan::{plan_query, FlowGraph, PlanContext, PlanNode};
pub use rillstream::sql::schema::{FieldType, Schema, StreamCatalog, TypedField};
