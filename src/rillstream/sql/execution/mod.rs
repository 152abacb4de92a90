//! Runtime execution support.
//!
//! The record/value types shared by all operators, the simplified filter,
//! the output sinks, and the windowed stream-stream join runtime. Operator
//! instantiation from a finished plan graph is the driver's job; this module
//! provides the pieces the driver instantiates.

pub mod filter;
pub mod join;
pub mod sink;
pub mod types;

pub use filter::StrMatchFilter;
pub use join::{KeyedEvent, WindowStore, WindowedJoinOperator};
pub use sink::{BufferRegistry, BufferSink, ConsoleSink};
pub use types::{FieldValue, StreamRecord};
