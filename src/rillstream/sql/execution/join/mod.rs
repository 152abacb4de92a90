//! Windowed stream-stream join runtime.
//!
//! The live counterpart of a planned `WindowedJoin` node: per-side windowed
//! indexes keyed by a configurable subset of event fields, with time-bounded
//! matching between the two sides.

pub mod keyed_event;
pub mod operator;
pub mod window_store;

pub use keyed_event::KeyedEvent;
pub use operator::{JoinStats, WindowedJoinOperator};
pub use window_store::WindowStore;
