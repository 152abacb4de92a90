//! Query planning.
//!
//! Turns parsed statements into a [`FlowGraph`] of typed operator
//! descriptors. The graph is consumed by an external translation step that
//! instantiates live operators, including turning a
//! [`node::WindowedJoinDescriptor`] into a running join operator wired to
//! two live event feeds.

pub mod compiler;
pub mod context;
pub mod graph;
pub mod node;

pub use compiler::{plan_query, plan_statement};
pub use context::PlanContext;
pub use graph::{FlowGraph, NodeId};
pub use node::{PlanNode, WindowedJoinDescriptor};
