//! Operator descriptors.
//!
//! Each plan-node variant carries its own strongly typed parameters, schemas
//! included. There is no untyped attribute bag: whatever an operator needs
//! at instantiation time is an explicit field of its variant.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::rillstream::config::EngineConfig;
use crate::rillstream::sql::schema::{Schema, TypedField};

/// Immutable parameters for a two-stream windowed equi-join.
///
/// Produced once during compilation and later consumed by the runtime
/// instantiation step that builds the live join operator. Performs no
/// matching itself.
#[derive(Debug, Clone)]
pub struct WindowedJoinDescriptor {
    /// Name of the left input stream
    pub left_name: String,
    /// Name of the right input stream
    pub right_name: String,
    /// Key field on the left stream
    pub left_key: TypedField,
    /// Key field on the right stream
    pub right_key: TypedField,
    /// Left-side fields propagated into the joined output, in declared order
    pub left_fields: Vec<TypedField>,
    /// Right-side fields propagated into the joined output, in declared order
    pub right_fields: Vec<TypedField>,
    /// Width of the time window over which the join is valid
    pub window_width: Duration,
    /// Name assigned to the joined output stream
    pub output_name: String,
    /// Ambient engine configuration
    pub config: Arc<EngineConfig>,
}

/// A node in the operator graph.
#[derive(Debug, Clone)]
pub enum PlanNode {
    /// Bind a named stream from the catalog; the leaf of every source
    /// subgraph, replaced at instantiation time by the ingestion binding.
    StreamSource {
        /// Name of the stream
        stream_name: String,
        /// Schema the stream exposes
        schema: Schema,
    },
    /// Informational operation: describe a named object.
    Describe {
        /// Identifier of the object to describe
        identifier: String,
    },
    /// Narrow the upstream record shape to an output schema.
    Project {
        /// Schema of the records arriving from upstream
        input_schema: Schema,
        /// Schema of the records this node emits
        output_schema: Schema,
    },
    /// Filter records by a raw predicate, evaluated as a literal text match.
    Filter {
        /// Raw predicate text from the WHERE clause
        predicate_text: String,
    },
    /// Terminal node printing selected fields to the console.
    ConsoleSink {
        /// Explicitly selected fields, in declared order
        fields: Vec<String>,
    },
    /// Terminal node appending selected fields to a named in-memory buffer.
    BufferSink {
        /// Name of the buffer, from the select-target configuration
        buffer_name: String,
        /// Explicitly selected fields, in declared order
        fields: Vec<String>,
    },
    /// Windowed equi-join of two upstream subgraphs.
    WindowedJoin {
        /// Join parameters
        descriptor: WindowedJoinDescriptor,
    },
}

impl PlanNode {
    /// Short name of this node's variant.
    pub fn type_name(&self) -> &'static str {
        match self {
            PlanNode::StreamSource { .. } => "StreamSource",
            PlanNode::Describe { .. } => "Describe",
            PlanNode::Project { .. } => "Project",
            PlanNode::Filter { .. } => "Filter",
            PlanNode::ConsoleSink { .. } => "ConsoleSink",
            PlanNode::BufferSink { .. } => "BufferSink",
            PlanNode::WindowedJoin { .. } => "WindowedJoin",
        }
    }
}

impl fmt::Display for PlanNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanNode::StreamSource { stream_name, .. } => {
                write!(f, "StreamSource stream={}", stream_name)
            }
            PlanNode::Describe { identifier } => write!(f, "Describe id={}", identifier),
            PlanNode::Project {
                input_schema,
                output_schema,
            } => write!(
                f,
                "Project {} -> {}",
                input_schema.width(),
                output_schema.width()
            ),
            PlanNode::Filter { predicate_text } => write!(f, "Filter \"{}\"", predicate_text),
            PlanNode::ConsoleSink { fields } => write!(f, "ConsoleSink fields={:?}", fields),
            PlanNode::BufferSink {
                buffer_name,
                fields,
            } => write!(f, "BufferSink buffer={} fields={:?}", buffer_name, fields),
            PlanNode::WindowedJoin { descriptor } => write!(
                f,
                "WindowedJoin left={} right={} leftKey={} rightKey={} width={:?} out={}",
                descriptor.left_name,
                descriptor.right_name,
                descriptor.left_key,
                descriptor.right_key,
                descriptor.window_width,
                descriptor.output_name
            ),
        }
    }
}
