//! Output sinks for root queries.
//!
//! A root SELECT routes either to the console or to a named in-memory
//! buffer. Buffers live in a [`BufferRegistry`] owned by the execution
//! driver and passed by reference into constructed sinks; there is no
//! process-wide lookup.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::{Map, Value};

use crate::rillstream::sql::execution::types::StreamRecord;

/// Shared handle to one named output buffer.
pub type OutputBuffer = Arc<Mutex<Vec<StreamRecord>>>;

/// Named in-memory output buffers, owned by the execution driver.
#[derive(Debug, Default)]
pub struct BufferRegistry {
    buffers: Mutex<HashMap<String, OutputBuffer>>,
}

impl BufferRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the buffer with the given name, creating it if needed.
    pub fn buffer(&self, name: &str) -> OutputBuffer {
        let mut buffers = self.buffers.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(buffers.entry(name.to_string()).or_default())
    }

    /// Drain the contents of a named buffer, if it exists.
    pub fn drain(&self, name: &str) -> Vec<StreamRecord> {
        let buffers = self.buffers.lock().unwrap_or_else(|e| e.into_inner());
        match buffers.get(name) {
            Some(buffer) => {
                let mut records = buffer.lock().unwrap_or_else(|e| e.into_inner());
                records.drain(..).collect()
            }
            None => Vec::new(),
        }
    }
}

/// Render the explicitly selected fields of a record, in declared order,
/// as one JSON object.
fn render_fields(record: &StreamRecord, fields: &[String]) -> Value {
    let mut object = Map::with_capacity(fields.len());
    for name in fields {
        let value = record
            .fields
            .get(name)
            .map(|v| v.to_json())
            .unwrap_or(Value::Null);
        object.insert(name.clone(), value);
    }
    Value::Object(object)
}

/// Terminal operator printing selected fields to stdout, one JSON object
/// per record.
#[derive(Debug, Clone)]
pub struct ConsoleSink {
    fields: Vec<String>,
}

impl ConsoleSink {
    /// Create a console sink over the given ordered field list.
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    /// Print one record.
    pub fn emit(&self, record: &StreamRecord) {
        println!("{}", render_fields(record, &self.fields));
    }
}

/// Terminal operator appending records to a named buffer.
#[derive(Debug)]
pub struct BufferSink {
    buffer: OutputBuffer,
    fields: Vec<String>,
}

impl BufferSink {
    /// Create a buffer sink writing to the given buffer handle.
    pub fn new(buffer: OutputBuffer, fields: Vec<String>) -> Self {
        Self { buffer, fields }
    }

    /// Append one record, narrowed to the selected fields in declared order.
    pub fn emit(&self, record: &StreamRecord) {
        let fields = self
            .fields
            .iter()
            .filter_map(|name| {
                record
                    .fields
                    .get(name)
                    .map(|value| (name.clone(), value.clone()))
            })
            .collect();
        let narrowed = StreamRecord::with_timestamp(fields, record.timestamp);
        let mut buffer = self.buffer.lock().unwrap_or_else(|e| e.into_inner());
        buffer.push(narrowed);
    }
}
