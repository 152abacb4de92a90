//! Windowed join operator.
//!
//! The live operator instantiated from a planned [`WindowedJoinDescriptor`].
//! Supports concurrent delivery from its two independent upstream sources:
//! each side's windowed index sits behind its own lock, and both locks are
//! always taken in left-then-right order so interleaved inserts, probes, and
//! evictions never corrupt the indexes or double-emit a pair.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::mpsc;

use crate::rillstream::sql::error::{SqlError, SqlResult};
use crate::rillstream::sql::execution::join::window_store::WindowStore;
use crate::rillstream::sql::execution::types::{FieldValue, StreamRecord};
use crate::rillstream::sql::plan::node::WindowedJoinDescriptor;

/// Which side of the join a record arrives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinSide {
    /// Left input stream
    Left,
    /// Right input stream
    Right,
}

/// Counters for monitoring a running join.
#[derive(Debug, Default)]
pub struct JoinStats {
    /// Records processed from the left input
    pub left_records: AtomicU64,
    /// Records processed from the right input
    pub right_records: AtomicU64,
    /// Joined output records emitted
    pub matches_emitted: AtomicU64,
}

/// Live windowed equi-join over two event feeds.
///
/// Events on each side are wrapped with that side's ordered key-field list
/// before being indexed and before probing the other side. A pair matches
/// when the wrapped keys compare equal and the event times fall within the
/// window width of each other (boundary inclusive); each matching pair
/// yields exactly one output record combining the declared payload fields
/// of both sides.
#[derive(Debug)]
pub struct WindowedJoinOperator {
    descriptor: WindowedJoinDescriptor,
    left: Mutex<WindowStore>,
    right: Mutex<WindowStore>,
    window_ms: i64,
    stats: JoinStats,
}

impl WindowedJoinOperator {
    /// Instantiate the operator from its compiled descriptor.
    ///
    /// When the two key descriptors are structurally identical the sides
    /// share one key-field-list allocation, which is what makes cross-side
    /// wrappers comparable; differently named or typed keys build disjoint
    /// lists, and such wrappers never compare equal.
    pub fn new(descriptor: WindowedJoinDescriptor) -> Self {
        let left_key_fields = Arc::new(vec![descriptor.left_key.clone()]);
        let right_key_fields = if descriptor.right_key == descriptor.left_key {
            Arc::clone(&left_key_fields)
        } else {
            Arc::new(vec![descriptor.right_key.clone()])
        };

        let window_ms = descriptor.window_width.as_millis() as i64;
        Self {
            left: Mutex::new(WindowStore::new(left_key_fields, window_ms)),
            right: Mutex::new(WindowStore::new(right_key_fields, window_ms)),
            descriptor,
            window_ms,
            stats: JoinStats::default(),
        }
    }

    /// The compiled join parameters.
    pub fn descriptor(&self) -> &WindowedJoinDescriptor {
        &self.descriptor
    }

    /// Window width in milliseconds.
    pub fn window_ms(&self) -> i64 {
        self.window_ms
    }

    /// Monitoring counters.
    pub fn stats(&self) -> &JoinStats {
        &self.stats
    }

    /// Process one record from the left input, returning any joined outputs.
    pub fn process_left(&self, record: StreamRecord) -> SqlResult<Vec<StreamRecord>> {
        self.stats.left_records.fetch_add(1, Ordering::Relaxed);
        self.process(JoinSide::Left, record)
    }

    /// Process one record from the right input, returning any joined outputs.
    pub fn process_right(&self, record: StreamRecord) -> SqlResult<Vec<StreamRecord>> {
        self.stats.right_records.fetch_add(1, Ordering::Relaxed);
        self.process(JoinSide::Right, record)
    }

    fn process(&self, side: JoinSide, record: StreamRecord) -> SqlResult<Vec<StreamRecord>> {
        let record = Arc::new(record);
        let event_time = record.timestamp;

        // Fixed lock order: left, then right. Holding both for the whole
        // insert-and-probe keeps every pair matched exactly once under
        // concurrent delivery.
        let mut left = self.lock_store(&self.left)?;
        let mut right = self.lock_store(&self.right)?;

        let matches = match side {
            JoinSide::Left => {
                let wrapped = left.wrap(Arc::clone(&record))?;
                left.insert(wrapped.clone());
                right.probe(&wrapped, event_time)
            }
            JoinSide::Right => {
                let wrapped = right.wrap(Arc::clone(&record))?;
                right.insert(wrapped.clone());
                left.probe(&wrapped, event_time)
            }
        };
        drop(right);
        drop(left);

        let mut outputs = Vec::with_capacity(matches.len());
        for other in matches {
            let (left_rec, right_rec) = match side {
                JoinSide::Left => (&record, &other),
                JoinSide::Right => (&other, &record),
            };
            outputs.push(self.compose_output(left_rec, right_rec));
        }
        self.stats
            .matches_emitted
            .fetch_add(outputs.len() as u64, Ordering::Relaxed);
        Ok(outputs)
    }

    /// Combine one matching pair into a single output record: left payload
    /// fields first, then right payload fields, each in its declared order.
    /// The output carries the later of the two event times.
    fn compose_output(&self, left: &StreamRecord, right: &StreamRecord) -> StreamRecord {
        let mut fields = HashMap::with_capacity(
            self.descriptor.left_fields.len() + self.descriptor.right_fields.len(),
        );
        for field in &self.descriptor.left_fields {
            let value = left.fields.get(&field.name).cloned().unwrap_or(FieldValue::Null);
            fields.insert(field.name.clone(), value);
        }
        for field in &self.descriptor.right_fields {
            let value = right
                .fields
                .get(&field.name)
                .cloned()
                .unwrap_or(FieldValue::Null);
            fields.insert(field.name.clone(), value);
        }
        StreamRecord::with_timestamp(fields, left.timestamp.max(right.timestamp))
    }

    fn lock_store<'a>(
        &self,
        store: &'a Mutex<WindowStore>,
    ) -> SqlResult<MutexGuard<'a, WindowStore>> {
        store
            .lock()
            .map_err(|_| SqlError::execution_error("join window state lock poisoned"))
    }

    /// Drop all window state. No pending match survives teardown.
    pub fn tear_down(&self) {
        if let Ok(mut left) = self.left.lock() {
            left.clear();
        }
        if let Ok(mut right) = self.right.lock() {
            right.clear();
        }
    }

    /// True if both window stores are empty.
    pub fn is_empty(&self) -> bool {
        let left_empty = self.left.lock().map(|s| s.is_empty()).unwrap_or(true);
        let right_empty = self.right.lock().map(|s| s.is_empty()).unwrap_or(true);
        left_empty && right_empty
    }

    /// Total records buffered across both sides.
    pub fn buffered_count(&self) -> usize {
        let left = self.left.lock().map(|s| s.record_count()).unwrap_or(0);
        let right = self.right.lock().map(|s| s.record_count()).unwrap_or(0);
        left + right
    }

    /// Drive the join from two live event feeds.
    ///
    /// Consumes events one at a time per side as they arrive, sends joined
    /// outputs downstream, and completes when both upstream channels close.
    /// Dropping the returned future (cancellation) tears the flow down
    /// without emitting any further joined events.
    pub async fn run(
        self: Arc<Self>,
        mut left_rx: mpsc::Receiver<StreamRecord>,
        mut right_rx: mpsc::Receiver<StreamRecord>,
        output: mpsc::Sender<StreamRecord>,
    ) -> SqlResult<()> {
        let mut left_open = true;
        let mut right_open = true;

        while left_open || right_open {
            let outputs = tokio::select! {
                event = left_rx.recv(), if left_open => match event {
                    Some(record) => self.process_left(record)?,
                    None => {
                        left_open = false;
                        continue;
                    }
                },
                event = right_rx.recv(), if right_open => match event {
                    Some(record) => self.process_right(record)?,
                    None => {
                        right_open = false;
                        continue;
                    }
                },
            };

            for record in outputs {
                if output.send(record).await.is_err() {
                    // Downstream hung up; stop emitting.
                    return Ok(());
                }
            }
        }
        Ok(())
    }
}
