// SPDX-License-Identifier: MIT OR Apache-2.0

//! # In-Memory Sink
//!
//! This module provides an in-memory sink for testing and debugging purposes.
//! The `InMemorySink` captures records in memory rather than writing them anywhere,
//! making it ideal for:
//!
//! - Unit testing code that logs through emojilog
//! - Asserting on the diagnostic context a record carried
//! - Programmatically examining log output
//!
//! The sink implements [`Sink`] and can be installed with
//! [`add_global_sink`](crate::add_global_sink) or [`set_global_sinks`](crate::set_global_sinks).

use crate::log_record::LogRecord;
use crate::sink::Sink;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Mutex, PoisonError};

/// A sink that stores records in a `Vec`.
///
/// # Example
///
/// ```rust
/// use emojilog::{Emit, InMemorySink, LogHandle};
/// use emojilog::context::with_context;
/// use emojilog::global_sink::{global_sinks, set_global_sinks};
/// use std::sync::Arc;
///
/// let original = global_sinks();
/// let sink = Arc::new(InMemorySink::new());
/// set_global_sinks(vec![sink.clone()]);
///
/// with_context([("requestId", "r1")], || {
///     LogHandle::named("shop::Checkout").info("order placed");
/// });
///
/// let records = sink.drain_records();
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].context().get("requestId"), Some("r1"));
///
/// set_global_sinks(original);
/// ```
#[derive(Debug)]
pub struct InMemorySink {
    records: Mutex<Vec<LogRecord>>,
}

// ============================================================================
// BOILERPLATE TRAIT IMPLEMENTATIONS
// ============================================================================
//
// - Debug: Derived, required by Sink
// - Default: empty buffer
// - Clone: NOT implemented - two sinks sharing nothing would be surprising
// - PartialEq/Eq/Hash/Display: NOT implemented - no meaningful semantics for a sink

impl Default for InMemorySink {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySink {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
        }
    }

    /// Removes and returns every captured record, oldest first.
    pub fn drain_records(&self) -> Vec<LogRecord> {
        std::mem::take(&mut *self.records.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Drains all records into a single string, one rendered record per line.
    pub fn drain_logs(&self) -> String {
        self.drain_records()
            .iter()
            .map(LogRecord::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Sink for InMemorySink {
    fn finish_log_record(&self, record: LogRecord) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
    }

    fn finish_log_record_async<'s>(
        &'s self,
        record: LogRecord,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 's>> {
        Box::pin(async move {
            self.finish_log_record(record);
        })
    }

    fn prepare_to_die(&self) {
        // nothing buffered outside memory
    }
}
