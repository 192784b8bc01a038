// SPDX-License-Identifier: MIT OR Apache-2.0

//! Global sink management.
//!
//! Every [`LogHandle`](crate::LogHandle) writes to the same process-wide list of sinks.
//! By default the list holds a single [`StdErrorSink`](crate::StdErrorSink), so logging
//! works without configuration.
//!
//! # Examples
//!
//! ## Capturing records in a test
//!
//! ```
//! use emojilog::global_sink::{global_sinks, set_global_sinks};
//! use emojilog::{Emit, InMemorySink, LogHandle};
//! use std::sync::Arc;
//!
//! let original = global_sinks();
//! let sink = Arc::new(InMemorySink::new());
//! set_global_sinks(vec![sink.clone()]);
//!
//! LogHandle::named("doc").warn("only captured in memory");
//! assert!(sink.drain_logs().contains("only captured in memory"));
//!
//! set_global_sinks(original);
//! ```
//!
//! # Implementation Notes
//!
//! Sinks are reference-counted. Replacing the list does not drop a sink that a handle is
//! currently writing to; it lives until the last in-flight call releases it. The lock is
//! held only long enough to clone or replace the vector of `Arc`s.

use crate::sink::Sink;
use crate::stderror_sink::StdErrorSink;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

static GLOBAL_SINKS: OnceLock<RwLock<Vec<Arc<dyn Sink>>>> = OnceLock::new();

fn sinks() -> &'static RwLock<Vec<Arc<dyn Sink>>> {
    GLOBAL_SINKS.get_or_init(|| RwLock::new(vec![Arc::new(StdErrorSink::new())]))
}

/// Retrieves the current set of global sinks.
///
/// Returns clones of the `Arc`s so sinks stay alive for the duration of a write even if
/// the list is replaced concurrently.
pub fn global_sinks() -> Vec<Arc<dyn Sink>> {
    sinks()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Appends a sink to the global list.
pub fn add_global_sink(sink: Arc<dyn Sink>) {
    sinks()
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .push(sink);
}

/// Replaces all global sinks.
///
/// An empty list is allowed; records are then silently dropped.
pub fn set_global_sinks(new_sinks: Vec<Arc<dyn Sink>>) {
    *sinks().write().unwrap_or_else(PoisonError::into_inner) = new_sinks;
}

/// Asks every global sink to flush.
pub fn prepare_to_die() {
    for sink in global_sinks() {
        sink.prepare_to_die();
    }
}
