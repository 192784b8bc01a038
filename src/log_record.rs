// SPDX-License-Identifier: MIT OR Apache-2.0

//! Log record type for the emojilog facade.
//!
//! A [`LogRecord`] is built by a [`LogHandle`](crate::LogHandle) at the moment of the call
//! and handed by value to every global [`Sink`](crate::Sink). It carries a copy of the
//! diagnostic context that was active at the call site, so sinks never need to look at
//! thread-local state themselves (and may run on another thread).
//!
//! # Example
//!
//! ```rust
//! use emojilog::{Level, LogRecord, Marker};
//! use emojilog::context::DiagnosticContext;
//!
//! let record = LogRecord::new(Level::Info, "shop::Checkout", "order placed")
//!     .with_marker(Marker::new("AUDIT"))
//!     .with_context(DiagnosticContext::from([("requestId", "r1")]));
//!
//! assert_eq!(record.logger(), "shop::Checkout");
//! assert_eq!(record.context().get("requestId"), Some("r1"));
//! assert!(record.to_string().ends_with("INFO  shop::Checkout {AUDIT} order placed {requestId=r1}"));
//! ```

use crate::Level;
use crate::context::DiagnosticContext;
use crate::marker::Marker;
use std::fmt::{Debug, Display};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

static INITIAL_TIMESTAMP: OnceLock<Instant> = OnceLock::new();

fn initial_timestamp() -> Instant {
    *INITIAL_TIMESTAMP.get_or_init(Instant::now)
}

/**
A log record.

Records are plain values: cloning one is how a handle fans a single call out to several
sinks.
*/
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LogRecord {
    level: Level,
    logger: String,
    marker: Option<Marker>,
    message: String,
    context: DiagnosticContext,
    elapsed: Duration,
}

impl LogRecord {
    /// Creates a record stamped with the time since the first record of the process.
    pub fn new(level: Level, logger: impl Into<String>, message: impl Into<String>) -> Self {
        let start = initial_timestamp();
        Self {
            level,
            logger: logger.into(),
            marker: None,
            message: message.into(),
            context: DiagnosticContext::new(),
            elapsed: Instant::now().duration_since(start),
        }
    }

    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.marker = Some(marker);
        self
    }

    pub fn with_context(mut self, context: DiagnosticContext) -> Self {
        self.context = context;
        self
    }

    pub fn level(&self) -> Level {
        self.level
    }

    /// Name of the handle that emitted the record.
    pub fn logger(&self) -> &str {
        &self.logger
    }

    pub fn marker(&self) -> Option<&Marker> {
        self.marker.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn context(&self) -> &DiagnosticContext {
        &self.context
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

impl Display for LogRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {} {}", self.elapsed, self.level.label(), self.logger)?;
        if let Some(marker) = &self.marker {
            write!(f, " {{{marker}}}")?;
        }
        write!(f, " {}", self.message)?;
        if !self.context.is_empty() {
            write!(f, " {}", self.context)?;
        }
        Ok(())
    }
}
/*
Boilerplate notes for LogRecord:

IMPLEMENTED:
- Debug, Clone, PartialEq/Eq, Hash: Derived
- Display: the single-line rendering used by the reference sinks

NOT IMPLEMENTED:
- Default: a record without a logger name or level has no sensible meaning
- Ord/PartialOrd: No meaningful ordering for log records
- Copy: owns heap data
*/
