// SPDX-License-Identifier: MIT OR Apache-2.0

//! Named log handles and the possibly-unbound [`Log`] facade.
//!
//! A [`LogHandle`] is a cheap-to-clone, named entry point into the global sinks. Every
//! record it emits carries a snapshot of the diagnostic context active at the call site:
//! [`ProcessContext`] keys underneath, the execution unit's own keys on top.
//!
//! A [`Log`] is what application code usually holds. It is either bound to a handle up
//! front, or unbound, in which case every call asks a [`CallerResolver`] which component
//! is logging and uses the (cached) handle for that component.

use std::fmt::Display;
use std::sync::Arc;

use crate::Level;
use crate::caller::CallerResolver;
use crate::context::{ContextStore, ProcessContext, ThreadLocalStore};
use crate::global_sink::global_sinks;
use crate::log_record::LogRecord;
use crate::marker::Marker;

/// Leveled emit operations.
///
/// Implementors provide [`emit`](Emit::emit); the per-level methods delegate to it.
///
/// ```rust
/// use emojilog::{Emit, LogHandle, Marker};
///
/// let log = LogHandle::named("shop::Checkout");
/// log.info("order placed");
/// log.warn_marked(&Marker::new("AUDIT"), "refund above limit");
/// ```
pub trait Emit {
    fn emit(&self, level: Level, marker: Option<&Marker>, message: impl Display);

    fn trace(&self, message: impl Display) {
        self.emit(Level::Trace, None, message)
    }
    fn debug(&self, message: impl Display) {
        self.emit(Level::Debug, None, message)
    }
    fn info(&self, message: impl Display) {
        self.emit(Level::Info, None, message)
    }
    fn warn(&self, message: impl Display) {
        self.emit(Level::Warn, None, message)
    }
    fn error(&self, message: impl Display) {
        self.emit(Level::Error, None, message)
    }

    fn trace_marked(&self, marker: &Marker, message: impl Display) {
        self.emit(Level::Trace, Some(marker), message)
    }
    fn debug_marked(&self, marker: &Marker, message: impl Display) {
        self.emit(Level::Debug, Some(marker), message)
    }
    fn info_marked(&self, marker: &Marker, message: impl Display) {
        self.emit(Level::Info, Some(marker), message)
    }
    fn warn_marked(&self, marker: &Marker, message: impl Display) {
        self.emit(Level::Warn, Some(marker), message)
    }
    fn error_marked(&self, marker: &Marker, message: impl Display) {
        self.emit(Level::Error, Some(marker), message)
    }
}

#[derive(Debug)]
struct HandleInner {
    name: String,
    store: Arc<dyn ContextStore>,
}

/// A named handle that writes records to the global sinks.
///
/// Clones share one allocation; [`LogHandle::ptr_eq`] tells whether two handles are the
/// same object rather than merely equally named.
#[derive(Debug, Clone)]
pub struct LogHandle {
    inner: Arc<HandleInner>,
}

impl LogHandle {
    /// A handle reading its context from the thread-local store.
    pub fn named(name: impl Into<String>) -> Self {
        Self::with_store(name, Arc::new(ThreadLocalStore))
    }

    /// A handle reading its context from `store`.
    pub fn with_store(name: impl Into<String>, store: Arc<dyn ContextStore>) -> Self {
        Self {
            inner: Arc::new(HandleInner {
                name: name.into(),
                store,
            }),
        }
    }

    /// The name stamped on every record this handle emits.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Whether `a` and `b` are clones of the same handle.
    pub fn ptr_eq(a: &LogHandle, b: &LogHandle) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    /// Builds the record a call would emit, without emitting it.
    pub fn record(&self, level: Level, marker: Option<&Marker>, message: impl Display) -> LogRecord {
        let context = ProcessContext::snapshot().merged_with(&self.inner.store.snapshot());
        let record = LogRecord::new(level, self.inner.name.as_str(), message.to_string())
            .with_context(context);
        match marker {
            Some(marker) => record.with_marker(marker.clone()),
            None => record,
        }
    }

    /// Emits through each sink's async path.
    ///
    /// The context is captured before the first await, so what the record carries is the
    /// context at the call site even if the sinks complete on another thread.
    pub async fn emit_async(&self, level: Level, marker: Option<&Marker>, message: impl Display) {
        let record = self.record(level, marker, message);
        for sink in global_sinks() {
            sink.finish_log_record_async(record.clone()).await;
        }
    }
}

impl Emit for LogHandle {
    fn emit(&self, level: Level, marker: Option<&Marker>, message: impl Display) {
        let record = self.record(level, marker, message);
        for sink in global_sinks() {
            sink.finish_log_record(record.clone());
        }
    }
}

#[derive(Debug, Clone)]
enum Binding {
    Bound(LogHandle),
    Unbound(Arc<CallerResolver>),
}

/// A logger that is either bound to a handle or resolves one per call.
///
/// Binding up front skips stack inspection entirely. An unbound `Log` pays for a stack
/// walk on each call, but the handle for each distinct caller is created only once.
///
/// ```rust
/// use emojilog::caller::{CallerResolver, ResolverConfig};
/// use emojilog::{Emit, Log};
/// use std::sync::Arc;
///
/// let resolver = Arc::new(CallerResolver::new(ResolverConfig::default()));
/// let log = Log::unbound(resolver);
/// log.info("attributed to whoever called this");
///
/// let bound = Log::named("shop::Checkout");
/// assert_eq!(bound.handle().name(), "shop::Checkout");
/// ```
#[derive(Debug, Clone)]
pub struct Log {
    binding: Binding,
}

impl Log {
    /// A `Log` that always writes through `handle`.
    pub fn bound(handle: LogHandle) -> Self {
        Self {
            binding: Binding::Bound(handle),
        }
    }

    /// A `Log` bound to a fresh handle called `name`.
    pub fn named(name: impl Into<String>) -> Self {
        Self::bound(LogHandle::named(name))
    }

    /// A `Log` that asks `resolver` for a handle on every call.
    ///
    /// Share one resolver between many `Log`s so they share its handle cache.
    pub fn unbound(resolver: Arc<CallerResolver>) -> Self {
        Self {
            binding: Binding::Unbound(resolver),
        }
    }

    /// Whether this `Log` skips caller resolution.
    pub fn is_bound(&self) -> bool {
        matches!(self.binding, Binding::Bound(_))
    }

    /// The handle the next call would use.
    pub fn handle(&self) -> LogHandle {
        match &self.binding {
            Binding::Bound(handle) => handle.clone(),
            Binding::Unbound(resolver) => resolver.handle(),
        }
    }

    /// Resolves the handle, then emits through each sink's async path.
    pub async fn emit_async(&self, level: Level, marker: Option<&Marker>, message: impl Display) {
        let handle = self.handle();
        handle.emit_async(level, marker, message).await
    }
}

impl Emit for Log {
    fn emit(&self, level: Level, marker: Option<&Marker>, message: impl Display) {
        self.handle().emit(level, marker, message)
    }
}

impl From<LogHandle> for Log {
    fn from(handle: LogHandle) -> Self {
        Self::bound(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::with_context;
    use crate::global_sink::set_global_sinks;
    use crate::global_sink::tests::TEST_SINK_GUARD;
    use crate::inmemory_sink::InMemorySink;
    use std::sync::PoisonError;

    fn capture<R>(f: impl FnOnce() -> R) -> (R, Vec<LogRecord>) {
        let _guard = TEST_SINK_GUARD.lock().unwrap_or_else(PoisonError::into_inner);
        let original = global_sinks();
        let sink = Arc::new(InMemorySink::new());
        set_global_sinks(vec![sink.clone()]);
        let r = f();
        set_global_sinks(original);
        (r, sink.drain_records())
    }

    #[test]
    fn records_carry_level_marker_and_context() {
        let audit = Marker::new("AUDIT");
        let ((), records) = capture(|| {
            with_context([("requestId", "r1")], || {
                let log = LogHandle::named("shop::Checkout");
                log.info("order placed");
                log.error_marked(&audit, "charge failed");
            })
        });

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].level(), Level::Info);
        assert_eq!(records[0].marker(), None);
        assert_eq!(records[1].level(), Level::Error);
        assert_eq!(records[1].marker(), Some(&audit));
        for record in &records {
            assert_eq!(record.logger(), "shop::Checkout");
            assert_eq!(record.context().get("requestId"), Some("r1"));
        }
    }

    #[test]
    fn unit_keys_shadow_process_keys() {
        ProcessContext::put("handle.tests.shadow", "process");
        let record = with_context([("handle.tests.shadow", "unit")], || {
            LogHandle::named("x").record(Level::Info, None, "m")
        });
        assert_eq!(record.context().get("handle.tests.shadow"), Some("unit"));

        let record = LogHandle::named("x").record(Level::Info, None, "m");
        assert_eq!(record.context().get("handle.tests.shadow"), Some("process"));
        ProcessContext::remove("handle.tests.shadow");
    }

    #[test]
    fn every_level_reaches_the_sink() {
        let ((), records) = capture(|| {
            let log = Log::named("levels");
            log.trace("t");
            log.debug("d");
            log.info("i");
            log.warn("w");
            log.error("e");
        });
        let levels: Vec<Level> = records.iter().map(LogRecord::level).collect();
        assert_eq!(
            levels,
            vec![Level::Trace, Level::Debug, Level::Info, Level::Warn, Level::Error]
        );
    }

    #[test]
    fn clones_are_the_same_handle() {
        let a = LogHandle::named("same");
        let b = a.clone();
        let c = LogHandle::named("same");
        assert!(LogHandle::ptr_eq(&a, &b));
        assert!(!LogHandle::ptr_eq(&a, &c));
    }

    #[test]
    fn async_emit_captures_context_at_call_site() {
        let ((), records) = capture(|| {
            test_executors::spin_on(
                crate::context::ContextScope::new()
                    .pair("requestId", "r9")
                    .run_async(async {
                        Log::named("async").emit_async(Level::Info, None, "hello").await;
                    }),
            )
        });
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].context().get("requestId"), Some("r9"));
    }
}
