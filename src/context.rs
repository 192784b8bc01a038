// SPDX-License-Identifier: MIT OR Apache-2.0

//! Diagnostic context: ambient key-value pairs attached to every log record.
//!
//! This module provides the scoped context system. A [`DiagnosticContext`] is a map from
//! string keys to string values held by a [`ContextStore`] for the current execution unit.
//! Handles snapshot it when they emit a record, so call sites never pass it explicitly.
//!
//! # Overview
//!
//! - [`DiagnosticContext`]: the key-value map, a plain value with copy-on-snapshot semantics
//! - [`ContextStore`]: where the current unit's map lives; [`ThreadLocalStore`] is the default
//! - [`ContextScope`]: applies pairs around a closure or future and restores afterwards
//! - [`ScopedFuture`]: the future wrapper produced by [`ContextScope::in_future`]
//! - [`ProcessContext`]: process-lifetime keys written once at startup
//!
//! # Scopes
//!
//! ```rust
//! use emojilog::context::{self, ContextScope};
//!
//! context::put("tenant", "acme");
//! ContextScope::new().pair("requestId", "r1").run(|| {
//!     assert_eq!(context::get("tenant").as_deref(), Some("acme"));
//!     assert_eq!(context::get("requestId").as_deref(), Some("r1"));
//! });
//! assert_eq!(context::get("requestId"), None);
//! # context::clear();
//! ```
//!
//! # Async
//!
//! Thread-local storage does not follow a future across executor threads. Wrap the future
//! instead; the wrapper installs its context around each poll:
//!
//! ```rust
//! use emojilog::context::ContextScope;
//! # async fn handle_request() {}
//!
//! # async fn example() {
//! ContextScope::new()
//!     .pair("requestId", "r2")
//!     .in_future(handle_request())
//!     .await;
//! # }
//! ```
//!
//! # Shared stores
//!
//! Restoring clears the whole store and writes the saved copy back. If two unrelated
//! units of work share one store and interleave (for example an executor that multiplexes
//! tasks over one thread while they call [`ContextScope::enter`] directly), a restore
//! wipes whatever the other unit wrote in between. [`ScopedFuture`] avoids this by
//! keeping each future's context inside the future; synchronous code on a shared store
//! has to avoid interleaving on its own.

mod diagnostic;
mod process;
mod scope;
mod scoped_future;
mod store;

#[cfg(test)]
mod tests;

pub use diagnostic::DiagnosticContext;
pub use process::ProcessContext;
pub use scope::{ContextScope, ScopeGuard, with_context};
pub use scoped_future::ScopedFuture;
pub use store::{ContextStore, ThreadLocalStore};

/// Reads `key` from the current thread's context.
pub fn get(key: &str) -> Option<String> {
    ThreadLocalStore.get(key)
}

/// Writes `key` into the current thread's context, outside any scope.
///
/// The write survives until something removes it; an enclosing [`ContextScope`] will
/// remove it when it restores.
pub fn put(key: &str, value: &str) {
    ThreadLocalStore.put(key, value);
}

/// Removes `key` from the current thread's context.
pub fn remove(key: &str) {
    ThreadLocalStore.remove(key);
}

/// Empties the current thread's context.
///
/// Scopes entered before this call still restore their own saved copy on exit.
pub fn clear() {
    ThreadLocalStore.clear();
}

/// A copy of the current thread's context.
pub fn snapshot() -> DiagnosticContext {
    ThreadLocalStore.snapshot()
}
