// SPDX-License-Identifier: MIT OR Apache-2.0

//! Context storage for the current execution unit.

use std::cell::RefCell;
use std::fmt::Debug;

use super::diagnostic::DiagnosticContext;

/// Storage for the diagnostic context of the *current* execution unit.
///
/// The store decides what "current" means. [`ThreadLocalStore`] keeps one map per
/// OS thread; a host with its own task model can implement this trait over task-local
/// storage instead, and [`ContextScope`](super::ContextScope) will work unchanged.
///
/// Implementations must make [`snapshot`](ContextStore::snapshot) return an
/// independent copy.
pub trait ContextStore: Debug + Send + Sync {
    /// The value of `key`, if set.
    fn get(&self, key: &str) -> Option<String>;

    /// Sets `key`, replacing any previous value.
    fn put(&self, key: &str, value: &str);

    /// Removes `key`. Removing a missing key does nothing.
    fn remove(&self, key: &str);

    /// Removes every key visible to the current execution unit.
    fn clear(&self);

    /// An independent copy of the current context.
    fn snapshot(&self) -> DiagnosticContext;

    /**
    Replaces the current context with `snapshot`.

    This clears everything and then reapplies the snapshot key by key, so keys added
    since the snapshot was taken are gone afterwards, including keys written by
    unrelated work sharing the same store.
    */
    fn restore(&self, snapshot: &DiagnosticContext) {
        self.clear();
        for (k, v) in snapshot.iter() {
            self.put(k, v);
        }
    }
}

thread_local! {
    static THREAD_CONTEXT: RefCell<DiagnosticContext> = const { RefCell::new(DiagnosticContext::new()) };
}

/// The default store: one [`DiagnosticContext`] per OS thread.
///
/// ```rust
/// use emojilog::context::{ContextStore, ThreadLocalStore};
///
/// let store = ThreadLocalStore;
/// store.put("user", "alice");
/// assert_eq!(store.get("user").as_deref(), Some("alice"));
/// store.clear();
/// assert!(store.snapshot().is_empty());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ThreadLocalStore;

impl ThreadLocalStore {
    fn with<R>(f: impl FnOnce(&mut DiagnosticContext) -> R) -> Option<R> {
        // try_with: during thread teardown the map may already be gone.
        THREAD_CONTEXT.try_with(|cell| f(&mut cell.borrow_mut())).ok()
    }
}

impl ContextStore for ThreadLocalStore {
    fn get(&self, key: &str) -> Option<String> {
        Self::with(|ctx| ctx.get(key).map(str::to_owned)).flatten()
    }

    fn put(&self, key: &str, value: &str) {
        Self::with(|ctx| ctx.insert(key, value));
    }

    fn remove(&self, key: &str) {
        Self::with(|ctx| ctx.remove(key));
    }

    fn clear(&self) {
        Self::with(|ctx| ctx.clear());
    }

    fn snapshot(&self) -> DiagnosticContext {
        Self::with(|ctx| ctx.clone()).unwrap_or_default()
    }

    fn restore(&self, snapshot: &DiagnosticContext) {
        Self::with(|ctx| {
            ctx.clear();
            for (k, v) in snapshot.iter() {
                ctx.insert(k, v);
            }
        });
    }
}
