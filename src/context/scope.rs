// SPDX-License-Identifier: MIT OR Apache-2.0

//! Save/apply/restore of diagnostic pairs around a unit of work.

use std::future::Future;

use super::diagnostic::DiagnosticContext;
use super::scoped_future::ScopedFuture;
use super::store::{ContextStore, ThreadLocalStore};

/// A set of diagnostic pairs applied for the duration of a unit of work.
///
/// Running work in a scope:
///
/// 1. takes a full copy of the store's current context,
/// 2. writes each pair in the order given, overwriting existing keys,
/// 3. runs the work,
/// 4. clears the store and writes the copy back.
///
/// Step 4 happens on every exit path: normal return, `Err`, and panic unwinding.
/// The work's result is passed through unchanged.
///
/// # Examples
///
/// ```rust
/// use emojilog::context::{self, ContextScope};
///
/// let scope = ContextScope::new().pair("requestId", "r1");
/// let seen = scope.run(|| context::get("requestId"));
/// assert_eq!(seen.as_deref(), Some("r1"));
/// assert_eq!(context::get("requestId"), None);
/// ```
///
/// Scopes nest; each one restores to its own pre-state:
///
/// ```rust
/// use emojilog::context::{self, ContextScope};
///
/// ContextScope::new().pair("a", "1").run(|| {
///     ContextScope::new().pair("a", "2").pair("b", "3").run(|| {
///         assert_eq!(context::get("a").as_deref(), Some("2"));
///     });
///     assert_eq!(context::get("a").as_deref(), Some("1"));
///     assert_eq!(context::get("b"), None);
/// });
/// assert!(context::snapshot().is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ContextScope<S: ContextStore = ThreadLocalStore> {
    store: S,
    pairs: Vec<(String, String)>,
}

impl ContextScope<ThreadLocalStore> {
    /// An empty scope over the thread-local store.
    pub fn new() -> Self {
        Self::with_store(ThreadLocalStore)
    }
}

impl<S: ContextStore> ContextScope<S> {
    /// An empty scope over `store`.
    pub fn with_store(store: S) -> Self {
        Self {
            store,
            pairs: Vec::new(),
        }
    }

    /// Appends a pair. Later pairs win over earlier ones with the same key.
    pub fn pair(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.pairs.push((key.into(), value.into()));
        self
    }

    /// Appends several pairs, preserving their order.
    pub fn pairs<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.pairs
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Applies the pairs and returns a guard that restores the prior context on drop.
    ///
    /// Prefer [`run`](Self::run); the guard is for call sites that can't be expressed
    /// as a closure. Guards must be dropped in reverse order of creation.
    #[must_use = "the context is restored as soon as the guard is dropped"]
    pub fn enter(&self) -> ScopeGuard<'_, S> {
        let saved = self.store.snapshot();
        for (k, v) in &self.pairs {
            self.store.put(k, v);
        }
        ScopeGuard {
            store: &self.store,
            saved,
        }
    }

    /// Runs `work` with the pairs applied.
    pub fn run<R>(&self, work: impl FnOnce() -> R) -> R {
        let _guard = self.enter();
        work()
    }

    /// Wraps `future` so that it runs with the pairs applied.
    ///
    /// The base context is captured from the store *now*, so a future created here and
    /// polled on another thread still sees the creator's keys. See [`ScopedFuture`]
    /// for the per-poll contract.
    pub fn in_future<F: Future>(self, future: F) -> ScopedFuture<S, F> {
        let mut working = self.store.snapshot();
        for (k, v) in self.pairs {
            working.insert(k, v);
        }
        ScopedFuture::new(self.store, working, future)
    }

    /// Awaits `future` with the pairs applied.
    pub async fn run_async<F: Future>(self, future: F) -> F::Output {
        self.in_future(future).await
    }
}

/// Restores a saved context when dropped.
///
/// Returned by [`ContextScope::enter`].
#[derive(Debug)]
pub struct ScopeGuard<'s, S: ContextStore> {
    store: &'s S,
    saved: DiagnosticContext,
}

impl<S: ContextStore> ScopeGuard<'_, S> {
    /// The context as it was before the scope was entered.
    pub fn saved(&self) -> &DiagnosticContext {
        &self.saved
    }
}

impl<S: ContextStore> Drop for ScopeGuard<'_, S> {
    fn drop(&mut self) {
        self.store.restore(&self.saved);
    }
}

/// Runs `work` with `pairs` applied to the thread-local store.
///
/// Shorthand for `ContextScope::new().pairs(pairs).run(work)`.
///
/// ```rust
/// let r: Result<u8, &str> = emojilog::context::with_context([("x", "1")], || Err("boom"));
/// assert_eq!(r, Err("boom"));
/// assert_eq!(emojilog::context::get("x"), None);
/// ```
pub fn with_context<K, V, R>(pairs: impl IntoIterator<Item = (K, V)>, work: impl FnOnce() -> R) -> R
where
    K: Into<String>,
    V: Into<String>,
{
    ContextScope::new().pairs(pairs).run(work)
}
