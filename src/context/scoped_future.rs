// SPDX-License-Identifier: MIT OR Apache-2.0

//! Async context preservation.

use std::future::Future;
use std::pin::Pin;
use std::task::Poll;

use super::diagnostic::DiagnosticContext;
use super::store::ContextStore;

/// A [`Future`] wrapper that runs its inner future inside a diagnostic scope.
///
/// Executors are free to poll a future on any thread and to interleave many futures on
/// one thread, so the scope can't simply be applied once and restored at the end.
/// Instead `ScopedFuture` owns its working context and installs it around every poll:
///
/// 1. snapshot whatever context the polling thread has,
/// 2. install the working context,
/// 3. poll the inner future,
/// 4. copy the (possibly modified) context back into the working context,
/// 5. restore the polling thread's snapshot.
///
/// Step 5 also runs if the inner future panics. Keys the inner future writes survive
/// suspension and follow it to whichever thread resumes it, while no thread ever
/// observes them outside a poll. Dropping a pending `ScopedFuture` therefore needs no
/// cleanup: between polls, every thread's context is already what it was.
///
/// Created by [`ContextScope::in_future`](super::ContextScope::in_future).
///
/// # Examples
///
/// ```rust
/// use emojilog::context::{self, ContextScope};
///
/// async fn handler() -> Option<String> {
///     context::get("requestId")
/// }
///
/// # async fn example() {
/// let seen = ContextScope::new()
///     .pair("requestId", "r1")
///     .in_future(handler())
///     .await;
/// assert_eq!(seen.as_deref(), Some("r1"));
/// assert_eq!(context::get("requestId"), None);
/// # }
/// ```
#[derive(Debug)]
pub struct ScopedFuture<S: ContextStore, F> {
    store: S,
    working: DiagnosticContext,
    future: F,
}

impl<S: ContextStore, F> ScopedFuture<S, F> {
    pub(crate) fn new(store: S, working: DiagnosticContext, future: F) -> Self {
        Self {
            store,
            working,
            future,
        }
    }

    /// The context the inner future will see on its next poll.
    pub fn working_context(&self) -> &DiagnosticContext {
        &self.working
    }
}

struct RestoreOnExit<'s, S: ContextStore> {
    store: &'s S,
    outer: DiagnosticContext,
}

impl<S: ContextStore> Drop for RestoreOnExit<'_, S> {
    fn drop(&mut self) {
        self.store.restore(&self.outer);
    }
}

impl<S, F> Future for ScopedFuture<S, F>
where
    S: ContextStore,
    F: Future,
{
    type Output = F::Output;

    fn poll(self: Pin<&mut Self>, cx: &mut std::task::Context<'_>) -> Poll<Self::Output> {
        // SAFETY: `future` is structurally pinned and never moved out of `self`.
        // `store` and `working` are not pinned and are only accessed by reference.
        let this = unsafe { self.get_unchecked_mut() };
        let future = unsafe { Pin::new_unchecked(&mut this.future) };

        let exit = RestoreOnExit {
            store: &this.store,
            outer: this.store.snapshot(),
        };
        this.store.restore(&this.working);
        let r = future.poll(cx);
        this.working = this.store.snapshot();
        drop(exit);
        r
    }
}
