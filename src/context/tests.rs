// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tests for the context module.

use super::*;
use std::future::Future;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Poll, Waker};

/// Returns `Pending` once, waking itself, then `Ready`.
#[derive(Default)]
struct YieldOnce {
    yielded: bool,
}

impl Future for YieldOnce {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut std::task::Context<'_>) -> Poll<()> {
        if self.yielded {
            Poll::Ready(())
        } else {
            self.yielded = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }
}

fn poll_once<F: Future>(fut: Pin<&mut F>) -> Poll<F::Output> {
    let mut cx = std::task::Context::from_waker(Waker::noop());
    fut.poll(&mut cx)
}

/// A store shared by everyone who holds a clone, standing in for a host that
/// multiplexes several units of work over one context.
#[derive(Debug, Clone, Default)]
struct SharedStore(Arc<Mutex<DiagnosticContext>>);

impl ContextStore for SharedStore {
    fn get(&self, key: &str) -> Option<String> {
        let ctx = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        ctx.get(key).map(str::to_owned)
    }

    fn put(&self, key: &str, value: &str) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, value);
    }

    fn remove(&self, key: &str) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }

    fn clear(&self) {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }

    fn snapshot(&self) -> DiagnosticContext {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[test]
fn scope_restores_untouched_and_overwritten_keys() {
    clear();
    put("tenant", "acme");
    put("requestId", "outer");
    let before = snapshot();

    ContextScope::new()
        .pair("requestId", "r1")
        .pair("user", "alice")
        .run(|| {
            assert_eq!(
                snapshot(),
                DiagnosticContext::from([("tenant", "acme"), ("requestId", "r1"), ("user", "alice")])
            );
        });

    assert_eq!(snapshot(), before);
    clear();
}

#[test]
fn scope_removes_keys_written_by_the_work() {
    clear();
    ContextScope::new().pair("a", "1").run(|| {
        put("scratch", "x");
        remove("a");
    });
    assert!(snapshot().is_empty());
}

#[test]
fn pairs_apply_in_order() {
    clear();
    let seen = ContextScope::new()
        .pairs([("k", "first"), ("k", "second")])
        .run(|| get("k"));
    assert_eq!(seen.as_deref(), Some("second"));
}

#[test]
fn request_scenario() {
    clear();
    let during = with_context([("requestId", "r1")], snapshot);
    assert_eq!(during, DiagnosticContext::from([("requestId", "r1")]));
    assert!(snapshot().is_empty());
}

#[test]
fn nested_scopes_restore_to_their_own_prestate() {
    clear();
    ContextScope::new().pair("a", "1").run(|| {
        ContextScope::new().pair("a", "2").pair("b", "3").run(|| {
            assert_eq!(snapshot(), DiagnosticContext::from([("a", "2"), ("b", "3")]));
        });
        assert_eq!(snapshot(), DiagnosticContext::from([("a", "1")]));
    });
    assert!(snapshot().is_empty());
}

#[test]
fn result_passes_through() {
    clear();
    let ok: Result<u32, String> = with_context([("x", "1")], || Ok(7));
    assert_eq!(ok, Ok(7));

    let err: Result<u32, String> = with_context([("x", "1")], || Err("bad input".to_string()));
    assert_eq!(err, Err("bad input".to_string()));
    assert!(snapshot().is_empty());
}

#[test]
fn panic_restores_and_propagates() {
    clear();
    put("tenant", "acme");
    let result = catch_unwind(AssertUnwindSafe(|| {
        with_context([("x", "1")], || -> () { panic!("work failed") })
    }));

    let payload = result.expect_err("panic must reach the caller");
    assert_eq!(payload.downcast_ref::<&str>(), Some(&"work failed"));
    assert_eq!(snapshot(), DiagnosticContext::from([("tenant", "acme")]));
    clear();
}

#[test]
fn guard_exposes_saved_context() {
    clear();
    put("a", "0");
    let scope = ContextScope::new().pair("a", "1");
    {
        let guard = scope.enter();
        assert_eq!(guard.saved(), &DiagnosticContext::from([("a", "0")]));
        assert_eq!(get("a").as_deref(), Some("1"));
    }
    assert_eq!(get("a").as_deref(), Some("0"));
    clear();
}

#[test]
fn threads_have_independent_contexts() {
    clear();
    put("thread", "main");
    let other = std::thread::spawn(|| {
        let inherited = snapshot();
        with_context([("thread", "worker")], || get("thread"));
        inherited
    })
    .join()
    .unwrap();
    assert!(other.is_empty());
    assert_eq!(get("thread").as_deref(), Some("main"));
    clear();
}

#[test]
fn restore_wipes_interleaved_writes_on_a_shared_store() {
    let store = SharedStore::default();
    let first = ContextScope::with_store(store.clone()).pair("unit", "first");

    let guard = first.enter();
    // An unrelated unit on the same store writes while `first` is active.
    store.put("other", "second");
    drop(guard);

    assert_eq!(store.get("other"), None);
    assert!(store.snapshot().is_empty());
}

#[test]
fn scoped_future_applies_only_during_polls() {
    clear();
    put("tenant", "acme");
    let fut = ContextScope::new().pair("requestId", "r1").in_future(async {
        let first = snapshot();
        YieldOnce::default().await;
        (first, get("requestId"))
    });
    let mut fut = Box::pin(fut);

    assert!(poll_once(fut.as_mut()).is_pending());
    assert_eq!(snapshot(), DiagnosticContext::from([("tenant", "acme")]));

    let Poll::Ready((first, after_resume)) = poll_once(fut.as_mut()) else {
        panic!("future should complete after one yield");
    };
    assert_eq!(
        first,
        DiagnosticContext::from([("tenant", "acme"), ("requestId", "r1")])
    );
    assert_eq!(after_resume.as_deref(), Some("r1"));
    assert_eq!(snapshot(), DiagnosticContext::from([("tenant", "acme")]));
    clear();
}

#[test]
fn scoped_future_follows_the_task_across_threads() {
    clear();
    put("creator", "main");
    let fut = ContextScope::new().pair("requestId", "r1").in_future(async {
        put("step", "started");
        YieldOnce::default().await;
        snapshot()
    });
    let mut fut = Box::pin(fut);
    assert!(poll_once(fut.as_mut()).is_pending());
    assert_eq!(snapshot(), DiagnosticContext::from([("creator", "main")]));

    let (seen, worker_after) = std::thread::spawn(move || {
        put("worker", "w1");
        let Poll::Ready(seen) = poll_once(fut.as_mut()) else {
            panic!("future should complete after one yield");
        };
        (seen, snapshot())
    })
    .join()
    .unwrap();

    assert_eq!(
        seen,
        DiagnosticContext::from([("creator", "main"), ("requestId", "r1"), ("step", "started")])
    );
    assert_eq!(worker_after, DiagnosticContext::from([("worker", "w1")]));
    assert_eq!(snapshot(), DiagnosticContext::from([("creator", "main")]));
    clear();
}

#[test]
fn dropping_a_pending_scoped_future_leaves_context_untouched() {
    clear();
    put("tenant", "acme");
    let fut = ContextScope::new().pair("requestId", "r1").in_future(async {
        put("half", "done");
        YieldOnce::default().await;
        get("half")
    });
    let mut fut = Box::pin(fut);
    assert!(poll_once(fut.as_mut()).is_pending());
    drop(fut);

    assert_eq!(snapshot(), DiagnosticContext::from([("tenant", "acme")]));
    clear();
}

#[test]
fn scoped_future_restores_when_poll_panics() {
    clear();
    let fut = ContextScope::new()
        .pair("x", "1")
        .in_future(async {
            if get("x").is_some() {
                panic!("poll failed");
            }
            0u8
        });
    let mut fut = Box::pin(fut);
    let result = catch_unwind(AssertUnwindSafe(|| poll_once(fut.as_mut())));
    assert!(result.is_err());
    assert!(snapshot().is_empty());
}

#[test_executors::async_test]
async fn run_async_passes_output_through() {
    clear();
    let out: Result<&str, &str> = ContextScope::new()
        .pair("x", "1")
        .run_async(async {
            YieldOnce::default().await;
            assert_eq!(get("x").as_deref(), Some("1"));
            Err("downstream failed")
        })
        .await;
    assert_eq!(out, Err("downstream failed"));
    assert!(snapshot().is_empty());
}

#[test]
fn process_context_is_shared_across_threads() {
    ProcessContext::put("tests.process", "yes");
    let seen = std::thread::spawn(|| ProcessContext::get("tests.process"))
        .join()
        .unwrap();
    assert_eq!(seen.as_deref(), Some("yes"));
    ProcessContext::remove("tests.process");
    assert_eq!(ProcessContext::get("tests.process"), None);
}

#[test]
fn diagnostic_context_display_and_merge() {
    let base = DiagnosticContext::from([("b", "2"), ("a", "1")]);
    let overlay = DiagnosticContext::from([("b", "3")]);
    let merged = base.merged_with(&overlay);
    assert_eq!(merged.to_string(), "{a=1, b=3}");
    assert_eq!(base.get("b"), Some("2"));
    assert_eq!(DiagnosticContext::new().to_string(), "{}");
}
