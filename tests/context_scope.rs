// SPDX-License-Identifier: MIT OR Apache-2.0

use emojilog::context::{self, ContextScope, DiagnosticContext};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Returns `Pending` once, then `Ready`.
struct YieldOnce(bool);

impl Future for YieldOnce {
    type Output = ();
    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.0 {
            Poll::Ready(())
        } else {
            self.0 = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }
}

#[test]
fn request_scenario() {
    let mut during = DiagnosticContext::new();
    ContextScope::new().pair("requestId", "r1").run(|| {
        during = context::snapshot();
    });
    assert_eq!(during, DiagnosticContext::from([("requestId", "r1")]));
    assert!(context::snapshot().is_empty());
}

#[test]
fn child_thread_inherits_by_explicit_snapshot() {
    ContextScope::new().pair("job", "reindex").run(|| {
        let inherited = context::snapshot();
        let seen = std::thread::spawn(move || {
            let bare = context::get("job");
            let scoped = ContextScope::new()
                .pairs(inherited)
                .run(|| context::get("job"));
            (bare, scoped, context::get("job"))
        })
        .join()
        .unwrap();
        assert_eq!(seen, (None, Some("reindex".to_owned()), None));
    });
}

#[test]
fn scoped_future_keeps_its_context_across_suspension() {
    let scoped = ContextScope::new().pair("task", "a").in_future(async {
        let before = context::get("task");
        YieldOnce(false).await;
        context::put("progress", "half");
        YieldOnce(false).await;
        (before, context::get("task"), context::get("progress"))
    });
    let out = test_executors::spin_on(scoped);
    assert_eq!(
        out,
        (
            Some("a".to_owned()),
            Some("a".to_owned()),
            Some("half".to_owned())
        )
    );
    assert_eq!(context::get("task"), None);
    assert_eq!(context::get("progress"), None);
}

#[test_executors::async_test]
async fn run_async_nests() {
    let inner = ContextScope::new()
        .pair("outer", "1")
        .run_async(async {
            ContextScope::new()
                .pair("inner", "2")
                .run_async(async { context::snapshot() })
                .await
        })
        .await;
    assert_eq!(inner, DiagnosticContext::from([("outer", "1"), ("inner", "2")]));
    assert_eq!(context::get("outer"), None);
}
