// SPDX-License-Identifier: MIT OR Apache-2.0

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::context::ContextScope;
use crate::handle::{Emit, LogHandle};

pub const REQUEST_ID_KEY: &str = "requestId";
pub const PATH_KEY: &str = "path";
pub const METHOD_KEY: &str = "method";
pub const REMOTE_ADDR_KEY: &str = "remoteAddr";

static NEXT_REQUEST: AtomicU64 = AtomicU64::new(1);

fn next_request_id() -> String {
    format!("req-{}", NEXT_REQUEST.fetch_add(1, Ordering::Relaxed))
}

/// The parts of an inbound request that end up in the diagnostic context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestInfo {
    pub request_id: Option<String>,
    pub method: String,
    pub path: String,
    pub remote_addr: Option<String>,
}

impl RequestInfo {
    /// A request with no id (one is generated per handling) and no remote address.
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            request_id: None,
            method: method.into(),
            path: path.into(),
            remote_addr: None,
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn with_remote_addr(mut self, remote_addr: impl Into<String>) -> Self {
        self.remote_addr = Some(remote_addr.into());
        self
    }

    /// The context pairs for this request. A missing request id is generated.
    fn pairs(&self) -> Vec<(&'static str, String)> {
        let request_id = self.request_id.clone().unwrap_or_else(next_request_id);
        let mut pairs = vec![
            (REQUEST_ID_KEY, request_id),
            (PATH_KEY, self.path.clone()),
            (METHOD_KEY, self.method.clone()),
        ];
        if let Some(remote_addr) = &self.remote_addr {
            pairs.push((REMOTE_ADDR_KEY, remote_addr.clone()));
        }
        pairs
    }
}

/// Runs request handlers inside a context scope carrying the request's metadata.
///
/// The scope is entered before the handler runs and the prior context is restored when
/// it finishes, whether it returns, fails or panics.
///
/// ```rust
/// use emojilog::integration::{RequestFilter, RequestInfo};
///
/// let filter = RequestFilter::new();
/// let request = RequestInfo::new("GET", "/orders/7").with_request_id("r1");
/// let id = filter.handle(&request, || emojilog::context::get("requestId"));
/// assert_eq!(id.as_deref(), Some("r1"));
/// assert_eq!(emojilog::context::get("requestId"), None);
/// ```
#[derive(Debug, Clone)]
pub struct RequestFilter {
    log: LogHandle,
}

impl RequestFilter {
    /// A filter logging its start and end lines as `emojilog::integration::request`.
    pub fn new() -> Self {
        Self {
            log: LogHandle::named(module_path!()),
        }
    }

    /// Runs `downstream` with the request's keys applied and returns its result.
    pub fn handle<R>(&self, request: &RequestInfo, downstream: impl FnOnce() -> R) -> R {
        ContextScope::new().pairs(request.pairs()).run(|| {
            self.log.debug(format_args!("start {} {}", request.method, request.path));
            let out = downstream();
            self.log.debug(format_args!("end {} {}", request.method, request.path));
            out
        })
    }

    /// Async form of [`handle`](Self::handle). The context is applied around every poll
    /// of `downstream`, whichever thread that poll runs on.
    pub async fn handle_async<F: Future>(&self, request: &RequestInfo, downstream: F) -> F::Output {
        let log = &self.log;
        ContextScope::new()
            .pairs(request.pairs())
            .run_async(async move {
                log.debug(format_args!("start {} {}", request.method, request.path));
                let out = downstream.await;
                log.debug(format_args!("end {} {}", request.method, request.path));
                out
            })
            .await
    }
}

impl Default for RequestFilter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context;
    use crate::global_sink::tests::TEST_SINK_GUARD;
    use std::sync::PoisonError;

    #[test]
    fn keys_present_during_and_gone_after() {
        let _guard = TEST_SINK_GUARD.lock().unwrap_or_else(PoisonError::into_inner);
        let filter = RequestFilter::new();
        let request = RequestInfo::new("POST", "/orders")
            .with_request_id("r1")
            .with_remote_addr("10.0.0.7");
        let seen = filter.handle(&request, context::snapshot);
        assert_eq!(seen.get(REQUEST_ID_KEY), Some("r1"));
        assert_eq!(seen.get(PATH_KEY), Some("/orders"));
        assert_eq!(seen.get(METHOD_KEY), Some("POST"));
        assert_eq!(seen.get(REMOTE_ADDR_KEY), Some("10.0.0.7"));
        assert!(context::snapshot().is_empty());
    }

    #[test]
    fn missing_request_id_is_generated() {
        let _guard = TEST_SINK_GUARD.lock().unwrap_or_else(PoisonError::into_inner);
        let filter = RequestFilter::new();
        let request = RequestInfo::new("GET", "/");
        let first = filter.handle(&request, || context::get(REQUEST_ID_KEY)).unwrap();
        let second = filter.handle(&request, || context::get(REQUEST_ID_KEY)).unwrap();
        assert!(first.starts_with("req-"));
        assert_ne!(first, second);
        assert_eq!(context::get(REMOTE_ADDR_KEY), None);
    }

    #[test]
    fn failed_downstream_restores_prior_context() {
        let _guard = TEST_SINK_GUARD.lock().unwrap_or_else(PoisonError::into_inner);
        context::put("tenant", "acme");
        let filter = RequestFilter::new();
        let request = RequestInfo::new("GET", "/boom").with_request_id("r2");
        let result: Result<(), String> = filter.handle(&request, || Err("downstream".to_owned()));
        assert_eq!(result, Err("downstream".to_owned()));
        assert_eq!(context::get(REQUEST_ID_KEY), None);
        assert_eq!(context::get("tenant").as_deref(), Some("acme"));
        context::remove("tenant");
    }
}
