// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process-wide diagnostic keys.
//!
//! Some keys describe the process rather than a unit of work: the application name,
//! the pid, the active profile. They are written once at startup and stay for the
//! lifetime of the process, so they live here instead of in a per-thread store and are
//! never touched by [`ContextScope`](super::ContextScope).

use std::sync::{PoisonError, RwLock};

use super::diagnostic::DiagnosticContext;

static PROCESS_CONTEXT: RwLock<DiagnosticContext> = RwLock::new(DiagnosticContext::new());

/// Accessors for the process-wide context.
///
/// Every emitted record merges these keys underneath the execution unit's own context,
/// so a scope can shadow a process key without changing it.
///
/// ```rust
/// use emojilog::context::ProcessContext;
///
/// ProcessContext::put("appName", "shop");
/// assert_eq!(ProcessContext::get("appName").as_deref(), Some("shop"));
/// ProcessContext::remove("appName");
/// ```
#[derive(Debug)]
pub struct ProcessContext;

impl ProcessContext {
    pub fn get(key: &str) -> Option<String> {
        PROCESS_CONTEXT
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .map(str::to_owned)
    }

    pub fn put(key: &str, value: &str) {
        PROCESS_CONTEXT
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, value);
    }

    pub fn remove(key: &str) {
        PROCESS_CONTEXT
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }

    pub fn snapshot() -> DiagnosticContext {
        PROCESS_CONTEXT
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
