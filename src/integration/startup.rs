// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::atomic::{AtomicBool, Ordering};

use crate::context::ProcessContext;
use crate::handle::{Emit, LogHandle};

pub const APP_NAME_KEY: &str = "appName";
pub const PID_KEY: &str = "pid";
pub const PROFILE_KEY: &str = "profile";

/// Writes process-wide keys into [`ProcessContext`] when the application is ready.
///
/// Only the first [`on_ready`](Self::on_ready) call does anything. Unset values are
/// left out rather than written empty.
#[derive(Debug)]
pub struct StartupListener {
    application_name: Option<String>,
    profile: Option<String>,
    fired: AtomicBool,
}

impl StartupListener {
    /// A listener that has not fired yet.
    pub fn new(application_name: Option<String>, profile: Option<String>) -> Self {
        Self {
            application_name,
            profile,
            fired: AtomicBool::new(false),
        }
    }

    pub fn application_name(&self) -> Option<&str> {
        self.application_name.as_deref()
    }

    pub fn profile(&self) -> Option<&str> {
        self.profile.as_deref()
    }

    /// Whether [`on_ready`](Self::on_ready) has run.
    pub fn has_fired(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }

    /// Returns whether this call was the one that populated the context.
    pub fn on_ready(&self) -> bool {
        if self.fired.swap(true, Ordering::AcqRel) {
            return false;
        }
        if let Some(name) = &self.application_name {
            ProcessContext::put(APP_NAME_KEY, name);
        }
        ProcessContext::put(PID_KEY, &std::process::id().to_string());
        if let Some(profile) = &self.profile {
            ProcessContext::put(PROFILE_KEY, profile);
        }
        LogHandle::named(module_path!()).info("process context ready");
        true
    }
}
