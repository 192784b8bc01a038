// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hooks a host framework calls to populate the diagnostic context.
//!
//! - [`RequestFilter`] wraps one inbound request in a [`ContextScope`](crate::context::ContextScope)
//!   keyed by request metadata, so every record logged while handling it carries those keys.
//! - [`StartupListener`] writes process-wide keys into
//!   [`ProcessContext`](crate::context::ProcessContext) once the application is ready.
//!
//! Neither owns a server or a lifecycle; the host decides when to call them.

mod request;
mod startup;

pub use request::{
    METHOD_KEY, PATH_KEY, REMOTE_ADDR_KEY, REQUEST_ID_KEY, RequestFilter, RequestInfo,
};
pub use startup::{APP_NAME_KEY, PID_KEY, PROFILE_KEY, StartupListener};
