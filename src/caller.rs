// SPDX-License-Identifier: MIT OR Apache-2.0

//! Caller attribution for log calls that have no bound logger.
//!
//! When application code logs through an unbound [`Log`](crate::Log), something has to
//! decide whose name goes on the record. [`CallerResolver`] does that by looking at the
//! call stack: it walks past its own frames, this crate's facade, the standard library,
//! async runtimes and compiler shims, and names the record after the first component
//! that is left.
//!
//! The walk is split from stack capture:
//!
//! - [`FrameSource`] captures frames. [`BacktraceFrames`] reads the real stack;
//!   [`StaticFrames`] replays a fixed list, which is how the walk is tested.
//! - [`SkipPatterns`] is the table of frames to walk past.
//! - [`CallerResolver`] runs the walk and caches one [`LogHandle`](crate::LogHandle) per
//!   [`CallerIdentity`].
//!
//! # Example
//!
//! ```rust
//! use emojilog::caller::{CallerResolver, ResolverConfig};
//!
//! let resolver = CallerResolver::new(ResolverConfig::disabled());
//! assert!(resolver.resolve().is_sentinel());
//! ```

mod frame;
mod resolver;
mod skip;


use std::fmt::Display;

pub use frame::{BacktraceFrames, Frame, FrameSource, StaticFrames};
pub use resolver::{CallerResolver, DEFAULT_MAX_DEPTH, ResolverConfig};
pub use skip::SkipPatterns;

/// The identity returned when attribution is disabled or finds nothing usable.
pub const DEFAULT_IDENTITY: &str = "DEFAULT";

/// Frames whose component lives under this path belong to the resolver itself.
const RESOLVER_IDENTITY: &str = module_path!();

/// The component a log call is attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallerIdentity(String);

impl CallerIdentity {
    /// An identity naming `name`, usually a type or module path.
    ///
    /// ```rust
    /// use emojilog::caller::CallerIdentity;
    ///
    /// let id = CallerIdentity::new("shop::Checkout");
    /// assert!(!id.is_sentinel());
    /// assert_eq!(id.as_str(), "shop::Checkout");
    /// ```
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The `"DEFAULT"` identity.
    pub fn sentinel() -> Self {
        Self(DEFAULT_IDENTITY.to_owned())
    }

    /// Whether this is the `"DEFAULT"` identity.
    pub fn is_sentinel(&self) -> bool {
        self.0 == DEFAULT_IDENTITY
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CallerIdentity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for CallerIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
