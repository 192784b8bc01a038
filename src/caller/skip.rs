// SPDX-License-Identifier: MIT OR Apache-2.0

//! The table of frames that are never attributed as callers.

use regex::{Regex, RegexSet};

use super::frame::Frame;
use crate::config::ConfigError;

/// Frames of this crate's own facade.
const FACADE: &str = concat!("^", env!("CARGO_CRATE_NAME"), "(::|$)");

/// Default skip table. Each entry is tested against both the symbol and the component.
const BUILTIN: &[&str] = &[
    FACADE,
    // stack capture backend
    r"^(backtrace|rustc_demangle|addr2line|gimli|miniz_oxide)(::|$)",
    // standard library and test harness
    r"^(std|core|alloc|test|proc_macro)(::|$)",
    // async runtimes and executors
    r"^(tokio|futures|futures_core|futures_util|futures_executor|async_std|smol|test_executors)(::|$)",
    // unwinder, process and thread entry points
    r"^(_Unwind_|__rust_|__libc_start|__GI_|__clone|_start$|_pthread_start$|start_thread$|clone3?$|thread_start$|BaseThreadInitThunk$|RtlUserThreadStart$|main$)",
    // compiler-generated shims
    r"\{\{vtable\.shim\}\}",
    r"\{\{reify\.shim\}\}",
    r"\{\{constant\}\}",
    r"\{shim:",
];

/// A compiled set of patterns naming frames to walk past.
///
/// [`SkipPatterns::builtin`] covers this crate's facade, the stack capture backend, the
/// standard library, common async runtimes, thread entry points and compiler shims.
/// Extra patterns are plain [`regex`] syntax.
///
/// A pattern that is too broad is not an error: resolution simply walks past the real
/// caller and attributes the record to something further out.
///
/// ```rust
/// use emojilog::caller::{Frame, SkipPatterns};
///
/// let skip = SkipPatterns::builtin().with_extra(["^shop::middleware(::|$)"])?;
/// assert!(skip.is_match(&Frame::new("std::rt::lang_start")));
/// assert!(skip.is_match(&Frame::new("shop::middleware::Auth::check")));
/// assert!(!skip.is_match(&Frame::new("shop::checkout::Checkout::place")));
/// # Ok::<(), emojilog::ConfigError>(())
/// ```
#[derive(Debug, Clone)]
pub struct SkipPatterns {
    sources: Vec<String>,
    set: RegexSet,
}

impl SkipPatterns {
    /// The default table.
    pub fn builtin() -> Self {
        Self::new(BUILTIN.iter().copied()).expect("built-in skip patterns are valid")
    }

    /// A table that skips nothing.
    pub fn empty() -> Self {
        Self {
            sources: Vec::new(),
            set: RegexSet::empty(),
        }
    }

    /// Compiles `patterns` into a table.
    pub fn new<S: AsRef<str>>(patterns: impl IntoIterator<Item = S>) -> Result<Self, ConfigError> {
        let sources: Vec<String> = patterns
            .into_iter()
            .map(|p| p.as_ref().to_owned())
            .collect();
        for pattern in &sources {
            Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })?;
        }
        let set = RegexSet::new(&sources).map_err(|source| ConfigError::InvalidPattern {
            pattern: sources.join(", "),
            source,
        })?;
        Ok(Self { sources, set })
    }

    /// This table plus `extra`.
    pub fn with_extra<S: AsRef<str>>(self, extra: impl IntoIterator<Item = S>) -> Result<Self, ConfigError> {
        let mut sources = self.sources;
        sources.extend(extra.into_iter().map(|p| p.as_ref().to_owned()));
        Self::new(sources)
    }

    /// The source text of every pattern, in table order.
    pub fn patterns(&self) -> &[String] {
        &self.sources
    }

    /// Whether `frame` should be walked past.
    ///
    /// Frames that didn't resolve to a component are always skipped.
    pub fn is_match(&self, frame: &Frame) -> bool {
        frame.component().is_empty()
            || self.set.is_match(frame.symbol())
            || self.set.is_match(frame.component())
    }
}

impl Default for SkipPatterns {
    fn default() -> Self {
        Self::builtin()
    }
}
