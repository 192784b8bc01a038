// SPDX-License-Identifier: MIT OR Apache-2.0

//! Caller attribution and the handle cache.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};

use super::frame::{BacktraceFrames, Frame, FrameSource};
use super::skip::SkipPatterns;
use super::{CallerIdentity, RESOLVER_IDENTITY};
use crate::handle::LogHandle;

/// Default cap on captured frames.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Construction-time settings for a [`CallerResolver`].
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// When false, every resolution returns the sentinel without touching the stack.
    pub enabled: bool,
    pub skip: SkipPatterns,
    /// Frames beyond this depth are never captured. A resolver treats 0 as 1.
    pub max_depth: usize,
}

impl ResolverConfig {
    /// A configuration that never inspects the stack.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Replaces the skip table.
    pub fn with_skip(mut self, skip: SkipPatterns) -> Self {
        self.skip = skip;
        self
    }

    /// Caps captured frames at `max_depth`, which is raised to 1 if given as 0.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            skip: SkipPatterns::builtin(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Works out which component is logging, and hands out one handle per component.
///
/// Resolution walks the frames from the innermost outward and returns the component of
/// the first frame that is neither part of this resolver nor matched by the skip table.
/// If resolution is disabled, or no frame qualifies, the result is the sentinel
/// identity `"DEFAULT"`; attribution failing never makes logging unavailable.
///
/// Handles are cached by identity *string*. Two calls from different stack depths that
/// resolve to the same component share one handle, and the stack walk is only worth
/// paying for until every calling component has a handle. Callers that want to skip
/// the walk entirely should hold a bound [`Log`](crate::Log) instead.
///
/// The enable flag and the skip table can be changed on a live resolver; the next
/// resolution sees the change. The handle cache is never cleared by this.
///
/// ```rust
/// use emojilog::caller::{CallerResolver, ResolverConfig, StaticFrames};
///
/// let frames = StaticFrames::from_symbols([
///     "emojilog::caller::resolver::CallerResolver::resolve",
///     "emojilog::handle::Log::handle",
///     "shop::checkout::Checkout::place_order",
/// ]);
/// let resolver = CallerResolver::with_frame_source(ResolverConfig::default(), frames);
/// assert_eq!(resolver.resolve().as_str(), "shop::checkout::Checkout");
///
/// let a = resolver.handle();
/// let b = resolver.handle();
/// assert!(emojilog::LogHandle::ptr_eq(&a, &b));
/// ```
#[derive(Debug)]
pub struct CallerResolver {
    enabled: AtomicBool,
    skip: RwLock<SkipPatterns>,
    max_depth: usize,
    source: Box<dyn FrameSource>,
    cache: RwLock<HashMap<String, LogHandle>>,
}

impl CallerResolver {
    /// A resolver over the real call stack.
    pub fn new(config: ResolverConfig) -> Self {
        Self::with_frame_source(config, BacktraceFrames)
    }

    /// A resolver over an arbitrary frame source.
    pub fn with_frame_source(config: ResolverConfig, source: impl FrameSource + 'static) -> Self {
        Self {
            enabled: AtomicBool::new(config.enabled),
            skip: RwLock::new(config.skip),
            max_depth: config.max_depth.max(1),
            source: Box::new(source),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Frames captured per resolution.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Whether resolution currently inspects the stack.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Turns stack inspection on or off from the next resolution on.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    /// A copy of the current skip table.
    pub fn skip_patterns(&self) -> SkipPatterns {
        self.skip
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces the skip table from the next resolution on.
    pub fn set_skip_patterns(&self, skip: SkipPatterns) {
        *self.skip.write().unwrap_or_else(PoisonError::into_inner) = skip;
    }

    /// Attributes the current call.
    pub fn resolve(&self) -> CallerIdentity {
        if !self.is_enabled() {
            return CallerIdentity::sentinel();
        }
        let frames = self.source.frames(self.max_depth);
        self.attribute(&frames)
    }

    /// Runs the walk over `frames` (innermost first), ignoring the enable flag.
    pub fn attribute(&self, frames: &[Frame]) -> CallerIdentity {
        let skip = self.skip.read().unwrap_or_else(PoisonError::into_inner);
        frames
            .iter()
            .find(|frame| !is_resolver_frame(frame) && !skip.is_match(frame))
            .map(|frame| CallerIdentity::new(frame.component()))
            .unwrap_or_else(CallerIdentity::sentinel)
    }

    /// The handle for the current caller.
    pub fn handle(&self) -> LogHandle {
        let identity = self.resolve();
        self.handle_for(&identity)
    }

    /// The cached handle for `identity`, created on first use.
    pub fn handle_for(&self, identity: &CallerIdentity) -> LogHandle {
        if let Some(handle) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(identity.as_str())
        {
            return handle.clone();
        }
        // Construction happens under the write lock, so racing callers all get the
        // first handle inserted.
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(identity.as_str().to_owned())
            .or_insert_with(|| LogHandle::named(identity.as_str()))
            .clone()
    }

    /// Number of distinct identities with a cached handle.
    pub fn cached_handles(&self) -> usize {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

fn is_resolver_frame(frame: &Frame) -> bool {
    let component = frame.component();
    component == RESOLVER_IDENTITY
        || component
            .strip_prefix(RESOLVER_IDENTITY)
            .is_some_and(|rest| rest.starts_with("::"))
}
