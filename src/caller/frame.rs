// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stack frames and where they come from.

use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

/// One entry of a captured call stack.
///
/// A frame keeps the demangled symbol (without the trailing hash and crate
/// disambiguators) and the component that owns it. The component is the symbol with
/// the function name dropped: the type for methods, the module for free functions.
///
/// ```rust
/// use emojilog::caller::Frame;
///
/// let method = Frame::new("shop::checkout::Checkout::place_order::h0123456789abcdef");
/// assert_eq!(method.symbol(), "shop::checkout::Checkout::place_order");
/// assert_eq!(method.component(), "shop::checkout::Checkout");
///
/// let trait_impl = Frame::new("<shop::Cart<u8> as core::fmt::Display>::fmt");
/// assert_eq!(trait_impl.component(), "shop::Cart");
///
/// let closure = Frame::new("shop::jobs::run::{{closure}}");
/// assert_eq!(closure.component(), "shop::jobs");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Frame {
    symbol: String,
    component: String,
    file: Option<PathBuf>,
    line: Option<u32>,
}

impl Frame {
    /// Builds a frame from a demangled symbol name.
    pub fn new(symbol: impl AsRef<str>) -> Self {
        let symbol = normalize_symbol(symbol.as_ref());
        let component = component_of(&symbol);
        Self {
            symbol,
            component,
            file: None,
            line: None,
        }
    }

    /// Attaches the source location the symbol resolved to.
    pub fn with_location(mut self, file: impl Into<PathBuf>, line: u32) -> Self {
        self.file = Some(file.into());
        self.line = Some(line);
        self
    }

    /// The normalized symbol, hash and disambiguators removed.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// The owning type or module; empty when the frame has no usable owner.
    pub fn component(&self) -> &str {
        &self.component
    }

    /// Source file, when debug info provided one.
    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    /// Source line, when debug info provided one.
    pub fn line(&self) -> Option<u32> {
        self.line
    }
}

fn hash_suffix() -> &'static Regex {
    static HASH: OnceLock<Regex> = OnceLock::new();
    HASH.get_or_init(|| Regex::new(r"::h[0-9a-f]{16}$").expect("hash pattern is valid"))
}

fn disambiguator() -> &'static Regex {
    static DISAMBIGUATOR: OnceLock<Regex> = OnceLock::new();
    DISAMBIGUATOR.get_or_init(|| Regex::new(r"\[[0-9a-f]+\]").expect("disambiguator pattern is valid"))
}

fn normalize_symbol(raw: &str) -> String {
    let trimmed = hash_suffix().replace(raw.trim(), "");
    disambiguator().replace_all(&trimmed, "").into_owned()
}

/// Index of the `>` closing a `<` that was just consumed, skipping `->`.
fn closing_angle(s: &str) -> Option<usize> {
    let mut depth = 1usize;
    let mut prev = '\0';
    for (i, c) in s.char_indices() {
        match c {
            '<' => depth += 1,
            '>' if prev != '-' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        prev = c;
    }
    None
}

/// Drops every `<...>` group, leaving the bare path.
fn strip_generics(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut depth = 0usize;
    let mut prev = '\0';
    for c in s.chars() {
        match c {
            '<' => depth += 1,
            '>' if prev != '-' && depth > 0 => depth -= 1,
            _ if depth == 0 => out.push(c),
            _ => {}
        }
        prev = c;
    }
    out
}

fn is_closure_segment(segment: &str) -> bool {
    segment.starts_with('{') && segment.contains("closure")
}

/// The owning path of a function path: closures and the function name removed.
fn owner_of_path(path: &str) -> String {
    let bare = strip_generics(path);
    let segments: Vec<&str> = bare
        .split("::")
        .map(str::trim)
        .filter(|s| !s.is_empty() && !is_closure_segment(s))
        .collect();
    match segments.len() {
        0 => String::new(),
        1 => segments[0].to_owned(),
        n => segments[..n - 1].join("::"),
    }
}

fn component_of(symbol: &str) -> String {
    let Some(rest) = symbol.strip_prefix('<') else {
        return owner_of_path(symbol);
    };
    // `<T as Trait>::method` and `<T>::method` belong to T.
    let Some(end) = closing_angle(rest) else {
        return owner_of_path(symbol);
    };
    let qualified = &rest[..end];
    let (self_ty, trait_path) = match top_level_as(qualified) {
        Some(i) => (&qualified[..i], Some(&qualified[i + " as ".len()..])),
        None => (qualified, None),
    };
    let self_ty = self_ty
        .trim()
        .trim_start_matches('&')
        .trim_start_matches("mut ")
        .trim_start_matches("dyn ");
    if !is_path(self_ty) {
        // fn pointers, primitives, slices, tuples and bare type parameters: the impl
        // belongs to whoever owns the trait, or to nobody for inherent impls
        return trait_path
            .map(|t| strip_generics(t).trim().to_owned())
            .unwrap_or_default();
    }
    if self_ty.split("::").any(is_closure_segment) {
        // an async block or closure type: attribute it to the function's owner
        owner_of_path(self_ty)
    } else {
        strip_generics(self_ty).trim().to_owned()
    }
}

/// Whether `ty` names a crate-qualified path such as `shop::Cart<u8>`.
fn is_path(ty: &str) -> bool {
    let bare = strip_generics(ty);
    let bare = bare.trim();
    bare.contains("::")
        && bare.starts_with(|c: char| c.is_alphabetic() || c == '_')
        && bare
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | ':' | '{' | '}' | '#'))
}

/// Position of the ` as ` separating the self type from the trait, outside generics.
fn top_level_as(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut prev = '\0';
    for (i, c) in s.char_indices() {
        match c {
            '<' => depth += 1,
            '>' if prev != '-' && depth > 0 => depth -= 1,
            ' ' if depth == 0 && s[i..].starts_with(" as ") => return Some(i),
            _ => {}
        }
        prev = c;
    }
    None
}

/// Captures the current call stack.
///
/// This is the host-specific half of caller attribution. The walk itself lives in
/// [`CallerResolver`](super::CallerResolver) and only sees the frames returned here.
pub trait FrameSource: Debug + Send + Sync {
    /// Frames of the calling thread, innermost first, at most `max_depth` of them.
    fn frames(&self, max_depth: usize) -> Vec<Frame>;
}

/// Captures real stacks with the `backtrace` crate.
///
/// Symbol names need debug info; frames that don't resolve to a symbol are left out.
/// One machine frame may yield several [`Frame`]s when functions were inlined into it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct BacktraceFrames;

const DEFAULT_CAPACITY: usize = 64;

impl FrameSource for BacktraceFrames {
    fn frames(&self, max_depth: usize) -> Vec<Frame> {
        if max_depth == 0 {
            return Vec::new();
        }
        let mut raw = Vec::with_capacity(max_depth.min(DEFAULT_CAPACITY));
        backtrace::trace(|frame| {
            if raw.len() >= max_depth {
                return false;
            }
            raw.push(frame.clone());
            raw.len() < max_depth
        });

        let mut frames = Vec::with_capacity(raw.len());
        for frame in &raw {
            backtrace::resolve_frame(frame, |symbol| {
                let Some(name) = symbol.name() else {
                    return;
                };
                let mut resolved = Frame::new(format!("{name:#}"));
                if let (Some(file), Some(line)) = (symbol.filename(), symbol.lineno()) {
                    resolved = resolved.with_location(file, line);
                }
                frames.push(resolved);
            });
        }
        // inlined functions resolve to extra frames
        frames.truncate(max_depth);
        frames
    }
}

/// A fixed list of frames, for exercising the resolution walk without a real stack.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticFrames(Vec<Frame>);

impl StaticFrames {
    /// Replays `frames`, innermost first.
    pub fn new(frames: Vec<Frame>) -> Self {
        Self(frames)
    }

    /// Builds frames from symbol names, innermost first.
    pub fn from_symbols<S: AsRef<str>>(symbols: impl IntoIterator<Item = S>) -> Self {
        Self(symbols.into_iter().map(Frame::new).collect())
    }
}

impl FrameSource for StaticFrames {
    fn frames(&self, max_depth: usize) -> Vec<Frame> {
        self.0.iter().take(max_depth).cloned().collect()
    }
}
