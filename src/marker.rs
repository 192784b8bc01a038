// SPDX-License-Identifier: MIT OR Apache-2.0

//! Categorical tags attached to individual log calls.

use std::borrow::Cow;
use std::fmt::Display;

/// A categorical tag for a single log call.
///
/// Markers let a sink route or filter records by category (`AUDIT`, `SECURITY`, ...)
/// independently of the level.
///
/// ```rust
/// use emojilog::Marker;
///
/// const AUDIT: Marker = Marker::new("AUDIT");
/// assert_eq!(AUDIT.name(), "AUDIT");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Marker(Cow<'static, str>);

impl Marker {
    pub const fn new(name: &'static str) -> Self {
        Marker(Cow::Borrowed(name))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<String> for Marker {
    fn from(name: String) -> Self {
        Marker(Cow::Owned(name))
    }
}

impl From<&'static str> for Marker {
    fn from(name: &'static str) -> Self {
        Marker::new(name)
    }
}

impl Display for Marker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
