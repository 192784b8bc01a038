// SPDX-License-Identifier: MIT OR Apache-2.0

//! The key-value map carried by a context store.

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt::Display;

/// A snapshot of diagnostic key-value pairs.
///
/// `DiagnosticContext` is a plain value: cloning it produces an independent copy, so a
/// snapshot taken before a scope never aliases the live store it was taken from.
/// Keys are kept sorted, which makes rendered records stable.
///
/// ```rust
/// use emojilog::context::DiagnosticContext;
///
/// let ctx = DiagnosticContext::from([("requestId", "r1"), ("path", "/checkout")]);
/// assert_eq!(ctx.get("requestId"), Some("r1"));
/// assert_eq!(ctx.to_string(), "{path=/checkout, requestId=r1}");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DiagnosticContext {
    entries: BTreeMap<String, String>,
}

impl DiagnosticContext {
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Inserts or overwrites `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns a copy of `self` with every pair of `overlay` written on top.
    pub fn merged_with(&self, overlay: &DiagnosticContext) -> DiagnosticContext {
        let mut merged = self.clone();
        for (k, v) in overlay.iter() {
            merged.insert(k, v);
        }
        merged
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for DiagnosticContext {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut ctx = DiagnosticContext::new();
        for (k, v) in iter {
            ctx.insert(k, v);
        }
        ctx
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for DiagnosticContext {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl IntoIterator for DiagnosticContext {
    type Item = (String, String);
    type IntoIter = btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Display for DiagnosticContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("{")?;
        let mut first = true;
        for (k, v) in self.iter() {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            write!(f, "{k}={v}")?;
        }
        f.write_str("}")
    }
}
