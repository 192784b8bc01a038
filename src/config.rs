// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration binding.
//!
//! [`Settings`] gathers the knobs of this crate from environment-style key/value lookups
//! and turns them into the objects that use them:
//!
//! | Key                       | Meaning                                      | Default  |
//! |---------------------------|----------------------------------------------|----------|
//! | `EMOJILOG_RESOLVE_CALLER` | enable stack-based caller attribution        | `true`   |
//! | `EMOJILOG_SKIP_PATTERNS`  | extra skip patterns, comma separated         | none     |
//! | `EMOJILOG_MAX_DEPTH`      | frames captured per resolution               | `64`     |
//! | `EMOJILOG_APP_NAME`       | `appName` written at startup                 | none     |
//! | `EMOJILOG_PROFILE`        | `profile` written at startup                 | none     |
//!
//! ```rust
//! use emojilog::Settings;
//!
//! let settings = Settings::from_lookup(|key| match key {
//!     "EMOJILOG_RESOLVE_CALLER" => Some("off".to_string()),
//!     "EMOJILOG_APP_NAME" => Some("shop".to_string()),
//!     _ => None,
//! })?;
//! assert!(!settings.resolve_caller);
//! assert!(!settings.resolver_config()?.enabled);
//! assert_eq!(settings.application_name.as_deref(), Some("shop"));
//! # Ok::<(), emojilog::ConfigError>(())
//! ```

use crate::caller::{DEFAULT_MAX_DEPTH, ResolverConfig, SkipPatterns};
use crate::integration::StartupListener;

pub const RESOLVE_CALLER_KEY: &str = "EMOJILOG_RESOLVE_CALLER";
pub const SKIP_PATTERNS_KEY: &str = "EMOJILOG_SKIP_PATTERNS";
pub const MAX_DEPTH_KEY: &str = "EMOJILOG_MAX_DEPTH";
pub const APP_NAME_KEY: &str = "EMOJILOG_APP_NAME";
pub const PROFILE_KEY: &str = "EMOJILOG_PROFILE";

/// Errors produced while building configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid skip pattern `{pattern}`")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("invalid value `{value}` for {key}")]
    InvalidValue { key: String, value: String },
}

/// Settings for the resolver and the startup listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub resolve_caller: bool,
    /// Appended to the built-in skip table.
    pub skip_patterns: Vec<String>,
    pub max_depth: usize,
    pub application_name: Option<String>,
    pub profile: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            resolve_caller: true,
            skip_patterns: Vec::new(),
            max_depth: DEFAULT_MAX_DEPTH,
            application_name: None,
            profile: None,
        }
    }
}

impl Settings {
    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`; missing keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut settings = Settings::default();
        if let Some(value) = lookup(RESOLVE_CALLER_KEY) {
            settings.resolve_caller = parse_bool(RESOLVE_CALLER_KEY, &value)?;
        }
        if let Some(value) = lookup(SKIP_PATTERNS_KEY) {
            settings.skip_patterns = value
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_owned)
                .collect();
        }
        if let Some(value) = lookup(MAX_DEPTH_KEY) {
            settings.max_depth = match value.trim().parse::<usize>() {
                Ok(depth) if depth > 0 => depth,
                _ => return Err(invalid(MAX_DEPTH_KEY, &value)),
            };
        }
        settings.application_name = lookup(APP_NAME_KEY).filter(|v| !v.trim().is_empty());
        settings.profile = lookup(PROFILE_KEY).filter(|v| !v.trim().is_empty());
        Ok(settings)
    }

    /// Builds the resolver configuration, compiling the skip table.
    pub fn resolver_config(&self) -> Result<ResolverConfig, ConfigError> {
        let skip = SkipPatterns::builtin().with_extra(&self.skip_patterns)?;
        Ok(ResolverConfig {
            enabled: self.resolve_caller,
            skip,
            max_depth: self.max_depth,
        })
    }

    /// Builds the startup listener for these settings.
    pub fn startup_listener(&self) -> StartupListener {
        StartupListener::new(self.application_name.clone(), self.profile.clone())
    }
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_owned(),
        value: value.to_owned(),
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(key, value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let settings = Settings::from_lookup(|_| None).unwrap();
        assert_eq!(settings, Settings::default());
        let config = settings.resolver_config().unwrap();
        assert!(config.enabled);
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(
            config.skip.patterns().len(),
            SkipPatterns::builtin().patterns().len()
        );
    }

    #[test]
    fn reads_every_key() {
        let settings = Settings::from_lookup(lookup(&[
            (RESOLVE_CALLER_KEY, "No"),
            (SKIP_PATTERNS_KEY, "^shop::middleware, ,^shop::util"),
            (MAX_DEPTH_KEY, "16"),
            (APP_NAME_KEY, "shop"),
            (PROFILE_KEY, "staging"),
        ]))
        .unwrap();
        assert!(!settings.resolve_caller);
        assert_eq!(settings.skip_patterns, vec!["^shop::middleware", "^shop::util"]);
        assert_eq!(settings.max_depth, 16);
        assert_eq!(settings.application_name.as_deref(), Some("shop"));
        assert_eq!(settings.profile.as_deref(), Some("staging"));

        let config = settings.resolver_config().unwrap();
        assert!(!config.enabled);
        assert!(config.skip.patterns().iter().any(|p| p == "^shop::util"));
    }

    #[test]
    fn rejects_bad_values() {
        let err = Settings::from_lookup(lookup(&[(RESOLVE_CALLER_KEY, "maybe")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == RESOLVE_CALLER_KEY));

        let err = Settings::from_lookup(lookup(&[(MAX_DEPTH_KEY, "0")])).unwrap_err();
        assert_eq!(err.to_string(), "invalid value `0` for EMOJILOG_MAX_DEPTH");
    }

    #[test]
    fn rejects_bad_patterns_at_build_time() {
        let settings = Settings::from_lookup(lookup(&[(SKIP_PATTERNS_KEY, "shop::(")])).unwrap();
        let err = settings.resolver_config().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPattern { ref pattern, .. } if pattern == "shop::("));
    }
}
