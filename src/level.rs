//SPDX-License-Identifier: MIT OR Apache-2.0
use std::fmt::Display;

#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// Step-by-step detail, usually only interesting while chasing a bug
    Trace,
    /// Diagnostics for developers of the component
    Debug,
    /// Normal operation worth recording
    Info,
    /// Suspicious condition
    Warn,
    /// Runtime error
    Error,
}

impl Level {
    /// Fixed-width uppercase label used in rendered records.
    pub const fn label(self) -> &'static str {
        match self {
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO ",
            Level::Warn => "WARN ",
            Level::Error => "ERROR",
        }
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label().trim_end())
    }
}
