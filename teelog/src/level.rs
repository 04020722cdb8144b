use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicI32, Ordering};
use thiserror::Error;

/// Log severity.
///
/// Ordered from the most verbose to the most severe.
/// A logger at level `L` writes entries whose level is `>= L`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(try_from = "String")]
#[repr(i32)]
pub enum Level {
    Debug = -1,
    #[default]
    Info = 0,
    Warn = 1,
    Error = 2,
    /// Logs, then panics.
    Panic = 3,
    /// Logs, then exits the process.
    Fatal = 4,
}

impl Level {
    pub const ALL: [Level; 6] = [
        Level::Debug,
        Level::Info,
        Level::Warn,
        Level::Error,
        Level::Panic,
        Level::Fatal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Panic => "PANIC",
            Level::Fatal => "FATAL",
        }
    }

    /// Panic and Fatal always reach the output regardless of the threshold.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Level::Panic | Level::Fatal)
    }

    /// Counterpart for the `log` crate facade.
    ///
    /// `log` has no Panic/Fatal, they are reported as Error.
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            // Trace is folded into Debug
            Level::Debug => log::LevelFilter::Trace,
            Level::Info => log::LevelFilter::Info,
            Level::Warn => log::LevelFilter::Warn,
            Level::Error | Level::Panic | Level::Fatal => log::LevelFilter::Error,
        }
    }

    // only values written by AtomicLevel::store are expected here
    fn from_i32(value: i32) -> Self {
        match value {
            i32::MIN..=-1 => Level::Debug,
            0 => Level::Info,
            1 => Level::Warn,
            2 => Level::Error,
            3 => Level::Panic,
            _ => Level::Fatal,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // pad() keeps width options such as "{:5}" working
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown log level: {0}")]
pub struct ParseLevelError(pub String);

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Level::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseLevelError(s.to_string()))
    }
}

impl TryFrom<String> for Level {
    type Error = ParseLevelError;

    fn try_from(value: String) -> Result<Self, ParseLevelError> {
        value.parse()
    }
}

impl From<log::Level> for Level {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Level::Error,
            log::Level::Warn => Level::Warn,
            log::Level::Info => Level::Info,
            log::Level::Debug | log::Level::Trace => Level::Debug,
        }
    }
}

/// [Level] cell which can be read and replaced from any thread.
///
/// Only eventual visibility of the last store is guaranteed.
#[derive(Debug)]
pub struct AtomicLevel(AtomicI32);

impl AtomicLevel {
    pub fn new(level: Level) -> Self {
        Self(AtomicI32::new(level as i32))
    }

    pub fn load(&self) -> Level {
        Level::from_i32(self.0.load(Ordering::Relaxed))
    }

    pub fn store(&self, level: Level) {
        self.0.store(level as i32, Ordering::Relaxed);
    }

    /// Whether an entry at `level` passes this threshold.
    pub fn enabled(&self, level: Level) -> bool {
        level.is_terminal() || level >= self.load()
    }
}

impl Default for AtomicLevel {
    fn default() -> Self {
        Self::new(Level::default())
    }
}
