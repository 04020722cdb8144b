//! Fan-out logger.
//!
//! [tee] duplicates every call to several [Logger]s.
//! Sinks for console and file output are included,
//! as well as a bridge for the [log] crate facade.

mod console;
mod field;
mod file;
mod format;
mod level;
mod logger;
mod tee;

pub mod config;
pub mod facade;
pub mod spy;

// Rename and export
pub use console::{Console, ConsoleLogger};
pub use facade::{FlushGuard, init, init_for_test, try_init};
pub use field::{Field, FieldValue};
pub use file::{FileLogger, MIN_BUF_SIZE, RotateOptions, RotateSize, RotateTime};
pub use format::{FormatArgs, Formatter, default_formatter};
pub use level::{AtomicLevel, Level, ParseLevelError};
pub use logger::{CheckedMessage, ExitFn, Logger, process_exit};
pub use tee::{TeeLogger, tee, tee_with_exit};
