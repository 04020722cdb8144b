use crate::{Field, Level};
use std::sync::Arc;

/// Process termination used by [Logger::fatal].
///
/// Replaceable so that Fatal can be observed without killing the test runner.
pub type ExitFn = Arc<dyn Fn(i32) + Send + Sync>;

/// [ExitFn] which really terminates the process.
pub fn process_exit() -> ExitFn {
    Arc::new(|code| std::process::exit(code))
}

/// Leveled structured logger.
///
/// Implemented by every sink and by [crate::TeeLogger] itself,
/// so that aggregates can be nested.
///
/// [Logger::log] only writes.
/// It never panics or exits, even at [Level::Panic] or [Level::Fatal].
/// Those effects belong to [Logger::panic] and [Logger::fatal].
pub trait Logger: Send + Sync {
    fn level(&self) -> Level;

    fn set_level(&self, level: Level);

    /// Write an entry if `level` passes the filter.
    /// Panic and Fatal entries always pass.
    fn log(&self, level: Level, msg: &str, fields: &[Field]);

    fn debug(&self, msg: &str, fields: &[Field]) {
        self.log(Level::Debug, msg, fields);
    }

    fn info(&self, msg: &str, fields: &[Field]) {
        self.log(Level::Info, msg, fields);
    }

    fn warn(&self, msg: &str, fields: &[Field]) {
        self.log(Level::Warn, msg, fields);
    }

    fn error(&self, msg: &str, fields: &[Field]) {
        self.log(Level::Error, msg, fields);
    }

    /// Log at [Level::Panic], then panic with `msg`.
    fn panic(&self, msg: &str, fields: &[Field]) {
        self.log(Level::Panic, msg, fields);
        panic!("{msg}");
    }

    /// Log at [Level::Fatal], flush, then exit the process with code 1.
    fn fatal(&self, msg: &str, fields: &[Field]) {
        self.log(Level::Fatal, msg, fields);
        self.flush();
        std::process::exit(1);
    }

    /// Fatal in debug builds, Error in release builds.
    fn dfatal(&self, msg: &str, fields: &[Field]) {
        if cfg!(debug_assertions) {
            self.fatal(msg, fields);
        } else {
            self.error(msg, fields);
        }
    }

    /// Child logger which adds `fields` to every entry.
    ///
    /// The receiver is not modified.
    fn with(&self, fields: &[Field]) -> Arc<dyn Logger>;

    /// Pre-flight check.
    ///
    /// Returns [None] if nothing would be written at `level`,
    /// so that the caller can skip building expensive fields.
    fn check<'a>(&'a self, level: Level, msg: &'a str) -> Option<CheckedMessage<'a>>;

    fn flush(&self) {}
}

/// Result of a successful [Logger::check].
///
/// [CheckedMessage::write] consumes it, so it is written at most once.
#[must_use]
pub struct CheckedMessage<'a> {
    logger: &'a dyn Logger,
    level: Level,
    msg: &'a str,
}

impl<'a> CheckedMessage<'a> {
    pub fn new(logger: &'a dyn Logger, level: Level, msg: &'a str) -> Self {
        Self { logger, level, msg }
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn msg(&self) -> &str {
        self.msg
    }

    /// Write the entry through the logger which produced this message.
    ///
    /// Panic and Fatal keep their effect.
    pub fn write(self, fields: &[Field]) {
        match self.level {
            Level::Panic => self.logger.panic(self.msg, fields),
            Level::Fatal => self.logger.fatal(self.msg, fields),
            level => self.logger.log(level, self.msg, fields),
        }
    }
}
