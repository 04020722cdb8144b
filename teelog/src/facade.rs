//! Bridge from the [log] crate facade.
//!
//! `log::info!()` and friends are routed into a [Logger].

use crate::logger::Logger;
use crate::{Console, ConsoleLogger, Field, Level, default_formatter};
use log::{Log, Metadata, Record, SetLoggerError};
use std::sync::Arc;

struct FacadeLogger {
    inner: Arc<dyn Logger>,
}

impl Log for FacadeLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        Level::from(metadata.level()) >= self.inner.level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let body = record.args().to_string();
        let target = Field::string("target", record.target());
        Logger::log(
            &*self.inner,
            record.level().into(),
            &body,
            std::slice::from_ref(&target),
        );
    }

    fn flush(&self) {
        Logger::flush(&*self.inner);
    }
}

/// [FlushGuard] must be dropped on the end of the program.
///  Panic if a logger is already set.
///
/// The facade's max level is taken from `logger` at this point.
pub fn init(logger: Arc<dyn Logger>) -> FlushGuard {
    try_init(logger).unwrap()
}

pub fn try_init(logger: Arc<dyn Logger>) -> Result<FlushGuard, SetLoggerError> {
    let level = logger.level();
    log::set_boxed_logger(Box::new(FacadeLogger { inner: logger }))?;
    log::set_max_level(level.to_level_filter());

    Ok(FlushGuard)
}

/// Initialize with [ConsoleLogger] + [Console::Stdout] + [default_formatter].
///
/// [FlushGuard] must be dropped on the end of the program.
/// Ignore errors if a logger is already set.
///
/// This function is intended to be called on test start.
/// `cargo test -- --nocapture` option is needed to see the log.
pub fn init_for_test(level: Level) -> FlushGuard {
    let logger = ConsoleLogger::new_shared(Console::Stdout, level, default_formatter);
    if let Ok(flush) = try_init(logger) {
        // OK
        flush_on_panic();
        flush
    } else {
        // already registered
        FlushGuard
    }
}

#[must_use]
/// On drop, calls `log::logger()::flush()`.
pub struct FlushGuard;

impl Drop for FlushGuard {
    fn drop(&mut self) {
        log::logger().flush();
    }
}

/// Set panic hook that calls [FlushGuard::drop].
fn flush_on_panic() {
    let old = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        // execute old handler
        old(info);
        // flush on drop
        let _ = FlushGuard;
    }));
}
