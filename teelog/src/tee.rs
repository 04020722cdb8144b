use crate::logger::{CheckedMessage, ExitFn, Logger, process_exit};
use crate::{AtomicLevel, Field, Level};
use std::sync::Arc;

/// Duplicate log calls to two or more loggers.
///
/// * 0 loggers: [None]
/// * 1 logger: that logger itself
/// * otherwise: a [TeeLogger] whose initial level is the minimum of all levels
pub fn tee(loggers: Vec<Arc<dyn Logger>>) -> Option<Arc<dyn Logger>> {
    tee_with_exit(loggers, process_exit())
}

/// [tee] with a replaced process exit used by [Logger::fatal].
///
/// `exit` only applies to the [TeeLogger] built from two or more loggers.
/// A single logger is returned as is and keeps its own [Logger::fatal].
pub fn tee_with_exit(mut loggers: Vec<Arc<dyn Logger>>, exit: ExitFn) -> Option<Arc<dyn Logger>> {
    match loggers.len() {
        0 => None,
        1 => loggers.pop(),
        _ => Some(Arc::new(TeeLogger::new(loggers, exit))),
    }
}

/// Aggregate logger.
///
/// Every call is forwarded to the wrapped loggers in construction order.
/// Each wrapped logger filters by its own level.
/// Panic and Fatal take effect only after all of them have been written.
pub struct TeeLogger {
    inner: Vec<Arc<dyn Logger>>,
    /// Shared with loggers derived by [Logger::with].
    level: Arc<AtomicLevel>,
    exit: ExitFn,
}

impl TeeLogger {
    fn new(loggers: Vec<Arc<dyn Logger>>, exit: ExitFn) -> Self {
        let mut level = loggers[0].level();
        for logger in &loggers[1..] {
            level = level.min(logger.level());
        }

        Self {
            inner: loggers,
            level: Arc::new(AtomicLevel::new(level)),
            exit,
        }
    }

    fn log_all(&self, level: Level, msg: &str, fields: &[Field]) {
        for logger in &self.inner {
            logger.log(level, msg, fields);
        }
    }
}

impl Logger for TeeLogger {
    fn level(&self) -> Level {
        self.level.load()
    }

    /// Not atomic as a whole: the wrapped loggers are updated one by one,
    /// then the aggregate's own value.
    fn set_level(&self, level: Level) {
        for logger in &self.inner {
            logger.set_level(level);
        }
        self.level.store(level);
    }

    fn log(&self, level: Level, msg: &str, fields: &[Field]) {
        self.log_all(level, msg, fields);
    }

    fn panic(&self, msg: &str, fields: &[Field]) {
        self.log_all(Level::Panic, msg, fields);
        panic!("{msg}");
    }

    fn fatal(&self, msg: &str, fields: &[Field]) {
        self.log_all(Level::Fatal, msg, fields);
        self.flush();
        (self.exit)(1);
    }

    /// Each wrapped logger decides whether this is fatal.
    fn dfatal(&self, msg: &str, fields: &[Field]) {
        for logger in &self.inner {
            logger.dfatal(msg, fields);
        }
    }

    fn with(&self, fields: &[Field]) -> Arc<dyn Logger> {
        let inner = self.inner.iter().map(|logger| logger.with(fields)).collect();

        Arc::new(Self {
            inner,
            level: Arc::clone(&self.level),
            exit: Arc::clone(&self.exit),
        })
    }

    fn check<'a>(&'a self, level: Level, msg: &'a str) -> Option<CheckedMessage<'a>> {
        // Panic and Fatal must always panic/exit, even if every level is disabled.
        // Otherwise one willing logger is enough. The message is bound to self,
        // so writing it goes to all of them again.
        if level.is_terminal() || self.inner.iter().any(|logger| logger.check(level, msg).is_some())
        {
            Some(CheckedMessage::new(self, level, msg))
        } else {
            None
        }
    }

    fn flush(&self) {
        for logger in &self.inner {
            logger.flush();
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::spy::{Journal, SpyLogger};

    #[test]
    fn min_level_seeded_by_first() {
        let journal = Journal::default();
        let loggers = vec![
            SpyLogger::new_shared("a", Level::Error, &journal),
            SpyLogger::new_shared("b", Level::Warn, &journal),
        ];
        let tee = tee(loggers).unwrap();
        assert_eq!(tee.level(), Level::Warn);
    }

    #[test]
    fn with_shares_level_cell() {
        let journal = Journal::default();
        let loggers = vec![
            SpyLogger::new_shared("a", Level::Info, &journal),
            SpyLogger::new_shared("b", Level::Info, &journal),
        ];
        let parent = tee(loggers).unwrap();
        let child = parent.with(&[Field::int("n", 1)]);

        parent.set_level(Level::Error);
        assert_eq!(child.level(), Level::Error);
    }

    #[test]
    fn nested() {
        let journal = Journal::default();
        let inner = tee(vec![
            SpyLogger::new_shared("a", Level::Info, &journal),
            SpyLogger::new_shared("b", Level::Info, &journal),
        ])
        .unwrap();
        let outer = tee(vec![inner, SpyLogger::new_shared("c", Level::Info, &journal)]).unwrap();

        outer.warn("nested", &[]);
        let names: Vec<_> = journal.entries().into_iter().map(|e| e.name).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }
}
