use chrono::Local;
use serde::Deserialize;
use std::sync::Arc;

use crate::format::{FormatArgs, Formatter, translate_args};
use crate::logger::{CheckedMessage, Logger};
use crate::{AtomicLevel, Field, Level};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Console {
    #[default]
    Stdout,
    Stderr,
}

pub struct ConsoleLogger {
    level: Arc<AtomicLevel>,
    console: Console,
    color: bool,
    context: Vec<Field>,
    formatter: Arc<Formatter>,
}

impl ConsoleLogger {
    pub fn new_shared<F>(console: Console, level: Level, formatter: F) -> Arc<dyn Logger>
    where
        F: Fn(FormatArgs) -> String + Send + Sync + 'static,
    {
        let color = is_console(console);
        Arc::new(Self {
            level: Arc::new(AtomicLevel::new(level)),
            console,
            color,
            context: Vec::new(),
            formatter: Arc::new(formatter),
        })
    }
}

impl Logger for ConsoleLogger {
    fn level(&self) -> Level {
        self.level.load()
    }

    fn set_level(&self, level: Level) {
        self.level.store(level);
    }

    fn log(&self, level: Level, msg: &str, fields: &[Field]) {
        if !self.level.enabled(level) {
            return;
        }

        const COL_RED: &str = "\x1b[31m";
        const COL_YELLOW: &str = "\x1b[33m";
        const COL_GREEN: &str = "\x1b[32m";
        const COL_PURPLE: &str = "\x1b[35m";
        const COL_RESET: &str = "\x1b[0m";

        let timestamp = Local::now();

        let mut args = translate_args(level, msg, &self.context, fields, timestamp);
        if self.color {
            args.level_str = match level {
                Level::Error | Level::Panic | Level::Fatal => {
                    format!("{COL_RED}[{level:5}]{COL_RESET}")
                }
                Level::Warn => format!("{COL_YELLOW}[{level:5}]{COL_RESET}"),
                Level::Info => format!("{COL_GREEN}[{level:5}]{COL_RESET}"),
                Level::Debug => format!("{COL_PURPLE}[{level:5}]{COL_RESET}"),
            };
        }

        let output = self.formatter.as_ref()(args);
        match self.console {
            Console::Stdout => {
                println!("{output}");
            }
            Console::Stderr => {
                eprintln!("{output}");
            }
        }
    }

    fn with(&self, fields: &[Field]) -> Arc<dyn Logger> {
        let mut context = self.context.clone();
        context.extend_from_slice(fields);

        Arc::new(Self {
            level: Arc::clone(&self.level),
            console: self.console,
            color: self.color,
            context,
            formatter: Arc::clone(&self.formatter),
        })
    }

    fn check<'a>(&'a self, level: Level, msg: &'a str) -> Option<CheckedMessage<'a>> {
        if self.level.enabled(level) {
            Some(CheckedMessage::new(self, level, msg))
        } else {
            None
        }
    }
}

/// Stdout/Stderr is redirected?
///
/// If not, returns true. (colored output will be enabled)
fn is_console(console: Console) -> bool {
    let fd = match console {
        Console::Stdout => libc::STDOUT_FILENO,
        Console::Stderr => libc::STDERR_FILENO,
    };
    let ret = unsafe { libc::isatty(fd) };

    ret != 0
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::default_formatter;

    #[test]
    fn check_follows_level() {
        let logger = ConsoleLogger::new_shared(Console::Stderr, Level::Warn, default_formatter);
        assert!(logger.check(Level::Info, "dropped").is_none());
        assert!(logger.check(Level::Warn, "kept").is_some());

        logger.set_level(Level::Debug);
        assert!(logger.check(Level::Info, "kept").is_some());
    }

    #[test]
    fn child_shares_level() {
        let parent = ConsoleLogger::new_shared(Console::Stderr, Level::Info, default_formatter);
        let child = parent.with(&[Field::string("req", "a1")]);
        child.set_level(Level::Error);
        assert_eq!(parent.level(), Level::Error);

        child.error("console child", &[Field::bool("ok", false)]);
    }
}
