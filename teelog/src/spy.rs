//! Recording logger for tests.
//!
//! Several [SpyLogger]s may share one [Journal],
//! which makes the order of calls across loggers observable.

use crate::logger::{CheckedMessage, Logger};
use crate::{AtomicLevel, Field, Level};
use std::sync::{Arc, Mutex};

/// Which method of the spy was called.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Log,
    DFatal,
    /// `level` is the new level.
    SetLevel,
    /// `fields` are the fields bound by the call.
    With,
    /// Recorded whether the check passes or not.
    Check,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    /// Name of the spy which recorded this entry.
    pub name: String,
    pub call: Call,
    pub level: Level,
    pub msg: String,
    /// Bound fields followed by the call's fields.
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<Entry>>>);

impl Journal {
    pub fn entries(&self) -> Vec<Entry> {
        self.0.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.0.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }

    fn push(&self, entry: Entry) {
        self.0.lock().unwrap().push(entry);
    }
}

/// Records every call, whatever its level.
///
/// The level only affects the result of [Logger::check].
/// [Logger::fatal] records the entry but never terminates the process.
pub struct SpyLogger {
    name: String,
    level: Arc<AtomicLevel>,
    context: Vec<Field>,
    journal: Journal,
}

impl SpyLogger {
    pub fn new_shared(name: &str, level: Level, journal: &Journal) -> Arc<dyn Logger> {
        Arc::new(Self {
            name: name.to_string(),
            level: Arc::new(AtomicLevel::new(level)),
            context: Vec::new(),
            journal: journal.clone(),
        })
    }

    fn record(&self, call: Call, level: Level, msg: &str, fields: &[Field]) {
        let mut all = self.context.clone();
        all.extend_from_slice(fields);
        self.journal.push(Entry {
            name: self.name.clone(),
            call,
            level,
            msg: msg.to_string(),
            fields: all,
        });
    }
}

impl Logger for SpyLogger {
    fn level(&self) -> Level {
        self.level.load()
    }

    fn set_level(&self, level: Level) {
        self.record(Call::SetLevel, level, "", &[]);
        self.level.store(level);
    }

    fn log(&self, level: Level, msg: &str, fields: &[Field]) {
        self.record(Call::Log, level, msg, fields);
    }

    fn fatal(&self, msg: &str, fields: &[Field]) {
        self.record(Call::Log, Level::Fatal, msg, fields);
    }

    fn dfatal(&self, msg: &str, fields: &[Field]) {
        self.record(Call::DFatal, Level::Fatal, msg, fields);
    }

    fn with(&self, fields: &[Field]) -> Arc<dyn Logger> {
        self.record(Call::With, self.level(), "", fields);
        let mut context = self.context.clone();
        context.extend_from_slice(fields);

        Arc::new(Self {
            name: self.name.clone(),
            level: Arc::clone(&self.level),
            context,
            journal: self.journal.clone(),
        })
    }

    fn check<'a>(&'a self, level: Level, msg: &'a str) -> Option<CheckedMessage<'a>> {
        self.record(Call::Check, level, msg, &[]);
        if self.level.enabled(level) {
            Some(CheckedMessage::new(self, level, msg))
        } else {
            None
        }
    }
}
