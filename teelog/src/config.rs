//! Logger construction from TOML.
//!
//! ```toml
//! [[sink]]
//! kind = "console"
//! stream = "stderr"
//! level = "warn"
//!
//! [[sink]]
//! kind = "file"
//! path = "app.log"
//! level = "debug"
//! rotate_size = 1048576
//! file_count = 10
//! ```

use crate::file::{RotateOptions, RotateSize, RotateTime};
use crate::logger::Logger;
use crate::{Console, ConsoleLogger, FileLogger, Level, default_formatter, tee};
use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Default write buffer size of a file sink.
pub const DEFAULT_BUF_SIZE: usize = 64 * 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid log config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("file_count is set but neither rotate_size nor rotate_time: {}", .0.display())]
    RotateUnused(PathBuf),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Output order follows this list.
    #[serde(default)]
    pub sink: Vec<SinkConfig>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase", deny_unknown_fields)]
pub enum SinkConfig {
    Console {
        #[serde(default)]
        stream: Console,
        #[serde(default)]
        level: Level,
    },
    File {
        path: PathBuf,
        #[serde(default)]
        level: Level,
        #[serde(default = "default_buf_size")]
        buf_size: usize,
        /// In bytes.
        rotate_size: Option<usize>,
        #[serde(default)]
        rotate_time: RotateTime,
        /// Number of archives to keep.
        #[serde(default)]
        file_count: u16,
    },
}

fn default_buf_size() -> usize {
    DEFAULT_BUF_SIZE
}

impl LogConfig {
    pub fn from_toml(src: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(src)?;
        config.validate()?;

        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let src = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read log config: {}", path.display()))?;

        Ok(Self::from_toml(&src)?)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for sink in &self.sink {
            if let SinkConfig::File {
                path,
                rotate_size: None,
                rotate_time: RotateTime::Disabled,
                file_count,
                ..
            } = sink
            {
                if *file_count > 0 {
                    return Err(ConfigError::RotateUnused(path.clone()));
                }
            }
        }

        Ok(())
    }

    /// Open every sink and [tee] them.
    ///
    /// [None] if no sink is configured.
    pub fn build(&self) -> anyhow::Result<Option<Arc<dyn Logger>>> {
        let loggers = self
            .sink
            .iter()
            .map(SinkConfig::build)
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(tee(loggers))
    }
}

impl SinkConfig {
    pub fn build(&self) -> anyhow::Result<Arc<dyn Logger>> {
        let logger = match self {
            SinkConfig::Console { stream, level } => {
                ConsoleLogger::new_shared(*stream, *level, default_formatter)
            }
            SinkConfig::File {
                path,
                level,
                buf_size,
                rotate_size,
                rotate_time,
                file_count,
            } => {
                let rotate_opts = RotateOptions {
                    size: rotate_size.map_or(RotateSize::Disabled, RotateSize::Enabled),
                    time: *rotate_time,
                    file_count: *file_count,
                };
                FileLogger::new_shared(*level, default_formatter, path, *buf_size, rotate_opts)?
            }
        };

        Ok(logger)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse() {
        let src = r#"
[[sink]]
kind = "console"
stream = "stderr"
level = "WARN"

[[sink]]
kind = "file"
path = "app.log"
level = "debug"
rotate_size = 1024
rotate_time = "day"
file_count = 3
"#;
        let config = LogConfig::from_toml(src).unwrap();
        assert_eq!(
            config.sink,
            vec![
                SinkConfig::Console {
                    stream: Console::Stderr,
                    level: Level::Warn,
                },
                SinkConfig::File {
                    path: PathBuf::from("app.log"),
                    level: Level::Debug,
                    buf_size: DEFAULT_BUF_SIZE,
                    rotate_size: Some(1024),
                    rotate_time: RotateTime::Day,
                    file_count: 3,
                },
            ]
        );
    }

    #[test]
    fn defaults() {
        let config = LogConfig::from_toml("[[sink]]\nkind = \"console\"\n").unwrap();
        assert_eq!(
            config.sink,
            vec![SinkConfig::Console {
                stream: Console::Stdout,
                level: Level::Info,
            }]
        );

        let config = LogConfig::from_toml("").unwrap();
        assert!(config.sink.is_empty());
        assert!(config.build().unwrap().is_none());
    }

    #[test]
    fn invalid() {
        let err = LogConfig::from_toml("[[sink]]\nkind = \"syslog\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));

        let err = LogConfig::from_toml("[[sink]]\nkind = \"console\"\nlevel = \"loud\"\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));

        let err = LogConfig::from_toml(
            "[[sink]]\nkind = \"file\"\npath = \"a.log\"\nfile_count = 2\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::RotateUnused(_)));

        // misspelled key
        let err = LogConfig::from_toml(
            "[[sink]]\nkind = \"file\"\npath = \"a.log\"\nrotate_sise = 1024\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));

        // key of another kind
        let err = LogConfig::from_toml(
            "[[sink]]\nkind = \"file\"\npath = \"a.log\"\nstream = \"stderr\"\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn build_tee() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("build.log");
        let src = format!(
            r#"
[[sink]]
kind = "console"
level = "error"

[[sink]]
kind = "file"
path = {:?}
level = "debug"
"#,
            path.to_str().unwrap()
        );

        let logger = LogConfig::from_toml(&src).unwrap().build().unwrap().unwrap();
        // minimum of error and debug
        assert_eq!(logger.level(), Level::Debug);

        logger.info("built from config", &[]);
        logger.flush();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("built from config"));
    }
}
