//! Fan-out logger demo.
//!
//! Builds a logger from a TOML file (see [teelog::config]) and writes
//! a few entries through it, both directly and through the `log` facade.

use anyhow::{Context, Result, anyhow};
use getopts::Options;
use log::{error, info, warn};
use std::env;
use std::sync::Arc;
use teelog::config::LogConfig;
use teelog::{Console, ConsoleLogger, Field, FlushGuard, Level, Logger};

/// Level of the fallback logger used without `--config`.
const DEFAULT_LEVEL: Level = Level::Debug;

/// Build the logger and install it to the `log` facade.
///
/// Without a config file, writes to stdout only.
/// `level` overrides the level of every sink.
fn init_log(config: Option<&str>, level: Option<Level>) -> Result<(Arc<dyn Logger>, FlushGuard)> {
    let logger = match config {
        Some(path) => LogConfig::load(path)?
            .build()?
            .with_context(|| format!("No sink in {path}"))?,
        None => ConsoleLogger::new_shared(
            Console::Stdout,
            DEFAULT_LEVEL,
            teelog::default_formatter,
        ),
    };
    if let Some(level) = level {
        logger.set_level(level);
    }
    let flush = teelog::init(Arc::clone(&logger));

    Ok((logger, flush))
}

/// `key=value` to a string [Field].
fn parse_field(s: &str) -> Result<Field> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| anyhow!("Field must be KEY=VALUE: {s}"))?;
    if key.is_empty() {
        return Err(anyhow!("Empty field key: {s}"));
    }

    Ok(Field::string(key, value))
}

/// Write one entry per level and a few structured ones.
///
/// `fields` are bound to the structured entries.
fn demo(logger: &dyn Logger, fields: &[String]) -> Result<()> {
    let mut bound = fields
        .iter()
        .map(|s| parse_field(s))
        .collect::<Result<Vec<_>>>()?;
    bound.push(Field::string("component", "demo"));
    bound.push(Field::uint("pid", std::process::id().into()));

    for level in [Level::Debug, Level::Info, Level::Warn, Level::Error] {
        logger.log(level, &format!("{level} entry"), &[]);
    }

    let child = logger.with(&bound);
    child.info("bound fields", &[Field::bool("ok", true)]);

    // fields are built only if some sink accepts Debug
    if let Some(cm) = child.check(Level::Debug, "expensive fields") {
        let sum: u64 = (1..=100).sum();
        cm.write(&[Field::uint("sum", sum)]);
    }

    info!("via log facade");
    warn!("via log facade");

    Ok(())
}

/// Print the command line help.
///
/// * `program` - program name (argv\[0\]).
/// * `opts` - parser object.
fn print_help(program: &str, opts: Options) {
    let brief = format!("Usage: {program} [options]");
    print!("{}", opts.usage(&brief));
}

/// Entry point.
///
/// Parses the command line and initializes logging, then calls [demo].
pub fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let program = &args[0];

    let mut opts = Options::new();
    opts.optflag("h", "help", "Print this help");
    opts.optopt("c", "config", "Log config file (TOML)", "FILE");
    opts.optopt(
        "l",
        "level",
        "Override level: debug, info, warn, error, panic, fatal",
        "LEVEL",
    );
    opts.optmulti("f", "field", "Bind a field to structured entries", "KEY=VALUE");
    let matches = match opts.parse(&args[1..]) {
        Ok(m) => m,
        Err(fail) => {
            eprintln!("{fail}");
            std::process::exit(1);
        }
    };

    // --help
    if matches.opt_present("h") {
        print_help(program, opts);
        std::process::exit(0);
    }

    let level = match matches.opt_str("l") {
        Some(s) => Some(s.parse::<Level>()?),
        None => None,
    };
    let config = matches.opt_str("c");

    let fields = matches.opt_strs("f");

    let (logger, _flush) = init_log(config.as_deref(), level)?;
    demo(logger.as_ref(), &fields).map_err(|e| {
        error!("Error in demo");
        error!("{e:#}");
        e
    })

    // drop(_flush)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn field_arg() {
        let field = parse_field("user=yappy").unwrap();
        assert_eq!(field, Field::string("user", "yappy"));
        let field = parse_field("expr=a=b").unwrap();
        assert_eq!(field, Field::string("expr", "a=b"));

        assert!(parse_field("novalue").is_err());
        assert!(parse_field("=v").is_err());
    }
}
