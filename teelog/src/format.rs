use crate::{Field, Level};
use chrono::{DateTime, Local, SecondsFormat};

pub struct FormatArgs<'a> {
    pub timestamp: DateTime<Local>,
    pub level: Level,
    /// May contain color escape sequences.
    pub level_str: String,
    pub body: &'a str,
    /// Bound fields first, then the fields of the call.
    pub fields: Vec<&'a Field>,
}

pub type Formatter = dyn Fn(FormatArgs) -> String + Send + Sync;

/// `<timestamp> [LEVEL] body k=v k=v`
///
/// Debug entries get millisecond timestamps.
pub fn default_formatter(args: FormatArgs) -> String {
    let timestamp = match args.level {
        Level::Debug => args
            .timestamp
            .to_rfc3339_opts(SecondsFormat::Millis, false),
        _ => args.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
    };

    let mut output = format!("{} {} {}", timestamp, args.level_str, args.body);
    for field in args.fields {
        output.push(' ');
        output.push_str(&field.to_string());
    }

    output
}

pub(crate) fn translate_args<'a>(
    level: Level,
    body: &'a str,
    context: &'a [Field],
    fields: &'a [Field],
    timestamp: DateTime<Local>,
) -> FormatArgs<'a> {
    FormatArgs {
        timestamp,
        level,
        level_str: format!("[{level:5}]"),
        body,
        fields: context.iter().chain(fields).collect(),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn format_line() {
        let timestamp = Local.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let context = [Field::string("component", "db")];
        let fields = [Field::int("retry", 3)];
        let args = translate_args(Level::Warn, "slow query", &context, &fields, timestamp);

        let line = default_formatter(args);
        let expected_ts = timestamp.to_rfc3339_opts(SecondsFormat::Secs, true);
        assert_eq!(
            line,
            format!("{expected_ts} [WARN ] slow query component=db retry=3")
        );
    }
}
