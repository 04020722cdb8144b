use std::fmt;

/// Structured value attached to a log entry.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    String(String),
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
}

/// Key/value pair attached to a log entry.
///
/// Loggers pass fields through unmodified.
/// How they are rendered is up to each sink's formatter.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    key: String,
    value: FieldValue,
}

impl Field {
    pub fn new(key: impl Into<String>, value: FieldValue) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    pub fn string(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(key, FieldValue::String(value.into()))
    }

    pub fn int(key: impl Into<String>, value: i64) -> Self {
        Self::new(key, FieldValue::Int(value))
    }

    pub fn uint(key: impl Into<String>, value: u64) -> Self {
        Self::new(key, FieldValue::Uint(value))
    }

    pub fn float(key: impl Into<String>, value: f64) -> Self {
        Self::new(key, FieldValue::Float(value))
    }

    pub fn bool(key: impl Into<String>, value: bool) -> Self {
        Self::new(key, FieldValue::Bool(value))
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &FieldValue {
        &self.value
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // quote only if it would be ambiguous in "k=v k=v" form
            FieldValue::String(s) if s.is_empty() || s.contains([' ', '=', '"']) => {
                write!(f, "{s:?}")
            }
            FieldValue::String(s) => f.write_str(s),
            FieldValue::Int(n) => write!(f, "{n}"),
            FieldValue::Uint(n) => write!(f, "{n}"),
            FieldValue::Float(x) => write!(f, "{x}"),
            FieldValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(Field::int("n", -3).to_string(), "n=-3");
        assert_eq!(Field::uint("n", 3).to_string(), "n=3");
        assert_eq!(Field::bool("ok", true).to_string(), "ok=true");
        assert_eq!(Field::float("x", 1.5).to_string(), "x=1.5");
        assert_eq!(Field::string("user", "yappy").to_string(), "user=yappy");
        assert_eq!(
            Field::string("msg", "hello world").to_string(),
            r#"msg="hello world""#
        );
        assert_eq!(Field::string("empty", "").to_string(), r#"empty="""#);
    }
}
