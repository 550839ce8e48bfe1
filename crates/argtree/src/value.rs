use std::fmt;

/// The kind of value an option stores. Fixed at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Flag,
    String,
    Integer,
    Float,
}

impl Kind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Flag => "flag",
            Self::String => "string",
            Self::Integer => "integer",
            Self::Float => "float",
        }
    }

    /// The fallback used when an option is registered without an explicit default.
    pub fn zero(self) -> Value {
        match self {
            Self::Flag => Value::Flag(false),
            Self::String => Value::Str(String::new()),
            Self::Integer => Value::Int(0),
            Self::Float => Value::Float(0.0),
        }
    }

    pub(crate) fn describe(&self) -> &'static str {
        match self {
            Self::Flag => "a boolean flag",
            Self::String => "a string",
            Self::Integer => "an integer",
            Self::Float => "a floating-point value",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single typed option value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Flag(bool),
    Str(String),
    Int(i64),
    Float(f64),
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Self::Flag(_) => Kind::Flag,
            Self::Str(_) => Kind::String,
            Self::Int(_) => Kind::Integer,
            Self::Float(_) => Kind::Float,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(b) => write!(f, "{b}"),
            Self::Str(s) => f.write_str(s),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

/// Typed extraction for [`crate::Parser::value`] and [`crate::Parser::values`].
///
/// Extraction is strict: asking for an `i64` from a string option yields `None`.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Flag(b) => Some(*b),
            _ => None,
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(i) => i32::try_from(*i).ok(),
            _ => None,
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(x) => Some(*x),
            _ => None,
        }
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_matches_kind() {
        for kind in [Kind::Flag, Kind::String, Kind::Integer, Kind::Float] {
            assert_eq!(kind.zero().kind(), kind);
        }
    }

    #[test]
    fn extraction_is_strict() {
        assert_eq!(i64::from_value(&Value::Str("3".into())), None);
        assert_eq!(f64::from_value(&Value::Int(3)), None);
        assert_eq!(String::from_value(&Value::Str("x".into())), Some("x".to_string()));
        assert_eq!(bool::from_value(&Value::Flag(true)), Some(true));
    }

    #[test]
    fn i32_extraction_checks_range() {
        assert_eq!(i32::from_value(&Value::Int(-7)), Some(-7));
        assert_eq!(i32::from_value(&Value::Int(i64::from(i32::MAX) + 1)), None);
    }

    #[test]
    fn display_is_plain() {
        assert_eq!(Value::Flag(false).to_string(), "false");
        assert_eq!(Value::Str("a b".into()).to_string(), "a b");
        assert_eq!(Value::Int(-4).to_string(), "-4");
        assert_eq!(Value::Float(1.5).to_string(), "1.5");
    }
}
