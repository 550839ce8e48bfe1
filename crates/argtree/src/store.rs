use crate::convert::Converter;
use crate::error::ConversionError;
use crate::value::{Kind, Value};

/// Accumulated values of one option, shared by all of its aliases.
///
/// Values are append-only and kept in encounter order; the most recent one is
/// the option's current value.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueStore {
    default: Value,
    values: Vec<Value>,
}

impl ValueStore {
    /// Create an empty store. The kind is taken from `default`.
    pub fn new(default: Value) -> Self {
        Self {
            default,
            values: Vec::new(),
        }
    }

    pub fn kind(&self) -> Kind {
        self.default.kind()
    }

    pub fn default_value(&self) -> &Value {
        &self.default
    }

    /// The last appended value, or the default.
    pub fn current(&self) -> &Value {
        self.values.last().unwrap_or(&self.default)
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn count(&self) -> usize {
        self.values.len()
    }

    pub fn found(&self) -> bool {
        !self.values.is_empty()
    }

    /// Record one occurrence of a flag.
    pub(crate) fn push_flag(&mut self) {
        debug_assert_eq!(self.kind(), Kind::Flag);
        self.values.push(Value::Flag(true));
    }

    /// Convert `raw` to this store's kind and append it.
    pub(crate) fn push_raw(
        &mut self,
        raw: &str,
        converter: &dyn Converter,
    ) -> Result<(), ConversionError> {
        let kind = self.kind();
        let value = converter.convert(raw, kind)?;
        if value.kind() != kind {
            return Err(ConversionError::invalid(raw, kind));
        }
        self.values.push(value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::StdConverter;

    #[test]
    fn current_falls_back_to_default() {
        let mut store = ValueStore::new(Value::Str("default".into()));
        assert_eq!(store.current(), &Value::Str("default".into()));
        assert!(!store.found());
        assert_eq!(store.count(), 0);

        store.push_raw("a", &StdConverter).unwrap();
        store.push_raw("b", &StdConverter).unwrap();
        assert_eq!(store.current(), &Value::Str("b".into()));
        assert_eq!(store.count(), 2);
        assert_eq!(store.default_value(), &Value::Str("default".into()));
    }

    #[test]
    fn failed_conversion_appends_nothing() {
        let mut store = ValueStore::new(Value::Int(5));
        let err = store.push_raw("five", &StdConverter).unwrap_err();
        assert_eq!(err.token(), "five");
        assert_eq!(err.kind(), Kind::Integer);
        assert!(!store.found());
        assert_eq!(store.current(), &Value::Int(5));
    }

    #[derive(Debug)]
    struct Liar;

    impl Converter for Liar {
        fn convert(&self, _raw: &str, _kind: Kind) -> Result<Value, ConversionError> {
            Ok(Value::Flag(true))
        }
    }

    #[test]
    fn converter_must_preserve_kind() {
        let mut store = ValueStore::new(Value::Float(0.0));
        assert!(store.push_raw("1.0", &Liar).is_err());
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn flags_accumulate() {
        let mut store = ValueStore::new(Value::Flag(false));
        store.push_flag();
        store.push_flag();
        assert_eq!(store.values(), [Value::Flag(true), Value::Flag(true)]);
        assert_eq!(store.current(), &Value::Flag(true));
    }
}
