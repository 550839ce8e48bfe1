//! String-to-value conversion.
//!
//! The classification engine never parses numbers itself; every raw value
//! goes through the [`Converter`] held by the owning [`crate::ArgParser`].

use std::fmt;
use std::num::IntErrorKind;

use crate::error::ConversionError;
use crate::value::{Kind, Value};

/// Converts a raw token into a [`Value`] of the requested kind.
///
/// Implementations must return a value whose [`Value::kind`] equals `kind`.
pub trait Converter: fmt::Debug {
    fn convert(&self, raw: &str, kind: Kind) -> Result<Value, ConversionError>;
}

/// Decimal integers (`i64`) and Rust float syntax (`f64`).
#[derive(Debug, Clone, Copy, Default)]
pub struct StdConverter;

impl Converter for StdConverter {
    fn convert(&self, raw: &str, kind: Kind) -> Result<Value, ConversionError> {
        match kind {
            Kind::Flag => raw
                .parse::<bool>()
                .map(Value::Flag)
                .map_err(|_| ConversionError::invalid(raw, kind)),
            Kind::String => Ok(Value::Str(raw.to_string())),
            Kind::Integer => parse_decimal(raw).map(Value::Int),
            Kind::Float => parse_float(raw).map(Value::Float),
        }
    }
}

/// Like [`StdConverter`], but integers may also be written with a `0x`, `0o`
/// or `0b` prefix (after an optional sign).
#[derive(Debug, Clone, Copy, Default)]
pub struct RadixConverter;

impl Converter for RadixConverter {
    fn convert(&self, raw: &str, kind: Kind) -> Result<Value, ConversionError> {
        match kind {
            Kind::Integer => parse_radix(raw).map(Value::Int),
            _ => StdConverter.convert(raw, kind),
        }
    }
}

fn int_error(raw: &str, kind: &IntErrorKind) -> ConversionError {
    match kind {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
            ConversionError::out_of_range(raw, Kind::Integer)
        }
        _ => ConversionError::invalid(raw, Kind::Integer),
    }
}

fn parse_decimal(raw: &str) -> Result<i64, ConversionError> {
    raw.parse::<i64>().map_err(|e| int_error(raw, e.kind()))
}

fn parse_radix(raw: &str) -> Result<i64, ConversionError> {
    let (negative, unsigned) = match raw.as_bytes().first() {
        Some(b'-') => (true, &raw[1..]),
        Some(b'+') => (false, &raw[1..]),
        _ => (false, raw),
    };

    let lower = unsigned.get(..2).map(str::to_ascii_lowercase);
    let radix = match lower.as_deref() {
        Some("0x") => 16,
        Some("0o") => 8,
        Some("0b") => 2,
        _ => return parse_decimal(raw),
    };

    let digits = &unsigned[2..];
    // from_str_radix tolerates a leading sign; a second sign is not a literal.
    if digits.starts_with(['+', '-']) {
        return Err(ConversionError::invalid(raw, Kind::Integer));
    }
    let magnitude = u64::from_str_radix(digits, radix).map_err(|e| int_error(raw, e.kind()))?;
    let signed = if negative {
        -i128::from(magnitude)
    } else {
        i128::from(magnitude)
    };
    i64::try_from(signed).map_err(|_| ConversionError::out_of_range(raw, Kind::Integer))
}

fn parse_float(raw: &str) -> Result<f64, ConversionError> {
    let value = raw
        .parse::<f64>()
        .map_err(|_| ConversionError::invalid(raw, Kind::Float))?;
    if value.is_infinite() && !raw.to_ascii_lowercase().contains("inf") {
        return Err(ConversionError::out_of_range(raw, Kind::Float));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn std_integers() {
        let c = StdConverter;
        assert_eq!(c.convert("42", Kind::Integer), Ok(Value::Int(42)));
        assert_eq!(c.convert("-7", Kind::Integer), Ok(Value::Int(-7)));
        assert_eq!(
            c.convert("4x", Kind::Integer),
            Err(ConversionError::invalid("4x", Kind::Integer))
        );
        assert_eq!(
            c.convert("", Kind::Integer),
            Err(ConversionError::invalid("", Kind::Integer))
        );
        assert_eq!(
            c.convert("99999999999999999999", Kind::Integer),
            Err(ConversionError::out_of_range("99999999999999999999", Kind::Integer))
        );
    }

    #[test]
    fn std_floats() {
        let c = StdConverter;
        assert_eq!(c.convert("2.5", Kind::Float), Ok(Value::Float(2.5)));
        assert_eq!(c.convert("-1e3", Kind::Float), Ok(Value::Float(-1000.0)));
        assert_eq!(c.convert("inf", Kind::Float), Ok(Value::Float(f64::INFINITY)));
        assert!(matches!(
            c.convert("1e999", Kind::Float),
            Err(ConversionError::OutOfRange { .. })
        ));
        assert!(matches!(
            c.convert("one", Kind::Float),
            Err(ConversionError::Invalid { .. })
        ));
    }

    #[test]
    fn strings_are_verbatim() {
        assert_eq!(
            StdConverter.convert(" --x= ", Kind::String),
            Ok(Value::Str(" --x= ".to_string()))
        );
    }

    #[test]
    fn radix_prefixes() {
        let c = RadixConverter;
        assert_eq!(c.convert("0x1f", Kind::Integer), Ok(Value::Int(31)));
        assert_eq!(c.convert("0X1F", Kind::Integer), Ok(Value::Int(31)));
        assert_eq!(c.convert("-0b101", Kind::Integer), Ok(Value::Int(-5)));
        assert_eq!(c.convert("0o17", Kind::Integer), Ok(Value::Int(15)));
        assert_eq!(c.convert("12", Kind::Integer), Ok(Value::Int(12)));
        assert_eq!(
            c.convert("-0x8000000000000000", Kind::Integer),
            Ok(Value::Int(i64::MIN))
        );
        assert!(matches!(
            c.convert("0x8000000000000000", Kind::Integer),
            Err(ConversionError::OutOfRange { .. })
        ));
        assert!(matches!(
            c.convert("0x+1", Kind::Integer),
            Err(ConversionError::Invalid { .. })
        ));
        assert!(matches!(
            c.convert("0x", Kind::Integer),
            Err(ConversionError::Invalid { .. })
        ));
        assert_eq!(c.convert("0.5", Kind::Float), Ok(Value::Float(0.5)));
    }
}
