use thiserror::Error;

use crate::value::Kind;

/// A raw token could not be converted to the kind an option (or a positional
/// conversion) asked for.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("cannot parse '{token}' as {}", Kind::describe(.kind))]
    Invalid { token: String, kind: Kind },

    #[error("'{token}' is out of range for {}", Kind::describe(.kind))]
    OutOfRange { token: String, kind: Kind },
}

impl ConversionError {
    pub fn invalid(token: impl Into<String>, kind: Kind) -> Self {
        Self::Invalid {
            token: token.into(),
            kind,
        }
    }

    pub fn out_of_range(token: impl Into<String>, kind: Kind) -> Self {
        Self::OutOfRange {
            token: token.into(),
            kind,
        }
    }

    /// The offending token.
    pub fn token(&self) -> &str {
        match self {
            Self::Invalid { token, .. } | Self::OutOfRange { token, .. } => token,
        }
    }

    /// The kind the token was being converted to.
    pub fn kind(&self) -> Kind {
        match self {
            Self::Invalid { kind, .. } | Self::OutOfRange { kind, .. } => *kind,
        }
    }
}

/// Why a parse was aborted.
///
/// Option names are reported with the prefix they were written with
/// (`--name` or `-n`).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("{option} is not a recognised option")]
    UnknownOption { option: String },

    #[error("'{name}' is not a recognised command")]
    UnknownCommand { name: String },

    #[error("missing value for {option}")]
    MissingValue { option: String },

    #[error("the {command} command requires an argument")]
    MissingArgument { command: String },

    #[error("invalid value for {option}: {source}")]
    Conversion {
        option: String,
        #[source]
        source: ConversionError,
    },

    #[error("invalid positional argument at index {index}: {source}")]
    PositionalConversion {
        index: usize,
        #[source]
        source: ConversionError,
    },

    #[error("invalid format for boolean flag {option}")]
    FlagEquals { option: String },

    #[error("no more arguments to consume")]
    EmptyStream,
}

impl ParseError {
    /// The conversion failure behind this error, if any.
    pub fn conversion(&self) -> Option<&ConversionError> {
        match self {
            Self::Conversion { source, .. } | Self::PositionalConversion { source, .. } => {
                Some(source)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_token() {
        let err = ConversionError::invalid("abc", Kind::Integer);
        assert_eq!(err.to_string(), "cannot parse 'abc' as an integer");

        let err = ParseError::Conversion {
            option: "--jobs".to_string(),
            source: ConversionError::out_of_range("1e999", Kind::Float),
        };
        assert_eq!(
            err.to_string(),
            "invalid value for --jobs: '1e999' is out of range for a floating-point value"
        );
        assert_eq!(err.conversion().map(|c| c.token()), Some("1e999"));
    }

    #[test]
    fn unknown_option_keeps_prefix() {
        let err = ParseError::UnknownOption {
            option: "-x".to_string(),
        };
        assert_eq!(err.to_string(), "-x is not a recognised option");
    }
}
