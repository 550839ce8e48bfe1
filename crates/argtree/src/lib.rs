//! GNU-style argument parsing with nested command trees.
//!
//! An [`ArgParser`] owns every parser of one command tree. Options are
//! registered under whitespace-separated alias lists (`"verbose v"`), commands
//! the same way, and parsing classifies each token of the argument vector:
//! - `--name value`, `--name=value`, `-n value`, `-n=value`
//! - condensed short flags (`-abc`)
//! - `--` ends option parsing
//! - `-` and `-<digit>...` are positional (negative numbers)
//! - a registered command alias hands the rest of the stream to that command
//!
//! Automatic `--help`/`-h`/`help <command>` and `--version`/`-v` are reported
//! as [`Outcome`] values; the engine never prints or exits on its own.
//!
//! ```
//! use argtree::ArgParser;
//!
//! let mut parser = ArgParser::with_info("Usage: app [--verbose] <file>", "1.0");
//! parser.flag("verbose v");
//! parser.int_option("jobs j", 1);
//! let outcome = parser.parse(["-vj", "4", "input.txt"]).unwrap();
//! assert!(outcome.is_complete());
//! assert!(parser.found("verbose"));
//! assert_eq!(parser.value::<i64>("jobs"), Some(4));
//! assert_eq!(parser.args(), ["input.txt"]);
//! ```

mod convert;
mod engine;
mod error;
mod parser;
mod store;
mod stream;
mod tree;
mod value;

pub use convert::{Converter, RadixConverter, StdConverter};
pub use error::{ConversionError, ParseError};
pub use parser::{Callback, Parser};
pub use store::ValueStore;
pub use stream::TokenStream;
pub use tree::{ArgParser, Outcome, ParserId, ParserRef};
pub use value::{FromValue, Kind, Value};
