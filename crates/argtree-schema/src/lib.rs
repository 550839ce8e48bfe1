//! Declarative JSON model of an argtree command tree.
//!
//! The types here mirror the registration API of [`argtree::ArgParser`] and
//! are used for:
//! - describing a command tree in a file instead of code
//! - validating alias lists before anything is registered
//!
//! ```
//! use argtree_schema::ParserSchema;
//!
//! let schema = ParserSchema::from_json(r#"{
//!     "help": "Usage: app [-v] <command>",
//!     "options": [{ "aliases": "verbose v", "kind": "flag" }],
//!     "commands": [{
//!         "aliases": "boo b",
//!         "options": [{ "aliases": "bar", "default": "default" }]
//!     }]
//! }"#).unwrap();
//!
//! let mut parser = schema.build().unwrap();
//! parser.parse(["-v", "boo", "--bar", "baz"]).unwrap();
//! assert!(parser.found("verbose"));
//! ```

use std::collections::HashSet;

use argtree::{ArgParser, ConversionError, Converter, Kind, ParserId, RadixConverter, Value};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("invalid schema JSON")]
    Json(#[from] serde_json::Error),

    #[error("{context}: alias list is empty")]
    EmptyAliases { context: String },

    #[error("{context}: alias '{alias}' must not start with '-' or contain '='")]
    InvalidAlias { context: String, alias: String },

    #[error("{context}: alias '{alias}' is declared more than once")]
    DuplicateAlias { context: String, alias: String },

    #[error("{context}: flag '{alias}' cannot have a default")]
    FlagDefault { context: String, alias: String },

    #[error("{context}: invalid default for '{alias}'")]
    InvalidDefault {
        context: String,
        alias: String,
        #[source]
        source: ConversionError,
    },
}

/// Mirrors [`argtree::Kind`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum OptionKind {
    Flag,
    #[default]
    String,
    Integer,
    Float,
}

impl From<OptionKind> for Kind {
    fn from(kind: OptionKind) -> Self {
        match kind {
            OptionKind::Flag => Kind::Flag,
            OptionKind::String => Kind::String,
            OptionKind::Integer => Kind::Integer,
            OptionKind::Float => Kind::Float,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct OptionSchema {
    /// Whitespace-separated alias list, e.g. `"verbose v"`.
    pub aliases: String,
    #[serde(default)]
    pub kind: OptionKind,
    /// Raw default, converted like a command-line value of `kind`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct CommandSchema {
    pub aliases: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub help: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionSchema>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<CommandSchema>,
}

/// The root of a command tree.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ParserSchema {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub help: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
    /// Accept `0x`/`0o`/`0b` integer literals everywhere in the tree.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub radix_integers: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionSchema>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<CommandSchema>,
}

/// Counts over a whole tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub options: usize,
    pub commands: usize,
    /// Deepest command nesting; 0 when there are no commands.
    pub depth: usize,
}

impl ParserSchema {
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_pretty(&self) -> String {
        // Plain data; serialization cannot fail.
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Register everything in this schema on a fresh [`ArgParser`].
    pub fn build(&self) -> Result<ArgParser, SchemaError> {
        let mut tree = ArgParser::with_info(self.help.as_str(), self.version.as_str());
        if self.radix_integers {
            tree = tree.with_converter(RadixConverter);
        }
        register_level(&mut tree, ParserId::ROOT, "", &self.options, &self.commands)?;
        Ok(tree)
    }

    /// Check the schema without keeping the built tree.
    pub fn validate(&self) -> Result<(), SchemaError> {
        self.build().map(drop)
    }

    pub fn summary(&self) -> Summary {
        let mut summary = Summary {
            options: self.options.len(),
            ..Summary::default()
        };
        for command in &self.commands {
            command.accumulate(&mut summary, 1);
        }
        summary
    }
}

impl CommandSchema {
    fn accumulate(&self, summary: &mut Summary, depth: usize) {
        summary.commands += 1;
        summary.options += self.options.len();
        summary.depth = summary.depth.max(depth);
        for command in &self.commands {
            command.accumulate(summary, depth + 1);
        }
    }
}

impl OptionSchema {
    fn default_value(
        &self,
        converter: &dyn Converter,
        context: &str,
        alias: &str,
    ) -> Result<Value, SchemaError> {
        let kind = Kind::from(self.kind);
        match &self.default {
            None => Ok(kind.zero()),
            Some(_) if kind == Kind::Flag => Err(SchemaError::FlagDefault {
                context: context.to_string(),
                alias: alias.to_string(),
            }),
            Some(raw) => {
                converter
                    .convert(raw, kind)
                    .map_err(|source| SchemaError::InvalidDefault {
                        context: context.to_string(),
                        alias: alias.to_string(),
                        source,
                    })
            }
        }
    }
}

fn describe(path: &str) -> String {
    if path.is_empty() {
        "root".to_string()
    } else {
        format!("command '{path}'")
    }
}

/// Split an alias list and check every alias against `seen`.
///
/// Returns the first alias, used to name the entry in later errors.
fn checked_aliases<'a>(
    path: &str,
    aliases: &'a str,
    seen: &mut HashSet<&'a str>,
) -> Result<&'a str, SchemaError> {
    let mut first = None;
    for alias in aliases.split_whitespace() {
        if alias.starts_with('-') || alias.contains('=') {
            return Err(SchemaError::InvalidAlias {
                context: describe(path),
                alias: alias.to_string(),
            });
        }
        if !seen.insert(alias) {
            return Err(SchemaError::DuplicateAlias {
                context: describe(path),
                alias: alias.to_string(),
            });
        }
        first.get_or_insert(alias);
    }
    first.ok_or_else(|| SchemaError::EmptyAliases {
        context: describe(path),
    })
}

fn register_level(
    tree: &mut ArgParser,
    id: ParserId,
    path: &str,
    options: &[OptionSchema],
    commands: &[CommandSchema],
) -> Result<(), SchemaError> {
    let mut seen = HashSet::new();
    for option in options {
        let name = checked_aliases(path, &option.aliases, &mut seen)?;
        let default = option.default_value(tree.converter(), &describe(path), name)?;
        tree[id].register(&option.aliases, default);
    }

    let mut seen = HashSet::new();
    for command in commands {
        let name = checked_aliases(path, &command.aliases, &mut seen)?;
        let child = tree.command_in(id, &command.aliases, command.help.as_str());
        let child_path = if path.is_empty() {
            name.to_string()
        } else {
            format!("{path} {name}")
        };
        tracing::debug!(command = %child_path, "registered command from schema");
        register_level(tree, child, &child_path, &command.options, &command.commands)?;
    }
    Ok(())
}
