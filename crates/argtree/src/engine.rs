//! Token classification.
//!
//! Each token is classified in this order:
//! 1. after `--`, everything is positional
//! 2. `--` switches option parsing off
//! 3. `--name`, `--name=value`
//! 4. `-abc`, `-n=value` (a dash followed by a non-digit)
//! 5. `-` and `-<digit>...` are positional
//! 6. a registered command alias hands the stream to that command
//! 7. `help <command>` before any positional
//! 8. anything else is positional

use tracing::{debug, trace};

use crate::error::ParseError;
use crate::parser::Parser;
use crate::stream::TokenStream;
use crate::tree::{ArgParser, Outcome, ParserId, ParserRef};
use crate::value::Kind;

impl ArgParser {
    pub(crate) fn parse_level(
        &mut self,
        id: ParserId,
        stream: &mut TokenStream,
    ) -> Result<Outcome, ParseError> {
        let mut option_parsing = true;
        // Options, `--` and dash positionals leave this set.
        let mut before_positional = true;

        while stream.has_next() {
            let arg = stream.next_token()?;

            if !option_parsing {
                self[id].arguments.push(arg);
                continue;
            }

            if arg == "--" {
                trace!("option parsing disabled");
                option_parsing = false;
                continue;
            }

            if let Some(name) = arg.strip_prefix("--") {
                if let Some(outcome) = self[id].parse_long(name, stream)? {
                    return Ok(outcome);
                }
                continue;
            }

            if let Some(rest) = arg.strip_prefix('-') {
                if rest.is_empty() || rest.starts_with(|c: char| c.is_ascii_digit()) {
                    trace!(token = %arg, "dash token taken as positional");
                    self[id].arguments.push(arg);
                } else if let Some(outcome) = self[id].parse_short(rest, stream)? {
                    return Ok(outcome);
                }
                continue;
            }

            let child = self[id].commands.get(arg.as_str()).copied();
            if let Some(child) = child {
                debug!(command = %arg, "dispatching to command parser");
                self[id].command = Some(arg.clone());
                let outcome = self.parse_level(child, stream)?;
                if !outcome.is_complete() {
                    return Ok(outcome);
                }
                if let Some(callback) = self[child].callback.as_ref() {
                    callback(&arg, ParserRef { tree: self, id: child });
                }
                continue;
            }

            if before_positional && arg == "help" && !self[id].helptext.is_empty() {
                return self.help_command(id, stream);
            }

            self[id].arguments.push(arg);
            before_positional = false;
        }

        Ok(Outcome::Complete)
    }

    /// `help <command>`: report the named command's help text.
    fn help_command(&self, id: ParserId, stream: &mut TokenStream) -> Result<Outcome, ParseError> {
        if !stream.has_next() {
            return Err(ParseError::MissingArgument {
                command: "help".to_string(),
            });
        }
        let name = stream.next_token()?;
        match self[id].commands.get(name.as_str()) {
            Some(&child) => Ok(Outcome::Help {
                parser: child,
                text: self[child].helptext.clone(),
            }),
            None => Err(ParseError::UnknownCommand { name }),
        }
    }
}

impl Parser {
    fn help_outcome(&self) -> Outcome {
        Outcome::Help {
            parser: self.id,
            text: self.helptext.clone(),
        }
    }

    fn version_outcome(&self) -> Outcome {
        Outcome::Version {
            parser: self.id,
            text: self.version.clone(),
        }
    }

    /// `name` is the token with its leading `--` stripped.
    fn parse_long(
        &mut self,
        name: &str,
        stream: &mut TokenStream,
    ) -> Result<Option<Outcome>, ParseError> {
        if let Some((key, value)) = name.split_once('=') {
            self.parse_equals("--", key, value)?;
            return Ok(None);
        }

        if let Some(&slot) = self.options.get(name) {
            self.take_occurrence(slot, &format!("--{name}"), stream)?;
            return Ok(None);
        }

        if name == "help" && !self.helptext.is_empty() {
            return Ok(Some(self.help_outcome()));
        }
        if name == "version" && !self.version.is_empty() {
            return Ok(Some(self.version_outcome()));
        }

        Err(ParseError::UnknownOption {
            option: format!("--{name}"),
        })
    }

    /// `arg` is the token with its leading `-` stripped.
    ///
    /// Every character is a single-character alias. Each value-taking option
    /// in a condensed group consumes the next token of the stream, so
    /// `-ab x y` gives `x` to `a` and `y` to `b`.
    fn parse_short(
        &mut self,
        arg: &str,
        stream: &mut TokenStream,
    ) -> Result<Option<Outcome>, ParseError> {
        if let Some((key, value)) = arg.split_once('=') {
            self.parse_equals("-", key, value)?;
            return Ok(None);
        }

        let mut buf = [0u8; 4];
        for c in arg.chars() {
            let alias: &str = c.encode_utf8(&mut buf);
            match self.options.get(alias).copied() {
                Some(slot) => self.take_occurrence(slot, &format!("-{c}"), stream)?,
                None if c == 'h' && !self.helptext.is_empty() => {
                    return Ok(Some(self.help_outcome()));
                }
                None if c == 'v' && !self.version.is_empty() => {
                    return Ok(Some(self.version_outcome()));
                }
                None => {
                    return Err(ParseError::UnknownOption {
                        option: format!("-{c}"),
                    });
                }
            }
        }
        Ok(None)
    }

    /// `--name=value` and `-n=value`.
    fn parse_equals(&mut self, prefix: &str, name: &str, value: &str) -> Result<(), ParseError> {
        let option = format!("{prefix}{name}");
        let Some(&slot) = self.options.get(name) else {
            return Err(ParseError::UnknownOption { option });
        };
        let store = &mut self.stores[slot];
        if store.kind() == Kind::Flag {
            return Err(ParseError::FlagEquals { option });
        }
        if value.is_empty() {
            return Err(ParseError::MissingValue { option });
        }
        trace!(%option, value, "equals-form value");
        store
            .push_raw(value, self.converter.as_ref())
            .map_err(|source| ParseError::Conversion { option, source })
    }

    /// Record one occurrence of the option in `slot`, consuming its value
    /// from the stream unless it is a flag.
    fn take_occurrence(
        &mut self,
        slot: usize,
        option: &str,
        stream: &mut TokenStream,
    ) -> Result<(), ParseError> {
        let store = &mut self.stores[slot];
        if store.kind() == Kind::Flag {
            trace!(option, "flag");
            store.push_flag();
            return Ok(());
        }
        if !stream.has_next() {
            return Err(ParseError::MissingValue {
                option: option.to_string(),
            });
        }
        let raw = stream.next_token()?;
        trace!(option, value = %raw, "option value");
        store
            .push_raw(&raw, self.converter.as_ref())
            .map_err(|source| ParseError::Conversion {
                option: option.to_string(),
                source,
            })
    }
}
