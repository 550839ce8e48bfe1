use std::ffi::OsString;
use std::fmt;
use std::ops::{Deref, DerefMut, Index, IndexMut};
use std::rc::Rc;

use crate::convert::{Converter, StdConverter};
use crate::error::ParseError;
use crate::parser::Parser;
use crate::stream::TokenStream;

/// Identifies one parser within an [`ArgParser`].
///
/// Ids are only meaningful for the tree that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParserId(pub(crate) usize);

impl ParserId {
    pub const ROOT: ParserId = ParserId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

/// How a successful parse ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Every token was consumed.
    Complete,
    /// Automatic help was requested; `parser` is the level whose help text
    /// this is. No further tokens were consumed.
    Help { parser: ParserId, text: String },
    /// Automatic version was requested. No further tokens were consumed.
    Version { parser: ParserId, text: String },
}

impl Outcome {
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }

    /// The text to print for help/version outcomes.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Complete => None,
            Self::Help { text, .. } | Self::Version { text, .. } => Some(text),
        }
    }
}

/// Owns every parser of a command tree.
///
/// The root parser's registration and query methods are available directly
/// through `Deref`; command parsers are addressed by [`ParserId`]:
///
/// ```
/// use argtree::ArgParser;
///
/// let mut parser = ArgParser::new();
/// let boo = parser.command("boo b", "Usage: app boo [--foo]");
/// parser[boo].flag("foo f");
///
/// parser.parse(["b", "-f", "x"]).unwrap();
/// assert_eq!(parser.command_name(), Some("b"));
/// assert!(parser[boo].found("foo"));
/// assert_eq!(parser[boo].args(), ["x"]);
/// ```
pub struct ArgParser {
    nodes: Vec<Parser>,
    converter: Rc<dyn Converter>,
}

impl ArgParser {
    pub fn new() -> Self {
        Self::with_info("", "")
    }

    /// A non-empty `helptext` enables `--help`, `-h` and `help <command>`;
    /// a non-empty `version` enables `--version` and `-v`.
    pub fn with_info(helptext: impl Into<String>, version: impl Into<String>) -> Self {
        let converter: Rc<dyn Converter> = Rc::new(StdConverter);
        let root = Parser::new(
            ParserId::ROOT,
            None,
            helptext.into(),
            version.into(),
            Rc::clone(&converter),
        );
        Self {
            nodes: vec![root],
            converter,
        }
    }

    /// Replace the conversion function for every parser in the tree.
    pub fn with_converter(mut self, converter: impl Converter + 'static) -> Self {
        self.converter = Rc::new(converter);
        for node in &mut self.nodes {
            node.converter = Rc::clone(&self.converter);
        }
        self
    }

    pub fn converter(&self) -> &dyn Converter {
        self.converter.as_ref()
    }

    /// Register a command on the root parser.
    pub fn command(&mut self, aliases: &str, helptext: impl Into<String>) -> ParserId {
        self.command_in(ParserId::ROOT, aliases, helptext)
    }

    /// Register a command on `parent`, binding the new parser under every
    /// alias in the whitespace-separated `aliases` list.
    ///
    /// Re-registering an alias rebinds that alias only.
    pub fn command_in(
        &mut self,
        parent: ParserId,
        aliases: &str,
        helptext: impl Into<String>,
    ) -> ParserId {
        let id = ParserId(self.nodes.len());
        self.nodes.push(Parser::new(
            id,
            Some(parent),
            helptext.into(),
            String::new(),
            Rc::clone(&self.converter),
        ));
        let node = &mut self[parent];
        for alias in aliases.split_whitespace() {
            if let Some(previous) = node.commands.insert(alias.to_string(), id) {
                tracing::warn!(
                    alias,
                    previous = previous.0,
                    current = id.0,
                    "command alias re-registered"
                );
            }
        }
        id
    }

    /// Run `callback` right after the command parser `id` finishes parsing.
    ///
    /// Only command parsers are dispatched, so a callback on the root is
    /// ignored.
    pub fn on_parsed(&mut self, id: ParserId, callback: impl Fn(&str, ParserRef<'_>) + 'static) {
        if id == ParserId::ROOT {
            tracing::warn!("callback on the root parser ignored");
            return;
        }
        self[id].callback = Some(Box::new(callback));
    }

    pub fn get(&self, id: ParserId) -> Option<&Parser> {
        self.nodes.get(id.0)
    }

    /// A view of `id` that can walk to its parent and matched command.
    pub fn view(&self, id: ParserId) -> ParserRef<'_> {
        assert!(id.0 < self.nodes.len(), "parser id {} out of range", id.0);
        ParserRef { tree: self, id }
    }

    pub fn root(&self) -> ParserRef<'_> {
        self.view(ParserId::ROOT)
    }

    /// Every parser id in the tree, root first, in registration order.
    pub fn ids(&self) -> impl Iterator<Item = ParserId> + use<> {
        (0..self.nodes.len()).map(ParserId)
    }

    /// The parser of the command matched at level `id`.
    pub fn command_parser(&self, id: ParserId) -> Option<ParserRef<'_>> {
        self.get(id)
            .and_then(Parser::command_id)
            .map(|child| self.view(child))
    }

    pub fn parent_of(&self, id: ParserId) -> Option<ParserId> {
        self.get(id).and_then(Parser::parent)
    }

    /// The chain of matched commands below the root, outermost first.
    pub fn matched_commands(&self) -> Vec<(&str, ParserRef<'_>)> {
        let mut chain = Vec::new();
        let mut level = &self.nodes[ParserId::ROOT.0];
        while let (Some(name), Some(child)) = (level.command_name(), level.command_id()) {
            chain.push((name, self.view(child)));
            level = &self.nodes[child.0];
        }
        chain
    }

    /// Parse an argument vector that excludes the program name.
    pub fn parse<I, S>(&mut self, args: I) -> Result<Outcome, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut stream: TokenStream = args.into_iter().collect();
        self.parse_stream(&mut stream)
    }

    /// Parse the process arguments, skipping the program name.
    ///
    /// Arguments that are not valid UTF-8 are converted lossily.
    pub fn parse_env(&mut self) -> Result<Outcome, ParseError> {
        self.parse(lossy_args(std::env::args_os().skip(1)))
    }

    pub fn parse_stream(&mut self, stream: &mut TokenStream) -> Result<Outcome, ParseError> {
        tracing::debug!(tokens = stream.len(), "parsing argument stream");
        self.parse_level(ParserId::ROOT, stream)
    }
}

fn lossy_args(args: impl IntoIterator<Item = OsString>) -> impl Iterator<Item = String> {
    args.into_iter()
        .map(|arg| arg.into_string().unwrap_or_else(|raw| raw.to_string_lossy().into_owned()))
}

impl Default for ArgParser {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ArgParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgParser")
            .field("nodes", &self.nodes)
            .field("converter", &self.converter)
            .finish()
    }
}

impl Deref for ArgParser {
    type Target = Parser;

    fn deref(&self) -> &Parser {
        &self.nodes[ParserId::ROOT.0]
    }
}

impl DerefMut for ArgParser {
    fn deref_mut(&mut self) -> &mut Parser {
        &mut self.nodes[ParserId::ROOT.0]
    }
}

impl Index<ParserId> for ArgParser {
    type Output = Parser;

    fn index(&self, id: ParserId) -> &Parser {
        &self.nodes[id.0]
    }
}

impl IndexMut<ParserId> for ArgParser {
    fn index_mut(&mut self, id: ParserId) -> &mut Parser {
        &mut self.nodes[id.0]
    }
}

/// A borrowed parser together with the tree it lives in.
#[derive(Clone, Copy)]
pub struct ParserRef<'a> {
    pub(crate) tree: &'a ArgParser,
    pub(crate) id: ParserId,
}

impl<'a> ParserRef<'a> {
    pub fn parent(&self) -> Option<ParserRef<'a>> {
        self.tree.parent_of(self.id).map(|id| self.tree.view(id))
    }

    pub fn command_parser(&self) -> Option<ParserRef<'a>> {
        self.tree.command_parser(self.id)
    }
}

impl Deref for ParserRef<'_> {
    type Target = Parser;

    fn deref(&self) -> &Parser {
        &self.tree[self.id]
    }
}

impl fmt::Debug for ParserRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserRef").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::RadixConverter;

    #[test]
    fn ids_cover_every_parser() {
        let mut parser = ArgParser::new();
        let a = parser.command("a", "");
        let b = parser.command_in(a, "b", "");
        assert_eq!(parser.ids().collect::<Vec<_>>(), [ParserId::ROOT, a, b]);
        assert_eq!(parser.parent_of(b), Some(a));
        assert_eq!(parser.parent_of(ParserId::ROOT), None);
        assert!(parser.get(ParserId(99)).is_none());
        assert_eq!(b.index(), 2);
    }

    #[test]
    fn commands_have_no_version() {
        let mut parser = ArgParser::with_info("help", "1.0");
        let a = parser.command("a", "a help");
        assert_eq!(parser[a].helptext(), "a help");
        assert_eq!(parser[a].version(), "");
        assert_eq!(parser.version(), "1.0");
    }

    #[test]
    fn converter_is_shared_with_existing_commands() {
        let mut parser = ArgParser::new();
        let a = parser.command("a", "");
        let mut parser = parser.with_converter(RadixConverter);
        parser[a].int_option("n", 0);
        parser.parse(["a", "-n", "0x10"]).unwrap();
        assert_eq!(parser[a].value::<i64>("n"), Some(16));
    }

    #[test]
    fn unmatched_tree_has_no_chain() {
        let mut parser = ArgParser::new();
        parser.command("a", "");
        parser.parse(["x"]).unwrap();
        assert!(parser.matched_commands().is_empty());
        assert!(parser.root().command_parser().is_none());
        assert!(parser.root().parent().is_none());
    }

    #[test]
    fn root_callback_is_ignored() {
        let mut parser = ArgParser::new();
        parser.on_parsed(ParserId::ROOT, |_, _| {});
        assert!(parser.callback.is_none());

        let a = parser.command("a", "");
        parser.on_parsed(a, |_, _| {});
        assert!(parser[a].callback.is_some());
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_arguments_are_converted_lossily() {
        use std::os::unix::ffi::OsStringExt;

        let args = vec![
            OsString::from("--name"),
            OsString::from_vec(vec![b'a', 0xff, b'b']),
        ];
        let mut parser = ArgParser::new();
        parser.option("name", "");
        parser.parse(lossy_args(args)).unwrap();
        assert_eq!(parser.value::<String>("name").as_deref(), Some("a\u{FFFD}b"));
    }

    #[test]
    fn outcome_message() {
        assert_eq!(Outcome::Complete.message(), None);
        let help = Outcome::Help {
            parser: ParserId::ROOT,
            text: "usage".into(),
        };
        assert_eq!(help.message(), Some("usage"));
        assert!(!help.is_complete());
    }
}
