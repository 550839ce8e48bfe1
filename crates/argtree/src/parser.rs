use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::convert::Converter;
use crate::error::{ConversionError, ParseError};
use crate::store::ValueStore;
use crate::tree::{ParserId, ParserRef};
use crate::value::{FromValue, Kind, Value};

/// Called after a command's parser has consumed its tokens, with the alias the
/// command was invoked under.
pub type Callback = Box<dyn Fn(&str, ParserRef<'_>)>;

/// One level of a command tree: its options, its command aliases, and what
/// parsing found at this level.
///
/// The root level is reachable through `Deref` on [`crate::ArgParser`];
/// command levels through indexing with the [`ParserId`] returned at
/// registration.
pub struct Parser {
    pub(crate) id: ParserId,
    pub(crate) parent: Option<ParserId>,
    pub(crate) helptext: String,
    pub(crate) version: String,
    pub(crate) stores: Vec<ValueStore>,
    pub(crate) options: IndexMap<String, usize>,
    pub(crate) commands: IndexMap<String, ParserId>,
    pub(crate) arguments: Vec<String>,
    pub(crate) command: Option<String>,
    pub(crate) callback: Option<Callback>,
    pub(crate) converter: Rc<dyn Converter>,
}

impl Parser {
    pub(crate) fn new(
        id: ParserId,
        parent: Option<ParserId>,
        helptext: String,
        version: String,
        converter: Rc<dyn Converter>,
    ) -> Self {
        Self {
            id,
            parent,
            helptext,
            version,
            stores: Vec::new(),
            options: IndexMap::new(),
            commands: IndexMap::new(),
            arguments: Vec::new(),
            command: None,
            callback: None,
            converter,
        }
    }

    pub fn id(&self) -> ParserId {
        self.id
    }

    pub fn helptext(&self) -> &str {
        &self.helptext
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Register an option under every alias in the whitespace-separated
    /// `aliases` list. The option's kind is the kind of `default`.
    ///
    /// Re-registering an alias rebinds that alias only; other aliases keep
    /// pointing at the previous option.
    pub fn register(&mut self, aliases: &str, default: impl Into<Value>) -> &mut Self {
        let slot = self.stores.len();
        self.stores.push(ValueStore::new(default.into()));
        for alias in aliases.split_whitespace() {
            if let Some(previous) = self.options.insert(alias.to_string(), slot) {
                tracing::warn!(alias, previous, slot, "option alias re-registered");
            }
        }
        self
    }

    pub fn flag(&mut self, aliases: &str) -> &mut Self {
        self.register(aliases, false)
    }

    pub fn option(&mut self, aliases: &str, default: &str) -> &mut Self {
        self.register(aliases, default)
    }

    pub fn int_option(&mut self, aliases: &str, default: i64) -> &mut Self {
        self.register(aliases, default)
    }

    pub fn float_option(&mut self, aliases: &str, default: f64) -> &mut Self {
        self.register(aliases, default)
    }

    pub fn store(&self, name: &str) -> Option<&ValueStore> {
        self.options.get(name).map(|&slot| &self.stores[slot])
    }

    /// The kind `name` was registered with.
    pub fn kind(&self, name: &str) -> Option<Kind> {
        self.store(name).map(ValueStore::kind)
    }

    /// Whether `name` occurred at least once. Unregistered names are never found.
    pub fn found(&self, name: &str) -> bool {
        self.store(name).is_some_and(ValueStore::found)
    }

    pub fn count(&self, name: &str) -> usize {
        self.store(name).map_or(0, ValueStore::count)
    }

    /// The most recent value of `name`, or its default.
    ///
    /// Returns `None` if `name` is unregistered or `T` does not match its kind.
    pub fn value<T: FromValue>(&self, name: &str) -> Option<T> {
        self.store(name).and_then(|s| T::from_value(s.current()))
    }

    /// Every value accumulated for `name`, in encounter order.
    pub fn values<T: FromValue>(&self, name: &str) -> Vec<T> {
        self.store(name)
            .map(|s| s.values().iter().filter_map(T::from_value).collect())
            .unwrap_or_default()
    }

    /// Registered options in registration order, one entry per option with
    /// all of its aliases.
    pub fn option_groups(&self) -> Vec<(Vec<&str>, &ValueStore)> {
        let mut groups: Vec<(usize, Vec<&str>)> = Vec::new();
        for (alias, &slot) in &self.options {
            match groups.iter_mut().find(|(s, _)| *s == slot) {
                Some((_, aliases)) => aliases.push(alias.as_str()),
                None => groups.push((slot, vec![alias.as_str()])),
            }
        }
        groups
            .into_iter()
            .map(|(slot, aliases)| (aliases, &self.stores[slot]))
            .collect()
    }

    pub fn has_args(&self) -> bool {
        !self.arguments.is_empty()
    }

    pub fn num_args(&self) -> usize {
        self.arguments.len()
    }

    pub fn arg(&self, index: usize) -> Option<&str> {
        self.arguments.get(index).map(String::as_str)
    }

    pub fn args(&self) -> &[String] {
        &self.arguments
    }

    pub fn args_as_ints(&self) -> Result<Vec<i64>, ParseError> {
        self.args_as(Kind::Integer)
    }

    pub fn args_as_floats(&self) -> Result<Vec<f64>, ParseError> {
        self.args_as(Kind::Float)
    }

    fn args_as<T: FromValue>(&self, kind: Kind) -> Result<Vec<T>, ParseError> {
        self.arguments
            .iter()
            .enumerate()
            .map(|(index, arg)| {
                let value = self
                    .converter
                    .convert(arg, kind)
                    .map_err(|source| ParseError::PositionalConversion { index, source })?;
                T::from_value(&value).ok_or_else(|| ParseError::PositionalConversion {
                    index,
                    source: ConversionError::invalid(arg.as_str(), kind),
                })
            })
            .collect()
    }

    pub fn command_found(&self) -> bool {
        self.command.is_some()
    }

    /// The alias the matched command was invoked under.
    pub fn command_name(&self) -> Option<&str> {
        self.command.as_deref()
    }

    pub fn command_id(&self) -> Option<ParserId> {
        self.command
            .as_deref()
            .and_then(|name| self.commands.get(name).copied())
    }

    /// Command aliases registered at this level, with their parser ids.
    pub fn commands(&self) -> impl Iterator<Item = (&str, ParserId)> {
        self.commands.iter().map(|(alias, &id)| (alias.as_str(), id))
    }

    pub fn parent(&self) -> Option<ParserId> {
        self.parent
    }

    pub fn has_parent(&self) -> bool {
        self.parent.is_some()
    }

    /// Write the dump produced by `Display` to stdout.
    pub fn print(&self) {
        print!("{self}");
    }
}

impl fmt::Debug for Parser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parser")
            .field("id", &self.id)
            .field("parent", &self.parent)
            .field("options", &self.options)
            .field("stores", &self.stores)
            .field("commands", &self.commands)
            .field("arguments", &self.arguments)
            .field("command", &self.command)
            .finish_non_exhaustive()
    }
}

/// Multi-line debugging dump: every option alias with its default and
/// accumulated values, the positional arguments, and the matched command.
impl fmt::Display for Parser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Options:")?;
        if self.options.is_empty() {
            writeln!(f, "  [none]")?;
        }
        for (alias, &slot) in &self.options {
            let store = &self.stores[slot];
            let values: Vec<String> = store.values().iter().map(Value::to_string).collect();
            writeln!(
                f,
                "  {alias}: ({}) [{}]",
                store.default_value(),
                values.join(", ")
            )?;
        }

        writeln!(f)?;
        writeln!(f, "Arguments:")?;
        if self.arguments.is_empty() {
            writeln!(f, "  [none]")?;
        }
        for arg in &self.arguments {
            writeln!(f, "  {arg}")?;
        }

        writeln!(f)?;
        writeln!(f, "Command:")?;
        writeln!(f, "  {}", self.command.as_deref().unwrap_or("[none]"))
    }
}

#[cfg(test)]
mod tests {
    use crate::tree::ArgParser;

    #[test]
    fn dump_lists_every_alias() {
        let mut parser = ArgParser::new();
        parser.flag("foo f").option("bar b", "default");
        parser.command("boo", "");
        parser.parse(["-f", "--bar", "x", "pos", "boo"]).unwrap();

        let expected = "\
Options:
  foo: (false) [true]
  f: (false) [true]
  bar: (default) [x]
  b: (default) [x]

Arguments:
  pos

Command:
  boo
";
        assert_eq!(parser.to_string(), expected);
    }

    #[test]
    fn dump_of_empty_parser() {
        let parser = ArgParser::new();
        assert_eq!(
            parser.to_string(),
            "Options:\n  [none]\n\nArguments:\n  [none]\n\nCommand:\n  [none]\n"
        );
    }

    #[test]
    fn option_groups_collect_aliases() {
        let mut parser = ArgParser::new();
        parser.flag("verbose v").int_option("jobs j", 2).option("out", "");
        let groups: Vec<(Vec<&str>, i64)> = parser
            .option_groups()
            .into_iter()
            .map(|(aliases, store)| (aliases, store.count() as i64))
            .collect();
        assert_eq!(
            groups,
            [
                (vec!["verbose", "v"], 0),
                (vec!["jobs", "j"], 0),
                (vec!["out"], 0),
            ]
        );
    }

    #[test]
    fn commands_iterate_in_registration_order() {
        let mut parser = ArgParser::new();
        let a = parser.command("add a", "");
        let r = parser.command("remove rm", "");
        let listed: Vec<_> = parser.commands().collect();
        assert_eq!(listed, [("add", a), ("a", a), ("remove", r), ("rm", r)]);
    }
}
