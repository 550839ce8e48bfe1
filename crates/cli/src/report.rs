use argtree::{Outcome, ParserRef, Value};
use indexmap::IndexMap;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ParseReport {
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub root: LevelReport,
}

/// What one level of the tree collected.
#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct LevelReport {
    /// Keyed by the option's first alias.
    pub options: IndexMap<String, OptionReport>,
    pub arguments: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcommand: Option<Box<LevelReport>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct OptionReport {
    pub aliases: Vec<String>,
    pub kind: &'static str,
    pub found: bool,
    pub count: usize,
    pub default: serde_json::Value,
    pub values: Vec<serde_json::Value>,
}

impl ParseReport {
    pub fn new(outcome: &Outcome, root: ParserRef<'_>) -> Self {
        let name = match outcome {
            Outcome::Complete => "complete",
            Outcome::Help { .. } => "help",
            Outcome::Version { .. } => "version",
        };
        Self {
            outcome: name,
            text: outcome.message().map(str::to_string),
            root: LevelReport::collect(root),
        }
    }
}

impl LevelReport {
    fn collect(level: ParserRef<'_>) -> Self {
        let options = level
            .option_groups()
            .into_iter()
            .filter_map(|(aliases, store)| {
                let key = aliases.first()?.to_string();
                let report = OptionReport {
                    aliases: aliases.iter().map(|a| a.to_string()).collect(),
                    kind: store.kind().as_str(),
                    found: store.found(),
                    count: store.count(),
                    default: to_json(store.default_value()),
                    values: store.values().iter().map(to_json).collect(),
                };
                Some((key, report))
            })
            .collect();

        Self {
            options,
            arguments: level.args().to_vec(),
            command: level.command_name().map(str::to_string),
            subcommand: level
                .command_parser()
                .map(|child| Box::new(Self::collect(child))),
        }
    }
}

fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Flag(b) => serde_json::Value::Bool(*b),
        Value::Str(s) => serde_json::Value::String(s.clone()),
        Value::Int(i) => serde_json::Value::from(*i),
        // JSON has no NaN or infinity.
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argtree::ArgParser;

    #[test]
    fn report_nests_matched_commands() {
        let mut parser = ArgParser::new();
        parser.flag("verbose v");
        let remote = parser.command("remote", "");
        let add = parser.command_in(remote, "add a", "");
        parser[add].float_option("weight w", 1.5);

        let outcome = parser
            .parse(["-v", "remote", "a", "-w", "2.5", "origin"])
            .unwrap();
        let report = ParseReport::new(&outcome, parser.root());
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["outcome"], "complete");
        assert!(json.get("text").is_none());
        assert_eq!(json["root"]["options"]["verbose"]["count"], 1);
        assert_eq!(json["root"]["command"], "remote");
        let leaf = &json["root"]["subcommand"]["subcommand"];
        assert_eq!(json["root"]["subcommand"]["command"], "a");
        assert_eq!(leaf["options"]["weight"]["aliases"], serde_json::json!(["weight", "w"]));
        assert_eq!(leaf["options"]["weight"]["default"], 1.5);
        assert_eq!(leaf["options"]["weight"]["values"], serde_json::json!([2.5]));
        assert_eq!(leaf["arguments"], serde_json::json!(["origin"]));
    }

    #[test]
    fn non_finite_floats_become_null() {
        assert_eq!(to_json(&Value::Float(f64::NAN)), serde_json::Value::Null);
        assert_eq!(to_json(&Value::Int(-3)), serde_json::json!(-3));
    }

    #[test]
    fn help_outcome_carries_text() {
        let mut parser = ArgParser::with_info("Usage: app", "");
        let outcome = parser.parse(["--help"]).unwrap();
        let report = ParseReport::new(&outcome, parser.root());
        assert_eq!(report.outcome, "help");
        assert_eq!(report.text.as_deref(), Some("Usage: app"));
    }
}
