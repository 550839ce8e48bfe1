mod report;

use anyhow::{Context, Result};
use argtree::Outcome;
use argtree_schema::ParserSchema;
use clap::{Parser, Subcommand};
use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};
use tracing_subscriber::{EnvFilter, fmt};

use crate::report::ParseReport;

/// Exit status for arguments the schema rejects.
const EXIT_PARSE_ERROR: u8 = 2;

#[derive(Parser)]
#[command(name = "argtree")]
#[command(version, about = "Inspect how an argtree command tree parses arguments", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse arguments against a schema and show what was collected
    Parse(ParseArgs),

    /// Validate a schema and summarize it
    Check(SchemaArgs),

    /// Print a schema in normalized form
    DumpSchema(SchemaArgs),
}

#[derive(Parser)]
struct SchemaArgs {
    /// Path to the JSON schema
    #[arg(short, long, value_name = "FILE")]
    schema: PathBuf,
}

#[derive(Parser)]
struct ParseArgs {
    /// Path to the JSON schema
    #[arg(short, long, value_name = "FILE")]
    schema: PathBuf,

    /// Print a JSON report instead of the text dump
    #[arg(long)]
    json: bool,

    /// Arguments to parse, given after `--`
    #[arg(last = true, value_name = "ARGS")]
    args: Vec<String>,
}

fn main() -> Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Parse(args) => parse(args),
        Commands::Check(args) => check(&args.schema).map(|()| ExitCode::SUCCESS),
        Commands::DumpSchema(args) => dump_schema(&args.schema).map(|()| ExitCode::SUCCESS),
    }
}

fn read_schema(path: &Path) -> Result<ParserSchema> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read schema: {}", path.display()))?;
    ParserSchema::from_json(&json)
        .with_context(|| format!("failed to load schema: {}", path.display()))
}

fn load_schema(path: &Path) -> Result<ParserSchema> {
    let schema = read_schema(path)?;
    schema
        .validate()
        .with_context(|| format!("invalid schema: {}", path.display()))?;
    Ok(schema)
}

fn parse(args: ParseArgs) -> Result<ExitCode> {
    let mut parser = read_schema(&args.schema)?
        .build()
        .with_context(|| format!("invalid schema: {}", args.schema.display()))?;

    if !args.json {
        for id in parser.ids().skip(1) {
            parser.on_parsed(id, |alias, level| {
                println!("---------- {alias} ----------");
                level.print();
                println!();
            });
        }
    }

    tracing::debug!(tokens = args.args.len(), "parsing against schema");
    let outcome = match parser.parse(args.args) {
        Ok(outcome) => outcome,
        Err(err) => {
            eprintln!("error: {err}");
            return Ok(ExitCode::from(EXIT_PARSE_ERROR));
        }
    };

    if args.json {
        let report = ParseReport::new(&outcome, parser.root());
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(ExitCode::SUCCESS);
    }

    match outcome {
        Outcome::Complete => parser.print(),
        Outcome::Help { text, .. } | Outcome::Version { text, .. } => println!("{text}"),
    }
    Ok(ExitCode::SUCCESS)
}

fn check(path: &Path) -> Result<()> {
    let summary = load_schema(path)?.summary();
    tracing::debug!(depth = summary.depth, "schema is valid");
    println!(
        "{} options, {} commands",
        summary.options, summary.commands
    );
    Ok(())
}

fn dump_schema(path: &Path) -> Result<()> {
    let schema = load_schema(path)?;
    println!("{}", schema.to_json_pretty());
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
