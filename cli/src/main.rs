mod error_formatter;
mod formatter;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use formatter::{CheckOutcome, Formatter};
use kechain::schemas::SchemaKind;
use kechain::{Engine, KeChainError, MemoryClient, ValidationRule, Widget};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "kechain")]
#[command(about = "Check and try out KE-chain validators, representations and widgets.")]
#[command(
    long_about = "Works on the JSON documents KE-chain stores for property options and activity customizations.\nCheck them against their schemas, evaluate validators against sample values, or list the widgets of an activity."
)]
#[command(version)]
struct Cli {
    /// Log engine activity to stderr (overrides KECHAIN_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check JSON documents against their schemas
    ///
    /// Walks the given files and directories for .json files, detects what each
    /// document is (validator, effect, representation, property options or
    /// activity customization) and parses it. Exits non-zero when any file fails.
    Check {
        /// Files or directories to check
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Evaluate validators against values
    ///
    /// The rule file holds one validator or a list of them. Values are read as
    /// JSON when possible and as text otherwise.
    ///
    /// Examples:
    ///   kechain evaluate range.json 4 11 null
    ///   kechain evaluate email.json support@ke-chain.com '"not an address"'
    Evaluate {
        /// File holding a validator document or a list of them
        rule: PathBuf,
        /// Values to evaluate
        values: Vec<String>,
    },
    /// List the widgets of an activity
    ///
    /// Reads a fixture file with parts, properties, activities, services and
    /// scopes, and shows the widgets configured on the given activity.
    Widgets {
        /// Fixture file
        fixture: PathBuf,
        /// Identifier of the activity
        activity: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match &cli.command {
        Commands::Check { paths } => check_command(paths),
        Commands::Evaluate { rule, values } => evaluate_command(rule, values),
        Commands::Widgets { fixture, activity } => widgets_command(fixture, activity),
    };

    if let Err(e) = result {
        if let Some(kechain_err) = e.downcast_ref::<KeChainError>() {
            eprintln!("{}", error_formatter::format_error(kechain_err));
        } else {
            eprintln!("Error: {:#}", e);
        }
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("kechain=debug")
    } else {
        EnvFilter::try_from_env("KECHAIN_LOG").unwrap_or_else(|_| EnvFilter::new("kechain=warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn check_command(paths: &[PathBuf]) -> Result<()> {
    let engine = Engine::new(MemoryClient::new());
    let mut outcomes = Vec::new();

    for file in json_files(paths)? {
        let source_id = file.to_string_lossy().to_string();
        let text = fs::read_to_string(&file)
            .with_context(|| format!("could not read {}", file.display()))?;
        debug!(file = %source_id, "checking document");

        let outcome = match serde_json::from_str::<Value>(&text) {
            Ok(document) => {
                let kind = DocumentKind::detect(&document);
                let error = kind.check(&engine, &document).err().map(|e| e.to_string());
                CheckOutcome {
                    source_id,
                    kind: kind.label(),
                    error,
                }
            }
            Err(err) => {
                eprint!("{}", error_formatter::format_json_error(&source_id, &text, &err));
                CheckOutcome {
                    source_id,
                    kind: "-",
                    error: Some(format!("invalid JSON: {}", err)),
                }
            }
        };
        outcomes.push(outcome);
    }

    let formatter = Formatter::default();
    print!("{}", formatter.format_check_report(&outcomes));

    let failed = outcomes.iter().filter(|outcome| outcome.error.is_some()).count();
    if failed > 0 {
        anyhow::bail!("{} of {} document(s) failed", failed, outcomes.len());
    }
    Ok(())
}

fn evaluate_command(rule: &Path, values: &[String]) -> Result<()> {
    let engine = Engine::new(MemoryClient::new());
    let text = fs::read_to_string(rule)
        .with_context(|| format!("could not read {}", rule.display()))?;
    let document: Value = serde_json::from_str(&text).map_err(|err| {
        anyhow::anyhow!(error_formatter::format_json_error(
            &rule.to_string_lossy(),
            &text,
            &err
        ))
    })?;
    let rules = match &document {
        Value::Array(_) => engine.parse_validators(&document)?,
        _ => vec![engine.parse_validator(&document)?],
    };

    let values: Vec<Value> = values.iter().map(|value| parse_value(value)).collect();
    let formatter = Formatter::default();
    print!("{}", formatter.format_evaluations(&evaluate_all(&rules, &values)));
    Ok(())
}

fn evaluate_all(rules: &[ValidationRule], values: &[Value]) -> Vec<(String, Value, kechain::Evaluation)> {
    values
        .iter()
        .flat_map(|value| {
            rules.iter().map(move |rule| {
                (
                    rule.kind().to_string(),
                    value.clone(),
                    rule.evaluate(value),
                )
            })
        })
        .collect()
}

fn widgets_command(fixture: &Path, activity: &str) -> Result<()> {
    let text = fs::read_to_string(fixture)
        .with_context(|| format!("could not read {}", fixture.display()))?;
    let engine = Engine::new(MemoryClient::from_json(&text)?);
    let customization = engine.customization(activity)?;

    let formatter = Formatter::default();
    print!(
        "{}",
        formatter.format_widgets(&customization.activity().name, customization.widgets())
    );
    Ok(())
}

/// Read a command-line value as JSON, falling back to plain text
fn parse_value(input: &str) -> Value {
    serde_json::from_str(input).unwrap_or_else(|_| Value::String(input.to_string()))
}

/// All .json files under the given paths, in walk order
fn json_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for root in paths {
        if !root.exists() {
            anyhow::bail!("path {} does not exist", root.display());
        }
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry?;
            if entry.file_type().is_file()
                && entry.path().extension().and_then(|s| s.to_str()) == Some("json")
            {
                files.push(entry.into_path());
            }
        }
    }
    Ok(files)
}

/// What a JSON document on disk holds, judged by its tag keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DocumentKind {
    Validator,
    Validators,
    Effect,
    Representation,
    Representations,
    PropertyOptions,
    Customization,
    Unknown,
}

impl DocumentKind {
    fn detect(document: &Value) -> Self {
        match document {
            Value::Object(map) if map.contains_key("vtype") => DocumentKind::Validator,
            Value::Object(map) if map.contains_key("effect") => DocumentKind::Effect,
            Value::Object(map) if map.contains_key("rtype") => DocumentKind::Representation,
            Value::Object(map) if map.contains_key("ext") => DocumentKind::Customization,
            Value::Object(map)
                if ["validators", "representations", "value_choices"]
                    .iter()
                    .any(|key| map.contains_key(*key)) =>
            {
                DocumentKind::PropertyOptions
            }
            Value::Array(items) => match items.first() {
                Some(Value::Object(map)) if map.contains_key("rtype") => {
                    DocumentKind::Representations
                }
                _ => DocumentKind::Validators,
            },
            _ => DocumentKind::Unknown,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            DocumentKind::Validator => "validator",
            DocumentKind::Validators => "validators",
            DocumentKind::Effect => "effect",
            DocumentKind::Representation => "representation",
            DocumentKind::Representations => "representations",
            DocumentKind::PropertyOptions => "property options",
            DocumentKind::Customization => "customization",
            DocumentKind::Unknown => "unknown",
        }
    }

    fn check(&self, engine: &Engine<MemoryClient>, document: &Value) -> kechain::KeChainResult<()> {
        match self {
            DocumentKind::Validator => engine.parse_validator(document).map(drop),
            DocumentKind::Validators => engine.parse_validators(document).map(drop),
            DocumentKind::Effect => engine.parse_effect(document).map(drop),
            DocumentKind::Representation => engine.parse_representation(document).map(drop),
            DocumentKind::Representations => {
                kechain::Representation::parse_list(document, engine.schemas()).map(drop)
            }
            DocumentKind::PropertyOptions => engine.parse_property_options(document).map(drop),
            DocumentKind::Customization => {
                engine.validate_document(SchemaKind::Customization, document)?;
                match document.pointer("/ext/widgets") {
                    Some(Value::Array(widgets)) => widgets
                        .iter()
                        .try_for_each(|widget| Widget::parse(widget).map(drop)),
                    _ => Ok(()),
                }
            }
            DocumentKind::Unknown => Err(KeChainError::UnknownType(
                "document is not a validator, effect, representation, property options or customization"
                    .to_string(),
            )),
        }
    }
}
