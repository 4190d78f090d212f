//! CLI: infer | convert | project
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use serde_json::Value;
use tracing::{debug, info};

use crate::convert::convert;
use crate::diag::{Diagnostics, Severity};
use crate::inference::{infer, InferError};
use crate::ir::Ty;
use crate::outputs::{project_document, ProjectionOptions, TypeSource};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// infer types for JSON documents, convert them into typed values, and project state outputs
#[derive(Parser, Debug)]
#[command(name = "json-outputs")]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// infer and print the type constraint of each document
    Infer(InferOut),
    /// convert each document against a declared type constraint
    Convert(ConvertOut),
    /// split state outputs into full and non-sensitive typed objects
    Project(ProjectOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// JSON Pointer to select a subnode in each document (e.g. /data/attributes)
    #[arg(long)]
    json_pointer: Option<String>,

    /// JQ pre-process filter for each document.
    #[arg(long)]
    jq_expr: Option<String>,

    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct InferOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct ConvertOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// target type constraint as JSON, e.g. '["map", "string"]'
    #[arg(long = "type")]
    target: String,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct ProjectOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// use each output's declared `type` when present
    #[arg(long, env = "JSON_OUTPUTS_DECLARED_TYPES")]
    declared_types: bool,

    /// convert outputs in parallel
    #[arg(long, env = "JSON_OUTPUTS_PARALLEL")]
    parallel: bool,

    /// print only the non-sensitive projection
    #[arg(long)]
    nonsensitive_only: bool,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

/// Whether any error diagnostic was reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Clean,
    Failed,
}

/// One loaded document and where it came from.
struct Document {
    source: String,
    value: Value,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load(&self) -> Result<Vec<Document>> {
        let source_paths = resolve_file_path_patterns(&self.input)
            .context("failed to resolve input file paths")?;
        let mut docs = Vec::new();
        for source_path in source_paths {
            let source = source_path.to_string_lossy().to_string();
            let text = std::fs::read_to_string(&source_path)
                .with_context(|| format!("failed to read source file ({source})"))?;
            let mut value = serde_json::from_str::<Value>(&text)
                .with_context(|| format!("failed to parse JSON source file ({source})"))?;
            if let Some(pointer) = self.json_pointer.as_deref() {
                value = value
                    .pointer(pointer)
                    .cloned()
                    .with_context(|| format!("JSON pointer {pointer} matched nothing in {source}"))?;
            }
            match self.jq_expr.as_deref() {
                None => docs.push(Document { source, value }),
                Some(jq_expr) => {
                    let results = crate::jq_exec::run_jaq(jq_expr, &value)
                        .with_context(|| format!("failed to apply jq expression to {source}"))?;
                    for (i, value) in results.into_iter().enumerate() {
                        docs.push(Document { source: format!("{source}#{i}"), value });
                    }
                }
            }
        }
        debug!(documents = docs.len(), "loaded inputs");
        Ok(docs)
    }
}

impl ProjectOut {
    fn options(&self) -> ProjectionOptions {
        ProjectionOptions {
            type_source: if self.declared_types { TypeSource::Declared } else { TypeSource::Inferred },
            parallel: self.parallel,
        }
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> Result<Outcome> {
        match &self.cmd {
            Command::Infer(target) => {
                let mut outcome = Outcome::Clean;
                let mut rendered = Vec::new();
                for doc in target.input_settings.load()? {
                    rendered.push(type_or_null(&doc.source, infer(&doc.value), &mut outcome));
                }
                write_output(target.out.as_deref(), &collapse(rendered))?;
                Ok(outcome)
            }
            Command::Convert(target) => {
                let type_json = serde_json::from_str::<Value>(&target.target)
                    .context("--type is not valid JSON")?;
                let ty = Ty::from_type_json(&type_json)?;
                info!(ty = %ty, "converting documents");

                let mut outcome = Outcome::Clean;
                let mut rendered = Vec::new();
                for doc in target.input_settings.load()? {
                    let (val, diagnostics) = convert(&doc.value, &ty);
                    report(&doc.source, &diagnostics);
                    if diagnostics.has_error() {
                        outcome = Outcome::Failed;
                    }
                    rendered.push(val.to_json());
                }
                write_output(target.out.as_deref(), &collapse(rendered))?;
                Ok(outcome)
            }
            Command::Project(target) => {
                let options = target.options();
                let mut outcome = Outcome::Clean;
                let mut rendered = Vec::new();
                for doc in target.input_settings.load()? {
                    let projection = project_document(doc.value, &options)
                        .with_context(|| format!("cannot project {}", doc.source))?;
                    report(&doc.source, &projection.diagnostics);
                    if projection.has_errors() {
                        outcome = Outcome::Failed;
                    }
                    if target.nonsensitive_only {
                        rendered.push(projection.nonsensitive_values.to_json());
                    } else {
                        rendered.push(projection.to_json());
                    }
                }
                write_output(target.out.as_deref(), &collapse(rendered))?;
                Ok(outcome)
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

/// Failed documents render as `null` so the output stays aligned with the inputs.
fn type_or_null(source: &str, inferred: Result<Ty, InferError>, outcome: &mut Outcome) -> Value {
    match inferred {
        Ok(ty) => ty.to_type_json(),
        Err(err) => {
            eprintln!("{}: {} ({})", "error".red().bold(), err, source);
            *outcome = Outcome::Failed;
            Value::Null
        }
    }
}

/// A single document prints bare; several print as an array in input order.
fn collapse(mut rendered: Vec<Value>) -> Value {
    if rendered.len() == 1 {
        rendered.remove(0)
    } else {
        Value::Array(rendered)
    }
}

fn report(source: &str, diagnostics: &Diagnostics) {
    for d in diagnostics {
        let label = match d.severity {
            Severity::Error => "error".red().bold(),
            Severity::Warning => "warning".yellow().bold(),
        };
        eprintln!("{label}: {} at {} ({source}): {}", d.summary, d.path.cyan(), d.detail);
    }
}

fn write_output(out: Option<&Path>, value: &Value) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    match out {
        Some(out) => {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            std::fs::write(out, &text).with_context(|| format!("failed to write {}", out.display()))?;
        }
        None => println!("{text}"),
    }
    Ok(())
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();
    for raw in patterns {
        let pattern = raw.as_ref();
        if !has_glob_chars(pattern) {
            out.push(PathBuf::from(pattern));
            continue;
        }
        let before = out.len();
        for entry in glob::glob(pattern)? {
            out.push(entry?);
        }
        if out.len() == before {
            bail!("glob pattern matched no files: {pattern}");
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_project_flags() {
        let cli = CommandLineInterface::try_parse_from([
            "json-outputs", "project", "--declared-types", "--parallel", "-i", "state.json",
        ])
        .unwrap();
        let Command::Project(target) = cli.cmd else { panic!("expected project") };
        let options = target.options();
        assert_eq!(options.type_source, TypeSource::Declared);
        assert!(options.parallel);
        assert_eq!(target.input_settings.input, ["state.json"]);
    }

    #[test]
    fn convert_requires_a_type() {
        let parsed = CommandLineInterface::try_parse_from(["json-outputs", "convert", "-i", "a.json"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn literal_paths_pass_through_and_empty_globs_fail() {
        let paths = resolve_file_path_patterns(["does/not/need/to/exist.json"]).unwrap();
        assert_eq!(paths, [PathBuf::from("does/not/need/to/exist.json")]);
        assert!(resolve_file_path_patterns(["/definitely/missing/dir/*.json"]).is_err());
    }

    #[test]
    fn failed_inference_keeps_its_slot() {
        let mut outcome = Outcome::Clean;
        let failed = Err(InferError::UnsupportedValue { path: "$".into(), kind: "blob".into() });
        let rendered = vec![
            type_or_null("a.json", infer(&serde_json::json!([1, 2])), &mut outcome),
            type_or_null("b.json", failed, &mut outcome),
            type_or_null("c.json", infer(&serde_json::json!("x")), &mut outcome),
        ];
        assert_eq!(outcome, Outcome::Failed);
        assert_eq!(collapse(rendered), serde_json::json!([["list", "number"], null, "string"]));
    }

    #[test]
    fn single_document_prints_bare() {
        assert_eq!(collapse(vec![Value::Bool(true)]), Value::Bool(true));
        assert_eq!(collapse(vec![]), Value::Array(vec![]));
    }
}
