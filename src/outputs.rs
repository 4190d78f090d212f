//! Projection of a state document's outputs into two typed objects.
//!
//! Every output is inferred (or taken from its declared type) and converted on its own;
//! the results are gathered into `values` (everything) and `nonsensitive_values`
//! (outputs whose `sensitive` flag is false). An output whose type cannot be inferred is
//! left out of both and reported.
use indexmap::IndexMap;
use rayon::prelude::*;
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::convert::convert_at;
use crate::diag::{key_path, Diagnostics, ROOT};
use crate::inference::{infer_at, InferError};
use crate::ir::Ty;
use crate::path_de::{from_str_with_path, from_value_with_path, PathError};
use crate::value::Val;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OutputEntry {
    #[serde(default)]
    pub value: Value,
    /// Absent means sensitive: an output is only published when it says so.
    #[serde(default = "sensitive_by_default")]
    pub sensitive: bool,
    /// Type-constraint JSON, as written by the producer of the document.
    #[serde(default, rename = "type")]
    pub declared_type: Option<Value>,
}

pub type Outputs = IndexMap<String, OutputEntry>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TypeSource {
    /// Infer every output from its value.
    #[default]
    Inferred,
    /// Prefer an output's declared `type`; infer when it is missing, malformed or mentions
    /// `dynamic` anywhere.
    Declared,
}

#[derive(Debug, Clone, Default)]
pub struct ProjectionOptions {
    pub type_source: TypeSource,
    /// Convert outputs on the rayon pool.
    pub parallel: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub values: Val,
    pub nonsensitive_values: Val,
    pub diagnostics: Diagnostics,
}

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("malformed outputs document {0}")]
    Malformed(#[from] PathError),
    #[error("document has neither `values.outputs` nor `outputs`")]
    MissingOutputs,
}

#[derive(Deserialize)]
struct StateDocument {
    #[serde(default)]
    values: Option<OutputsSection>,
    #[serde(default)]
    outputs: Option<Outputs>,
}

#[derive(Deserialize)]
struct OutputsSection {
    outputs: Outputs,
}

/// One output after inference and conversion; `typed` is `None` when it was skipped.
struct Converted<'a> {
    name: &'a str,
    sensitive: bool,
    typed: Option<(Ty, Val)>,
    diagnostics: Diagnostics,
}

// ————————————————————————————————————————————————————————————————————————————
// DOCUMENT
// ————————————————————————————————————————————————————————————————————————————

fn sensitive_by_default() -> bool { true }

impl StateDocument {
    fn into_outputs(self) -> Result<Outputs, DocumentError> {
        match (self.values, self.outputs) {
            (Some(section), _) => Ok(section.outputs),
            (None, Some(outputs)) => Ok(outputs),
            (None, None) => Err(DocumentError::MissingOutputs),
        }
    }
}

/// Read `{"values": {"outputs": {...}}}` or a bare `{"outputs": {...}}`.
pub fn parse_outputs(src: &str) -> Result<Outputs, DocumentError> {
    from_str_with_path::<StateDocument>(src)?.into_outputs()
}

pub fn outputs_from_value(doc: Value) -> Result<Outputs, DocumentError> {
    from_value_with_path::<StateDocument>(doc)?.into_outputs()
}

// ————————————————————————————————————————————————————————————————————————————
// PROJECTION
// ————————————————————————————————————————————————————————————————————————————

pub fn project(outputs: &Outputs, options: &ProjectionOptions) -> Projection {
    info!(outputs = outputs.len(), parallel = options.parallel, "projecting outputs");

    // each output owns its collector; merging in document order keeps the result stable
    let converted: Vec<Converted<'_>> = if options.parallel {
        let entries: Vec<(&String, &OutputEntry)> = outputs.iter().collect();
        entries
            .into_par_iter()
            .map(|(name, entry)| convert_output(name, entry, options))
            .collect()
    } else {
        outputs
            .iter()
            .map(|(name, entry)| convert_output(name, entry, options))
            .collect()
    };

    let mut diagnostics = Diagnostics::new();
    let mut all = ObjectBuilder::default();
    let mut public = ObjectBuilder::default();
    for out in converted {
        diagnostics.append(out.diagnostics);
        let Some((ty, val)) = out.typed else { continue };
        if !out.sensitive {
            public.insert(out.name, ty.clone(), val.clone());
        }
        all.insert(out.name, ty, val);
    }

    if diagnostics.has_error() {
        warn!(errors = diagnostics.error_count(), "projection finished with errors");
    }
    Projection {
        values: all.finish(),
        nonsensitive_values: public.finish(),
        diagnostics,
    }
}

pub fn project_document(doc: Value, options: &ProjectionOptions) -> Result<Projection, DocumentError> {
    let outputs = outputs_from_value(doc)?;
    Ok(project(&outputs, options))
}

impl Projection {
    /// Callers must treat the read as failed, even though both objects are complete.
    pub fn has_errors(&self) -> bool { self.diagnostics.has_error() }

    pub fn to_json(&self) -> Value {
        let mut out = Map::new();
        out.insert("values".to_string(), self.values.to_json());
        out.insert("nonsensitive_values".to_string(), self.nonsensitive_values.to_json());
        Value::Object(out)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

#[derive(Default)]
struct ObjectBuilder {
    fields: IndexMap<String, Ty>,
    values: IndexMap<String, Val>,
}

impl ObjectBuilder {
    fn insert(&mut self, name: &str, ty: Ty, val: Val) {
        self.fields.insert(name.to_string(), ty);
        self.values.insert(name.to_string(), val);
    }

    fn finish(self) -> Val {
        Val::Object { fields: self.fields, values: self.values }
    }
}

fn convert_output<'a>(name: &'a str, entry: &OutputEntry, options: &ProjectionOptions) -> Converted<'a> {
    let path = key_path(ROOT, name);
    let mut diagnostics = Diagnostics::new();
    let typed = resolve_target(name, entry, options, &path, &mut diagnostics).map(|ty| {
        let val = convert_at(&entry.value, &ty, &path, &mut diagnostics);
        debug!(output = name, sensitive = entry.sensitive, ty = %ty, "converted output");
        (ty, val)
    });
    Converted { name, sensitive: entry.sensitive, typed, diagnostics }
}

fn resolve_target(
    name: &str,
    entry: &OutputEntry,
    options: &ProjectionOptions,
    path: &str,
    diagnostics: &mut Diagnostics,
) -> Option<Ty> {
    if options.type_source == TypeSource::Declared {
        if let Some(declared) = &entry.declared_type {
            match Ty::from_type_json(declared) {
                Ok(ty) if ty.contains_dynamic() => {
                    debug!(output = name, ty = %ty, "declared type is open, inferring instead");
                }
                Ok(ty) => return Some(ty),
                Err(err) => {
                    warn!(output = name, error = %err, "ignoring declared type");
                    diagnostics.add_warning("Invalid Declared Type", err.to_string(), path);
                }
            }
        }
    }
    match infer_at(&entry.value, path) {
        Ok(ty) => Some(ty),
        Err(err) => {
            record_inference_failure(name, &err, diagnostics);
            None
        }
    }
}

fn record_inference_failure(name: &str, err: &InferError, diagnostics: &mut Diagnostics) {
    error!(output = name, error = %err, "type inference failed, output skipped");
    diagnostics.add_error("Type Inference Failed", err.to_string(), err.path());
}

// ------------------------------- Tests ------------------------------------ //
