//! Conversion of decoded JSON into a typed `Val` tree against a target `Ty`.
//!
//! Conversion never aborts. A branch that does not fit its descriptor is replaced by a
//! typed placeholder and the failure is appended to the collector:
//! - scalar mismatch → `Null(target)`
//! - list element → that element only; siblings still convert
//! - tuple arity or kind → the whole tuple (`Null(tuple)`)
//! - object field → the whole object (`Null(object)`), remaining fields are skipped
//! - map entry or kind → the whole map, left empty
//!
//! A JSON `null` fits every target and yields `Null(target)` without a diagnostic. Missing
//! object keys are read as `null`; keys the descriptor does not name are ignored.
mod arr;
mod obj;

use serde_json::Value;
use thiserror::Error;

use crate::diag::{Diagnostic, Diagnostics, ROOT};
use crate::inference::kind_name;
use crate::ir::Ty;
use crate::value::Val;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    #[error("expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: &'static str },
    #[error("tuple length mismatch: expected {expected} elements, got {actual}")]
    ArityMismatch { expected: usize, actual: usize },
    #[error("no conversion rule for target type {target}")]
    UnsupportedConversion { target: String },
}

impl ConvertError {
    pub const TYPE_MISMATCH: &'static str = "Type Mismatch";
    pub const ARITY_MISMATCH: &'static str = "Arity Mismatch";
    pub const UNSUPPORTED_CONVERSION: &'static str = "Unsupported Conversion";

    pub fn summary(&self) -> &'static str {
        match self {
            ConvertError::TypeMismatch { .. } => Self::TYPE_MISMATCH,
            ConvertError::ArityMismatch { .. } => Self::ARITY_MISMATCH,
            ConvertError::UnsupportedConversion { .. } => Self::UNSUPPORTED_CONVERSION,
        }
    }

    pub fn into_diagnostic(self, path: &str) -> Diagnostic {
        Diagnostic::error(self.summary(), self.to_string(), path)
    }
}

// ------------------------------- Front API -------------------------------- //

pub fn convert(raw: &Value, target: &Ty) -> (Val, Diagnostics) {
    let mut diags = Diagnostics::new();
    let val = convert_at(raw, target, ROOT, &mut diags);
    (val, diags)
}

/// Convert with diagnostics appended to `diags` and paths relative to `path`.
pub fn convert_at(raw: &Value, target: &Ty, path: &str, diags: &mut Diagnostics) -> Val {
    if raw.is_null() {
        return null_of(target);
    }
    match (target, raw) {
        (Ty::Bool, Value::Bool(b)) => Val::Bool(*b),
        (Ty::Number, Value::Number(n)) => Val::Number(n.clone()),
        (Ty::String, Value::String(s)) => Val::String(s.clone()),
        (Ty::Null | Ty::Bool | Ty::Number | Ty::String, _) => {
            mismatch(raw, target, path, diags);
            Val::Null(target.clone())
        }
        (Ty::List(elem), _) => arr::convert_list(raw, elem, path, diags),
        (Ty::Tuple(elems), _) => arr::convert_tuple(raw, elems, path, diags),
        (Ty::Object(fields), _) => obj::convert_object(raw, fields, path, diags),
        (Ty::Map(elem), _) => obj::convert_map(raw, elem, path, diags),
        (Ty::Dynamic, _) => {
            let err = ConvertError::UnsupportedConversion { target: target.to_string() };
            diags.push(err.into_diagnostic(path));
            null_of(target)
        }
    }
}

// ------------------------------- Helpers ---------------------------------- //

/// `Dynamic` never types a value, so its null is an untyped `Null(Null)`.
fn null_of(target: &Ty) -> Val {
    match target {
        Ty::Dynamic => Val::Null(Ty::Null),
        ty => Val::Null(ty.clone()),
    }
}

fn mismatch(raw: &Value, target: &Ty, path: &str, diags: &mut Diagnostics) {
    let err = ConvertError::TypeMismatch { expected: target.to_string(), actual: kind_name(raw) };
    diags.push(err.into_diagnostic(path));
}

// ------------------------------- Tests ------------------------------------ //
