//! Single-document structural type inference.
//!
//! Decoded JSON in, one `Ty` out, depth-first with no sampling or history:
//! - scalars map to their kind; every numeric literal is `Number`
//! - an empty array is `List(Dynamic)`: its element type is unknowable
//! - a non-empty array is a `List` when every element infers the same descriptor,
//!   otherwise a positional `Tuple` of each element's own descriptor (no unions)
//! - an object is always an `Object` over exactly its keys (never a `Map`)
//!
//! Recursion depth follows the document's nesting; there is no cap.
mod arr;
mod obj;

use serde_json::Value;
use thiserror::Error;

use crate::diag::ROOT;
use crate::ir::Ty;

/// `serde_json::Value` only carries the six JSON kinds, so documents decoded by this crate
/// never produce it; it exists for values built from other decoders.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InferError {
    #[error("unsupported value at {path}: {kind}")]
    UnsupportedValue { path: String, kind: String },
}

impl InferError {
    /// Path of the branch that could not be inferred.
    pub fn path(&self) -> &str {
        match self {
            InferError::UnsupportedValue { path, .. } => path,
        }
    }
}

// ------------------------------- Front API -------------------------------- //

pub fn infer(v: &Value) -> Result<Ty, InferError> {
    infer_at(v, ROOT)
}

/// Infer with errors reported relative to `path`.
pub fn infer_at(v: &Value, path: &str) -> Result<Ty, InferError> {
    match v {
        Value::Null => Ok(Ty::Null),
        Value::Bool(_) => Ok(Ty::Bool),
        // literals are kept verbatim, so magnitude never matters
        Value::Number(_) => Ok(Ty::Number),
        Value::String(_) => Ok(Ty::String),
        Value::Array(xs) => arr::infer_array(xs, path),
        Value::Object(m) => obj::infer_object(m, path),
    }
}

/// Kind of a raw JSON value, as used in diagnostics.
pub fn kind_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalars_map_to_their_kind() {
        assert_eq!(infer(&json!(null)).unwrap(), Ty::Null);
        assert_eq!(infer(&json!(true)).unwrap(), Ty::Bool);
        assert_eq!(infer(&json!("x")).unwrap(), Ty::String);
        assert_eq!(infer(&json!(3)).unwrap(), Ty::Number);
        assert_eq!(infer(&json!(-3.25)).unwrap(), Ty::Number);
    }

    #[test]
    fn empty_array_is_list_of_dynamic() {
        assert_eq!(infer(&json!([])).unwrap(), Ty::list(Ty::Dynamic));
    }

    #[test]
    fn homogeneous_array_is_list() {
        assert_eq!(infer(&json!([1, 2, 3])).unwrap(), Ty::list(Ty::Number));
        // integer and float literals share one kind
        assert_eq!(infer(&json!([1, 2.5])).unwrap(), Ty::list(Ty::Number));
    }

    #[test]
    fn heterogeneous_array_is_tuple() {
        assert_eq!(
            infer(&json!([1, "a", true])).unwrap(),
            Ty::Tuple(vec![Ty::Number, Ty::String, Ty::Bool])
        );
    }

    #[test]
    fn nested_shapes_decide_list_vs_tuple() {
        // same-shaped objects stay a list
        let same = json!([{"a": 1, "b": "x"}, {"b": "y", "a": 2}]);
        assert_eq!(
            infer(&same).unwrap(),
            Ty::list(Ty::object([("a", Ty::Number), ("b", Ty::String)]))
        );

        // a missing key is a different shape
        let ragged = json!([{"a": 1}, {"a": 1, "b": 2}]);
        let Ty::Tuple(elems) = infer(&ragged).unwrap() else { panic!("expected tuple") };
        assert_eq!(elems.len(), 2);

        // inner lists of different lengths still share a list type
        let lists = json!([[1, 2], [3]]);
        assert_eq!(infer(&lists).unwrap(), Ty::list(Ty::list(Ty::Number)));
    }

    #[test]
    fn object_fields_are_exactly_input_keys() {
        let ty = infer(&json!({"a": 1, "b": "x"})).unwrap();
        assert_eq!(ty, Ty::object([("b", Ty::String), ("a", Ty::Number)]));
        assert_eq!(ty, infer(&json!({"b": "x", "a": 1})).unwrap());
        assert_eq!(infer(&json!({})).unwrap(), Ty::object::<String, _>([]));
    }

    #[test]
    fn reinference_is_stable() {
        let v = json!({"net": {"cidrs": ["10.0.0.0/16"], "ports": [80, "https"]}, "tags": {}});
        assert_eq!(infer(&v).unwrap(), infer(&v).unwrap());
    }

    #[test]
    fn numbers_beyond_double_range_are_numbers() {
        let v: Value = serde_json::from_str(r#"{"ok": [1, 2], "huge": [1, 1e400]}"#).unwrap();
        assert_eq!(
            infer(&v).unwrap(),
            Ty::object([("ok", Ty::list(Ty::Number)), ("huge", Ty::list(Ty::Number))])
        );
        assert_eq!(infer(&serde_json::from_str("-1e400").unwrap()).unwrap(), Ty::Number);
    }

    #[test]
    fn errors_expose_the_failing_path() {
        let err = InferError::UnsupportedValue { path: "$.a[2]".into(), kind: "blob".into() };
        assert_eq!(err.path(), "$.a[2]");
        assert_eq!(err.to_string(), "unsupported value at $.a[2]: blob");
    }

    #[test]
    fn big_integers_stay_supported() {
        let v: Value = serde_json::from_str("123456789012345678901234567890").unwrap();
        assert_eq!(infer(&v).unwrap(), Ty::Number);
    }
}
