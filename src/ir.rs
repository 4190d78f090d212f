//! Structural type descriptors.
//!
//! `Ty` is the closed shape language shared by inference and conversion. It also has a
//! JSON encoding (type constraints, as state files write them next to each output):
//!
//! ```text
//! "null" | "bool" | "number" | "string" | "dynamic"
//! ["list", T] | ["set", T] | ["map", T] | ["tuple", [T, ...]] | ["object", {k: T}]
//! ```
use std::fmt;

use indexmap::IndexMap;
use serde_json::{json, Value};
use thiserror::Error;

use crate::diag::{index_path, key_path, ROOT};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// Equality is structural: `Object` fields compare as a map (order-independent), `Tuple`
/// elements positionally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ty {
    Null,
    Bool,
    /// every JSON numeric literal; no integer/float split
    Number,
    String,
    /// homogeneous sequence
    List(Box<Ty>),
    /// fixed arity, positional
    Tuple(Vec<Ty>),
    /// fixed field set
    Object(IndexMap<String, Ty>),
    /// homogeneous values under arbitrary keys; never inferred
    Map(Box<Ty>),
    /// element wildcard of an empty list; no value has this type
    Dynamic,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid type constraint at {path}: {reason}")]
pub struct TypeSyntaxError {
    pub path: String,
    pub reason: String,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl Ty {
    pub fn list(elem: Ty) -> Self { Ty::List(Box::new(elem)) }
    pub fn map(elem: Ty) -> Self { Ty::Map(Box::new(elem)) }

    pub fn object<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Ty)>,
    {
        Ty::Object(fields.into_iter().map(|(k, t)| (k.into(), t)).collect())
    }

    /// Short name of the outermost kind, as used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Ty::Null => "null",
            Ty::Bool => "bool",
            Ty::Number => "number",
            Ty::String => "string",
            Ty::List(_) => "list",
            Ty::Tuple(_) => "tuple",
            Ty::Object(_) => "object",
            Ty::Map(_) => "map",
            Ty::Dynamic => "dynamic",
        }
    }

    /// True if `Dynamic` appears anywhere in the descriptor.
    pub fn contains_dynamic(&self) -> bool {
        match self {
            Ty::Dynamic => true,
            Ty::List(t) | Ty::Map(t) => t.contains_dynamic(),
            Ty::Tuple(ts) => ts.iter().any(Ty::contains_dynamic),
            Ty::Object(fs) => fs.values().any(Ty::contains_dynamic),
            Ty::Null | Ty::Bool | Ty::Number | Ty::String => false,
        }
    }

    pub fn to_type_json(&self) -> Value {
        match self {
            Ty::List(t) => json!(["list", t.to_type_json()]),
            Ty::Map(t) => json!(["map", t.to_type_json()]),
            Ty::Tuple(ts) => {
                let elems: Vec<Value> = ts.iter().map(Ty::to_type_json).collect();
                json!(["tuple", elems])
            }
            Ty::Object(fs) => {
                let fields: serde_json::Map<String, Value> = fs
                    .iter()
                    .map(|(k, t)| (k.clone(), t.to_type_json()))
                    .collect();
                json!(["object", fields])
            }
            scalar => Value::from(scalar.kind_name()),
        }
    }

    pub fn from_type_json(v: &Value) -> Result<Ty, TypeSyntaxError> {
        parse_type(v, ROOT)
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::List(t) => write!(f, "list({t})"),
            Ty::Map(t) => write!(f, "map({t})"),
            Ty::Tuple(ts) => {
                f.write_str("tuple([")?;
                for (i, t) in ts.iter().enumerate() {
                    if i > 0 { f.write_str(", ")?; }
                    write!(f, "{t}")?;
                }
                f.write_str("])")
            }
            Ty::Object(fs) => {
                f.write_str("object({")?;
                for (i, (k, t)) in fs.iter().enumerate() {
                    if i > 0 { f.write_str(", ")?; }
                    write!(f, "{k} = {t}")?;
                }
                f.write_str("})")
            }
            scalar => f.write_str(scalar.kind_name()),
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn syntax(path: &str, reason: impl Into<String>) -> TypeSyntaxError {
    TypeSyntaxError { path: path.to_string(), reason: reason.into() }
}

fn parse_type(v: &Value, path: &str) -> Result<Ty, TypeSyntaxError> {
    match v {
        Value::String(name) => match name.as_str() {
            "null" => Ok(Ty::Null),
            "bool" => Ok(Ty::Bool),
            "number" => Ok(Ty::Number),
            "string" => Ok(Ty::String),
            "dynamic" => Ok(Ty::Dynamic),
            other => Err(syntax(path, format!("unknown primitive type `{other}`"))),
        },
        Value::Array(parts) => {
            let (kind, arg) = match parts.as_slice() {
                [kind, arg] => (kind, arg),
                // object constraints may carry a trailing list of optional attributes
                [kind, arg, _] if kind.as_str() == Some("object") => (kind, arg),
                _ => {
                    return Err(syntax(
                        path,
                        format!("expected a [kind, argument] pair, found {} elements", parts.len()),
                    ));
                }
            };
            let Some(kind) = kind.as_str() else {
                return Err(syntax(&index_path(path, 0), "type kind must be a string"));
            };
            let arg_path = index_path(path, 1);
            match kind {
                "list" | "set" => Ok(Ty::list(parse_type(arg, &arg_path)?)),
                "map" => Ok(Ty::map(parse_type(arg, &arg_path)?)),
                "tuple" => {
                    let Some(elems) = arg.as_array() else {
                        return Err(syntax(&arg_path, "tuple elements must be an array"));
                    };
                    elems
                        .iter()
                        .enumerate()
                        .map(|(i, e)| parse_type(e, &index_path(&arg_path, i)))
                        .collect::<Result<Vec<_>, TypeSyntaxError>>()
                        .map(Ty::Tuple)
                }
                "object" => {
                    let Some(fields) = arg.as_object() else {
                        return Err(syntax(&arg_path, "object attributes must be an object"));
                    };
                    fields
                        .iter()
                        .map(|(k, t)| Ok((k.clone(), parse_type(t, &key_path(&arg_path, k))?)))
                        .collect::<Result<IndexMap<_, _>, TypeSyntaxError>>()
                        .map(Ty::Object)
                }
                other => Err(syntax(&index_path(path, 0), format!("unknown type kind `{other}`"))),
            }
        }
        other => Err(syntax(
            path,
            format!("expected a string or array, found {}", crate::inference::kind_name(other)),
        )),
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_equality_ignores_field_order() {
        let a = Ty::object([("a", Ty::Number), ("b", Ty::String)]);
        let b = Ty::object([("b", Ty::String), ("a", Ty::Number)]);
        assert_eq!(a, b);
    }

    #[test]
    fn tuple_equality_is_positional() {
        let a = Ty::Tuple(vec![Ty::Number, Ty::String]);
        let b = Ty::Tuple(vec![Ty::String, Ty::Number]);
        assert_ne!(a, b);
    }

    #[test]
    fn type_json_round_trips_every_kind() {
        let ty = Ty::object([
            ("names", Ty::list(Ty::String)),
            ("tags", Ty::map(Ty::String)),
            ("pair", Ty::Tuple(vec![Ty::Number, Ty::Bool])),
            ("nothing", Ty::Null),
            ("empty", Ty::list(Ty::Dynamic)),
        ]);
        let encoded = ty.to_type_json();
        assert_eq!(encoded[1]["tags"], json!(["map", "string"]));
        assert_eq!(Ty::from_type_json(&encoded).unwrap(), ty);
    }

    #[test]
    fn sets_read_as_lists_and_optional_attrs_are_ignored() {
        let set = Ty::from_type_json(&json!(["set", "number"])).unwrap();
        assert_eq!(set, Ty::list(Ty::Number));

        let obj = Ty::from_type_json(&json!(["object", {"a": "bool"}, ["a"]])).unwrap();
        assert_eq!(obj, Ty::object([("a", Ty::Bool)]));
    }

    #[test]
    fn malformed_constraints_report_their_path() {
        let err = Ty::from_type_json(&json!(["object", {"a": ["list", "float"]}])).unwrap_err();
        assert_eq!(err.path, "$[1].a[1]");
        assert!(err.reason.contains("float"));

        let err = Ty::from_type_json(&json!(["tuple", "number"])).unwrap_err();
        assert_eq!(err.path, "$[1]");

        let err = Ty::from_type_json(&json!(42)).unwrap_err();
        assert_eq!(err.path, "$");
    }

    #[test]
    fn display_is_readable() {
        let ty = Ty::object([("a", Ty::list(Ty::Number)), ("b", Ty::Tuple(vec![Ty::String, Ty::Null]))]);
        assert_eq!(ty.to_string(), "object({a = list(number), b = tuple([string, null])})");
    }
}
