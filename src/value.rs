//! Typed value trees produced by conversion.
use indexmap::IndexMap;
use serde_json::{Number, Value};

use crate::ir::Ty;

/// A value paired with its descriptor at every level.
///
/// Failed branches and JSON `null`s are `Null(ty)`: a null that still knows which type it
/// stands in for, so the surrounding tree stays well-typed.
#[derive(Debug, Clone, PartialEq)]
pub enum Val {
    Null(Ty),
    Bool(bool),
    /// exact literal; never round-tripped through f64
    Number(Number),
    String(String),
    List { elem: Ty, items: Vec<Val> },
    Tuple { elems: Vec<Ty>, items: Vec<Val> },
    /// `values` has exactly the keys of `fields`
    Object { fields: IndexMap<String, Ty>, values: IndexMap<String, Val> },
    Map { elem: Ty, entries: IndexMap<String, Val> },
}

impl Val {
    pub fn ty(&self) -> Ty {
        match self {
            Val::Null(ty) => ty.clone(),
            Val::Bool(_) => Ty::Bool,
            Val::Number(_) => Ty::Number,
            Val::String(_) => Ty::String,
            Val::List { elem, .. } => Ty::List(Box::new(elem.clone())),
            Val::Tuple { elems, .. } => Ty::Tuple(elems.clone()),
            Val::Object { fields, .. } => Ty::Object(fields.clone()),
            Val::Map { elem, .. } => Ty::Map(Box::new(elem.clone())),
        }
    }

    pub fn is_null(&self) -> bool { matches!(self, Val::Null(_)) }

    /// Field of an object or entry of a map.
    pub fn get(&self, key: &str) -> Option<&Val> {
        match self {
            Val::Object { values, .. } => values.get(key),
            Val::Map { entries, .. } => entries.get(key),
            _ => None,
        }
    }

    /// Element of a list or tuple.
    pub fn at(&self, index: usize) -> Option<&Val> {
        match self {
            Val::List { items, .. } | Val::Tuple { items, .. } => items.get(index),
            _ => None,
        }
    }

    /// Render back to plain JSON. Typed nulls become `null`.
    pub fn to_json(&self) -> Value {
        match self {
            Val::Null(_) => Value::Null,
            Val::Bool(b) => Value::Bool(*b),
            Val::Number(n) => Value::Number(n.clone()),
            Val::String(s) => Value::String(s.clone()),
            Val::List { items, .. } | Val::Tuple { items, .. } => {
                Value::Array(items.iter().map(Val::to_json).collect())
            }
            Val::Object { values: kvs, .. } | Val::Map { entries: kvs, .. } => {
                Value::Object(kvs.iter().map(|(k, v)| (k.clone(), v.to_json())).collect())
            }
        }
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn typed_null_reports_its_placeholder_type() {
        let v = Val::Null(Ty::list(Ty::Number));
        assert!(v.is_null());
        assert_eq!(v.ty(), Ty::list(Ty::Number));
        assert_eq!(v.to_json(), Value::Null);
    }

    #[test]
    fn composite_renders_in_field_order() {
        let fields: IndexMap<String, Ty> =
            [("b".to_string(), Ty::String), ("a".to_string(), Ty::Bool)].into_iter().collect();
        let values: IndexMap<String, Val> = [
            ("b".to_string(), Val::String("x".into())),
            ("a".to_string(), Val::Null(Ty::Bool)),
        ]
        .into_iter()
        .collect();
        let obj = Val::Object { fields, values };
        assert_eq!(obj.to_json().to_string(), r#"{"b":"x","a":null}"#);
        assert_eq!(obj.get("b"), Some(&Val::String("x".into())));
        assert_eq!(obj.ty(), Ty::object([("a", Ty::Bool), ("b", Ty::String)]));
    }

    #[test]
    fn list_and_tuple_index() {
        let list = Val::List { elem: Ty::Number, items: vec![Val::Number(Number::from(7))] };
        assert_eq!(list.at(0).map(Val::to_json), Some(json!(7)));
        assert_eq!(list.at(1), None);
        assert_eq!(list.get("x"), None);
    }
}
