use indexmap::IndexMap;
use serde_json::Value;

use super::{convert_at, mismatch};
use crate::diag::{key_path, Diagnostics};
use crate::ir::Ty;
use crate::value::Val;

static MISSING: Value = Value::Null;

/// All-or-nothing: the first failing field turns the whole object into `Null(object)`.
pub(super) fn convert_object(
    raw: &Value,
    fields: &IndexMap<String, Ty>,
    path: &str,
    diags: &mut Diagnostics,
) -> Val {
    let placeholder = || Val::Null(Ty::Object(fields.clone()));
    let Value::Object(map) = raw else {
        mismatch(raw, &Ty::Object(fields.clone()), path, diags);
        return placeholder();
    };

    let mut values = IndexMap::with_capacity(fields.len());
    for (key, ty) in fields {
        let field_raw = map.get(key).unwrap_or(&MISSING);
        let mut field_diags = Diagnostics::new();
        let val = convert_at(field_raw, ty, &key_path(path, key), &mut field_diags);
        let failed = field_diags.has_error();
        diags.append(field_diags);
        if failed {
            return placeholder();
        }
        values.insert(key.clone(), val);
    }
    Val::Object { fields: fields.clone(), values }
}

/// All-or-nothing like objects, but the placeholder is an empty map.
pub(super) fn convert_map(raw: &Value, elem: &Ty, path: &str, diags: &mut Diagnostics) -> Val {
    let empty = || Val::Map { elem: elem.clone(), entries: IndexMap::new() };
    let Value::Object(map) = raw else {
        mismatch(raw, &Ty::map(elem.clone()), path, diags);
        return empty();
    };

    let mut entries = IndexMap::with_capacity(map.len());
    for (key, v) in map {
        let mut entry_diags = Diagnostics::new();
        let val = convert_at(v, elem, &key_path(path, key), &mut entry_diags);
        let failed = entry_diags.has_error();
        diags.append(entry_diags);
        if failed {
            return empty();
        }
        entries.insert(key.clone(), val);
    }
    Val::Map { elem: elem.clone(), entries }
}
