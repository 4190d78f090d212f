use serde_json::Value;

use super::{convert_at, mismatch, ConvertError};
use crate::diag::{index_path, Diagnostics};
use crate::ir::Ty;
use crate::value::Val;

pub(super) fn convert_list(raw: &Value, elem: &Ty, path: &str, diags: &mut Diagnostics) -> Val {
    let Value::Array(xs) = raw else {
        mismatch(raw, &Ty::list(elem.clone()), path, diags);
        return Val::List { elem: elem.clone(), items: Vec::new() };
    };
    let items = xs
        .iter()
        .enumerate()
        .map(|(i, x)| convert_at(x, elem, &index_path(path, i), diags))
        .collect();
    Val::List { elem: elem.clone(), items }
}

pub(super) fn convert_tuple(raw: &Value, elems: &[Ty], path: &str, diags: &mut Diagnostics) -> Val {
    let target = || Ty::Tuple(elems.to_vec());
    let Value::Array(xs) = raw else {
        mismatch(raw, &target(), path, diags);
        return Val::Null(target());
    };
    if xs.len() != elems.len() {
        let err = ConvertError::ArityMismatch { expected: elems.len(), actual: xs.len() };
        diags.push(err.into_diagnostic(path));
        return Val::Null(target());
    }
    let items = xs
        .iter()
        .zip(elems)
        .enumerate()
        .map(|(i, (x, ty))| convert_at(x, ty, &index_path(path, i), diags))
        .collect();
    Val::Tuple { elems: elems.to_vec(), items }
}
