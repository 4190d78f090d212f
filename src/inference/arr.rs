use serde_json::Value;

use super::{infer_at, InferError};
use crate::diag::index_path;
use crate::ir::Ty;

/// `List` when every element agrees with the first, else `Tuple`.
pub(super) fn infer_array(xs: &[Value], path: &str) -> Result<Ty, InferError> {
    if xs.is_empty() {
        return Ok(Ty::list(Ty::Dynamic));
    }

    // every element is inferred either way, so an unsupported value anywhere fails the array
    let mut elems = xs
        .iter()
        .enumerate()
        .map(|(i, el)| infer_at(el, &index_path(path, i)))
        .collect::<Result<Vec<_>, _>>()?;

    let homogeneous = elems[1..].iter().all(|t| *t == elems[0]);
    if homogeneous {
        Ok(Ty::list(elems.swap_remove(0)))
    } else {
        Ok(Ty::Tuple(elems))
    }
}
