use indexmap::IndexMap;
use serde_json::{Map, Value};

use super::{infer_at, InferError};
use crate::diag::key_path;
use crate::ir::Ty;

pub(super) fn infer_object(map: &Map<String, Value>, path: &str) -> Result<Ty, InferError> {
    let mut fields = IndexMap::with_capacity(map.len());
    for (k, v) in map {
        fields.insert(k.clone(), infer_at(v, &key_path(path, k))?);
    }
    Ok(Ty::Object(fields))
}
