use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// Deserialization failure annotated with where in the document it happened.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("at JSON path {path} → {message}")]
pub struct PathError {
    pub path: String,
    pub message: String,
}

impl<E: std::fmt::Display> From<serde_path_to_error::Error<E>> for PathError {
    fn from(err: serde_path_to_error::Error<E>) -> Self {
        let path = err.path().to_string();
        Self { path, message: err.into_inner().to_string() }
    }
}

/// Deserialize with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, PathError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    Ok(serde_path_to_error::deserialize::<_, T>(de)?)
}

/// Same, for a document that is already decoded (after `--json-pointer` / `--jq-expr`).
pub fn from_value_with_path<T: DeserializeOwned>(value: Value) -> Result<T, PathError> {
    Ok(serde_path_to_error::deserialize::<_, T>(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Entry {
        #[allow(unused)]
        sensitive: bool,
    }

    #[test]
    fn error_names_the_offending_path() {
        let src = r#"{"a": {"sensitive": true}, "b": {"sensitive": "yes"}}"#;
        let err = from_str_with_path::<std::collections::BTreeMap<String, Entry>>(src).unwrap_err();
        assert_eq!(err.path, "b.sensitive");
    }

    #[test]
    fn decoded_values_report_paths_too() {
        let v = serde_json::json!([{"sensitive": false}, {}]);
        let err = from_value_with_path::<Vec<Entry>>(v).unwrap_err();
        assert_eq!(err.path, "[1]");
        assert!(err.message.contains("sensitive"));
    }
}
