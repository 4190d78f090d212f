//! Append-only diagnostics collected over one inference + conversion pass.
use std::fmt;

/// Path of the document root.
pub const ROOT: &str = "$";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub summary: String,
    pub detail: String,
    /// JSON path of the branch this entry refers to (`$.a[0]`).
    pub path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostic {
    pub fn error(summary: impl Into<String>, detail: impl Into<String>, path: impl Into<String>) -> Self {
        Self { severity: Severity::Error, summary: summary.into(), detail: detail.into(), path: path.into() }
    }

    pub fn warning(summary: impl Into<String>, detail: impl Into<String>, path: impl Into<String>) -> Self {
        Self { severity: Severity::Warning, summary: summary.into(), detail: detail.into(), path: path.into() }
    }

    pub fn is_error(&self) -> bool { self.severity == Severity::Error }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} at {}: {}", self.severity, self.summary, self.path, self.detail)
    }
}

impl Diagnostics {
    pub fn new() -> Self { Self::default() }

    pub fn push(&mut self, diagnostic: Diagnostic) { self.entries.push(diagnostic); }

    pub fn add_error(&mut self, summary: impl Into<String>, detail: impl Into<String>, path: impl Into<String>) {
        self.push(Diagnostic::error(summary, detail, path));
    }

    pub fn add_warning(&mut self, summary: impl Into<String>, detail: impl Into<String>, path: impl Into<String>) {
        self.push(Diagnostic::warning(summary, detail, path));
    }

    pub fn append(&mut self, other: Diagnostics) { self.entries.extend(other.entries); }

    pub fn has_error(&self) -> bool { self.entries.iter().any(Diagnostic::is_error) }
    pub fn error_count(&self) -> usize { self.entries.iter().filter(|d| d.is_error()).count() }
    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> { self.entries.iter() }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;
    fn into_iter(self) -> Self::IntoIter { self.entries.iter() }
}

// ------------------------------- Paths ------------------------------------ //

/// `$.key`, or `$["some key"]` when the key is not a plain identifier.
pub fn key_path(parent: &str, key: &str) -> String {
    let plain = !key.is_empty()
        && !key.starts_with(|c: char| c.is_ascii_digit())
        && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if plain {
        format!("{parent}.{key}")
    } else {
        format!("{parent}[{}]", serde_json::Value::from(key))
    }
}

pub fn index_path(parent: &str, index: usize) -> String {
    format!("{parent}[{index}]")
}

// ------------------------------- Tests ------------------------------------ //
