//! Error types for invoice tokens and history

use std::fmt;

use thiserror::Error;

/// Why a token could not be turned into an invoice.
///
/// Callers usually only need to know that the link is invalid; the variant
/// and its detail are kept for logs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidInvoice {
    /// Missing or blank token
    #[error("empty invoice token")]
    Empty,

    /// Not valid Base64 after undoing the URL-safe alphabet
    #[error("invalid base64: {0}")]
    Base64(String),

    /// Decoded bytes are not UTF-8
    #[error("invalid UTF-8: {0}")]
    Utf8(String),

    /// Decoded text is not JSON
    #[error("invalid JSON: {0}")]
    Json(String),

    /// JSON does not satisfy the invoice schema
    #[error("schema violation: {0}")]
    Schema(#[from] SchemaError),
}

/// One failing field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaIssue {
    /// JSON field name, `$` for the document itself
    pub field: String,
    pub message: String,
}

impl SchemaIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for SchemaIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every field that failed validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct SchemaError {
    issues: Vec<SchemaIssue>,
}

impl SchemaError {
    pub fn new(issues: Vec<SchemaIssue>) -> Self {
        Self { issues }
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(vec![SchemaIssue::new(field, message)])
    }

    pub fn issues(&self) -> &[SchemaIssue] {
        &self.issues
    }

    /// Names of the failing fields, in schema order
    pub fn fields(&self) -> Vec<&str> {
        let mut fields: Vec<&str> = Vec::new();
        for issue in &self.issues {
            if !fields.contains(&issue.field.as_str()) {
                fields.push(&issue.field);
            }
        }
        fields
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.issues.iter().map(ToString::to_string).collect();
        f.write_str(&rendered.join("; "))
    }
}

#[derive(Debug, Error)]
pub enum HistoryError {
    /// Refused to store a record that fails the schema
    #[error("invalid invoice: {0}")]
    Invalid(#[from] SchemaError),

    #[error("history snapshot is not valid JSON: {0}")]
    Snapshot(#[from] serde_json::Error),
}
