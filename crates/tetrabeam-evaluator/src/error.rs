use std::{io, path::PathBuf};

use serde::Serialize;

use crate::weight_config::CURRENT_SCHEMA_VERSION;

/// One structural problem found in a weight document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, derive_more::Display)]
#[display("{path}: {message}")]
pub struct ValidationIssue {
    /// Dotted JSON path of the offending value (`phases.early.holes`).
    pub path: String,
    pub message: String,
}

impl ValidationIssue {
    #[must_use]
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Why a weight document was rejected.
#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::IsVariant)]
pub enum WeightConfigError {
    #[display("failed to read weight document {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[display("malformed weight document: {_0}")]
    Parse(serde_json::Error),
    #[display("weight document has no schema_version")]
    MissingSchemaVersion,
    #[display("unsupported weight schema version {found} (expected {})", CURRENT_SCHEMA_VERSION)]
    UnsupportedSchemaVersion { found: u64 },
    #[display("weight document failed validation with {} issue(s)", _0.len())]
    Invalid(#[error(not(source))] Vec<ValidationIssue>),
}

impl WeightConfigError {
    /// Every validation issue, if the document was rejected structurally.
    #[must_use]
    pub fn issues(&self) -> &[ValidationIssue] {
        match self {
            Self::Invalid(issues) => issues,
            _ => &[],
        }
    }
}
