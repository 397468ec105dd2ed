//! Diagnostic types for the aggregating validation mode.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Severity of a validation finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticLevel {
    Error,
    Warning,
}

/// A single validation finding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub code: String,
    pub path: Option<String>,
    pub message: String,
}

impl Diagnostic {
    pub(crate) fn from_error(err: &ValidationError) -> Self {
        Diagnostic {
            level: DiagnosticLevel::Error,
            code: err.code().to_string(),
            path: err.path().map(str::to_string),
            message: err.to_string(),
        }
    }
}

/// Aggregated result of checking a definition without short-circuiting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationReport {
    /// Only the error-level findings.
    pub fn errors(&self) -> Vec<&Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.level == DiagnosticLevel::Error)
            .collect()
    }

    /// Only the warning-level findings.
    pub fn warnings(&self) -> Vec<&Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.level == DiagnosticLevel::Warning)
            .collect()
    }

    /// Findings at or under a dotted field path, so callers can pull
    /// everything wrong with one state (`States.X`) or one nested
    /// definition (`States.X.Branches[2]`) out of a full report.
    pub fn for_path(&self, prefix: &str) -> Vec<&Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| match d.path.as_deref() {
                Some(path) => match path.strip_prefix(prefix) {
                    Some("") => true,
                    Some(rest) => rest.starts_with('.') || rest.starts_with('['),
                    None => false,
                },
                None => false,
            })
            .collect()
    }
}
