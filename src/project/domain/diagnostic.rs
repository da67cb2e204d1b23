//! Validation diagnostics and configuration error bags.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a configuration diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticLevel {
    /// Displayed alongside an otherwise usable version.
    Warning,
    /// Blocks build and task expansion.
    Error,
}

/// One finding reported by project configuration validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity.
    pub level: DiagnosticLevel,
    /// Human-readable explanation.
    pub message: String,
}

impl Diagnostic {
    /// Creates a warning-level diagnostic.
    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Warning,
            message: message.into(),
        }
    }

    /// Creates an error-level diagnostic.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Error,
            message: message.into(),
        }
    }

    /// Returns `true` for error-level diagnostics.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self.level, DiagnosticLevel::Error)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.level {
            DiagnosticLevel::Warning => write!(f, "warning: {}", self.message),
            DiagnosticLevel::Error => write!(f, "error: {}", self.message),
        }
    }
}

/// Warning and error messages destined for a version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigDiagnostics {
    /// Warning-level messages.
    pub warnings: Vec<String>,
    /// Error-level messages.
    pub errors: Vec<String>,
}

impl ConfigDiagnostics {
    /// Creates a bag holding a single error message.
    #[must_use]
    pub fn from_error(message: impl Into<String>) -> Self {
        Self {
            warnings: Vec::new(),
            errors: vec![message.into()],
        }
    }

    /// Splits validator diagnostics by level, preserving order.
    #[must_use]
    pub fn from_diagnostics(diagnostics: impl IntoIterator<Item = Diagnostic>) -> Self {
        let (errors, warnings): (Vec<_>, Vec<_>) =
            diagnostics.into_iter().partition(Diagnostic::is_error);
        Self {
            warnings: warnings.into_iter().map(|diagnostic| diagnostic.message).collect(),
            errors: errors.into_iter().map(|diagnostic| diagnostic.message).collect(),
        }
    }

    /// Appends warnings carried over from an earlier stage.
    #[must_use]
    pub fn with_carried_warnings(mut self, warnings: impl IntoIterator<Item = String>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    /// Returns `true` when any error-level message is present.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}
