//! Diagnostics accumulated during a conversion.
//!
//! Recoverable problems (a dropped join clause, a failed formula, an
//! unknown connection kind) never abort the run. Each one is recorded as a
//! [`Diagnostic`] naming the source entity and the reason, and the full
//! list is attached to the conversion output for operator review.

/// A diagnostic message tied to a source entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Identifier of the source entity (calculation name, join clause text,
    /// worksheet name, ...).
    pub source: String,
    /// The severity level.
    pub severity: Severity,
    /// Human-readable reason.
    pub message: String,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            severity: Severity::Error,
            message: message.into(),
        }
    }

    /// Create a new warning diagnostic.
    pub fn warning(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Diagnostic severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The entity could not be converted and was skipped or replaced by a
    /// placeholder.
    Error,
    /// The entity was converted but needs manual review.
    Warning,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {}: {}", level, self.source, self.message)
    }
}

impl std::error::Error for Diagnostic {}
