//! Custom validation: declarative rules evaluated against candidate
//! documents, plus the post-detection JSON-Schema conformance stage.
//!
//! Rule violations are findings, not errors: evaluation never halts early
//! and always returns the full ordered set. Conformance findings come from
//! the external schema engine and are kept as a separate type; the two are
//! merged only at the report layer.

pub mod config;
pub mod conformance;
pub mod evaluator;

pub use config::{CustomValidationConfig, PropertyRule, ToolRule, UniquenessScope};
pub use conformance::{check_conformance, compile_schema, ConformanceIssue};
pub use evaluator::{evaluate_rules, RuleEvaluator};

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Violations
// ============================================================================

/// Severity of a reported finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViolationSeverity {
    Error,
    Warning,
    Info,
}

impl ViolationSeverity {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for ViolationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One reported failure of a custom-validation rule against the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Rule identifier, e.g. `unique:classification` or `tool:scanner`.
    pub rule: String,
    /// Location within the document, e.g. `metadata.properties[3]`.
    pub path: String,
    /// The offending value (rendered).
    pub value: String,
    /// Human-readable reason.
    pub reason: String,
    pub severity: ViolationSeverity,
}

impl Violation {
    /// Create an error-severity violation.
    #[must_use]
    pub fn new(
        rule: impl Into<String>,
        path: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            rule: rule.into(),
            path: path.into(),
            value: value.into(),
            reason: reason.into(),
            severity: ViolationSeverity::Error,
        }
    }

    /// Downgrade to warning severity.
    #[must_use]
    pub fn warning(mut self) -> Self {
        self.severity = ViolationSeverity::Warning;
        self
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} at {}: {}",
            self.severity, self.rule, self.path, self.reason
        )
    }
}
