use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Period;

/// Errors that can occur during ledger, reconciliation, or filing operations.
///
/// Every variant maps to a stable machine-readable code via [`GstError::code`]
/// so transport layers can surface errors without string matching.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GstError {
    /// One or more validation rules failed. No state was changed.
    #[error("validation failed: {0}")]
    Validation(String),

    /// GST rate outside the enumerated slabs (0, 5, 12, 18, 28) or negative.
    #[error("invalid GST rate: {0}% is not a recognised slab")]
    InvalidRate(rust_decimal::Decimal),

    /// Referenced invoice, filing, or period does not exist.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// Illegal lifecycle transition, naming the current and attempted states.
    #[error("invalid transition from '{from}' to '{attempted}'")]
    InvalidTransition { from: String, attempted: String },

    /// Duplicate filing for a (return type, period) pair, or an operation
    /// attempted against a filing that has moved past the draft stage.
    #[error("conflict: {0}")]
    Conflict(String),
}

impl GstError {
    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION",
            Self::InvalidRate(_) => "INVALID_RATE",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::Conflict(_) => "CONFLICT",
        }
    }
}

/// A single validation error with field path and message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Dot-separated path to the invalid field (e.g. "counterparty_gstin").
    pub field: String,
    /// Human-readable error description.
    pub message: String,
    /// CGST rule reference if applicable (e.g. "Rule 46(b)").
    pub rule: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(rule) = &self.rule {
            write!(f, "[{}] {}: {}", rule, self.field, self.message)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

impl ValidationError {
    /// Create a validation error without a rule reference.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: None,
        }
    }

    /// Create a validation error with a CGST rule reference.
    pub fn with_rule(
        field: impl Into<String>,
        message: impl Into<String>,
        rule: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: Some(rule.into()),
        }
    }
}

/// Collapse a non-empty list of validation errors into a single
/// [`GstError::Validation`].
pub(crate) fn validation_failure(errors: &[ValidationError]) -> GstError {
    let msg = errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ");
    GstError::Validation(msg)
}

/// Non-fatal condition surfaced in a response payload rather than thrown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ComputationWarning {
    /// GSTR-3B was generated without a reconciliation run for the period;
    /// available ITC is reported as zero, never inferred from unreconciled
    /// purchase invoices.
    ReconciliationMissing { period: Period },
}

impl std::fmt::Display for ComputationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReconciliationMissing { period } => write!(
                f,
                "no reconciliation has been run for period {period}; ITC reported as zero"
            ),
        }
    }
}
