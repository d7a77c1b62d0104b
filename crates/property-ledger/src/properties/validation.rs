use serde::Serialize;
use utoipa::ToSchema;

/// A single rejected input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

/// Caller-correctable input error with optional per-field details.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
    pub details: Vec<FieldViolation>,
}

impl ValidationError {
    pub fn with_violations(message: impl Into<String>, details: Vec<FieldViolation>) -> Self {
        Self {
            message: message.into(),
            details,
        }
    }

    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            details: vec![FieldViolation {
                field: field.to_string(),
                message: message.clone(),
            }],
            message,
        }
    }

    pub fn violates(&self, field: &str) -> bool {
        self.details.iter().any(|violation| violation.field == field)
    }
}

/// Accumulates field violations before producing a [`ValidationError`].
#[derive(Debug, Default)]
pub(crate) struct Violations(Vec<FieldViolation>);

impl Violations {
    pub(crate) fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.push(FieldViolation {
            field: field.to_string(),
            message: message.into(),
        });
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn into_error(self, message: impl Into<String>) -> ValidationError {
        ValidationError::with_violations(message, self.0)
    }
}
