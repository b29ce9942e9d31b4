//! Result carriers returned by the public entry points.

use serde::Serialize;
use serde_json::Value;

use crate::error::ValidationError;

/// Outcome of single-value validation.
///
/// Validation failures live *inside* the report; only configuration
/// errors escape as `Err` from the validating call.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Whether the chain passed.
    pub is_valid: bool,

    /// Translated message of the first failure, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Structured detail of the first failure, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ValidationError>,
}

impl Report {
    pub(crate) fn pass() -> Self {
        Self {
            is_valid: true,
            message: None,
            error: None,
        }
    }

    pub(crate) fn fail(message: String, error: ValidationError) -> Self {
        Self {
            is_valid: false,
            message: Some(message),
            error: Some(error),
        }
    }
}

/// One failing field in a target (object) validation.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    /// Dotted/indexed path of the failing field (`email`, `address.city`,
    /// `tags[2]`).
    pub field: String,

    /// Translated failure message.
    pub message: String,

    /// Structured failure detail.
    pub error: ValidationError,
}

/// Outcome of target (object) validation.
///
/// Unlike a single chain, target validation never stops at the first
/// failing field: `errors` holds every field-level failure, in schema
/// declaration order.
#[derive(Debug, Clone, Serialize)]
pub struct TargetReport {
    /// True iff `errors` is empty.
    pub is_valid: bool,

    /// Every field-level failure, in schema declaration order.
    pub errors: Vec<FieldError>,

    /// The validated data, echoed back.
    pub data: Value,
}

impl TargetReport {
    /// Failure messages keyed by field path, for quick assertions and
    /// form-style display.
    #[must_use]
    pub fn messages(&self) -> Vec<(&str, &str)> {
        self.errors
            .iter()
            .map(|e| (e.field.as_str(), e.message.as_str()))
            .collect()
    }

    /// The error for a specific field path, if that field failed.
    #[must_use]
    pub fn error_for(&self, field: &str) -> Option<&FieldError> {
        self.errors.iter().find(|e| e.field == field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_serialization_omits_success_noise() {
        let json = serde_json::to_value(Report::pass()).unwrap();
        assert_eq!(json, serde_json::json!({ "is_valid": true }));
    }

    #[test]
    fn target_report_lookup() {
        let report = TargetReport {
            is_valid: false,
            errors: vec![FieldError {
                field: "email".into(),
                message: "Value is required".into(),
                error: ValidationError::required().with_field("email"),
            }],
            data: serde_json::json!({}),
        };

        assert!(report.error_for("email").is_some());
        assert!(report.error_for("name").is_none());
        assert_eq!(report.messages(), vec![("email", "Value is required")]);
    }
}
