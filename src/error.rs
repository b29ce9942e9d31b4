//! Error types for the two failure channels.
//!
//! Validation failures ([`ValidationError`]) are expected, data-dependent
//! outcomes: they are returned inside reports and never abort a call.
//! Configuration errors ([`ConfigError`]) are caller bugs — an unknown rule
//! name, malformed parameters — and propagate out of `validate` /
//! `validate_target` as `Err`, ideally at resolution time before any value
//! is inspected.
//!
//! String fields use `Cow<'static, str>` for zero-allocation in the common
//! case of static error codes and messages.

use std::borrow::Cow;
use std::fmt;

use serde::Serialize;

// ============================================================================
// VALIDATION ERROR
// ============================================================================

/// A structured validation failure.
///
/// Carries a machine-readable `code`, a default English `message`, the
/// failing field path, ordered message parameters, and (for composite or
/// nested-object failures) the underlying errors. The code plus params are
/// the localization key — see [`Translate`](crate::translate::Translate).
///
/// # Examples
///
/// ```
/// use rulekit::error::ValidationError;
///
/// let error = ValidationError::new("min_length", "Must be at least 3 characters")
///     .with_field("username")
///     .with_param("min", "3")
///     .with_param("actual", "2");
///
/// assert_eq!(error.code, "min_length");
/// assert_eq!(error.param("min"), Some("3"));
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ValidationError {
    /// Error code for programmatic handling and i18n.
    ///
    /// Examples: `min_length`, `required`, `type_mismatch`.
    pub code: Cow<'static, str>,

    /// Default human-readable message in English.
    pub message: Cow<'static, str>,

    /// Field path of the failing value.
    ///
    /// Examples: `email`, `address.city`, `items[2]`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<Cow<'static, str>>,

    /// Ordered key-value parameters for message templating.
    ///
    /// Example: `[("min", "3"), ("actual", "2")]`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<(Cow<'static, str>, Cow<'static, str>)>,

    /// Underlying errors for composite failures (`OneOf` alternatives,
    /// nested object fields, failing array elements).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub nested: Vec<ValidationError>,
}

impl ValidationError {
    /// Creates a new validation error from a code and default message.
    pub fn new(code: impl Into<Cow<'static, str>>, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            field: None,
            params: Vec::new(),
            nested: Vec::new(),
        }
    }

    /// Sets the field path.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_field(mut self, field: impl Into<Cow<'static, str>>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Sets the field path only if one is not already present.
    ///
    /// The engine uses this to stamp the current path onto errors coming
    /// from leaf rules without clobbering paths set by nested evaluation.
    #[must_use = "builder methods must be chained or built"]
    pub fn or_field(mut self, field: impl Into<Cow<'static, str>>) -> Self {
        if self.field.is_none() {
            self.field = Some(field.into());
        }
        self
    }

    /// Adds a message parameter.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_param(
        mut self,
        key: impl Into<Cow<'static, str>>,
        value: impl Into<Cow<'static, str>>,
    ) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Replaces the nested error list.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_nested(mut self, errors: Vec<ValidationError>) -> Self {
        self.nested = errors;
        self
    }

    /// Appends one nested error.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_nested_error(mut self, error: ValidationError) -> Self {
        self.nested.push(error);
        self
    }

    /// Looks up a parameter value by key.
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k.as_ref() == key)
            .map(|(_, v)| v.as_ref())
    }

    /// Returns true if this error carries nested errors.
    #[must_use]
    pub fn has_nested(&self) -> bool {
        !self.nested.is_empty()
    }

    /// Flattens this error and all nested errors, depth-first.
    #[must_use]
    pub fn flatten(&self) -> Vec<&ValidationError> {
        let mut out = vec![self];
        for nested in &self.nested {
            out.extend(nested.flatten());
        }
        out
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) if !field.is_empty() => {
                write!(f, "[{}] {}: {}", field, self.code, self.message)?;
            }
            _ => write!(f, "{}: {}", self.code, self.message)?,
        }

        if !self.nested.is_empty() {
            write!(f, " ({} underlying error(s))", self.nested.len())?;
        }

        Ok(())
    }
}

impl std::error::Error for ValidationError {}

// ============================================================================
// CONVENIENCE CONSTRUCTORS
// ============================================================================

impl ValidationError {
    /// A `required` failure for an absent/null/empty value.
    pub fn required() -> Self {
        Self::new("required", "Value is required")
    }

    /// A `type_mismatch` failure: the value has the wrong JSON type.
    pub fn type_mismatch(
        expected: impl Into<Cow<'static, str>>,
        actual: impl Into<Cow<'static, str>>,
    ) -> Self {
        let expected = expected.into();
        let actual = actual.into();
        Self::new(
            "type_mismatch",
            format!("Expected {expected}, found {actual}"),
        )
        .with_param("expected", expected)
        .with_param("actual", actual)
    }

    /// A failure from a custom rule with no code of its own.
    pub fn custom(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new("custom", message)
    }
}

// ============================================================================
// CONFIGURATION ERRORS
// ============================================================================

/// A caller/programmer mistake, distinct from a validation failure.
///
/// Configuration errors are raised at resolution time where possible and
/// abort the whole `validate` / `validate_target` call. They are never
/// folded into per-field error lists. Match on the variant, not the
/// message text.
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A rule specification referenced a name absent from the registry.
    #[error("rule `{name}` is not registered")]
    UnknownRule {
        /// The unresolvable rule name.
        name: String,
    },

    /// Rule parameters were malformed (wrong shape, wrong type, missing).
    #[error("invalid parameters for rule `{rule}`: {reason}")]
    InvalidParams {
        /// The rule whose parameters are malformed. Filled in by the
        /// engine when the rule itself cannot know its registered name.
        rule: Cow<'static, str>,
        /// What was wrong.
        reason: Cow<'static, str>,
    },

    /// A rule specification could not be parsed.
    #[error("invalid rule specification: {reason}")]
    InvalidSpec {
        /// What was wrong with the specification.
        reason: Cow<'static, str>,
    },

    /// A composite (`OneOf`/`AllOf`/`ArrayOf`) was given no sub-rules.
    #[error("composite rule `{rule}` requires at least one sub-rule")]
    EmptyComposite {
        /// The offending composite marker.
        rule: Cow<'static, str>,
    },

    /// Attempted to register a rule under an engine keyword.
    #[error("`{name}` is a reserved rule name")]
    ReservedName {
        /// The reserved name.
        name: String,
    },

    /// A schema declared the same field twice.
    #[error("field `{field}` is declared more than once")]
    DuplicateField {
        /// The duplicated field name.
        field: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid_params(
        rule: impl Into<Cow<'static, str>>,
        reason: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::InvalidParams {
            rule: rule.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_spec(reason: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidSpec {
            reason: reason.into(),
        }
    }
}

// ============================================================================
// RULE ERROR (ENGINE-INTERNAL UNION)
// ============================================================================

/// The union of both failure channels, as seen from inside a rule body.
///
/// Leaf rules return `Result<(), RuleError>`; the `From` impls let `?`
/// lift either channel. The engine recovers `Invalid` into the report and
/// propagates `Config` out of the call.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    /// A data-dependent validation failure.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// A caller bug (bad parameters, misconfigured rule).
    #[error(transparent)]
    Config(#[from] ConfigError),
}

// ============================================================================
// TESTS
// ============================================================================
