//! Raw rule specifications.
//!
//! A [`RuleSpec`] is the heterogeneous, caller-facing description of one
//! validation step: a bare rule name, a parameterized name, an inline
//! function, a composite over sub-specifications, or a nested schema. An
//! ordered slice of specs describes one chain. Specs are inert data — the
//! [`Resolver`](crate::resolve::Resolver) turns them into invocable
//! chains, and that is where unknown names and malformed shapes surface
//! as configuration errors.
//!
//! Specs can be written two ways, mirroring the two API surfaces:
//!
//! - **DSL constructors** for code-defined chains:
//!
//!   ```
//!   use rulekit::spec::{required, rule, with_params};
//!   use serde_json::json;
//!
//!   let chain = [required(), rule("Email"), with_params("MinLength", [json!(6)])];
//!   ```
//!
//! - **JSON** for data-driven chains (`RuleSpec::from_value`):
//!   a bare string (`"Email"`) or a single-key object whose value is the
//!   parameter list (`{"MinLength": [6]}`). Composite keys (`OneOf`,
//!   `AllOf`, `ArrayOf`) take a list of sub-specifications instead.

use std::borrow::Cow;
use std::sync::Arc;

use serde_json::Value;

use crate::context::RuleContext;
use crate::error::ConfigError;
use crate::rule::{sync_rule, RuleResult, SharedRule};
use crate::schema::Schema;

// ============================================================================
// ENGINE KEYWORDS
// ============================================================================

/// Names the resolver intercepts before registry lookup.
pub(crate) mod keyword {
    /// Skip sentinel: fails on absent/null/empty-string values.
    pub const REQUIRED: &str = "Required";
    /// Skip sentinel: bypasses the rest of the chain for absent values.
    pub const OPTIONAL: &str = "Optional";
    /// Skip sentinel: bypasses the rest of the chain for absent or null values.
    pub const NULLABLE: &str = "Nullable";
    /// Skip sentinel: bypasses the rest of the chain for empty strings.
    pub const EMPTY: &str = "Empty";

    pub const ONE_OF: &str = "OneOf";
    pub const ALL_OF: &str = "AllOf";
    pub const ARRAY_OF: &str = "ArrayOf";

    pub fn is_sentinel(name: &str) -> bool {
        matches!(name, REQUIRED | OPTIONAL | NULLABLE | EMPTY)
    }

    pub fn is_composite(name: &str) -> bool {
        matches!(name, ONE_OF | ALL_OF | ARRAY_OF)
    }

    pub fn is_reserved(name: &str) -> bool {
        is_sentinel(name) || is_composite(name)
    }
}

// ============================================================================
// RULE SPEC
// ============================================================================

/// One entry in a raw rule chain.
#[derive(Clone)]
pub enum RuleSpec {
    /// A zero-parameter rule referenced by registered name, or a skip
    /// sentinel (`Required` / `Optional` / `Nullable` / `Empty`).
    Name(Cow<'static, str>),

    /// A registered rule with a parameter list.
    With {
        /// Registered rule name.
        name: Cow<'static, str>,
        /// Ordered, rule-specific parameters. Opaque to the engine.
        params: Vec<Value>,
    },

    /// An inline rule function, bypassing the registry.
    Inline(SharedRule),

    /// Passes if at least one sub-specification passes on the same value.
    OneOf(Vec<RuleSpec>),

    /// Passes if every sub-specification passes on the same value.
    AllOf(Vec<RuleSpec>),

    /// Requires an array value; every element must pass every
    /// sub-specification.
    ArrayOf(Vec<RuleSpec>),

    /// Recursive object validation against a sub-schema.
    Nested(Arc<Schema>),
}

impl RuleSpec {
    /// Parses a specification from its JSON form.
    ///
    /// # Errors
    ///
    /// `ConfigError::InvalidSpec` for shapes that are not a string or a
    /// single-key object; `ConfigError::InvalidParams` when a rule's
    /// parameter value is not an array.
    pub fn from_value(value: &Value) -> Result<Self, ConfigError> {
        match value {
            Value::String(name) => Ok(RuleSpec::Name(Cow::Owned(name.clone()))),
            Value::Object(map) => {
                let mut entries = map.iter();
                let (name, payload) = entries.next().ok_or_else(|| {
                    ConfigError::invalid_spec("empty object is not a rule specification")
                })?;
                if entries.next().is_some() {
                    return Err(ConfigError::invalid_spec(
                        "rule specification objects must have exactly one key",
                    ));
                }

                let items = payload.as_array().ok_or_else(|| {
                    ConfigError::invalid_params(
                        name.clone(),
                        format!("expected an array, found {}", crate::rules::json_type(payload)),
                    )
                })?;

                if keyword::is_composite(name) {
                    let subs = items
                        .iter()
                        .map(RuleSpec::from_value)
                        .collect::<Result<Vec<_>, _>>()?;
                    Ok(match name.as_str() {
                        keyword::ONE_OF => RuleSpec::OneOf(subs),
                        keyword::ALL_OF => RuleSpec::AllOf(subs),
                        _ => RuleSpec::ArrayOf(subs),
                    })
                } else {
                    Ok(RuleSpec::With {
                        name: Cow::Owned(name.clone()),
                        params: items.clone(),
                    })
                }
            }
            other => Err(ConfigError::invalid_spec(format!(
                "expected a string or single-key object, found {}",
                crate::rules::json_type(other)
            ))),
        }
    }

    /// Parses a whole chain from a JSON array of specifications.
    pub fn chain_from_value(value: &Value) -> Result<Vec<Self>, ConfigError> {
        let items = value.as_array().ok_or_else(|| {
            ConfigError::invalid_spec(format!(
                "expected an array of rule specifications, found {}",
                crate::rules::json_type(value)
            ))
        })?;
        items.iter().map(RuleSpec::from_value).collect()
    }

    /// The display name of this specification, for diagnostics.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self {
            RuleSpec::Name(name) | RuleSpec::With { name, .. } => name,
            RuleSpec::Inline(_) => "<inline>",
            RuleSpec::OneOf(_) => keyword::ONE_OF,
            RuleSpec::AllOf(_) => keyword::ALL_OF,
            RuleSpec::ArrayOf(_) => keyword::ARRAY_OF,
            RuleSpec::Nested(_) => "<nested>",
        }
    }
}

impl std::fmt::Debug for RuleSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleSpec::Name(name) => f.debug_tuple("Name").field(name).finish(),
            RuleSpec::With { name, params } => f
                .debug_struct("With")
                .field("name", name)
                .field("params", params)
                .finish(),
            RuleSpec::Inline(_) => f.write_str("Inline(..)"),
            RuleSpec::OneOf(subs) => f.debug_tuple("OneOf").field(subs).finish(),
            RuleSpec::AllOf(subs) => f.debug_tuple("AllOf").field(subs).finish(),
            RuleSpec::ArrayOf(subs) => f.debug_tuple("ArrayOf").field(subs).finish(),
            RuleSpec::Nested(schema) => f.debug_tuple("Nested").field(schema).finish(),
        }
    }
}

// ============================================================================
// DSL CONSTRUCTORS
// ============================================================================

/// A zero-parameter rule by registered name.
#[must_use]
pub fn rule(name: impl Into<Cow<'static, str>>) -> RuleSpec {
    RuleSpec::Name(name.into())
}

/// A rule by registered name with a parameter list.
///
/// ```
/// use rulekit::spec::with_params;
/// use serde_json::json;
///
/// let spec = with_params("Between", [json!(1), json!(10)]);
/// ```
#[must_use]
pub fn with_params(
    name: impl Into<Cow<'static, str>>,
    params: impl IntoIterator<Item = Value>,
) -> RuleSpec {
    RuleSpec::With {
        name: name.into(),
        params: params.into_iter().collect(),
    }
}

/// The `Required` sentinel: fails for absent, null, or empty-string values.
#[must_use]
pub fn required() -> RuleSpec {
    RuleSpec::Name(Cow::Borrowed(keyword::REQUIRED))
}

/// The `Optional` sentinel: skips the rest of the chain for absent values
/// (explicit null is still validated).
#[must_use]
pub fn optional() -> RuleSpec {
    RuleSpec::Name(Cow::Borrowed(keyword::OPTIONAL))
}

/// The `Nullable` sentinel: skips the rest of the chain for absent or null
/// values.
#[must_use]
pub fn nullable() -> RuleSpec {
    RuleSpec::Name(Cow::Borrowed(keyword::NULLABLE))
}

/// The `Empty` sentinel: skips the rest of the chain for empty strings.
#[must_use]
pub fn empty() -> RuleSpec {
    RuleSpec::Name(Cow::Borrowed(keyword::EMPTY))
}

/// OR composite over sub-specifications.
#[must_use]
pub fn one_of(subs: impl IntoIterator<Item = RuleSpec>) -> RuleSpec {
    RuleSpec::OneOf(subs.into_iter().collect())
}

/// AND composite over sub-specifications.
#[must_use]
pub fn all_of(subs: impl IntoIterator<Item = RuleSpec>) -> RuleSpec {
    RuleSpec::AllOf(subs.into_iter().collect())
}

/// Per-element composite over sub-specifications.
#[must_use]
pub fn array_of(subs: impl IntoIterator<Item = RuleSpec>) -> RuleSpec {
    RuleSpec::ArrayOf(subs.into_iter().collect())
}

/// Recursive validation of an object value against `schema`.
#[must_use]
pub fn nested(schema: impl Into<Arc<Schema>>) -> RuleSpec {
    RuleSpec::Nested(schema.into())
}

/// An inline rule from an already-built [`SharedRule`].
#[must_use]
pub fn inline(rule: SharedRule) -> RuleSpec {
    RuleSpec::Inline(rule)
}

/// An inline rule from a plain synchronous predicate.
///
/// ```
/// use rulekit::spec::custom;
/// use rulekit::error::ValidationError;
///
/// let even = custom(|ctx| match ctx.value.and_then(|v| v.as_i64()) {
///     Some(n) if n % 2 == 0 => Ok(()),
///     _ => Err(ValidationError::custom("must be even").into()),
/// });
/// ```
#[must_use]
pub fn custom<F>(func: F) -> RuleSpec
where
    F: Fn(&RuleContext<'_>) -> RuleResult + Send + Sync + 'static,
{
    RuleSpec::Inline(sync_rule(func))
}
