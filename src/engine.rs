//! Chain evaluation: skip sentinels, short-circuiting, composites,
//! nested recursion.
//!
//! Evaluation is a small left-to-right state machine over a resolved
//! [`RuleChain`]. A chain is RUNNING until one of three things happens:
//! a unit fails (FAILED — first failure wins, later units never run), a
//! skip sentinel triggers (SKIPPED — the rest of the chain is bypassed
//! and the chain passes), or the chain ends (PASSED). Sentinels only
//! affect units *after* themselves; a sentinel following a failing unit
//! is never reached.
//!
//! Every unit is awaited before the next is considered: later units may
//! depend on the skip-state established by earlier ones, so there is no
//! fan-out within one chain. Recursion (composites, nested schemas) goes
//! through boxed futures.

use std::any::Any;

use futures::future::BoxFuture;
use serde_json::Value;
use tracing::{debug, trace};

use crate::context::RuleContext;
use crate::error::{ConfigError, RuleError, ValidationError};
use crate::resolve::{RuleChain, SkipKind, UnitKind};
use crate::schema::Schema;
use crate::translate::Translate;

/// Error code for a nested-object failure; the orchestrator flattens
/// errors with this code into individual per-field entries.
pub(crate) const OBJECT_INVALID: &str = "object_invalid";

/// Call-scoped evaluation state shared by every unit in one validation
/// call. Holds only borrows; the engine itself is stateless between
/// calls.
pub(crate) struct Engine<'a> {
    pub(crate) translator: &'a dyn Translate,
    pub(crate) custom: Option<&'a (dyn Any + Send + Sync)>,
}

impl<'a> Engine<'a> {
    /// Evaluates one chain against one value.
    ///
    /// `Ok(())` covers both PASSED and SKIPPED terminal states;
    /// `Err(Invalid)` is a validation failure, `Err(Config)` a caller bug
    /// that aborts the whole call.
    pub(crate) fn eval_chain<'e>(
        &'e self,
        chain: &'e RuleChain,
        value: Option<&'e Value>,
        field: &'e str,
    ) -> BoxFuture<'e, Result<(), RuleError>> {
        Box::pin(async move {
            for unit in chain {
                trace!(rule = %unit.name, field, "evaluating rule");
                match &unit.kind {
                    UnitKind::Skip(kind) => {
                        match self.eval_sentinel(*kind, value, field)? {
                            SentinelOutcome::Continue => {}
                            SentinelOutcome::SkipRest => {
                                debug!(sentinel = kind.name(), field, "chain skipped");
                                return Ok(());
                            }
                        }
                    }
                    UnitKind::Leaf { rule, params } => {
                        let ctx = RuleContext {
                            value,
                            params,
                            field,
                            custom: self.custom,
                            translator: self.translator,
                        };
                        match rule.invoke(ctx).await {
                            Ok(()) => {}
                            Err(RuleError::Invalid(error)) => {
                                let error = error.or_field(field.to_string());
                                debug!(rule = %unit.name, field, code = %error.code, "rule failed");
                                return Err(RuleError::Invalid(error));
                            }
                            Err(RuleError::Config(error)) => {
                                return Err(RuleError::Config(with_rule_name(error, &unit.name)));
                            }
                        }
                    }
                    UnitKind::OneOf(alternatives) => {
                        self.eval_one_of(alternatives, value, field).await?;
                    }
                    UnitKind::AllOf(sub_chain) => {
                        self.eval_chain(sub_chain, value, field).await?;
                    }
                    UnitKind::ArrayOf(sub_chain) => {
                        self.eval_array_of(sub_chain, value, field).await?;
                    }
                    UnitKind::Nested(schema) => {
                        self.eval_nested(schema, value, field).await?;
                    }
                }
            }
            Ok(())
        })
    }

    /// Validates every declared schema field against `data`, collecting
    /// all failures — target validation deliberately does not stop at the
    /// first failing field.
    ///
    /// Errors come back in schema declaration order with absolute field
    /// paths (`prefix.field`, `prefix.field[i]`, ...).
    pub(crate) fn eval_schema<'e>(
        &'e self,
        schema: &'e Schema,
        data: &'e Value,
        prefix: &'e str,
    ) -> BoxFuture<'e, Result<Vec<ValidationError>, ConfigError>> {
        Box::pin(async move {
            let mut failures = Vec::new();

            for field in schema.fields() {
                let path = if prefix.is_empty() {
                    field.name.clone()
                } else {
                    format!("{prefix}.{}", field.name)
                };
                let value = data.get(field.name.as_str());

                match self.eval_chain(&field.chain, value, &path).await {
                    Ok(()) => {}
                    Err(RuleError::Config(error)) => return Err(error),
                    Err(RuleError::Invalid(error)) => {
                        // Nested-object failures are carriers: the real
                        // per-field errors (with absolute paths) sit in
                        // `nested`, and the report wants them individually.
                        if error.code == OBJECT_INVALID && error.has_nested() {
                            failures.extend(error.nested);
                        } else {
                            failures.push(error);
                        }
                    }
                }
            }

            if !failures.is_empty() {
                debug!(
                    prefix,
                    failed = failures.len(),
                    declared = schema.len(),
                    "target validation failed"
                );
            }
            Ok(failures)
        })
    }

    fn eval_sentinel(
        &self,
        kind: SkipKind,
        value: Option<&Value>,
        field: &str,
    ) -> Result<SentinelOutcome, RuleError> {
        let outcome = match kind {
            SkipKind::Required => {
                // The only values Required rejects: absent, null, "".
                // 0, false, [], {} are all present.
                if is_absent(value) || is_null(value) || is_empty_string(value) {
                    debug!(field, "required value missing");
                    return Err(RuleError::Invalid(
                        ValidationError::required().with_field(field.to_string()),
                    ));
                }
                SentinelOutcome::Continue
            }
            SkipKind::Optional if is_absent(value) => SentinelOutcome::SkipRest,
            SkipKind::Nullable if is_absent(value) || is_null(value) => SentinelOutcome::SkipRest,
            SkipKind::Empty if is_empty_string(value) => SentinelOutcome::SkipRest,
            SkipKind::Optional | SkipKind::Nullable | SkipKind::Empty => SentinelOutcome::Continue,
        };
        Ok(outcome)
    }

    async fn eval_one_of(
        &self,
        alternatives: &[RuleChain],
        value: Option<&Value>,
        field: &str,
    ) -> Result<(), RuleError> {
        let mut failures = Vec::with_capacity(alternatives.len());

        for alternative in alternatives {
            match self.eval_chain(alternative, value, field).await {
                // First success wins; remaining alternatives are not run.
                Ok(()) => return Ok(()),
                Err(RuleError::Config(error)) => return Err(RuleError::Config(error)),
                Err(RuleError::Invalid(error)) => failures.push(error),
            }
        }

        Err(RuleError::Invalid(
            ValidationError::new("one_of_failed", "No alternative matched")
                .with_param("alternatives", failures.len().to_string())
                .with_field(field.to_string())
                .with_nested(failures),
        ))
    }

    async fn eval_array_of(
        &self,
        sub_chain: &RuleChain,
        value: Option<&Value>,
        field: &str,
    ) -> Result<(), RuleError> {
        let Some(items) = value.and_then(Value::as_array) else {
            return Err(RuleError::Invalid(
                ValidationError::type_mismatch("array", type_name(value))
                    .with_field(field.to_string()),
            ));
        };

        for (index, item) in items.iter().enumerate() {
            let element_field = if field.is_empty() {
                format!("[{index}]")
            } else {
                format!("{field}[{index}]")
            };
            match self.eval_chain(sub_chain, Some(item), &element_field).await {
                Ok(()) => {}
                Err(RuleError::Config(error)) => return Err(RuleError::Config(error)),
                Err(RuleError::Invalid(error)) => {
                    // The index is the only way a caller can find the bad
                    // item in a bulk payload, so it goes in the message,
                    // the params, and the field path.
                    return Err(RuleError::Invalid(
                        ValidationError::new(
                            "element_invalid",
                            format!("Element at index {index} failed: {}", error.message),
                        )
                        .with_param("index", index.to_string())
                        .with_field(element_field)
                        .with_nested_error(error),
                    ));
                }
            }
        }
        Ok(())
    }

    async fn eval_nested(
        &self,
        schema: &Schema,
        value: Option<&Value>,
        field: &str,
    ) -> Result<(), RuleError> {
        let Some(data) = value.filter(|v| v.is_object()) else {
            return Err(RuleError::Invalid(
                ValidationError::type_mismatch("object", type_name(value))
                    .with_field(field.to_string()),
            ));
        };

        let failures = self
            .eval_schema(schema, data, field)
            .await
            .map_err(RuleError::Config)?;

        if failures.is_empty() {
            Ok(())
        } else {
            Err(RuleError::Invalid(
                ValidationError::new(
                    OBJECT_INVALID,
                    format!("{} field(s) failed validation", failures.len()),
                )
                .with_field(field.to_string())
                .with_nested(failures),
            ))
        }
    }
}

enum SentinelOutcome {
    Continue,
    SkipRest,
}

// ============================================================================
// VALUE PREDICATES
// ============================================================================

fn is_absent(value: Option<&Value>) -> bool {
    value.is_none()
}

fn is_null(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::Null))
}

fn is_empty_string(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::String(s)) if s.is_empty())
}

fn type_name(value: Option<&Value>) -> &'static str {
    match value {
        None => "nothing",
        Some(v) => crate::rules::json_type(v),
    }
}

// Rules signal parameter problems without knowing their registered name;
// the engine fills it in from the failing unit.
fn with_rule_name(error: ConfigError, name: &str) -> ConfigError {
    match error {
        ConfigError::InvalidParams { rule, reason } if rule.is_empty() => {
            ConfigError::InvalidParams {
                rule: name.to_string().into(),
                reason,
            }
        }
        other => other,
    }
}
