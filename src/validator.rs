//! Public entry points: [`Validator`] ties a frozen [`Registry`], a
//! translator, and the evaluation engine into one handle.
//!
//! # Examples
//!
//! ```
//! use serde_json::json;
//! use rulekit::{required, with_params, Validator};
//!
//! # futures::executor::block_on(async {
//! let validator = Validator::builtin();
//! let value = json!("ab");
//! let report = validator
//!     .validate(Some(&value), &[required(), with_params("MinLength", [json!(3)])])
//!     .await
//!     .unwrap();
//! assert!(!report.is_valid);
//! # });
//! ```

use std::any::Any;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::engine::Engine;
use crate::error::{ConfigError, RuleError};
use crate::registry::Registry;
use crate::report::{FieldError, Report, TargetReport};
use crate::resolve::{Resolver, RuleChain};
use crate::schema::Schema;
use crate::spec::RuleSpec;
use crate::translate::{DefaultTranslator, Translate};

/// Validation handle over an immutable rule registry.
///
/// Construction freezes the registry behind an `Arc`; register custom
/// rules *before* building the validator. Cloning is cheap and clones
/// share the registry, so one `Validator` can serve many concurrent
/// calls.
#[derive(Clone)]
pub struct Validator {
    registry: Arc<Registry>,
    translator: Arc<dyn Translate>,
}

impl Validator {
    /// Wraps an explicit registry. Use [`Registry::builtin`] plus
    /// [`Registry::register`] calls to customize the rule set first.
    pub fn new(registry: Registry) -> Self {
        Self {
            registry: Arc::new(registry),
            translator: Arc::new(DefaultTranslator),
        }
    }

    /// Shorthand for `Validator::new(Registry::builtin())`.
    pub fn builtin() -> Self {
        Self::new(Registry::builtin())
    }

    /// Replaces the message translator (default: raw English messages).
    #[must_use = "builder methods must be chained or built"]
    pub fn with_translator(mut self, translator: impl Translate + 'static) -> Self {
        self.translator = Arc::new(translator);
        self
    }

    /// The registry this validator resolves names against.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Resolves a spec list into a reusable chain without running it.
    /// Useful to surface configuration errors at startup rather than on
    /// the first request.
    pub fn resolve(&self, specs: &[RuleSpec]) -> Result<RuleChain, ConfigError> {
        Resolver::new(&self.registry).resolve(specs)
    }

    /// Compiles a JSON schema description (field name -> spec array or
    /// nested object) against this validator's registry.
    pub fn schema_from_value(&self, value: &Value) -> Result<Schema, ConfigError> {
        Schema::from_value(value, &self.registry)
    }

    /// Validates a single value against a spec list.
    ///
    /// `None` means the value is absent, `Some(Value::Null)` that it is
    /// explicitly null; sentinels distinguish the two. Failures come back
    /// inside the [`Report`]; only configuration mistakes are `Err`.
    pub async fn validate(
        &self,
        value: Option<&Value>,
        specs: &[RuleSpec],
    ) -> Result<Report, ConfigError> {
        self.validate_with(ValidateRequest::new(value, specs)).await
    }

    /// [`validate`](Self::validate) with a field label and caller context
    /// attached.
    pub async fn validate_with(
        &self,
        request: ValidateRequest<'_>,
    ) -> Result<Report, ConfigError> {
        let chain = self.resolve(request.specs)?;
        let engine = Engine {
            translator: self.translator.as_ref(),
            custom: request.custom,
        };
        match engine
            .eval_chain(&chain, request.value, request.field)
            .await
        {
            Ok(()) => Ok(Report::pass()),
            Err(RuleError::Config(error)) => Err(error),
            Err(RuleError::Invalid(error)) => {
                let message = self.translator.translate(&error);
                Ok(Report::fail(message, error))
            }
        }
    }

    /// Validates an object against a schema, collecting failures from
    /// every declared field.
    ///
    /// Unlike single-value validation this never stops early: the report
    /// lists one [`FieldError`] per failing field path, in schema
    /// declaration order, with nested-object failures flattened to dotted
    /// paths (`address.city`). The input data is echoed back in the
    /// report.
    pub async fn validate_target(
        &self,
        schema: &Schema,
        data: &Value,
    ) -> Result<TargetReport, ConfigError> {
        self.validate_target_with(schema, data, None).await
    }

    /// [`validate_target`](Self::validate_target) with caller context
    /// passed through to every rule.
    pub async fn validate_target_with(
        &self,
        schema: &Schema,
        data: &Value,
        custom: Option<&(dyn Any + Send + Sync)>,
    ) -> Result<TargetReport, ConfigError> {
        let engine = Engine {
            translator: self.translator.as_ref(),
            custom,
        };

        // A non-object target cannot match any schema; report it as a
        // single root-level failure instead of erroring out.
        if !data.is_object() {
            let error = crate::error::ValidationError::type_mismatch(
                "object",
                crate::rules::json_type(data),
            );
            let message = self.translator.translate(&error);
            debug!(declared = schema.len(), "target data is not an object");
            return Ok(TargetReport {
                is_valid: false,
                errors: vec![FieldError {
                    field: String::new(),
                    message,
                    error,
                }],
                data: data.clone(),
            });
        }

        let failures = engine.eval_schema(schema, data, "").await?;
        let errors = failures
            .into_iter()
            .map(|error| FieldError {
                field: error.field.as_deref().unwrap_or_default().to_string(),
                message: self.translator.translate(&error),
                error,
            })
            .collect::<Vec<_>>();

        Ok(TargetReport {
            is_valid: errors.is_empty(),
            errors,
            data: data.clone(),
        })
    }
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

/// Input bundle for [`Validator::validate_with`].
#[derive(Clone, Copy)]
pub struct ValidateRequest<'a> {
    value: Option<&'a Value>,
    specs: &'a [RuleSpec],
    field: &'a str,
    custom: Option<&'a (dyn Any + Send + Sync)>,
}

impl<'a> ValidateRequest<'a> {
    pub fn new(value: Option<&'a Value>, specs: &'a [RuleSpec]) -> Self {
        Self {
            value,
            specs,
            field: "",
            custom: None,
        }
    }

    /// Field label stamped on errors that do not set one themselves.
    #[must_use = "builder methods must be chained or built"]
    pub fn field(mut self, field: &'a str) -> Self {
        self.field = field;
        self
    }

    /// Arbitrary caller state made available to rules through
    /// [`RuleContext::custom`](crate::RuleContext::custom).
    #[must_use = "builder methods must be chained or built"]
    pub fn context(mut self, custom: &'a (dyn Any + Send + Sync)) -> Self {
        self.custom = Some(custom);
        self
    }
}
