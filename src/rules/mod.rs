//! Builtin rule library.
//!
//! Every rule here is a plain synchronous function wired into the
//! registry by [`install`]. Rules follow two conventions:
//!
//! - A value of the wrong JSON type fails with code `type_mismatch`
//!   rather than erroring out, so `OneOf` alternatives can probe types.
//! - Malformed *parameters* are a caller bug and surface as
//!   [`ConfigError::InvalidParams`], never as a validation failure. The
//!   rule name on those errors is filled in by the engine.

use serde_json::Value;

use crate::context::RuleContext;
use crate::error::{ConfigError, RuleError, ValidationError};
use crate::registry::Registry;

mod collection;
mod datetime;
mod format;
mod numeric;
mod string;
mod types;

/// Registers every builtin rule into `registry`. Later `register` calls
/// may overwrite any of them.
pub(crate) fn install(registry: &mut Registry) {
    string::install(registry);
    numeric::install(registry);
    format::install(registry);
    collection::install(registry);
    types::install(registry);
    datetime::install(registry);
}

/// JSON type name as it appears in `type_mismatch` messages.
pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ============================================================================
// SHARED EXTRACTORS
// ============================================================================

/// The value as a string, or a `type_mismatch` failure.
fn expect_str<'a>(ctx: &RuleContext<'a>) -> Result<&'a str, RuleError> {
    match ctx.value {
        Some(Value::String(s)) => Ok(s),
        other => Err(mismatch("string", other)),
    }
}

/// The value as a number, or a `type_mismatch` failure.
fn expect_number(ctx: &RuleContext<'_>) -> Result<f64, RuleError> {
    match ctx.value {
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| mismatch("number", ctx.value)),
        other => Err(mismatch("number", other)),
    }
}

/// The value as an array, or a `type_mismatch` failure.
fn expect_array<'a>(ctx: &RuleContext<'a>) -> Result<&'a [Value], RuleError> {
    match ctx.value {
        Some(Value::Array(items)) => Ok(items),
        other => Err(mismatch("array", other)),
    }
}

fn mismatch(expected: &'static str, actual: Option<&Value>) -> RuleError {
    let actual = match actual {
        None => "nothing",
        Some(v) => json_type(v),
    };
    ValidationError::type_mismatch(expected, actual).into()
}

// Parameter extractors. The empty rule name is backfilled with the
// registered name by the engine when the error propagates.

fn param_u64(ctx: &RuleContext<'_>, index: usize) -> Result<u64, RuleError> {
    ctx.param(index)
        .and_then(Value::as_u64)
        .ok_or_else(|| missing_param(index, "a non-negative integer"))
}

fn param_f64(ctx: &RuleContext<'_>, index: usize) -> Result<f64, RuleError> {
    ctx.param(index)
        .and_then(Value::as_f64)
        .ok_or_else(|| missing_param(index, "a number"))
}

fn param_str<'a>(ctx: &RuleContext<'a>, index: usize) -> Result<&'a str, RuleError> {
    ctx.param(index)
        .and_then(Value::as_str)
        .ok_or_else(|| missing_param(index, "a string"))
}

fn missing_param(index: usize, expected: &str) -> RuleError {
    ConfigError::invalid_params(
        "",
        format!("parameter {index} must be {expected}"),
    )
    .into()
}

fn fail(
    code: &'static str,
    message: impl Into<std::borrow::Cow<'static, str>>,
) -> RuleError {
    ValidationError::new(code, message).into()
}
