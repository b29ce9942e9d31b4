//! Type-check rules, mostly useful inside `OneOf` alternatives.

use serde_json::Value;

use crate::context::RuleContext;
use crate::registry::Registry;
use crate::rule::{sync_rule, RuleResult};

use super::{fail, mismatch};

pub(super) fn install(registry: &mut Registry) {
    registry.insert("IsString", sync_rule(is_string));
    registry.insert("IsNumber", sync_rule(is_number));
    registry.insert("IsBoolean", sync_rule(is_boolean));
    registry.insert("IsArray", sync_rule(is_array));
    registry.insert("IsObject", sync_rule(is_object));
    registry.insert("Accepted", sync_rule(accepted));
}

fn check(
    ctx: &RuleContext<'_>,
    expected: &'static str,
    predicate: fn(&Value) -> bool,
) -> RuleResult {
    match ctx.value {
        Some(v) if predicate(v) => Ok(()),
        other => Err(mismatch(expected, other)),
    }
}

fn is_string(ctx: &RuleContext<'_>) -> RuleResult {
    check(ctx, "string", Value::is_string)
}

fn is_number(ctx: &RuleContext<'_>) -> RuleResult {
    check(ctx, "number", Value::is_number)
}

fn is_boolean(ctx: &RuleContext<'_>) -> RuleResult {
    check(ctx, "boolean", Value::is_boolean)
}

fn is_array(ctx: &RuleContext<'_>) -> RuleResult {
    check(ctx, "array", Value::is_array)
}

fn is_object(ctx: &RuleContext<'_>) -> RuleResult {
    check(ctx, "object", Value::is_object)
}

/// Consent-checkbox semantics: `true`, `"true"`, `"yes"`, `"on"`, `1`.
fn accepted(ctx: &RuleContext<'_>) -> RuleResult {
    let ok = match ctx.value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => matches!(s.as_str(), "true" | "yes" | "on" | "1"),
        Some(Value::Number(n)) => n.as_u64() == Some(1),
        _ => false,
    };
    if !ok {
        return Err(fail("accepted", "Must be accepted"));
    }
    Ok(())
}
