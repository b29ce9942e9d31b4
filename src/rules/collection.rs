//! Collection and membership rules.

use serde_json::Value;

use crate::context::RuleContext;
use crate::registry::Registry;
use crate::rule::{sync_rule, RuleResult};

use super::{expect_array, fail, missing_param, param_u64};

pub(super) fn install(registry: &mut Registry) {
    registry.insert("MinItems", sync_rule(min_items));
    registry.insert("MaxItems", sync_rule(max_items));
    registry.insert("Unique", sync_rule(unique));
    registry.insert("In", sync_rule(is_in));
    registry.insert("NotIn", sync_rule(not_in));
}

fn min_items(ctx: &RuleContext<'_>) -> RuleResult {
    let items = expect_array(ctx)?;
    let min = param_u64(ctx, 0)? as usize;
    if items.len() < min {
        return Err(fail(
            "min_items",
            format!("Must have at least {min} items, got {}", items.len()),
        ));
    }
    Ok(())
}

fn max_items(ctx: &RuleContext<'_>) -> RuleResult {
    let items = expect_array(ctx)?;
    let max = param_u64(ctx, 0)? as usize;
    if items.len() > max {
        return Err(fail(
            "max_items",
            format!("Must have at most {max} items, got {}", items.len()),
        ));
    }
    Ok(())
}

/// Quadratic scan; element counts in validation payloads stay small
/// enough that hashing serialized forms would cost more than it saves.
fn unique(ctx: &RuleContext<'_>) -> RuleResult {
    let items = expect_array(ctx)?;
    for (i, item) in items.iter().enumerate() {
        if items[..i].contains(item) {
            return Err(fail(
                "unique",
                format!("Duplicate item at index {i}"),
            ));
        }
    }
    Ok(())
}

/// Membership test against the parameter list. Unlike most rules this
/// accepts any JSON value, compared structurally.
fn is_in(ctx: &RuleContext<'_>) -> RuleResult {
    let value = present_value(ctx)?;
    if ctx.params.is_empty() {
        return Err(missing_param(0, "at least one allowed value"));
    }
    if !ctx.params.contains(value) {
        return Err(fail("in", format!("Value {value} is not one of the allowed values")));
    }
    Ok(())
}

fn not_in(ctx: &RuleContext<'_>) -> RuleResult {
    let value = present_value(ctx)?;
    if ctx.params.is_empty() {
        return Err(missing_param(0, "at least one forbidden value"));
    }
    if ctx.params.contains(value) {
        return Err(fail("not_in", format!("Value {value} is forbidden")));
    }
    Ok(())
}

fn present_value<'a>(ctx: &RuleContext<'a>) -> Result<&'a Value, crate::error::RuleError> {
    ctx.value.ok_or_else(|| super::mismatch("a value", None))
}
