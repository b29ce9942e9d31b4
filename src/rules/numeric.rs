//! Numeric rules. Comparisons happen in `f64`; JSON integers round-trip
//! exactly up to 2^53, which covers the realistic range for validation
//! bounds.

use crate::context::RuleContext;
use crate::registry::Registry;
use crate::rule::{sync_rule, RuleResult};

use super::{expect_number, fail, missing_param, param_f64};

pub(super) fn install(registry: &mut Registry) {
    registry.insert("Min", sync_rule(min));
    registry.insert("Max", sync_rule(max));
    registry.insert("Between", sync_rule(between));
    registry.insert("Positive", sync_rule(positive));
    registry.insert("Negative", sync_rule(negative));
    registry.insert("Integer", sync_rule(integer));
    registry.insert("Divisible", sync_rule(divisible));
}

fn min(ctx: &RuleContext<'_>) -> RuleResult {
    let n = expect_number(ctx)?;
    let bound = param_f64(ctx, 0)?;
    if n < bound {
        return Err(fail("min", format!("Must be at least {bound}, got {n}")));
    }
    Ok(())
}

fn max(ctx: &RuleContext<'_>) -> RuleResult {
    let n = expect_number(ctx)?;
    let bound = param_f64(ctx, 0)?;
    if n > bound {
        return Err(fail("max", format!("Must be at most {bound}, got {n}")));
    }
    Ok(())
}

/// Inclusive on both ends.
fn between(ctx: &RuleContext<'_>) -> RuleResult {
    let n = expect_number(ctx)?;
    let low = param_f64(ctx, 0)?;
    let high = param_f64(ctx, 1)?;
    if low > high {
        return Err(missing_param(1, "an upper bound >= the lower bound"));
    }
    if n < low || n > high {
        return Err(fail(
            "between",
            format!("Must be between {low} and {high}, got {n}"),
        ));
    }
    Ok(())
}

fn positive(ctx: &RuleContext<'_>) -> RuleResult {
    let n = expect_number(ctx)?;
    if n <= 0.0 {
        return Err(fail("positive", format!("Must be positive, got {n}")));
    }
    Ok(())
}

fn negative(ctx: &RuleContext<'_>) -> RuleResult {
    let n = expect_number(ctx)?;
    if n >= 0.0 {
        return Err(fail("negative", format!("Must be negative, got {n}")));
    }
    Ok(())
}

fn integer(ctx: &RuleContext<'_>) -> RuleResult {
    let n = expect_number(ctx)?;
    if n.fract() != 0.0 {
        return Err(fail("integer", format!("Must be an integer, got {n}")));
    }
    Ok(())
}

fn divisible(ctx: &RuleContext<'_>) -> RuleResult {
    let n = expect_number(ctx)?;
    let divisor = param_f64(ctx, 0)?;
    if divisor == 0.0 {
        return Err(missing_param(0, "a non-zero divisor"));
    }
    if (n % divisor).abs() > f64::EPSILON {
        return Err(fail(
            "divisible",
            format!("Must be divisible by {divisor}, got {n}"),
        ));
    }
    Ok(())
}
