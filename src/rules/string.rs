//! String rules. Lengths count Unicode scalar values, not bytes.

use std::sync::Mutex;

use regex::Regex;

use crate::context::RuleContext;
use crate::registry::Registry;
use crate::rule::{sync_rule, RuleResult};

use super::{expect_str, fail, missing_param, param_str, param_u64};

pub(super) fn install(registry: &mut Registry) {
    registry.insert("MinLength", sync_rule(min_length));
    registry.insert("MaxLength", sync_rule(max_length));
    registry.insert("Length", sync_rule(length));
    registry.insert("NotEmpty", sync_rule(not_empty));
    registry.insert("Contains", sync_rule(contains));
    registry.insert("StartsWith", sync_rule(starts_with));
    registry.insert("EndsWith", sync_rule(ends_with));
    registry.insert("Lowercase", sync_rule(lowercase));
    registry.insert("Uppercase", sync_rule(uppercase));
    registry.insert("Alpha", sync_rule(alpha));
    registry.insert("Alphanumeric", sync_rule(alphanumeric));
    registry.insert("Matches", sync_rule(matches));
}

fn min_length(ctx: &RuleContext<'_>) -> RuleResult {
    let s = expect_str(ctx)?;
    let min = param_u64(ctx, 0)? as usize;
    let actual = s.chars().count();
    if actual < min {
        return Err(fail(
            "min_length",
            format!("Must be at least {min} characters, got {actual}"),
        ));
    }
    Ok(())
}

fn max_length(ctx: &RuleContext<'_>) -> RuleResult {
    let s = expect_str(ctx)?;
    let max = param_u64(ctx, 0)? as usize;
    let actual = s.chars().count();
    if actual > max {
        return Err(fail(
            "max_length",
            format!("Must be at most {max} characters, got {actual}"),
        ));
    }
    Ok(())
}

/// Exact length with one parameter, inclusive range with two.
fn length(ctx: &RuleContext<'_>) -> RuleResult {
    let s = expect_str(ctx)?;
    let actual = s.chars().count();
    let first = param_u64(ctx, 0)? as usize;
    match ctx.param(1) {
        None => {
            if actual != first {
                return Err(fail(
                    "length",
                    format!("Must be exactly {first} characters, got {actual}"),
                ));
            }
        }
        Some(_) => {
            let second = param_u64(ctx, 1)? as usize;
            if actual < first || actual > second {
                return Err(fail(
                    "length",
                    format!("Must be between {first} and {second} characters, got {actual}"),
                ));
            }
        }
    }
    Ok(())
}

fn not_empty(ctx: &RuleContext<'_>) -> RuleResult {
    let s = expect_str(ctx)?;
    if s.trim().is_empty() {
        return Err(fail("not_empty", "Must not be empty or whitespace"));
    }
    Ok(())
}

fn contains(ctx: &RuleContext<'_>) -> RuleResult {
    let s = expect_str(ctx)?;
    let needle = param_str(ctx, 0)?;
    if !s.contains(needle) {
        return Err(fail("contains", format!("Must contain \"{needle}\"")));
    }
    Ok(())
}

fn starts_with(ctx: &RuleContext<'_>) -> RuleResult {
    let s = expect_str(ctx)?;
    let prefix = param_str(ctx, 0)?;
    if !s.starts_with(prefix) {
        return Err(fail("starts_with", format!("Must start with \"{prefix}\"")));
    }
    Ok(())
}

fn ends_with(ctx: &RuleContext<'_>) -> RuleResult {
    let s = expect_str(ctx)?;
    let suffix = param_str(ctx, 0)?;
    if !s.ends_with(suffix) {
        return Err(fail("ends_with", format!("Must end with \"{suffix}\"")));
    }
    Ok(())
}

fn lowercase(ctx: &RuleContext<'_>) -> RuleResult {
    let s = expect_str(ctx)?;
    if s.chars().any(|c| c.is_uppercase()) {
        return Err(fail("lowercase", "Must not contain uppercase characters"));
    }
    Ok(())
}

fn uppercase(ctx: &RuleContext<'_>) -> RuleResult {
    let s = expect_str(ctx)?;
    if s.chars().any(|c| c.is_lowercase()) {
        return Err(fail("uppercase", "Must not contain lowercase characters"));
    }
    Ok(())
}

fn alpha(ctx: &RuleContext<'_>) -> RuleResult {
    let s = expect_str(ctx)?;
    if !s.chars().all(|c| c.is_alphabetic()) {
        return Err(fail("alpha", "Must contain only letters"));
    }
    Ok(())
}

fn alphanumeric(ctx: &RuleContext<'_>) -> RuleResult {
    let s = expect_str(ctx)?;
    if !s.chars().all(|c| c.is_alphanumeric()) {
        return Err(fail("alphanumeric", "Must contain only letters and digits"));
    }
    Ok(())
}

/// Pattern match against a caller-supplied regex. Patterns are compiled
/// on first use and cached, keyed by source text; an invalid pattern is
/// a configuration error.
fn matches(ctx: &RuleContext<'_>) -> RuleResult {
    static CACHE: Mutex<Vec<(String, Regex)>> = Mutex::new(Vec::new());

    let s = expect_str(ctx)?;
    let pattern = param_str(ctx, 0)?;

    let mut cache = CACHE.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    let regex = match cache.iter().find(|(source, _)| source == pattern) {
        Some((_, regex)) => regex.clone(),
        None => {
            let regex = Regex::new(pattern)
                .map_err(|e| missing_param(0, &format!("a valid regex ({e})")))?;
            cache.push((pattern.to_string(), regex.clone()));
            regex
        }
    };
    drop(cache);

    if !regex.is_match(s) {
        return Err(fail("matches", format!("Must match pattern \"{pattern}\"")));
    }
    Ok(())
}
