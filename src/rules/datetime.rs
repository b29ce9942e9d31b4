//! Date and time rules over ISO 8601 strings.
//!
//! Dates are validated and compared lexically: `YYYY-MM-DD` strings
//! order the same way their calendar dates do, so `DateAfter` and
//! `DateBefore` need no calendar arithmetic.

use std::sync::LazyLock;

use regex::Regex;

use crate::context::RuleContext;
use crate::registry::Registry;
use crate::rule::{sync_rule, RuleResult};

use super::{expect_str, fail, missing_param, param_str};

pub(super) fn install(registry: &mut Registry) {
    registry.insert("DateIso", sync_rule(date_iso));
    registry.insert("TimeIso", sync_rule(time_iso));
    registry.insert("DateTimeIso", sync_rule(datetime_iso));
    registry.insert("DateAfter", sync_rule(date_after));
    registry.insert("DateBefore", sync_rule(date_before));
}

static DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").unwrap()
});

static TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([01]\d|2[0-3]):[0-5]\d(:[0-5]\d(\.\d{1,9})?)?$").unwrap()
});

static DATETIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(\d{4})-(\d{2})-(\d{2})[Tt]([01]\d|2[0-3]):[0-5]\d(:[0-5]\d(\.\d{1,9})?)?([Zz]|[+-]\d{2}:\d{2})?$",
    )
    .unwrap()
});

fn is_valid_date(s: &str, pattern: &Regex) -> bool {
    let Some(caps) = pattern.captures(s) else {
        return false;
    };
    // Captures are all-digit by construction.
    let year: u32 = caps[1].parse().unwrap_or(0);
    let month: u32 = caps[2].parse().unwrap_or(0);
    let day: u32 = caps[3].parse().unwrap_or(0);

    if !(1..=12).contains(&month) || day == 0 {
        return false;
    }
    day <= days_in_month(year, month)
}

fn days_in_month(year: u32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if year % 4 == 0 && (year % 100 != 0 || year % 400 == 0) => 29,
        2 => 28,
        _ => 0,
    }
}

fn date_iso(ctx: &RuleContext<'_>) -> RuleResult {
    let s = expect_str(ctx)?;
    if !is_valid_date(s, &DATE) {
        return Err(fail("date_iso", "Must be a valid ISO date (YYYY-MM-DD)"));
    }
    Ok(())
}

fn time_iso(ctx: &RuleContext<'_>) -> RuleResult {
    let s = expect_str(ctx)?;
    if !TIME.is_match(s) {
        return Err(fail("time_iso", "Must be a valid ISO time (HH:MM[:SS])"));
    }
    Ok(())
}

fn datetime_iso(ctx: &RuleContext<'_>) -> RuleResult {
    let s = expect_str(ctx)?;
    if !is_valid_date(s, &DATETIME) {
        return Err(fail(
            "datetime_iso",
            "Must be a valid ISO datetime (YYYY-MM-DDTHH:MM[:SS][offset])",
        ));
    }
    Ok(())
}

fn date_after(ctx: &RuleContext<'_>) -> RuleResult {
    let s = expect_str(ctx)?;
    let bound = param_str(ctx, 0)?;
    if !DATE.is_match(bound) {
        return Err(missing_param(0, "an ISO date (YYYY-MM-DD)"));
    }
    if !is_valid_date(s, &DATE) {
        return Err(fail("date_iso", "Must be a valid ISO date (YYYY-MM-DD)"));
    }
    if s <= bound {
        return Err(fail("date_after", format!("Must be after {bound}")));
    }
    Ok(())
}

fn date_before(ctx: &RuleContext<'_>) -> RuleResult {
    let s = expect_str(ctx)?;
    let bound = param_str(ctx, 0)?;
    if !DATE.is_match(bound) {
        return Err(missing_param(0, "an ISO date (YYYY-MM-DD)"));
    }
    if !is_valid_date(s, &DATE) {
        return Err(fail("date_iso", "Must be a valid ISO date (YYYY-MM-DD)"));
    }
    if s >= bound {
        return Err(fail("date_before", format!("Must be before {bound}")));
    }
    Ok(())
}
