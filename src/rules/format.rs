//! Format rules: identifiers, addresses, and other strings with a
//! grammar of their own.

use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::LazyLock;

use regex::Regex;
use url::Url;
use uuid::Uuid;

use crate::context::RuleContext;
use crate::registry::Registry;
use crate::rule::{sync_rule, RuleResult};

use super::{expect_str, fail};

pub(super) fn install(registry: &mut Registry) {
    registry.insert("Email", sync_rule(email));
    registry.insert("Url", sync_rule(is_url));
    registry.insert("Uuid", sync_rule(is_uuid));
    registry.insert("Ipv4", sync_rule(ipv4));
    registry.insert("Ipv6", sync_rule(ipv6));
    registry.insert("Hex", sync_rule(hex));
    registry.insert("Slug", sync_rule(slug));
    registry.insert("CreditCard", sync_rule(credit_card));
}

// Pragmatic rather than RFC 5322: one @, a dot in the domain, no
// whitespace. Anything stricter belongs in a dedicated mail crate.
static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap()
});

static SLUG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap()
});

fn email(ctx: &RuleContext<'_>) -> RuleResult {
    let s = expect_str(ctx)?;
    if !EMAIL.is_match(s) {
        return Err(fail("email", "Must be a valid email address"));
    }
    Ok(())
}

fn is_url(ctx: &RuleContext<'_>) -> RuleResult {
    let s = expect_str(ctx)?;
    if Url::parse(s).is_err() {
        return Err(fail("url", "Must be a valid URL"));
    }
    Ok(())
}

fn is_uuid(ctx: &RuleContext<'_>) -> RuleResult {
    let s = expect_str(ctx)?;
    if Uuid::parse_str(s).is_err() {
        return Err(fail("uuid", "Must be a valid UUID"));
    }
    Ok(())
}

fn ipv4(ctx: &RuleContext<'_>) -> RuleResult {
    let s = expect_str(ctx)?;
    if s.parse::<Ipv4Addr>().is_err() {
        return Err(fail("ipv4", "Must be a valid IPv4 address"));
    }
    Ok(())
}

fn ipv6(ctx: &RuleContext<'_>) -> RuleResult {
    let s = expect_str(ctx)?;
    if s.parse::<Ipv6Addr>().is_err() {
        return Err(fail("ipv6", "Must be a valid IPv6 address"));
    }
    Ok(())
}

fn hex(ctx: &RuleContext<'_>) -> RuleResult {
    let s = expect_str(ctx)?;
    let digits = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(fail("hex", "Must be a hexadecimal string"));
    }
    Ok(())
}

fn slug(ctx: &RuleContext<'_>) -> RuleResult {
    let s = expect_str(ctx)?;
    if !SLUG.is_match(s) {
        return Err(fail(
            "slug",
            "Must be lowercase alphanumeric groups separated by single hyphens",
        ));
    }
    Ok(())
}

/// Luhn checksum over the digits; spaces and hyphens are ignored.
fn credit_card(ctx: &RuleContext<'_>) -> RuleResult {
    let s = expect_str(ctx)?;
    let digits: Vec<u32> = s
        .chars()
        .filter(|c| !matches!(c, ' ' | '-'))
        .map(|c| c.to_digit(10))
        .collect::<Option<_>>()
        .unwrap_or_default();

    if digits.len() < 12 || digits.len() > 19 || !luhn(&digits) {
        return Err(fail("credit_card", "Must be a valid card number"));
    }
    Ok(())
}

fn luhn(digits: &[u32]) -> bool {
    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                d
            }
        })
        .sum();
    sum % 10 == 0
}
