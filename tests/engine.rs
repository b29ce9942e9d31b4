//! Chain evaluation semantics: sentinels, ordering, short-circuiting,
//! and the two error channels.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::future::BoxFuture;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use rulekit::{
    custom, inline, nullable, optional, required, rule, sync_rule, with_params, ConfigError,
    RuleContext, RuleFn, RuleResult, ValidateRequest, ValidationError, Validator,
};

fn specs_min3() -> Vec<rulekit::RuleSpec> {
    vec![required(), with_params("MinLength", [json!(3)])]
}

#[tokio::test]
async fn valid_value_passes() {
    let validator = Validator::builtin();
    let value = json!("hello");
    let report = validator.validate(Some(&value), &specs_min3()).await.unwrap();
    assert!(report.is_valid);
    assert!(report.error.is_none());
    assert!(report.message.is_none());
}

#[tokio::test]
async fn failure_is_returned_not_raised() {
    let validator = Validator::builtin();
    let value = json!("hi");
    let report = validator.validate(Some(&value), &specs_min3()).await.unwrap();
    assert!(!report.is_valid);
    let error = report.error.unwrap();
    assert_eq!(error.code, "min_length");
    assert!(report.message.unwrap().contains("at least 3"));
}

#[tokio::test]
async fn required_rejects_absent_null_and_empty_string() {
    let validator = Validator::builtin();
    for value in [None, Some(json!(null)), Some(json!(""))] {
        let report = validator
            .validate(value.as_ref(), &[required()])
            .await
            .unwrap();
        assert!(!report.is_valid, "{value:?}");
        assert_eq!(report.error.unwrap().code, "required", "{value:?}");
    }
}

#[tokio::test]
async fn required_accepts_other_falsy_values() {
    let validator = Validator::builtin();
    for value in [json!(0), json!(false), json!([]), json!({})] {
        let report = validator.validate(Some(&value), &[required()]).await.unwrap();
        assert!(report.is_valid, "{value}");
    }
}

#[tokio::test]
async fn optional_skips_absent_but_validates_null() {
    let validator = Validator::builtin();
    let specs = vec![optional(), rule("IsString")];

    let absent = validator.validate(None, &specs).await.unwrap();
    assert!(absent.is_valid);

    let null = json!(null);
    let explicit_null = validator.validate(Some(&null), &specs).await.unwrap();
    assert!(!explicit_null.is_valid);
    assert_eq!(explicit_null.error.unwrap().code, "type_mismatch");
}

#[tokio::test]
async fn nullable_skips_absent_and_null() {
    let validator = Validator::builtin();
    let specs = vec![nullable(), rule("IsString")];

    assert!(validator.validate(None, &specs).await.unwrap().is_valid);
    let null = json!(null);
    assert!(validator.validate(Some(&null), &specs).await.unwrap().is_valid);
    let number = json!(5);
    assert!(!validator.validate(Some(&number), &specs).await.unwrap().is_valid);
}

#[tokio::test]
async fn empty_skips_empty_string_only() {
    let validator = Validator::builtin();
    let specs = vec![rulekit::empty(), with_params("MinLength", [json!(3)])];

    let empty = json!("");
    assert!(validator.validate(Some(&empty), &specs).await.unwrap().is_valid);
    let short = json!("ab");
    assert!(!validator.validate(Some(&short), &specs).await.unwrap().is_valid);
}

#[tokio::test]
async fn sentinel_mid_chain_only_guards_later_units() {
    let validator = Validator::builtin();
    // IsString runs before Optional, so an absent value still fails it.
    let specs = vec![rule("IsString"), optional(), with_params("MinLength", [json!(3)])];
    let report = validator.validate(None, &specs).await.unwrap();
    assert!(!report.is_valid);
    assert_eq!(report.error.unwrap().code, "type_mismatch");
}

#[tokio::test]
async fn first_failure_stops_the_chain() {
    let calls = Arc::new(AtomicUsize::new(0));
    let spy_calls = Arc::clone(&calls);
    let spy = custom(move |_ctx: &RuleContext<'_>| {
        spy_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });

    let validator = Validator::builtin();
    let value = json!("x");
    let specs = vec![with_params("MinLength", [json!(5)]), spy];
    let report = validator.validate(Some(&value), &specs).await.unwrap();

    assert!(!report.is_valid);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn rules_run_in_declaration_order() {
    let order = Arc::new(std::sync::Mutex::new(Vec::new()));
    let make = |label: &'static str| {
        let order = Arc::clone(&order);
        custom(move |_ctx: &RuleContext<'_>| {
            order.lock().unwrap().push(label);
            Ok(())
        })
    };

    let validator = Validator::builtin();
    let value = json!(1);
    let specs = vec![make("first"), make("second"), make("third")];
    assert!(validator.validate(Some(&value), &specs).await.unwrap().is_valid);
    assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
}

struct YieldingRule;

impl RuleFn for YieldingRule {
    fn invoke<'a>(&'a self, ctx: RuleContext<'a>) -> BoxFuture<'a, RuleResult> {
        Box::pin(async move {
            tokio::task::yield_now().await;
            match ctx.value {
                Some(Value::String(_)) => Ok(()),
                _ => Err(ValidationError::custom("expected a string").into()),
            }
        })
    }
}

#[tokio::test]
async fn async_rules_are_awaited_in_sequence() {
    let validator = Validator::builtin();
    let value = json!("ok");
    let specs = vec![inline(Arc::new(YieldingRule)), with_params("MinLength", [json!(2)])];
    assert!(validator.validate(Some(&value), &specs).await.unwrap().is_valid);

    let number = json!(7);
    let report = validator.validate(Some(&number), &specs).await.unwrap();
    assert!(!report.is_valid);
    assert_eq!(report.error.unwrap().code, "custom");
}

#[tokio::test]
async fn unknown_rule_is_a_config_error() {
    let validator = Validator::builtin();
    let value = json!(1);
    let err = validator
        .validate(Some(&value), &[rule("NoSuchRule")])
        .await
        .unwrap_err();
    assert!(matches!(err, ConfigError::UnknownRule { name } if name == "NoSuchRule"));
}

#[tokio::test]
async fn malformed_params_surface_as_config_error_with_rule_name() {
    let validator = Validator::builtin();
    let value = json!("hello");
    let err = validator
        .validate(Some(&value), &[with_params("MinLength", [json!("three")])])
        .await
        .unwrap_err();
    match err {
        ConfigError::InvalidParams { rule, .. } => assert_eq!(rule, "MinLength"),
        other => panic!("expected InvalidParams, got {other:?}"),
    }
}

#[tokio::test]
async fn field_label_is_stamped_on_errors() {
    let validator = Validator::builtin();
    let value = json!("hi");
    let report = validator
        .validate_with(ValidateRequest::new(Some(&value), &specs_min3()).field("username"))
        .await
        .unwrap();
    assert_eq!(report.error.unwrap().field.as_deref(), Some("username"));
}

#[tokio::test]
async fn custom_context_reaches_rules() {
    struct Tenant {
        forbidden: &'static str,
    }

    let not_forbidden = sync_rule(|ctx: &RuleContext<'_>| {
        let tenant = ctx
            .custom::<Tenant>()
            .ok_or_else(|| ValidationError::custom("missing tenant context"))?;
        match ctx.value.and_then(Value::as_str) {
            Some(s) if s == tenant.forbidden => {
                Err(ValidationError::new("forbidden_name", "That name is taken").into())
            }
            _ => Ok(()),
        }
    });

    let validator = Validator::builtin();
    let tenant = Tenant { forbidden: "admin" };
    let value = json!("admin");
    let report = validator
        .validate_with(
            ValidateRequest::new(Some(&value), &[inline(not_forbidden)]).context(&tenant),
        )
        .await
        .unwrap();
    assert!(!report.is_valid);
    assert_eq!(report.error.unwrap().code, "forbidden_name");
}
