//! Target validation: schema building, whole-object aggregation, nested
//! objects with dotted paths.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;

use rulekit::{
    array_of, nullable, optional, required, rule, with_params, ConfigError, Schema, Validator,
};

fn user_schema(validator: &Validator) -> Schema {
    Schema::builder()
        .field("name", [required(), with_params("MinLength", [json!(3)])])
        .field("email", [required(), rule("Email")])
        .field("age", [optional(), with_params("Min", [json!(18)])])
        .build(validator.registry())
        .unwrap()
}

#[tokio::test]
async fn valid_object_passes() {
    let validator = Validator::builtin();
    let schema = user_schema(&validator);
    let data = json!({"name": "Alice", "email": "alice@example.com", "age": 30});

    let report = validator.validate_target(&schema, &data).await.unwrap();
    assert!(report.is_valid);
    assert!(report.errors.is_empty());
    assert_eq!(report.data, data);
}

#[tokio::test]
async fn all_failing_fields_are_reported() {
    let validator = Validator::builtin();
    let schema = user_schema(&validator);
    // Three bad fields; none of them masks the others.
    let data = json!({"name": "Al", "email": "not-an-email", "age": 12});

    let report = validator.validate_target(&schema, &data).await.unwrap();
    assert!(!report.is_valid);
    assert_eq!(report.errors.len(), 3);

    // Schema declaration order.
    let fields: Vec<&str> = report.errors.iter().map(|e| e.field.as_str()).collect();
    assert_eq!(fields, vec!["name", "email", "age"]);
    assert_eq!(report.errors[0].error.code, "min_length");
    assert_eq!(report.errors[1].error.code, "email");
    assert_eq!(report.errors[2].error.code, "min");
}

#[tokio::test]
async fn one_bad_field_among_good_ones() {
    let validator = Validator::builtin();
    let schema = user_schema(&validator);
    let data = json!({"name": "Alice", "email": "broken", "age": 30});

    let report = validator.validate_target(&schema, &data).await.unwrap();
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].field, "email");
    assert!(report.error_for("email").is_some());
    assert!(report.error_for("name").is_none());
}

#[tokio::test]
async fn optional_fields_may_be_absent() {
    let validator = Validator::builtin();
    let schema = user_schema(&validator);
    let data = json!({"name": "Alice", "email": "alice@example.com"});

    let report = validator.validate_target(&schema, &data).await.unwrap();
    assert!(report.is_valid);
}

#[tokio::test]
async fn nested_failures_use_dotted_paths() {
    let validator = Validator::builtin();
    let address = Schema::builder()
        .field("city", [required(), with_params("MinLength", [json!(2)])])
        .field("zip", [required(), with_params("Matches", [json!(r"^\d{5}$")])])
        .build(validator.registry())
        .unwrap();
    let schema = Schema::builder()
        .field("name", [required()])
        .nested("address", address)
        .build(validator.registry())
        .unwrap();

    let data = json!({"name": "Bob", "address": {"city": "X", "zip": "abc"}});
    let report = validator.validate_target(&schema, &data).await.unwrap();

    assert!(!report.is_valid);
    let fields: Vec<&str> = report.errors.iter().map(|e| e.field.as_str()).collect();
    assert_eq!(fields, vec!["address.city", "address.zip"]);
}

#[tokio::test]
async fn deeply_nested_paths_accumulate() {
    let validator = Validator::builtin();
    let geo = Schema::builder()
        .field("lat", [required(), with_params("Between", [json!(-90), json!(90)])])
        .build(validator.registry())
        .unwrap();
    let address = Schema::builder()
        .nested("geo", geo)
        .build(validator.registry())
        .unwrap();
    let schema = Schema::builder()
        .nested("address", address)
        .build(validator.registry())
        .unwrap();

    let data = json!({"address": {"geo": {"lat": 123}}});
    let report = validator.validate_target(&schema, &data).await.unwrap();
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].field, "address.geo.lat");
}

#[tokio::test]
async fn non_object_nested_value_is_one_field_error() {
    let validator = Validator::builtin();
    let address = Schema::builder()
        .field("city", [required()])
        .build(validator.registry())
        .unwrap();
    let schema = Schema::builder()
        .nested("address", address)
        .build(validator.registry())
        .unwrap();

    let data = json!({"address": "not an object"});
    let report = validator.validate_target(&schema, &data).await.unwrap();
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].field, "address");
    assert_eq!(report.errors[0].error.code, "type_mismatch");
}

#[tokio::test]
async fn array_field_errors_carry_indexed_paths() {
    let validator = Validator::builtin();
    let schema = Schema::builder()
        .field("tags", [required(), array_of([with_params("MinLength", [json!(2)])])])
        .build(validator.registry())
        .unwrap();

    let data = json!({"tags": ["ok", "x", "fine"]});
    let report = validator.validate_target(&schema, &data).await.unwrap();
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].field, "tags[1]");
}

#[tokio::test]
async fn non_object_target_is_a_root_error() {
    let validator = Validator::builtin();
    let schema = user_schema(&validator);
    let data = json!([1, 2, 3]);

    let report = validator.validate_target(&schema, &data).await.unwrap();
    assert!(!report.is_valid);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].field, "");
    assert_eq!(report.errors[0].error.code, "type_mismatch");
}

#[tokio::test]
async fn schema_from_json_description() {
    let validator = Validator::builtin();
    let schema = validator
        .schema_from_value(&json!({
            "name": ["Required", {"MinLength": [3]}],
            "address": {
                "city": ["Required"],
            },
        }))
        .unwrap();

    let data = json!({"name": "Al", "address": {}});
    let report = validator.validate_target(&schema, &data).await.unwrap();
    let fields: Vec<&str> = report.errors.iter().map(|e| e.field.as_str()).collect();
    assert_eq!(fields, vec!["name", "address.city"]);
}

#[tokio::test]
async fn duplicate_field_is_a_config_error() {
    let validator = Validator::builtin();
    let err = Schema::builder()
        .field("name", [required()])
        .field("name", [rule("Email")])
        .build(validator.registry())
        .unwrap_err();
    assert!(matches!(err, ConfigError::DuplicateField { field } if field == "name"));
}

#[tokio::test]
async fn schemas_are_shareable() {
    let validator = Validator::builtin();
    let address = Arc::new(
        Schema::builder()
            .field("city", [required()])
            .build(validator.registry())
            .unwrap(),
    );
    // The same sub-schema attached twice.
    let schema = Schema::builder()
        .nested("home", Arc::clone(&address))
        .nested("work", address)
        .build(validator.registry())
        .unwrap();

    let data = json!({"home": {"city": "Oslo"}, "work": {}});
    let report = validator.validate_target(&schema, &data).await.unwrap();
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].field, "work.city");
}

#[tokio::test]
async fn nullable_nested_object() {
    let validator = Validator::builtin();
    let address = Schema::builder()
        .field("city", [required()])
        .build(validator.registry())
        .unwrap();
    let schema = Schema::builder()
        .field("address", [nullable(), rulekit::nested(address)])
        .build(validator.registry())
        .unwrap();

    let data = json!({"address": null});
    assert!(validator.validate_target(&schema, &data).await.unwrap().is_valid);
}
