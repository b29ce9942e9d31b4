//! # rulekit
//!
//! A rule-composition validation engine for JSON values.
//!
//! Rules are named, registered in an explicit [`Registry`], and composed
//! into per-field chains that run left to right with skip sentinels
//! (`Required`, `Optional`, `Nullable`, `Empty`) and composites
//! (`OneOf`, `AllOf`, `ArrayOf`). Whole objects validate against a
//! [`Schema`], which collects every field failure instead of stopping at
//! the first.
//!
//! ## Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use rulekit::{required, rule, with_params, Schema, Validator};
//!
//! # futures::executor::block_on(async {
//! let validator = Validator::builtin();
//!
//! let schema = Schema::builder()
//!     .field("name", [required(), with_params("MinLength", [json!(3)])])
//!     .field("email", [required(), rule("Email")])
//!     .build(validator.registry())
//!     .unwrap();
//!
//! let report = validator
//!     .validate_target(&schema, &json!({"name": "Al", "email": "al@example.com"}))
//!     .await
//!     .unwrap();
//!
//! assert!(!report.is_valid);
//! assert_eq!(report.errors[0].field, "name");
//! # });
//! ```
//!
//! ## Two error channels
//!
//! Rule failures (the value is bad) come back inside [`Report`] /
//! [`TargetReport`] and are never raised. Configuration mistakes (an
//! unregistered rule name, malformed parameters, a bad spec shape) are a
//! separate [`ConfigError`] returned as `Err`, matchable by variant.
//!
//! ## Built-in rules
//!
//! Strings (`MinLength`, `Matches`, ...), numbers (`Min`, `Between`,
//! `Divisible`, ...), formats (`Email`, `Url`, `Uuid`, `CreditCard`,
//! ...), collections (`MinItems`, `Unique`, `In`, ...), type checks
//! (`IsString`, ...), and ISO dates (`DateIso`, `DateAfter`, ...). All
//! of them can be overwritten through [`Registry::register`].

// ValidationError carries message, params, and nested errors inline;
// boxing it would add indirection to every rule call.
#![allow(clippy::result_large_err)]

pub mod context;
mod engine;
pub mod error;
pub mod prelude;
pub mod registry;
pub mod report;
pub mod resolve;
pub mod rule;
mod rules;
pub mod schema;
pub mod spec;
pub mod translate;
pub mod validator;

pub use context::RuleContext;
pub use error::{ConfigError, RuleError, ValidationError};
pub use registry::Registry;
pub use report::{FieldError, Report, TargetReport};
pub use resolve::{Resolver, RuleChain, RuleUnit, SkipKind, UnitKind};
pub use rule::{sync_rule, RuleFn, RuleResult, SharedRule, SyncRule};
pub use schema::{Schema, SchemaBuilder};
pub use spec::{
    all_of, array_of, custom, empty, inline, nested, nullable, one_of, optional, required, rule,
    with_params, RuleSpec,
};
pub use translate::{DefaultTranslator, Translate};
pub use validator::{ValidateRequest, Validator};
