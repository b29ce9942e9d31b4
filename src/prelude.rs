//! Convenience re-exports for the common path.
//!
//! ```rust
//! use rulekit::prelude::*;
//! ```

pub use crate::error::{ConfigError, RuleError, ValidationError};
pub use crate::registry::Registry;
pub use crate::report::{FieldError, Report, TargetReport};
pub use crate::context::RuleContext;
pub use crate::rule::{sync_rule, RuleFn, RuleResult, SharedRule};
pub use crate::schema::{Schema, SchemaBuilder};
pub use crate::spec::{
    all_of, array_of, custom, empty, inline, nested, nullable, one_of, optional, required, rule,
    with_params, RuleSpec,
};
pub use crate::translate::Translate;
pub use crate::validator::{ValidateRequest, Validator};
