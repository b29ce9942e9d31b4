//! Schemas: per-field rule chains for target (object) validation.
//!
//! A [`Schema`] is an explicit, inspectable value — an ordered mapping
//! from field name to resolved rule chain — built either with
//! [`SchemaBuilder`] in code or from a JSON description. There is no
//! annotation/reflection magic: whatever attaches rules to fields in a
//! host application ultimately produces one of these.
//!
//! Field order is declaration order, and target reports emit failures in
//! that order, deterministically.

use std::sync::Arc;

use serde_json::Value;

use crate::error::ConfigError;
use crate::registry::Registry;
use crate::resolve::{Resolver, RuleChain, UnitKind};
use crate::spec::RuleSpec;

// ============================================================================
// SCHEMA
// ============================================================================

/// A resolved field → rule-chain mapping.
///
/// Immutable and cheaply shareable once built; nested schemas are held by
/// `Arc` inside their parent's chains.
///
/// # Examples
///
/// ```
/// use rulekit::registry::Registry;
/// use rulekit::schema::Schema;
/// use rulekit::spec::{required, rule, with_params};
/// use serde_json::json;
///
/// let registry = Registry::builtin();
/// let schema = Schema::builder()
///     .field("email", [required(), rule("Email")])
///     .field("name", [required(), with_params("MinLength", [json!(2)])])
///     .build(&registry)
///     .unwrap();
///
/// assert_eq!(schema.len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct Schema {
    fields: Vec<SchemaField>,
}

#[derive(Debug)]
pub(crate) struct SchemaField {
    pub(crate) name: String,
    pub(crate) chain: RuleChain,
}

impl Schema {
    /// Starts an empty builder.
    #[must_use]
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Builds a schema from a JSON description.
    ///
    /// Each key maps to either an array of rule specifications or, for
    /// nested objects, another schema description:
    ///
    /// ```
    /// use rulekit::registry::Registry;
    /// use rulekit::schema::Schema;
    /// use serde_json::json;
    ///
    /// let registry = Registry::builtin();
    /// let schema = Schema::from_value(
    ///     &json!({
    ///         "email": ["Required", "Email"],
    ///         "address": {
    ///             "city": ["Required", {"MinLength": [2]}],
    ///         },
    ///     }),
    ///     &registry,
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(schema.len(), 2);
    /// ```
    ///
    /// # Errors
    ///
    /// `ConfigError::InvalidSpec` for non-object descriptions or field
    /// values that are neither arrays nor objects, plus any resolution
    /// error from the referenced rules.
    pub fn from_value(value: &Value, registry: &Registry) -> Result<Self, ConfigError> {
        let map = value.as_object().ok_or_else(|| {
            ConfigError::invalid_spec(format!(
                "schema description must be an object, found {}",
                crate::rules::json_type(value)
            ))
        })?;

        let mut builder = Schema::builder();
        for (name, entry) in map {
            match entry {
                Value::Array(_) => {
                    builder = builder.field(name.clone(), RuleSpec::chain_from_value(entry)?);
                }
                Value::Object(_) => {
                    let sub = Schema::from_value(entry, registry)?;
                    builder = builder.nested(name.clone(), sub);
                }
                other => {
                    return Err(ConfigError::invalid_spec(format!(
                        "field `{name}` must map to an array of rules or a nested schema, \
                         found {}",
                        crate::rules::json_type(other)
                    )));
                }
            }
        }
        builder.build(registry)
    }

    /// Number of declared fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the schema declares no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Declared field names, in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub(crate) fn fields(&self) -> &[SchemaField] {
        &self.fields
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Collects field declarations, then resolves them in one pass.
///
/// Resolution (and therefore every configuration error) happens in
/// [`SchemaBuilder::build`], before any data is validated.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    fields: Vec<(String, Vec<RuleSpec>)>,
}

impl SchemaBuilder {
    /// Declares a field with its rule chain.
    #[must_use = "builder methods must be chained or built"]
    pub fn field(
        mut self,
        name: impl Into<String>,
        specs: impl IntoIterator<Item = RuleSpec>,
    ) -> Self {
        self.fields
            .push((name.into(), specs.into_iter().collect()));
        self
    }

    /// Declares a field validated recursively against a sub-schema.
    ///
    /// Shorthand for `.field(name, [nested(schema)])`. To combine with
    /// sentinels (`[required(), nested(schema)]`), use
    /// [`SchemaBuilder::field`] directly.
    #[must_use = "builder methods must be chained or built"]
    pub fn nested(self, name: impl Into<String>, schema: impl Into<Arc<Schema>>) -> Self {
        self.field(name, [crate::spec::nested(schema)])
    }

    /// Resolves every declared chain against `registry`.
    ///
    /// # Errors
    ///
    /// `ConfigError::DuplicateField` for repeated declarations, plus any
    /// resolution error (unknown rules, malformed composites).
    pub fn build(self, registry: &Registry) -> Result<Schema, ConfigError> {
        let resolver = Resolver::new(registry);
        let mut fields: Vec<SchemaField> = Vec::with_capacity(self.fields.len());

        for (name, specs) in self.fields {
            if fields.iter().any(|f| f.name == name) {
                return Err(ConfigError::DuplicateField { field: name });
            }
            let chain = resolver.resolve(&specs)?;
            fields.push(SchemaField { name, chain });
        }

        Ok(Schema { fields })
    }
}

impl Schema {
    /// Whether any field's chain contains a nested sub-schema.
    #[must_use]
    pub fn has_nested(&self) -> bool {
        fn chain_has_nested(chain: &RuleChain) -> bool {
            chain.iter().any(|unit| match &unit.kind {
                UnitKind::Nested(_) => true,
                UnitKind::OneOf(chains) => chains.iter().any(chain_has_nested),
                UnitKind::AllOf(chain) | UnitKind::ArrayOf(chain) => chain_has_nested(chain),
                UnitKind::Leaf { .. } | UnitKind::Skip(_) => false,
            })
        }
        self.fields.iter().any(|f| chain_has_nested(&f.chain))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{nested, required, rule};
    use serde_json::json;

    fn registry() -> Registry {
        Registry::builtin()
    }

    #[test]
    fn builder_preserves_declaration_order() {
        let schema = Schema::builder()
            .field("b", [rule("Email")])
            .field("a", [required()])
            .field("c", [rule("Uuid")])
            .build(&registry())
            .unwrap();

        let names: Vec<_> = schema.field_names().collect();
        assert_eq!(names, ["b", "a", "c"]);
    }

    #[test]
    fn duplicate_field_is_config_error() {
        let err = Schema::builder()
            .field("email", [rule("Email")])
            .field("email", [required()])
            .build(&registry())
            .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateField { field } if field == "email"));
    }

    #[test]
    fn unknown_rule_surfaces_at_build_time() {
        let err = Schema::builder()
            .field("x", [rule("Nope")])
            .build(&registry())
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownRule { .. }));
    }

    #[test]
    fn nested_shorthand() {
        let city = Schema::builder()
            .field("city", [required()])
            .build(&registry())
            .unwrap();
        let schema = Schema::builder()
            .nested("address", city)
            .build(&registry())
            .unwrap();

        assert!(schema.has_nested());
    }

    #[test]
    fn nested_combined_with_sentinels() {
        let sub = Schema::builder()
            .field("city", [required()])
            .build(&registry())
            .unwrap();
        let schema = Schema::builder()
            .field("address", [required(), nested(sub)])
            .build(&registry())
            .unwrap();

        assert!(schema.has_nested());
    }

    #[test]
    fn from_value_flat_and_nested() {
        let schema = Schema::from_value(
            &json!({
                "email": ["Required", "Email"],
                "address": { "city": ["Required"] },
            }),
            &registry(),
        )
        .unwrap();

        assert_eq!(schema.len(), 2);
        assert!(schema.has_nested());
    }

    #[test]
    fn from_value_rejects_scalar_field() {
        let err = Schema::from_value(&json!({"email": "Required"}), &registry()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSpec { .. }));
    }

    #[test]
    fn from_value_rejects_non_object() {
        let err = Schema::from_value(&json!(["Required"]), &registry()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSpec { .. }));
    }
}
