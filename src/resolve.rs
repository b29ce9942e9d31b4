//! Resolution: raw specifications → invocable chains.
//!
//! Resolution is synchronous and pure: it reads the registry, recursively
//! normalizes composites, and surfaces every configuration error before a
//! single value is inspected. A resolved [`RuleChain`] is immutable and
//! reusable across any number of validation calls.

use std::borrow::Cow;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::error::ConfigError;
use crate::registry::Registry;
use crate::rule::SharedRule;
use crate::schema::Schema;
use crate::spec::{keyword, RuleSpec};

// ============================================================================
// RESOLVED FORM
// ============================================================================

/// Which skip sentinel a unit is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipKind {
    /// Fail for absent, null, or empty-string values; otherwise continue.
    Required,
    /// Skip the rest of the chain for absent values.
    Optional,
    /// Skip the rest of the chain for absent or null values.
    Nullable,
    /// Skip the rest of the chain for empty-string values.
    Empty,
}

impl SkipKind {
    pub(crate) fn name(self) -> &'static str {
        match self {
            SkipKind::Required => keyword::REQUIRED,
            SkipKind::Optional => keyword::OPTIONAL,
            SkipKind::Nullable => keyword::NULLABLE,
            SkipKind::Empty => keyword::EMPTY,
        }
    }
}

/// The executable shape of one resolved unit.
#[derive(Clone)]
pub enum UnitKind {
    /// An ordinary rule: the function plus its bound parameters.
    Leaf {
        /// The rule function.
        rule: SharedRule,
        /// Parameters fixed at resolution time.
        params: Vec<serde_json::Value>,
    },
    /// A skip sentinel, interpreted by the engine itself.
    Skip(SkipKind),
    /// OR over independently resolved single-unit chains.
    OneOf(Vec<RuleChain>),
    /// AND over one resolved chain (uniform with ordinary chains).
    AllOf(Box<RuleChain>),
    /// Per-element AND over one resolved chain.
    ArrayOf(Box<RuleChain>),
    /// Recursive object validation.
    Nested(Arc<Schema>),
}

/// One resolved, invocable validation step.
#[derive(Clone)]
pub struct RuleUnit {
    /// Rule name for diagnostics; `<inline>` for anonymous rules.
    pub name: Cow<'static, str>,
    /// What to execute.
    pub kind: UnitKind,
}

// SharedRule is not Debug, so the executable shape prints a summary.
impl std::fmt::Debug for UnitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnitKind::Leaf { params, .. } => write!(f, "Leaf(params: {})", params.len()),
            UnitKind::Skip(kind) => write!(f, "Skip({kind:?})"),
            UnitKind::OneOf(chains) => write!(f, "OneOf({} alternatives)", chains.len()),
            UnitKind::AllOf(chain) => write!(f, "AllOf({} units)", chain.len()),
            UnitKind::ArrayOf(chain) => write!(f, "ArrayOf({} units)", chain.len()),
            UnitKind::Nested(schema) => write!(f, "Nested({} fields)", schema.len()),
        }
    }
}

impl std::fmt::Debug for RuleUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleUnit")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish()
    }
}

/// An ordered sequence of resolved units applied to one value.
///
/// Most chains are short; they are stored inline up to four units.
#[derive(Debug, Clone, Default)]
pub struct RuleChain {
    units: SmallVec<[RuleUnit; 4]>,
}

impl RuleChain {
    /// Number of units in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether the chain has no units. An empty chain always passes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Iterates units in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, RuleUnit> {
        self.units.iter()
    }
}

impl FromIterator<RuleUnit> for RuleChain {
    fn from_iter<I: IntoIterator<Item = RuleUnit>>(iter: I) -> Self {
        Self {
            units: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a RuleChain {
    type Item = &'a RuleUnit;
    type IntoIter = std::slice::Iter<'a, RuleUnit>;

    fn into_iter(self) -> Self::IntoIter {
        self.units.iter()
    }
}

// ============================================================================
// RESOLVER
// ============================================================================

/// Normalizes rule specifications against a registry.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'r> {
    registry: &'r Registry,
}

impl<'r> Resolver<'r> {
    /// A resolver reading from `registry`.
    #[must_use]
    pub fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }

    /// Resolves an ordered slice of specifications into a chain.
    ///
    /// # Errors
    ///
    /// Any configuration error in any specification, including inside
    /// composites: unknown rule names, sentinels given parameters,
    /// composites with no sub-rules.
    pub fn resolve(&self, specs: &[RuleSpec]) -> Result<RuleChain, ConfigError> {
        specs.iter().map(|spec| self.resolve_one(spec)).collect()
    }

    /// Resolves a single specification into a unit.
    pub fn resolve_one(&self, spec: &RuleSpec) -> Result<RuleUnit, ConfigError> {
        match spec {
            RuleSpec::Name(name) => self.resolve_named(name, Vec::new()),
            RuleSpec::With { name, params } => self.resolve_named(name, params.clone()),
            RuleSpec::Inline(rule) => Ok(RuleUnit {
                name: Cow::Borrowed("<inline>"),
                kind: UnitKind::Leaf {
                    rule: Arc::clone(rule),
                    params: Vec::new(),
                },
            }),
            RuleSpec::OneOf(subs) => {
                let chains = self.resolve_alternatives(keyword::ONE_OF, subs)?;
                Ok(RuleUnit {
                    name: Cow::Borrowed(keyword::ONE_OF),
                    kind: UnitKind::OneOf(chains),
                })
            }
            RuleSpec::AllOf(subs) => {
                let chain = self.resolve_sub_chain(keyword::ALL_OF, subs)?;
                Ok(RuleUnit {
                    name: Cow::Borrowed(keyword::ALL_OF),
                    kind: UnitKind::AllOf(Box::new(chain)),
                })
            }
            RuleSpec::ArrayOf(subs) => {
                let chain = self.resolve_sub_chain(keyword::ARRAY_OF, subs)?;
                Ok(RuleUnit {
                    name: Cow::Borrowed(keyword::ARRAY_OF),
                    kind: UnitKind::ArrayOf(Box::new(chain)),
                })
            }
            RuleSpec::Nested(schema) => Ok(RuleUnit {
                name: Cow::Borrowed("<nested>"),
                kind: UnitKind::Nested(Arc::clone(schema)),
            }),
        }
    }

    fn resolve_named(
        &self,
        name: &str,
        params: Vec<serde_json::Value>,
    ) -> Result<RuleUnit, ConfigError> {
        if let Some(kind) = sentinel_kind(name) {
            if !params.is_empty() {
                return Err(ConfigError::invalid_params(
                    kind.name(),
                    "skip sentinels take no parameters",
                ));
            }
            return Ok(RuleUnit {
                name: Cow::Borrowed(kind.name()),
                kind: UnitKind::Skip(kind),
            });
        }

        if keyword::is_composite(name) {
            // `{"OneOf": [...]}` parses into the composite variants; a bare
            // `Name("OneOf")` or raw params mean the caller built the spec
            // by hand and got the shape wrong.
            return Err(ConfigError::invalid_spec(format!(
                "`{name}` takes a list of sub-rule specifications"
            )));
        }

        let rule = self
            .registry
            .get(name)
            .ok_or_else(|| ConfigError::UnknownRule {
                name: name.to_string(),
            })?;

        Ok(RuleUnit {
            name: Cow::Owned(name.to_string()),
            kind: UnitKind::Leaf { rule, params },
        })
    }

    // Each OneOf alternative is its own single-unit chain, evaluated
    // independently against the same value.
    fn resolve_alternatives(
        &self,
        marker: &'static str,
        subs: &[RuleSpec],
    ) -> Result<Vec<RuleChain>, ConfigError> {
        if subs.is_empty() {
            return Err(ConfigError::EmptyComposite {
                rule: Cow::Borrowed(marker),
            });
        }
        subs.iter()
            .map(|sub| Ok(std::iter::once(self.resolve_one(sub)?).collect()))
            .collect()
    }

    fn resolve_sub_chain(
        &self,
        marker: &'static str,
        subs: &[RuleSpec],
    ) -> Result<RuleChain, ConfigError> {
        if subs.is_empty() {
            return Err(ConfigError::EmptyComposite {
                rule: Cow::Borrowed(marker),
            });
        }
        self.resolve(subs)
    }
}

fn sentinel_kind(name: &str) -> Option<SkipKind> {
    match name {
        keyword::REQUIRED => Some(SkipKind::Required),
        keyword::OPTIONAL => Some(SkipKind::Optional),
        keyword::NULLABLE => Some(SkipKind::Nullable),
        keyword::EMPTY => Some(SkipKind::Empty),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{all_of, array_of, one_of, required, rule, with_params};
    use serde_json::json;

    fn registry() -> Registry {
        let mut registry = Registry::empty();
        registry
            .register_fn("Ok", |_ctx: &crate::context::RuleContext<'_>| Ok(()))
            .unwrap();
        registry
    }

    #[test]
    fn resolves_in_declaration_order() {
        let registry = registry();
        let resolver = Resolver::new(&registry);
        let chain = resolver
            .resolve(&[required(), rule("Ok"), with_params("Ok", [json!(1)])])
            .unwrap();

        assert_eq!(chain.len(), 3);
        let names: Vec<_> = chain.iter().map(|u| u.name.as_ref()).collect();
        assert_eq!(names, ["Required", "Ok", "Ok"]);
        assert!(matches!(
            chain.iter().next().unwrap().kind,
            UnitKind::Skip(SkipKind::Required)
        ));
    }

    #[test]
    fn unknown_rule_is_config_error() {
        let registry = registry();
        let err = Resolver::new(&registry)
            .resolve(&[rule("DoesNotExist")])
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownRule { name } if name == "DoesNotExist"));
    }

    #[test]
    fn unknown_rule_inside_composite_is_config_error() {
        let registry = registry();
        let err = Resolver::new(&registry)
            .resolve(&[one_of([rule("Ok"), rule("Missing")])])
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownRule { name } if name == "Missing"));
    }

    #[test]
    fn sentinel_with_params_is_config_error() {
        let registry = registry();
        let err = Resolver::new(&registry)
            .resolve(&[with_params("Required", [json!(1)])])
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidParams { .. }));
    }

    #[test]
    fn bare_composite_name_is_config_error() {
        let registry = registry();
        let err = Resolver::new(&registry).resolve(&[rule("OneOf")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSpec { .. }));
    }

    #[test]
    fn empty_composites_rejected() {
        let registry = registry();
        let resolver = Resolver::new(&registry);
        for spec in [one_of([]), all_of([]), array_of([])] {
            let err = resolver.resolve(&[spec]).unwrap_err();
            assert!(matches!(err, ConfigError::EmptyComposite { .. }));
        }
    }

    #[test]
    fn one_of_alternatives_are_single_unit_chains() {
        let registry = registry();
        let chain = Resolver::new(&registry)
            .resolve(&[one_of([rule("Ok"), rule("Ok")])])
            .unwrap();

        let unit = chain.iter().next().unwrap();
        match &unit.kind {
            UnitKind::OneOf(alternatives) => {
                assert_eq!(alternatives.len(), 2);
                assert!(alternatives.iter().all(|c| c.len() == 1));
            }
            other => panic!("unexpected kind: {other:?}"),
        }
    }

    #[test]
    fn empty_chain_resolves() {
        let registry = registry();
        let chain = Resolver::new(&registry).resolve(&[]).unwrap();
        assert!(chain.is_empty());
    }
}
