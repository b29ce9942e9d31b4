//! The rule registry: name → rule function.
//!
//! The registry is an explicit value, not a hidden process-global: callers
//! (and tests) construct their own, fill it during startup, and hand it to
//! a [`Validator`](crate::validator::Validator), which freezes it behind an
//! `Arc`. Registration takes `&mut self`, so mutating a registry that is
//! already serving validation traffic is impossible without an external
//! lock — the "populate at bootstrap" contract is enforced by the borrow
//! checker rather than documented away.

use std::collections::HashMap;
use std::sync::Arc;

use crate::context::RuleContext;
use crate::error::ConfigError;
use crate::rule::{RuleResult, SharedRule, SyncRule};
use crate::spec::keyword;

/// Mapping from rule name to rule function.
///
/// Later registrations for the same name silently replace earlier ones
/// (last write wins). This is a deliberate design choice, not a bug: it is
/// how consumers override built-in rules with their own variants.
///
/// # Examples
///
/// ```
/// use rulekit::registry::Registry;
///
/// let registry = Registry::builtin();
/// assert!(registry.has("MinLength"));
/// assert!(registry.has("Email"));
/// assert!(!registry.has("DoesNotExist"));
/// ```
#[derive(Default)]
pub struct Registry {
    rules: HashMap<String, SharedRule>,
}

impl Registry {
    /// An empty registry. Useful for isolated tests and minimal builds.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// A registry preloaded with every built-in rule.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::default();
        crate::rules::install(&mut registry);
        registry
    }

    /// Registers (or overwrites) a rule under `name`.
    ///
    /// # Errors
    ///
    /// `ConfigError::ReservedName` if `name` is an engine keyword
    /// (`Required`, `Optional`, `Nullable`, `Empty`, `OneOf`, `AllOf`,
    /// `ArrayOf`) — shadowing those would silently change chain semantics.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        rule: SharedRule,
    ) -> Result<(), ConfigError> {
        let name = name.into();
        if keyword::is_reserved(&name) {
            return Err(ConfigError::ReservedName { name });
        }
        self.insert(name, rule);
        Ok(())
    }

    /// Registers a plain synchronous predicate under `name`.
    ///
    /// Convenience wrapper around [`Registry::register`] and
    /// [`SyncRule`].
    pub fn register_fn<F>(&mut self, name: impl Into<String>, func: F) -> Result<(), ConfigError>
    where
        F: Fn(&RuleContext<'_>) -> RuleResult + Send + Sync + 'static,
    {
        self.register(name, Arc::new(SyncRule::new(func)))
    }

    /// Looks up a rule by name.
    ///
    /// Returns `None` rather than erroring so the resolver can produce a
    /// precise "unknown rule" diagnostic with the chain position attached.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<SharedRule> {
        self.rules.get(name).cloned()
    }

    /// Whether a rule is registered under `name`.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    /// Names of every registered rule, unordered.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    /// Number of registered rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    // Builtin installation bypasses the reserved-name check; builtin names
    // are static and vetted.
    pub(crate) fn insert(&mut self, name: impl Into<String>, rule: SharedRule) {
        self.rules.insert(name.into(), rule);
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.rules.keys().collect();
        names.sort();
        f.debug_struct("Registry").field("rules", &names).finish()
    }
}
