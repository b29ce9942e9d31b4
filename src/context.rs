//! Per-invocation context handed to every rule.

use std::any::Any;

use serde_json::Value;

use crate::translate::Translate;

/// Everything a rule body can see for one invocation.
///
/// Built fresh by the engine for each rule unit; all fields are borrows
/// into call-scoped state, so the context is `Copy` and cheap to hand
/// around.
///
/// The value under test is `Option<&Value>`: `None` means the value is
/// absent (an undeclared field), `Some(Value::Null)` means it is
/// explicitly null. The skip sentinels and the `Required` check are
/// defined in terms of this distinction.
#[derive(Clone, Copy)]
pub struct RuleContext<'a> {
    /// The value under test, or `None` when absent.
    pub value: Option<&'a Value>,

    /// Parameters bound to this rule unit, in declaration order.
    ///
    /// Opaque to the engine; only the rule interprets them.
    pub params: &'a [Value],

    /// Field path for error messages (`email`, `address.city`, `items[2]`).
    /// Empty for bare single-value validation.
    pub field: &'a str,

    /// Opaque caller-supplied context, threaded unchanged through nested
    /// and composite evaluation. Downcast with [`RuleContext::custom`].
    pub custom: Option<&'a (dyn Any + Send + Sync)>,

    /// The active translator, for rules that pre-localize.
    pub translator: &'a dyn Translate,
}

impl<'a> RuleContext<'a> {
    /// Downcasts the caller-supplied context to a concrete type.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// struct Session { user_id: u64 }
    ///
    /// fn owner_only(ctx: &RuleContext<'_>) -> RuleResult {
    ///     let session = ctx.custom::<Session>()
    ///         .ok_or_else(|| ValidationError::custom("no session"))?;
    ///     // ...
    /// }
    /// ```
    #[must_use]
    pub fn custom<T: 'static>(&self) -> Option<&'a T> {
        self.custom.and_then(|c| c.downcast_ref::<T>())
    }

    /// Parameter at `index`, if present.
    #[must_use]
    pub fn param(&self, index: usize) -> Option<&'a Value> {
        self.params.get(index)
    }
}

impl std::fmt::Debug for RuleContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleContext")
            .field("value", &self.value)
            .field("params", &self.params)
            .field("field", &self.field)
            .field("has_custom", &self.custom.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::DefaultTranslator;
    use serde_json::json;

    fn ctx<'a>(
        value: Option<&'a Value>,
        params: &'a [Value],
        custom: Option<&'a (dyn Any + Send + Sync)>,
    ) -> RuleContext<'a> {
        RuleContext {
            value,
            params,
            field: "field",
            custom,
            translator: &DefaultTranslator,
        }
    }

    #[test]
    fn custom_downcast() {
        let session = 42_u64;
        let c = ctx(None, &[], Some(&session));
        assert_eq!(c.custom::<u64>(), Some(&42));
        assert_eq!(c.custom::<String>(), None);
    }

    #[test]
    fn custom_absent() {
        let c = ctx(None, &[], None);
        assert_eq!(c.custom::<u64>(), None);
    }

    #[test]
    fn param_access() {
        let params = [json!(3), json!("x")];
        let c = ctx(None, &params, None);
        assert_eq!(c.param(0), Some(&json!(3)));
        assert_eq!(c.param(1), Some(&json!("x")));
        assert_eq!(c.param(2), None);
    }
}
