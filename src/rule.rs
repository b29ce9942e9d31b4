//! The rule function contract.
//!
//! Every rule — built-in, caller-registered, or inline — is a
//! [`RuleFn`]: an object-safe, asynchronous predicate over a
//! [`RuleContext`]. Asynchrony is end-to-end by design: there is one
//! evaluation path, and synchronous predicates are adapted with
//! [`SyncRule`] at registration time rather than given a parallel API.

use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::context::RuleContext;
use crate::error::RuleError;

/// Outcome of one rule invocation.
///
/// `Ok(())` is a pass. `Err(RuleError::Invalid(_))` is an ordinary
/// validation failure, recovered into the report. `Err(RuleError::Config(_))`
/// is a caller bug (malformed parameters) and aborts the whole call.
pub type RuleResult = Result<(), RuleError>;

/// An invocable validation rule.
///
/// Object-safe so heterogeneous rules can live in one registry; the future
/// is boxed for the same reason. Implement this directly for rules that
/// await something (a uniqueness lookup, say), or wrap a plain function
/// with [`SyncRule`] — which [`Registry::register_fn`](crate::registry::Registry::register_fn)
/// does for you.
///
/// # Examples
///
/// An async rule implemented by hand:
///
/// ```rust,ignore
/// struct UniqueEmail { store: Arc<UserStore> }
///
/// impl RuleFn for UniqueEmail {
///     fn invoke<'a>(&'a self, ctx: RuleContext<'a>) -> BoxFuture<'a, RuleResult> {
///         Box::pin(async move {
///             let email = expect::string(&ctx)?;
///             if self.store.email_taken(email).await {
///                 Err(ValidationError::new("unique", "Email already in use").into())
///             } else {
///                 Ok(())
///             }
///         })
///     }
/// }
/// ```
pub trait RuleFn: Send + Sync {
    /// Runs the rule against the context's value.
    ///
    /// The engine awaits the returned future before evaluating the next
    /// unit in the chain.
    fn invoke<'a>(&'a self, ctx: RuleContext<'a>) -> BoxFuture<'a, RuleResult>;
}

/// A shared handle to a rule, as stored in the registry and in resolved
/// chains.
pub type SharedRule = Arc<dyn RuleFn>;

// ============================================================================
// SYNC ADAPTER
// ============================================================================

/// Adapts a plain synchronous predicate to the [`RuleFn`] contract.
///
/// The wrapped function runs to completion before the future is even
/// polled, so the adapter costs one ready-future allocation and nothing
/// else.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use rulekit::rule::{RuleFn, SyncRule, SharedRule};
/// use rulekit::error::ValidationError;
///
/// let rule: SharedRule = Arc::new(SyncRule::new(|ctx: &rulekit::context::RuleContext<'_>| {
///     match ctx.value.and_then(|v| v.as_str()) {
///         Some(s) if s.starts_with("ok") => Ok(()),
///         _ => Err(ValidationError::custom("must start with `ok`").into()),
///     }
/// }));
/// ```
pub struct SyncRule<F> {
    func: F,
}

impl<F> SyncRule<F>
where
    F: Fn(&RuleContext<'_>) -> RuleResult + Send + Sync,
{
    /// Wraps a synchronous predicate.
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> RuleFn for SyncRule<F>
where
    F: Fn(&RuleContext<'_>) -> RuleResult + Send + Sync,
{
    fn invoke<'a>(&'a self, ctx: RuleContext<'a>) -> BoxFuture<'a, RuleResult> {
        futures::future::ready((self.func)(&ctx)).boxed()
    }
}

/// Wraps a synchronous predicate into a [`SharedRule`].
///
/// Shorthand for `Arc::new(SyncRule::new(f))`, handy for inline rule
/// specifications.
pub fn sync_rule<F>(func: F) -> SharedRule
where
    F: Fn(&RuleContext<'_>) -> RuleResult + Send + Sync + 'static,
{
    Arc::new(SyncRule::new(func))
}
