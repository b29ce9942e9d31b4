//! Message translation seam.
//!
//! The engine never assembles user-facing text itself: every failure is a
//! structured [`ValidationError`] whose `code`, `field`, and `params` are
//! the localization key. A [`Translate`] implementation turns that into a
//! final string when reports are built, and is also reachable from rule
//! bodies through [`RuleContext`](crate::context::RuleContext) for rules
//! that want to pre-localize.

use crate::error::ValidationError;

/// Renders a [`ValidationError`] into user-facing text.
///
/// The error carries everything a message catalog needs: `code` is the
/// lookup key, `params` the substitutions, `field` the location.
/// Implementations may ignore the default English `message` entirely.
///
/// # Examples
///
/// ```
/// use rulekit::error::ValidationError;
/// use rulekit::translate::Translate;
///
/// struct German;
///
/// impl Translate for German {
///     fn translate(&self, error: &ValidationError) -> String {
///         match error.code.as_ref() {
///             "required" => "Pflichtfeld".to_string(),
///             _ => error.message.to_string(),
///         }
///     }
/// }
///
/// let err = ValidationError::required();
/// assert_eq!(German.translate(&err), "Pflichtfeld");
/// ```
pub trait Translate: Send + Sync {
    /// Produces the final message for one validation failure.
    fn translate(&self, error: &ValidationError) -> String;
}

/// Default translator: the error's built-in English message.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTranslator;

impl Translate for DefaultTranslator {
    fn translate(&self, error: &ValidationError) -> String {
        error.message.to_string()
    }
}
