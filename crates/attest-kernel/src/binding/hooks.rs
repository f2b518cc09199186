//! Valid/invalid callbacks.

use super::View;

/// Callbacks fired after each `validate` run, once per validated attribute.
///
/// `valid` fires for every validated attribute that passed. `invalid` fires
/// for a failing attribute when it was part of the change set, or on a full
/// validation. Views use these to toggle error state on the element found
/// through `selector`.
pub trait Hooks: Send + Sync {
    fn valid(&self, _view: Option<&View>, _attr: &str, _selector: &str) {}

    fn invalid(&self, _view: Option<&View>, _attr: &str, _message: &str, _selector: &str) {}
}

/// Default hooks: log and do nothing else.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogHooks;

impl Hooks for LogHooks {
    fn valid(&self, view: Option<&View>, attr: &str, selector: &str) {
        tracing::debug!(view = view.map(View::name), attr, selector, "valid");
    }

    fn invalid(&self, view: Option<&View>, attr: &str, message: &str, selector: &str) {
        tracing::debug!(view = view.map(View::name), attr, message, selector, "invalid");
    }
}
