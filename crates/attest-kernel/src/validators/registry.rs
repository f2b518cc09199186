//! Validator kinds resolvable at run time.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::Validator;
use crate::rules::ValidatorKind;

/// Validators by kind name.
///
/// Built-in kinds can be replaced by registering a validator under the same
/// name; rules keep referring to the kind, not the implementation.
#[derive(Default)]
pub struct ValidatorRegistry {
    by_kind: HashMap<String, Arc<dyn Validator>>,
}

impl ValidatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The thirteen built-in kinds.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        super::builtin::register_builtins(&mut registry);
        registry
    }

    /// Make `validator` the implementation of the kind it names.
    ///
    /// Returns the validator it displaced, if any.
    pub fn register(&mut self, validator: impl Validator + 'static) -> Option<Arc<dyn Validator>> {
        let kind = validator.name().to_string();
        let displaced = self.by_kind.insert(kind.clone(), Arc::new(validator));
        if displaced.is_some() && ValidatorKind::from_name(&kind).is_builtin() {
            tracing::debug!(kind, "built-in validator replaced");
        }
        displaced
    }

    /// Implementation for `kind`, if registered.
    pub fn lookup(&self, kind: &ValidatorKind) -> Option<Arc<dyn Validator>> {
        self.by_kind.get(kind.name()).cloned()
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.by_kind.contains_key(kind)
    }

    /// Registered kind names, sorted.
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<_> = self.by_kind.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }
}

impl fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.kinds()).finish()
    }
}
