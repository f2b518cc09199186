//! The validation engine.
//!
//! An [`Engine`] bundles what a run needs besides the model: the validator
//! registry, named patterns, message templates and the label formatter. It is
//! immutable once built and cheap to share behind an `Arc`.
//!
//! ```text
//! validate_entity ──▶ flatten ──▶ for each path: validate_attr
//!                                    └─▶ for each descriptor: invoke ──▶ Validator
//! ```

mod chain;
mod invoke;
mod report;

pub use report::{Decision, InvalidAttrs, RunReport, Verdict};

use std::sync::Arc;

use crate::config::ValidationConfig;
use crate::error::ConfigError;
use crate::messages::{LabelFormatter, Messages};
use crate::patterns::PatternLibrary;
use crate::validators::ValidatorRegistry;

/// Registry, patterns, messages and labels for validation runs.
#[derive(Debug, Clone)]
pub struct Engine {
    registry: Arc<ValidatorRegistry>,
    patterns: PatternLibrary,
    messages: Messages,
    labels: LabelFormatter,
}

impl Engine {
    /// Engine with the built-in validators and default settings.
    pub fn new() -> Self {
        Self {
            registry: Arc::new(ValidatorRegistry::with_builtins()),
            patterns: PatternLibrary::new(),
            messages: Messages::new(),
            labels: LabelFormatter::default(),
        }
    }

    /// Engine configured from `config`, with the built-in validators.
    ///
    /// Fails if a custom pattern does not compile.
    pub fn from_config(config: &ValidationConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            registry: Arc::new(ValidatorRegistry::with_builtins()),
            patterns: PatternLibrary::with_sources(&config.patterns)?,
            messages: config.messages.clone(),
            labels: config.label_formatter,
        })
    }

    /// Replace the validator registry.
    pub fn with_registry(mut self, registry: Arc<ValidatorRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn registry(&self) -> &ValidatorRegistry {
        &self.registry
    }

    pub fn patterns(&self) -> &PatternLibrary {
        &self.patterns
    }

    pub fn messages(&self) -> &Messages {
        &self.messages
    }

    pub fn label_formatter(&self) -> LabelFormatter {
        self.labels
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
