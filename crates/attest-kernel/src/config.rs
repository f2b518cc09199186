//! Validation configuration.
//!
//! A [`ValidationConfig`] is a plain value handed to [`crate::Validation::new`].
//! There is no process-wide default to mutate; build one config per setup and
//! override `force_update` per call through [`RunOptions`].
//!
//! ```toml
//! force-update = false
//! selector = "name"
//! label-formatter = "label"
//!
//! [messages]
//! required = "Please fill in {0}"
//!
//! [patterns]
//! postcode = '^\d{4}$'
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use crate::binding::{Hooks, LogHooks};
use crate::error::ConfigError;
use crate::messages::{LabelFormatter, Messages};

fn default_selector() -> String {
    "name".to_string()
}

fn default_hooks() -> Arc<dyn Hooks> {
    Arc::new(LogHooks)
}

/// Settings shared by every binding created from one [`crate::Validation`].
#[derive(Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ValidationConfig {
    /// Accept changes even when validation fails. Callbacks still fire.
    #[serde(default)]
    pub force_update: bool,

    /// Opaque selector handed to the hooks (the attribute a view uses to find
    /// an attribute's element).
    #[serde(default = "default_selector")]
    pub selector: String,

    #[serde(default)]
    pub label_formatter: LabelFormatter,

    /// Message template overrides, merged over the defaults.
    #[serde(default)]
    pub messages: Messages,

    /// Named regex sources usable from `pattern` rules.
    #[serde(default)]
    pub patterns: HashMap<String, String>,

    /// Valid/invalid callbacks.
    #[serde(skip, default = "default_hooks")]
    pub hooks: Arc<dyn Hooks>,
}

impl ValidationConfig {
    /// Parse a config from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Replace the callbacks.
    pub fn with_hooks(mut self, hooks: impl Hooks + 'static) -> Self {
        self.hooks = Arc::new(hooks);
        self
    }

    pub fn force_update(mut self, force: bool) -> Self {
        self.force_update = force;
        self
    }

    pub fn label_formatter(mut self, labels: LabelFormatter) -> Self {
        self.label_formatter = labels;
        self
    }

    /// Override one message template.
    pub fn message(mut self, key: impl Into<String>, template: impl Into<String>) -> Self {
        self.messages.set(key, template);
        self
    }

    /// Add a named pattern source. Compiled when the engine is built.
    pub fn pattern(mut self, name: impl Into<String>, source: impl Into<String>) -> Self {
        self.patterns.insert(name.into(), source.into());
        self
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            force_update: false,
            selector: default_selector(),
            label_formatter: LabelFormatter::default(),
            messages: Messages::default(),
            patterns: HashMap::new(),
            hooks: default_hooks(),
        }
    }
}

impl fmt::Debug for ValidationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationConfig")
            .field("force_update", &self.force_update)
            .field("selector", &self.selector)
            .field("label_formatter", &self.label_formatter)
            .field("messages", &self.messages)
            .field("patterns", &self.patterns)
            .finish_non_exhaustive()
    }
}

/// Per-call overrides for `validate` and `set`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Overrides [`ValidationConfig::force_update`] when set.
    pub force_update: Option<bool>,
}

impl RunOptions {
    /// Accept the change whatever the outcome.
    pub fn forced() -> Self {
        Self {
            force_update: Some(true),
        }
    }

    pub(crate) fn resolve_force(self, config: &ValidationConfig) -> bool {
        self.force_update.unwrap_or(config.force_update)
    }
}
