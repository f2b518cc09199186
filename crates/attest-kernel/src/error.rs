//! Error types for binding and configuration.
//!
//! Validation failures are not errors. They travel as [`crate::Verdict`] and
//! [`crate::RunReport`]. The types here cover the cases where the setup itself
//! is wrong.

use std::path::PathBuf;

use thiserror::Error;

/// Binding could not be established.
#[derive(Debug, Error)]
pub enum BindError {
    /// The view has neither a model nor a collection to validate.
    #[error("before binding, the view `{view}` must have a model or a collection")]
    NoModelOrCollection { view: String },

    /// A rule names a validator kind the registry does not know.
    #[error("attribute `{attr}` uses unknown validator `{kind}`")]
    UnknownValidator { attr: String, kind: String },

    /// A string rule names a method the model does not expose.
    #[error("attribute `{attr}` refers to missing method `{method}`")]
    MissingMethod { attr: String, method: String },
}

/// Configuration could not be loaded or compiled.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("pattern `{name}` does not compile: {source}")]
    Pattern {
        name: String,
        #[source]
        source: regex::Error,
    },
}
