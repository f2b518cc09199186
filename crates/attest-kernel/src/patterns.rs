//! Named patterns for the `pattern` validator.
//!
//! The built-ins cover the common cases (`digits`, `number`, `email`, `url`).
//! Hosts add their own named patterns through [`crate::ValidationConfig`].

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::ConfigError;

/// One or more digits, nothing else.
pub static DIGITS: LazyLock<Regex> = LazyLock::new(|| compile_builtin(r"^\d+$"));

/// Optionally signed number with optional thousands separators and decimals.
pub static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| compile_builtin(r"^-?(?:\d+|\d{1,3}(?:,\d{3})+)(?:\.\d+)?$"));

/// Pragmatic email address check: local part, `@`, dotted domain.
pub static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    compile_builtin(
        r"(?i)^[a-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[a-z0-9!#$%&'*+/=?^_`{|}~-]+)*@(?:[a-z0-9](?:[a-z0-9-]*[a-z0-9])?\.)+[a-z](?:[a-z0-9-]*[a-z0-9])?$",
    )
});

/// http, https or ftp URL with a host and optional port, path, query, fragment.
pub static URL: LazyLock<Regex> = LazyLock::new(|| {
    compile_builtin(
        r"(?i)^(?:https?|ftp)://(?:[^\s:@/]+(?::[^\s:@/]*)?@)?(?:localhost|(?:[a-z0-9](?:[a-z0-9-]*[a-z0-9])?\.)+[a-z]{2,}|\d{1,3}(?:\.\d{1,3}){3})(?::\d{2,5})?(?:[/?#]\S*)?$",
    )
});

// Built-in sources are constants covered by the tests below.
#[allow(clippy::expect_used)]
fn compile_builtin(source: &str) -> Regex {
    Regex::new(source).expect("built-in pattern compiles")
}

/// Look up a built-in pattern by name.
pub fn builtin(name: &str) -> Option<&'static Regex> {
    match name {
        "digits" => Some(&*DIGITS),
        "number" => Some(&*NUMBER),
        "email" => Some(&*EMAIL),
        "url" => Some(&*URL),
        _ => None,
    }
}

/// Named patterns available to one engine: host patterns shadow built-ins.
#[derive(Debug, Clone, Default)]
pub struct PatternLibrary {
    custom: HashMap<String, Regex>,
}

impl PatternLibrary {
    /// Create a library with only the built-in patterns.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile host-supplied named patterns.
    pub fn with_sources<'a>(
        sources: impl IntoIterator<Item = (&'a String, &'a String)>,
    ) -> Result<Self, ConfigError> {
        let mut library = Self::new();
        for (name, source) in sources {
            let re = Regex::new(source).map_err(|e| ConfigError::Pattern {
                name: name.clone(),
                source: e,
            })?;
            library.insert(name.clone(), re);
        }
        Ok(library)
    }

    /// Add or replace a named pattern.
    pub fn insert(&mut self, name: impl Into<String>, re: Regex) {
        self.custom.insert(name.into(), re);
    }

    /// Resolve a pattern name.
    pub fn get(&self, name: &str) -> Option<&Regex> {
        self.custom.get(name).or_else(|| builtin(name))
    }

    /// True if `name` is a known pattern (custom or built-in).
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}
