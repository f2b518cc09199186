//! Results of attribute and entity runs.

use indexmap::IndexMap;

/// Attribute path → failure message, in evaluation order.
pub type InvalidAttrs = IndexMap<String, String>;

/// Outcome of one attribute chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Valid,
    Invalid(String),
}

impl Verdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verdict::Valid)
    }

    /// The failure message, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            Verdict::Valid => None,
            Verdict::Invalid(message) => Some(message),
        }
    }
}

/// Outcome of one entity run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub invalid_attrs: InvalidAttrs,
    pub is_valid: bool,
}

impl RunReport {
    pub(crate) fn new() -> Self {
        Self {
            invalid_attrs: InvalidAttrs::new(),
            is_valid: true,
        }
    }

    pub(crate) fn record(&mut self, path: &str, verdict: Verdict) {
        if let Verdict::Invalid(message) = verdict {
            self.is_valid = false;
            self.invalid_attrs.insert(path.to_string(), message);
        }
    }

    /// Message for one path, if it failed.
    pub fn message(&self, path: &str) -> Option<&str> {
        self.invalid_attrs.get(path).map(String::as_str)
    }
}

impl Default for RunReport {
    fn default() -> Self {
        Self::new()
    }
}

/// What `validate` tells the caller about the proposed change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Apply the change.
    Accept,
    /// Keep the old state; carries the full invalid map of the run.
    Reject(InvalidAttrs),
}

impl Decision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Decision::Accept)
    }
}
