//! Failure messages and attribute labels.
//!
//! Messages are templates with positional `{n}` placeholders. `{0}` is always
//! the formatted attribute label; later positions carry the validator's
//! parameters.
//!
//! ```text
//! "{0} must be between {1} and {2}"  +  ["Age", 18, 65]
//!     → "Age must be between 18 and 65"
//! ```

use std::collections::HashMap;
use std::fmt::Display;

use serde::Deserialize;

use crate::model::Model;

/// Default message templates, keyed by validator kind or pattern name.
pub const DEFAULT_MESSAGES: &[(&str, &str)] = &[
    ("required", "{0} is required"),
    ("acceptance", "{0} must be accepted"),
    ("min", "{0} must be greater than or equal to {1}"),
    ("max", "{0} must be less than or equal to {1}"),
    ("range", "{0} must be between {1} and {2}"),
    ("length", "{0} must be {1} characters"),
    ("minLength", "{0} must be at least {1} characters"),
    ("maxLength", "{0} must be at most {1} characters"),
    ("rangeLength", "{0} must be between {1} and {2} characters"),
    ("oneOf", "{0} must be one of: {1}"),
    ("equalTo", "{0} must be the same as {1}"),
    ("digits", "{0} must only contain digits"),
    ("number", "{0} must be a number"),
    ("email", "{0} must be a valid email"),
    ("url", "{0} must be a valid url"),
    ("inlinePattern", "{0} is invalid"),
];

/// Template used when nothing more specific exists.
pub const FALLBACK_KEY: &str = "inlinePattern";

/// Message table: defaults overlaid with host overrides.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "HashMap<String, String>")]
pub struct Messages {
    templates: HashMap<String, String>,
}

impl Messages {
    /// The default table.
    pub fn new() -> Self {
        Self {
            templates: DEFAULT_MESSAGES
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        }
    }

    /// Override one template.
    pub fn set(&mut self, key: impl Into<String>, template: impl Into<String>) {
        self.templates.insert(key.into(), template.into());
    }

    /// Template for `key`, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.templates.get(key).map(String::as_str)
    }

    /// Template for `key`, falling back to the generic "is invalid" message.
    pub fn get_or_fallback(&self, key: &str) -> &str {
        self.get(key)
            .or_else(|| self.get(FALLBACK_KEY))
            .unwrap_or("{0} is invalid")
    }
}

impl Default for Messages {
    fn default() -> Self {
        Self::new()
    }
}

impl From<HashMap<String, String>> for Messages {
    fn from(overrides: HashMap<String, String>) -> Self {
        let mut messages = Self::new();
        for (k, v) in overrides {
            messages.set(k, v);
        }
        messages
    }
}

/// Substitute `{n}` placeholders with `args[n]`.
///
/// Placeholders without a matching argument, and anything that is not a
/// `{digits}` group, are copied through unchanged.
pub fn format_message(template: &str, args: &[&dyn Display]) -> String {
    let mut output = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '{' {
            output.push(c);
            continue;
        }

        let mut digits = String::new();
        while let Some(&d) = chars.peek() {
            if d.is_ascii_digit() {
                digits.push(d);
                chars.next();
            } else {
                break;
            }
        }

        let closed = !digits.is_empty() && chars.peek() == Some(&'}');
        let arg = if closed {
            digits.parse::<usize>().ok().and_then(|i| args.get(i))
        } else {
            None
        };

        match arg {
            Some(arg) => {
                chars.next(); // consume '}'
                output.push_str(&arg.to_string());
            }
            None => {
                output.push('{');
                output.push_str(&digits);
            }
        }
    }

    output
}

/// How attribute names are turned into labels for messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LabelFormatter {
    /// Use the attribute path as-is.
    None,
    /// `firstName` → `First name`, `first_name` → `First name`.
    #[default]
    SentenceCase,
    /// The model's declared label, falling back to sentence case.
    Label,
}

impl LabelFormatter {
    /// Format the label for `attr` on `model`.
    pub fn format(self, attr: &str, model: &dyn Model) -> String {
        match self {
            LabelFormatter::None => attr.to_string(),
            LabelFormatter::SentenceCase => sentence_case(attr),
            LabelFormatter::Label => model.label(attr).unwrap_or_else(|| sentence_case(attr)),
        }
    }
}

/// Sentence-case an attribute name.
///
/// The first word character is upper-cased. Every upper-case letter, and every
/// word character that follows a non-word character, starts a new lower-case
/// word. Underscores become spaces.
pub fn sentence_case(attr: &str) -> String {
    let mut out = String::with_capacity(attr.len() + 4);
    let mut prev_word = false;

    for (i, c) in attr.chars().enumerate() {
        let is_word = c.is_ascii_alphanumeric() || c == '_';
        let starts_word = is_word && (i == 0 || c.is_ascii_uppercase() || !prev_word);

        if starts_word && i == 0 {
            out.extend(c.to_uppercase());
        } else if starts_word {
            out.push(' ');
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
        prev_word = is_word;
    }

    out.replace('_', " ")
}
