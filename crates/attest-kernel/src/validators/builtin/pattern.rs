//! pattern: the stringified value must match a regex.
//!
//! The parameter is either a compiled [`Regex`](regex::Regex) or a name. Names
//! resolve through the engine's pattern library first; a name that is not a
//! known pattern is compiled as a regex source. Named patterns fail with the
//! message of the same name when one exists (`email` → "must be a valid
//! email"); everything else uses the generic `inlinePattern` message.

use std::borrow::Cow;

use async_trait::async_trait;
use regex::Regex;

use crate::messages::FALLBACK_KEY;
use crate::rules::Param;
use crate::validators::{Check, Outcome, Validator, ValidatorFault};

/// Regex validator.
pub struct Pattern;

#[async_trait]
impl Validator for Pattern {
    fn name(&self) -> &str {
        "pattern"
    }

    async fn validate(&self, check: &Check<'_>) -> Result<Outcome, ValidatorFault> {
        let (re, key): (Cow<'_, Regex>, &str) = match check.param {
            Param::Pattern(re) => (Cow::Borrowed(re), FALLBACK_KEY),
            Param::Text(name) => match check.engine.patterns().get(name) {
                Some(re) => {
                    let key = if check.engine.messages().get(name).is_some() {
                        name.as_str()
                    } else {
                        FALLBACK_KEY
                    };
                    (Cow::Borrowed(re), key)
                }
                None => {
                    let re = Regex::new(name).map_err(|e| {
                        ValidatorFault::Message(format!("invalid pattern `{name}`: {e}"))
                    })?;
                    (Cow::Owned(re), FALLBACK_KEY)
                }
            },
            other => {
                return Err(ValidatorFault::bad_param(
                    "pattern",
                    "a pattern name or a regex",
                    other,
                ));
            }
        };

        if check.value.has_value() && re.is_match(&check.value.to_string()) {
            Ok(Outcome::Pass)
        } else {
            Ok(check.fail(key, &[check.param]))
        }
    }
}
