//! required: presence check that also gates the rest of the chain.
//!
//! For an empty value:
//! - not required → [`Outcome::Skip`]: the attribute is valid and no later
//!   step runs
//! - required → failure, and no later step runs either
//!
//! Non-empty values pass and the chain continues.

use async_trait::async_trait;

use crate::rules::Param;
use crate::validators::{Check, Outcome, Validator, ValidatorFault};

/// Required validator: `true`/`false` or a predicate of the current values.
pub struct Required;

#[async_trait]
impl Validator for Required {
    fn name(&self) -> &str {
        "required"
    }

    async fn validate(&self, check: &Check<'_>) -> Result<Outcome, ValidatorFault> {
        let required = match check.param {
            Param::Bool(b) => *b,
            Param::Predicate(predicate) => predicate(check.value, check.attr, check.computed),
            other => {
                return Err(ValidatorFault::bad_param(
                    "required",
                    "a bool or a predicate",
                    other,
                ));
            }
        };

        if check.value.has_value() {
            return Ok(Outcome::Pass);
        }

        if required {
            Ok(check.fail("required", &[]))
        } else {
            Ok(Outcome::Skip)
        }
    }
}
