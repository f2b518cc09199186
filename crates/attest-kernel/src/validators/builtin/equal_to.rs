//! equalTo: the value must equal the value at another attribute path.
//!
//! The other side is read from the computed attributes of the current run, so
//! a proposed `password` and `passwordRepeat` are compared against each other
//! rather than against what the model holds.

use async_trait::async_trait;

use crate::rules::Param;
use crate::validators::{Check, Outcome, Validator, ValidatorFault};
use crate::value::Value;

/// Equality-with-another-attribute validator.
pub struct EqualTo;

#[async_trait]
impl Validator for EqualTo {
    fn name(&self) -> &str {
        "equalTo"
    }

    async fn validate(&self, check: &Check<'_>) -> Result<Outcome, ValidatorFault> {
        let Param::Text(other) = check.param else {
            return Err(ValidatorFault::bad_param("equalTo", "an attribute path", check.param));
        };
        let expected = check.computed_value(other).unwrap_or(&Value::Null);
        if check.value == expected {
            Ok(Outcome::Pass)
        } else {
            let other_label = check.label(other);
            Ok(check.fail("equalTo", &[&other_label]))
        }
    }
}
