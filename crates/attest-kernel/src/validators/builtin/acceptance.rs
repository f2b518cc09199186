//! acceptance: the value must be `true` or the string `"true"`.

use async_trait::async_trait;

use crate::validators::{Check, Outcome, Validator, ValidatorFault};
use crate::value::Value;

/// Acceptance validator, for "I agree" style checkboxes.
pub struct Acceptance;

#[async_trait]
impl Validator for Acceptance {
    fn name(&self) -> &str {
        "acceptance"
    }

    async fn validate(&self, check: &Check<'_>) -> Result<Outcome, ValidatorFault> {
        let accepted = match check.value {
            Value::Bool(b) => *b,
            Value::String(s) => s == "true",
            _ => false,
        };
        if accepted {
            Ok(Outcome::Pass)
        } else {
            Ok(check.fail("acceptance", &[]))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Param;
    use crate::validators::builtin::testing::run;
    use rstest::rstest;

    #[rstest]
    #[case::bool_true(Value::Bool(true), true)]
    #[case::string_true(Value::from("true"), true)]
    #[case::bool_false(Value::Bool(false), false)]
    #[case::string_yes(Value::from("yes"), false)]
    #[case::one(Value::Int(1), false)]
    #[case::null(Value::Null, false)]
    #[tokio::test]
    async fn acceptance(#[case] value: Value, #[case] accepted: bool) {
        let out = run(&Acceptance, value, Param::None).await;
        if accepted {
            assert_eq!(out, Outcome::Pass);
        } else {
            assert_eq!(out, Outcome::fail("Field must be accepted"));
        }
    }
}
