//! fn: delegate to a custom validator or a named model method.

use async_trait::async_trait;

use crate::rules::Param;
use crate::validators::{Check, Outcome, Validator, ValidatorFault};

/// Custom function step.
///
/// Carries either the validator itself or the name of a method to resolve on
/// the model at run time. A missing method is a fault.
pub struct Func;

#[async_trait]
impl Validator for Func {
    fn name(&self) -> &str {
        "fn"
    }

    async fn validate(&self, check: &Check<'_>) -> Result<Outcome, ValidatorFault> {
        match check.param {
            Param::Validator(v) => v.validate(check).await,
            Param::Text(name) => {
                let method = check
                    .model
                    .method(name)
                    .ok_or_else(|| ValidatorFault::MissingMethod(name.clone()))?;
                method.validate(check).await
            }
            other => Err(ValidatorFault::bad_param(
                "fn",
                "a validator or a method name",
                other,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Engine;
    use crate::model::Entity;
    use crate::rules::Rules;
    use crate::validators::builtin::testing::run;
    use crate::validators::validator_fn;
    use crate::value::{Attributes, Value};
    use std::sync::Arc;

    #[tokio::test]
    async fn delegates_to_validator() {
        let even: Arc<dyn Validator> = Arc::new(validator_fn("even", |check| match check.value {
            Value::Int(i) if i % 2 == 0 => Ok(Outcome::Pass),
            _ => Ok(Outcome::fail("must be even")),
        }));
        assert_eq!(run(&Func, Value::Int(4), Param::Validator(even.clone())).await, Outcome::Pass);
        assert_eq!(
            run(&Func, Value::Int(3), Param::Validator(even)).await,
            Outcome::fail("must be even")
        );
    }

    #[tokio::test]
    async fn resolves_model_method() {
        let engine = Engine::new();
        let model = Entity::builder()
            .method(
                "notAdmin",
                validator_fn("notAdmin", |check| {
                    if check.value.as_str() == Some("admin") {
                        Ok(Outcome::fail("reserved"))
                    } else {
                        Ok(Outcome::Pass)
                    }
                }),
            )
            .build();
        let computed = Attributes::new();
        let value = Value::from("admin");
        let param = Param::from("notAdmin");
        let check = Check {
            value: &value,
            attr: "user",
            param: &param,
            model: &model,
            computed: &computed,
            engine: &engine,
        };
        assert_eq!(Func.validate(&check).await.unwrap(), Outcome::fail("reserved"));
    }

    #[tokio::test]
    async fn missing_method_is_a_fault() {
        let engine = Engine::new();
        let model = Entity::new(Attributes::new(), Rules::new());
        let computed = Attributes::new();
        let value = Value::Null;
        let param = Param::from("nope");
        let check = Check {
            value: &value,
            attr: "x",
            param: &param,
            model: &model,
            computed: &computed,
            engine: &engine,
        };
        let err = Func.validate(&check).await.unwrap_err();
        assert!(matches!(err, ValidatorFault::MissingMethod(name) if name == "nope"));
    }
}
