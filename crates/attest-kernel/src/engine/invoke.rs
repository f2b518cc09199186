//! The validator invoker: one descriptor against one value.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;

use crate::messages::{FALLBACK_KEY, format_message};
use crate::model::Model;
use crate::rules::Descriptor;
use crate::validators::{Check, Outcome, ValidatorFault};
use crate::value::{Attributes, Value};

use super::Engine;

impl Engine {
    /// Run one descriptor.
    ///
    /// A descriptor message replaces the validator's own failure message. A
    /// fault never escapes, whether returned or raised as a panic: it is
    /// logged and reported as a failure with the descriptor message, or the
    /// generic "is invalid" message without one.
    pub(crate) async fn invoke(
        &self,
        descriptor: &Descriptor,
        value: &Value,
        attr: &str,
        model: &dyn Model,
        computed: &Attributes,
    ) -> Outcome {
        let check = Check {
            value,
            attr,
            param: &descriptor.param,
            model,
            computed,
            engine: self,
        };

        let result = match self.registry().lookup(&descriptor.kind) {
            Some(validator) => AssertUnwindSafe(validator.validate(&check))
                .catch_unwind()
                .await
                .unwrap_or_else(|payload| Err(ValidatorFault::Panicked(panic_message(&*payload)))),
            None => Err(ValidatorFault::UnknownValidator(descriptor.kind.to_string())),
        };

        match result {
            Ok(Outcome::Fail(message)) => match &descriptor.message {
                Some(custom) => Outcome::Fail(self.custom_message(custom, &check)),
                None => Outcome::Fail(message),
            },
            Ok(outcome) => outcome,
            Err(fault) => {
                tracing::warn!(
                    attr,
                    kind = %descriptor.kind,
                    error = %fault,
                    "validator fault reported as failure"
                );
                match &descriptor.message {
                    Some(custom) => Outcome::Fail(self.custom_message(custom, &check)),
                    None => Outcome::Fail(self.fallback_message(&check)),
                }
            }
        }
    }

    fn custom_message(&self, template: &str, check: &Check<'_>) -> String {
        let label = check.label(check.attr);
        format_message(template, &[&label])
    }

    fn fallback_message(&self, check: &Check<'_>) -> String {
        self.custom_message(self.messages().get_or_fallback(FALLBACK_KEY), check)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Entity;
    use crate::rules::{Param, Rules, ValidatorKind};
    use crate::validators::validator_fn;
    use std::sync::Arc;

    async fn invoke(engine: &Engine, descriptor: Descriptor, value: Value) -> Outcome {
        let model = Entity::new(Attributes::new(), Rules::new());
        engine
            .invoke(&descriptor, &value, "nickName", &model, &Attributes::new())
            .await
    }

    #[tokio::test]
    async fn custom_message_replaces_default() {
        let mut d = Descriptor::new(ValidatorKind::Required, Param::Bool(true));
        d.message = Some("{0} cannot be blank".into());
        let out = invoke(&Engine::new(), d, Value::Null).await;
        assert_eq!(out, Outcome::fail("Nick name cannot be blank"));
    }

    #[tokio::test]
    async fn custom_message_leaves_passes_alone() {
        let mut d = Descriptor::new(ValidatorKind::Required, Param::Bool(true));
        d.message = Some("nope".into());
        let out = invoke(&Engine::new(), d, Value::from("x")).await;
        assert_eq!(out, Outcome::Pass);
    }

    #[tokio::test]
    async fn unknown_kind_becomes_failure() {
        let d = Descriptor::new(ValidatorKind::Custom("isbn".into()), Param::Bool(true));
        let out = invoke(&Engine::new(), d, Value::from("x")).await;
        assert_eq!(out, Outcome::fail("Nick name is invalid"));
    }

    #[tokio::test]
    async fn fault_uses_descriptor_message() {
        let boom = validator_fn("boom", |_| Err(ValidatorFault::Message("kaboom".into())));
        let mut d = Descriptor::new(ValidatorKind::Fn, Param::Validator(Arc::new(boom)));
        d.message = Some("try again".into());
        let out = invoke(&Engine::new(), d, Value::from("x")).await;
        assert_eq!(out, Outcome::fail("try again"));
    }

    #[tokio::test]
    async fn bad_param_is_a_fault() {
        let d = Descriptor::new(ValidatorKind::Min, Param::from("eighteen"));
        let out = invoke(&Engine::new(), d, Value::Int(20)).await;
        assert_eq!(out, Outcome::fail("Nick name is invalid"));
    }

    #[tokio::test]
    async fn panic_becomes_failure() {
        let panicky = validator_fn("panicky", |check| -> Result<Outcome, ValidatorFault> {
            panic!("cannot handle {}", check.value)
        });
        let d = Descriptor::new(ValidatorKind::Fn, Param::Validator(Arc::new(panicky)));
        let out = invoke(&Engine::new(), d, Value::from("x")).await;
        assert_eq!(out, Outcome::fail("Nick name is invalid"));
    }

    #[test]
    fn panic_payloads_are_readable() {
        assert_eq!(panic_message(&"static"), "static");
        assert_eq!(panic_message(&String::from("owned")), "owned");
        assert_eq!(panic_message(&42_u8), "non-string panic payload");
    }
}
