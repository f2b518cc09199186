//! Attribute and entity chain runners.
//!
//! Both are plain sequential loops over await points. Step `k + 1` is never
//! started before step `k` has settled, within an attribute and across
//! attributes, so a validator that suspends holds up everything after it.

use tracing::instrument;

use crate::error::BindError;
use crate::flatten::flatten;
use crate::model::Model;
use crate::rules::{Param, ValidatorKind, normalize};
use crate::validators::Outcome;
use crate::value::{Attributes, Value};

use super::{Engine, RunReport, Verdict};

impl Engine {
    /// Run the chain for one attribute.
    ///
    /// Stops at the first failure. A `Skip` (an empty, optional attribute at
    /// the `required` step) ends the chain as valid. No descriptors means valid.
    #[instrument(level = "debug", skip(self, model, value, computed), fields(cid = model.cid()))]
    pub async fn validate_attr(
        &self,
        model: &dyn Model,
        attr: &str,
        value: &Value,
        computed: &Attributes,
    ) -> Verdict {
        let descriptors = model.rules().descriptors(attr);

        for descriptor in &descriptors {
            let outcome = self.invoke(descriptor, value, attr, model, computed).await;
            tracing::trace!(kind = %descriptor.kind, ?outcome, "step settled");

            match outcome {
                Outcome::Pass => continue,
                Outcome::Skip => return Verdict::Valid,
                Outcome::Fail(message) => return Verdict::Invalid(message),
            }
        }

        Verdict::Valid
    }

    /// Run every attribute of `attrs` in flattened order.
    ///
    /// Never stops early: each path's chain runs exactly once, and the report
    /// holds every failure. The flattened paths are the computed context handed
    /// to cross-field validators.
    #[instrument(level = "debug", skip(self, model, attrs), fields(cid = model.cid()))]
    pub async fn validate_entity(&self, model: &dyn Model, attrs: &Attributes) -> RunReport {
        let flattened = flatten(attrs);
        let mut report = RunReport::new();

        for (path, value) in &flattened {
            let verdict = self.validate_attr(model, path, value, &flattened).await;
            report.record(path, verdict);
        }

        tracing::debug!(
            attributes = flattened.len(),
            invalid = report.invalid_attrs.len(),
            is_valid = report.is_valid,
            "entity run settled"
        );
        report
    }

    /// Check that every declared kind is registered and every named method
    /// exists on the model.
    pub fn check_rules(&self, model: &dyn Model) -> Result<(), BindError> {
        for (attr, declaration) in model.rules().iter() {
            for descriptor in normalize(declaration) {
                if !self.registry().contains(descriptor.kind.name()) {
                    return Err(BindError::UnknownValidator {
                        attr: attr.to_string(),
                        kind: descriptor.kind.to_string(),
                    });
                }
                if let (ValidatorKind::Fn, Param::Text(method)) = (&descriptor.kind, &descriptor.param) {
                    if model.method(method).is_none() {
                        return Err(BindError::MissingMethod {
                            attr: attr.to_string(),
                            method: method.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}
