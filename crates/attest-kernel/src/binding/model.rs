//! Validation bound to one model.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::runtime::Handle;

use crate::config::{RunOptions, ValidationConfig};
use crate::engine::{Decision, Engine, RunReport, Verdict};
use crate::flatten::{flatten, lookup};
use crate::model::{Model, ModelEvent};
use crate::value::{Attributes, Value};

use super::View;

/// Which attributes `is_valid` should check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// One attribute path.
    Attr(String),
    /// Several paths; valid only if all are.
    Attrs(Vec<String>),
    /// A full `validate` run, with callbacks and events.
    All,
}

impl From<&str> for Query {
    fn from(attr: &str) -> Self {
        Query::Attr(attr.to_string())
    }
}

impl From<Vec<&str>> for Query {
    fn from(attrs: Vec<&str>) -> Self {
        Query::Attrs(attrs.into_iter().map(str::to_string).collect())
    }
}

/// Validation operations for one model.
///
/// Runs against the same model are not coordinated: start a new `validate`
/// only after the previous one has settled, or both may observe a model that
/// changed mid-run.
pub struct ModelBinding {
    model: Arc<dyn Model>,
    view: Option<Arc<View>>,
    engine: Arc<Engine>,
    config: Arc<ValidationConfig>,
    last_valid: AtomicBool,
}

impl ModelBinding {
    pub(crate) fn new(
        model: Arc<dyn Model>,
        view: Option<Arc<View>>,
        engine: Arc<Engine>,
        config: Arc<ValidationConfig>,
    ) -> Self {
        Self {
            model,
            view,
            engine,
            config,
            last_valid: AtomicBool::new(false),
        }
    }

    pub fn model(&self) -> &Arc<dyn Model> {
        &self.model
    }

    pub fn cid(&self) -> &str {
        self.model.cid()
    }

    pub fn view(&self) -> Option<&View> {
        self.view.as_deref()
    }

    /// Check a candidate value for one attribute without touching the model.
    ///
    /// Cross-field rules see the model's current attributes, flattened.
    pub async fn pre_validate(&self, attr: &str, value: impl Into<Value>) -> Verdict {
        let value = value.into();
        let computed = flatten(&self.model.attributes());
        self.engine
            .validate_attr(self.model.as_ref(), attr, &value, &computed)
            .await
    }

    /// Check the current attribute values.
    ///
    /// [`Query::All`] runs a full [`validate`](Self::validate), firing callbacks
    /// and events. The other queries run only the named chains.
    pub async fn is_valid(&self, query: impl Into<Query>) -> bool {
        let attrs = match query.into() {
            Query::All => {
                self.validate(None, RunOptions::default()).await;
                return self.is_valid_snapshot();
            }
            Query::Attr(attr) => vec![attr],
            Query::Attrs(attrs) => attrs,
        };

        let computed = flatten(&self.model.attributes());
        let mut valid = true;
        for attr in &attrs {
            let value = lookup(&computed, attr).cloned().unwrap_or(Value::Null);
            let verdict = self
                .engine
                .validate_attr(self.model.as_ref(), attr, &value, &computed)
                .await;
            valid &= verdict.is_valid();
        }
        valid
    }

    /// Outcome of the last `validate` run without running anything.
    ///
    /// A model without rules is always valid; otherwise this is `false` until
    /// the first run.
    pub fn is_valid_snapshot(&self) -> bool {
        self.model.rules().is_empty() || self.last_valid.load(Ordering::Acquire)
    }

    /// Validate the model with `proposed` changes overlaid, or as it is.
    ///
    /// Every validated attribute runs. Afterwards:
    /// - `valid` fires for each validated attribute that passed
    /// - `invalid` fires for each failing attribute in the change set, or for
    ///   every failing attribute when `proposed` is `None`
    /// - `validated` and `validated:valid`/`validated:invalid` are triggered on
    ///   the model from a spawned task, after this call has returned
    ///
    /// Rejects when a failing attribute is part of the change set, unless
    /// `force_update` is on.
    pub async fn validate(&self, proposed: Option<Attributes>, opts: RunOptions) -> Decision {
        let all = self.prospective(proposed.as_ref());
        let changed: HashSet<String> = match &proposed {
            Some(changes) => flatten(changes).into_keys().collect(),
            None => flatten(&all).into_keys().collect(),
        };
        let validate_all = proposed.is_none();

        let report = self.engine.validate_entity(self.model.as_ref(), &all).await;

        self.run_hooks(&report, &changed, validate_all);
        self.last_valid.store(report.is_valid, Ordering::Release);
        self.notify(&report);

        let force = opts.resolve_force(&self.config);
        let rejected = report
            .invalid_attrs
            .keys()
            .any(|attr| changed.contains(attr));

        if !force && rejected {
            tracing::debug!(cid = self.cid(), invalid = report.invalid_attrs.len(), "rejected");
            Decision::Reject(report.invalid_attrs)
        } else {
            Decision::Accept
        }
    }

    /// Validate `changes` and apply them to the model if accepted.
    pub async fn set(&self, changes: Attributes, opts: RunOptions) -> Decision {
        let decision = self.validate(Some(changes.clone()), opts).await;
        if decision.is_accepted() {
            self.model.apply(changes);
        }
        decision
    }

    /// Detach from the model.
    pub fn unbind(self) {
        tracing::debug!(cid = self.cid(), "unbound");
    }

    /// The model's attributes with the proposed changes overlaid. Rule paths
    /// that resolve to nothing are added as null so their chains still run.
    fn prospective(&self, proposed: Option<&Attributes>) -> Attributes {
        let mut all = self.model.attributes();
        if let Some(changes) = proposed {
            all.extend(changes.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        let missing: Vec<String> = self
            .model
            .rules()
            .paths()
            .filter(|path| lookup(&all, path).is_none())
            .map(str::to_string)
            .collect();
        for path in missing {
            all.insert(path, Value::Null);
        }
        all
    }

    fn run_hooks(&self, report: &RunReport, changed: &HashSet<String>, validate_all: bool) {
        let hooks = &self.config.hooks;
        let view = self.view();
        let selector = self.config.selector.as_str();

        for attr in self.model.rules().paths() {
            match report.message(attr) {
                None => hooks.valid(view, attr, selector),
                Some(message) if validate_all || changed.contains(attr) => {
                    hooks.invalid(view, attr, message, selector);
                }
                Some(_) => {}
            }
        }
    }

    fn notify(&self, report: &RunReport) {
        let model = Arc::clone(&self.model);
        let is_valid = report.is_valid;
        let invalid_attrs = report.invalid_attrs.clone();

        let deliver = move || {
            model.trigger(ModelEvent::Validated {
                is_valid,
                invalid_attrs: invalid_attrs.clone(),
            });
            model.trigger(if is_valid {
                ModelEvent::ValidatedValid { invalid_attrs }
            } else {
                ModelEvent::ValidatedInvalid { invalid_attrs }
            });
        };

        match Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move { deliver() });
            }
            Err(_) => deliver(),
        }
    }
}

impl fmt::Debug for ModelBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelBinding")
            .field("cid", &self.cid())
            .field("view", &self.view().map(View::name))
            .field("last_valid", &self.last_valid.load(Ordering::Relaxed))
            .finish()
    }
}
