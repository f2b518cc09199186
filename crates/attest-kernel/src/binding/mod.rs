//! Lifecycle integration: attaching validation to models and collections.
//!
//! Nothing is injected into the model. Binding returns a wrapper that holds a
//! reference to the model and exposes the validation operations:
//!
//! - [`ModelBinding::pre_validate`]: one attribute, one candidate value
//! - [`ModelBinding::is_valid`] / [`ModelBinding::is_valid_snapshot`]
//! - [`ModelBinding::validate`]: a full run with callbacks, events and an
//!   accept/reject decision
//! - [`ModelBinding::set`]: validate, then apply if accepted
//!
//! A view with a collection gets a [`CollectionBinding`] that keeps one
//! `ModelBinding` per member and follows membership changes.

mod collection;
mod hooks;
mod model;

pub use collection::CollectionBinding;
pub use hooks::{Hooks, LogHooks};
pub use model::{ModelBinding, Query};

use std::fmt;
use std::sync::Arc;

use crate::config::ValidationConfig;
use crate::engine::Engine;
use crate::error::{BindError, ConfigError};
use crate::model::{Collection, Model};
use crate::validators::ValidatorRegistry;

/// The host-side object validation is bound to: a model, a collection, or
/// (misconfigured) neither.
#[derive(Clone)]
pub struct View {
    name: String,
    model: Option<Arc<dyn Model>>,
    collection: Option<Arc<Collection>>,
}

impl View {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: None,
            collection: None,
        }
    }

    pub fn with_model(mut self, model: Arc<dyn Model>) -> Self {
        self.model = Some(model);
        self
    }

    pub fn with_collection(mut self, collection: Arc<Collection>) -> Self {
        self.collection = Some(collection);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn model(&self) -> Option<&Arc<dyn Model>> {
        self.model.as_ref()
    }

    pub fn collection(&self) -> Option<&Arc<Collection>> {
        self.collection.as_ref()
    }
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("name", &self.name)
            .field("model", &self.model.as_ref().map(|m| m.cid().to_string()))
            .field("collection", &self.collection)
            .finish()
    }
}

/// Result of binding a view.
#[derive(Debug)]
pub enum Bound {
    Model(ModelBinding),
    Collection(CollectionBinding),
}

impl Bound {
    pub fn into_model(self) -> Option<ModelBinding> {
        match self {
            Bound::Model(binding) => Some(binding),
            Bound::Collection(_) => None,
        }
    }

    pub fn into_collection(self) -> Option<CollectionBinding> {
        match self {
            Bound::Collection(binding) => Some(binding),
            Bound::Model(_) => None,
        }
    }
}

/// Entry point: an engine plus the config every binding shares.
#[derive(Debug, Clone)]
pub struct Validation {
    engine: Arc<Engine>,
    config: Arc<ValidationConfig>,
}

impl Validation {
    /// Build from a config. Fails if a custom pattern does not compile.
    pub fn new(config: ValidationConfig) -> Result<Self, ConfigError> {
        let engine = Engine::from_config(&config)?;
        Ok(Self {
            engine: Arc::new(engine),
            config: Arc::new(config),
        })
    }

    /// Use `registry` instead of the built-ins only, e.g. to add custom kinds.
    pub fn with_registry(self, registry: ValidatorRegistry) -> Self {
        let engine = Engine::clone(&self.engine).with_registry(Arc::new(registry));
        Self {
            engine: Arc::new(engine),
            config: self.config,
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Bind to a view's model, or to each member of its collection.
    ///
    /// The model wins when a view has both.
    pub fn bind(&self, view: View) -> Result<Bound, BindError> {
        let view = Arc::new(view);

        if let Some(model) = view.model().cloned() {
            let binding = self.bind_model(model, Some(view))?;
            return Ok(Bound::Model(binding));
        }

        if let Some(collection) = view.collection().cloned() {
            let binding = CollectionBinding::new(self, collection, view)?;
            return Ok(Bound::Collection(binding));
        }

        Err(BindError::NoModelOrCollection {
            view: view.name().to_string(),
        })
    }

    /// Bind directly to a model with no view; hooks receive `None`.
    pub fn attach(&self, model: Arc<dyn Model>) -> Result<ModelBinding, BindError> {
        self.bind_model(model, None)
    }

    pub(crate) fn bind_model(
        &self,
        model: Arc<dyn Model>,
        view: Option<Arc<View>>,
    ) -> Result<ModelBinding, BindError> {
        self.engine.check_rules(model.as_ref())?;
        tracing::debug!(
            cid = model.cid(),
            view = view.as_deref().map(View::name),
            "bound"
        );
        Ok(ModelBinding::new(
            model,
            view,
            Arc::clone(&self.engine),
            Arc::clone(&self.config),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Entity;
    use crate::rules::{RuleMap, Rules};
    use crate::value::Attributes;

    fn entity(rules: Rules) -> Arc<dyn Model> {
        Arc::new(Entity::new(Attributes::new(), rules))
    }

    #[test]
    fn bind_without_model_or_collection_fails() {
        let validation = Validation::new(ValidationConfig::default()).unwrap();
        let err = validation.bind(View::new("signup")).unwrap_err();
        assert!(matches!(&err, BindError::NoModelOrCollection { view } if view == "signup"));
        assert_eq!(
            err.to_string(),
            "before binding, the view `signup` must have a model or a collection"
        );
    }

    #[test]
    fn bind_prefers_model() {
        let validation = Validation::new(ValidationConfig::default()).unwrap();
        let view = View::new("v")
            .with_model(entity(Rules::new()))
            .with_collection(Arc::new(Collection::new()));
        assert!(validation.bind(view).unwrap().into_model().is_some());
    }

    #[test]
    fn bind_collection() {
        let validation = Validation::new(ValidationConfig::default()).unwrap();
        let collection = Arc::new(Collection::with_models(vec![
            entity(Rules::new()),
            entity(Rules::new()),
        ]));
        let bound = validation
            .bind(View::new("list").with_collection(collection))
            .unwrap()
            .into_collection()
            .unwrap();
        assert_eq!(bound.len(), 2);
    }

    #[test]
    fn attach_checks_rules() {
        let validation = Validation::new(ValidationConfig::default()).unwrap();
        let err = validation
            .attach(entity(Rules::new().attr("isbn", RuleMap::new().with("isbn", true))))
            .unwrap_err();
        assert!(matches!(err, BindError::UnknownValidator { .. }));
    }

    #[test]
    fn bad_custom_pattern_fails_setup() {
        let config = ValidationConfig::default().pattern("broken", "(unclosed");
        let err = Validation::new(config).unwrap_err();
        assert!(matches!(err, ConfigError::Pattern { name, .. } if name == "broken"));
    }

    #[test]
    fn custom_registry_enables_custom_kinds() {
        use crate::validators::{Outcome, validator_fn};

        let mut registry = ValidatorRegistry::with_builtins();
        registry.register(validator_fn("isbn", |_| Ok(Outcome::Pass)));
        let validation = Validation::new(ValidationConfig::default())
            .unwrap()
            .with_registry(registry);

        let model = entity(Rules::new().attr("isbn", RuleMap::new().with("isbn", true)));
        assert!(validation.attach(model).is_ok());
    }
}
