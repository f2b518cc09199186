//! The host boundary: models, their events, and collections.
//!
//! The engine never owns entities. It reads a model's attributes and rules for
//! the duration of one run and reports back through [`Model::trigger`]. Hosts
//! with their own entity types implement [`Model`]; [`Entity`] is a ready-made
//! in-memory implementation.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use tokio::sync::broadcast;

use crate::engine::InvalidAttrs;
use crate::rules::{Declaration, Rules};
use crate::validators::Validator;
use crate::value::Attributes;

/// Capacity of event channels. Slow subscribers see `Lagged` past this.
const EVENT_CAPACITY: usize = 64;

static NEXT_CID: AtomicU64 = AtomicU64::new(1);

/// Allocate a client id (`c1`, `c2`, ...).
pub fn next_cid() -> String {
    format!("c{}", NEXT_CID.fetch_add(1, Ordering::Relaxed))
}

/// An attribute-bearing record that can be validated.
pub trait Model: Send + Sync + 'static {
    /// Stable client id, unique per process.
    fn cid(&self) -> &str;

    /// Snapshot of the current attribute tree.
    fn attributes(&self) -> Attributes;

    /// Rule declarations, keyed by attribute path.
    fn rules(&self) -> &Rules;

    /// Apply accepted attribute changes (shallow merge).
    fn apply(&self, changes: Attributes);

    /// Human label for an attribute, used by [`crate::LabelFormatter::Label`].
    fn label(&self, _attr: &str) -> Option<String> {
        None
    }

    /// A named method usable from string rules and `fn` rules.
    fn method(&self, _name: &str) -> Option<Arc<dyn Validator>> {
        None
    }

    /// Receive a notification from the validation layer.
    fn trigger(&self, _event: ModelEvent) {}
}

/// Notifications emitted after a full validation run.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelEvent {
    /// Every run: overall flag plus the complete invalid map.
    Validated {
        is_valid: bool,
        invalid_attrs: InvalidAttrs,
    },
    /// Follows `Validated` when the run passed.
    ValidatedValid { invalid_attrs: InvalidAttrs },
    /// Follows `Validated` when the run failed.
    ValidatedInvalid { invalid_attrs: InvalidAttrs },
}

impl ModelEvent {
    /// Event name as hosts know it.
    pub fn name(&self) -> &'static str {
        match self {
            ModelEvent::Validated { .. } => "validated",
            ModelEvent::ValidatedValid { .. } => "validated:valid",
            ModelEvent::ValidatedInvalid { .. } => "validated:invalid",
        }
    }

    pub fn invalid_attrs(&self) -> &InvalidAttrs {
        match self {
            ModelEvent::Validated { invalid_attrs, .. }
            | ModelEvent::ValidatedValid { invalid_attrs }
            | ModelEvent::ValidatedInvalid { invalid_attrs } => invalid_attrs,
        }
    }
}

/// In-memory model with rules, labels, named methods and an event channel.
///
/// # Example
///
/// ```ignore
/// let user = Entity::builder()
///     .attributes(attributes_from_json(json!({"age": 15})))
///     .rule("age", RuleMap::new().required(true).min(18))
///     .build();
/// ```
pub struct Entity {
    cid: String,
    attributes: RwLock<Attributes>,
    rules: Rules,
    labels: HashMap<String, String>,
    methods: HashMap<String, Arc<dyn Validator>>,
    events: broadcast::Sender<ModelEvent>,
}

impl Entity {
    /// Entity with attributes and rules, no labels or methods.
    pub fn new(attributes: Attributes, rules: Rules) -> Self {
        Self::builder().attributes(attributes).rules(rules).build()
    }

    pub fn builder() -> EntityBuilder {
        EntityBuilder::default()
    }

    /// Subscribe to events triggered on this entity.
    pub fn subscribe(&self) -> broadcast::Receiver<ModelEvent> {
        self.events.subscribe()
    }

    /// Overwrite attributes without validation.
    pub fn set_unchecked(&self, changes: Attributes) {
        self.apply(changes);
    }

    /// Current value of a top-level attribute.
    pub fn get(&self, name: &str) -> Option<crate::Value> {
        self.read().get(name).cloned()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Attributes> {
        // A panic while holding the lock leaves the map intact; keep reading it.
        self.attributes.read().unwrap_or_else(|e| e.into_inner())
    }
}

impl Model for Entity {
    fn cid(&self) -> &str {
        &self.cid
    }

    fn attributes(&self) -> Attributes {
        self.read().clone()
    }

    fn rules(&self) -> &Rules {
        &self.rules
    }

    fn apply(&self, changes: Attributes) {
        let mut attrs = self.attributes.write().unwrap_or_else(|e| e.into_inner());
        attrs.extend(changes);
    }

    fn label(&self, attr: &str) -> Option<String> {
        self.labels.get(attr).cloned()
    }

    fn method(&self, name: &str) -> Option<Arc<dyn Validator>> {
        self.methods.get(name).cloned()
    }

    fn trigger(&self, event: ModelEvent) {
        tracing::trace!(cid = %self.cid, event = event.name(), "trigger");
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("cid", &self.cid)
            .field("attributes", &*self.read())
            .field("rules", &self.rules.paths().collect::<Vec<_>>())
            .finish()
    }
}

/// Builder for [`Entity`].
#[derive(Default)]
pub struct EntityBuilder {
    attributes: Attributes,
    rules: Rules,
    labels: HashMap<String, String>,
    methods: HashMap<String, Arc<dyn Validator>>,
}

impl EntityBuilder {
    pub fn attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn rules(mut self, rules: Rules) -> Self {
        self.rules = rules;
        self
    }

    /// Declare the rule for one attribute path.
    pub fn rule(mut self, path: impl Into<String>, declaration: impl Into<Declaration>) -> Self {
        self.rules = self.rules.attr(path, declaration);
        self
    }

    pub fn label(mut self, attr: impl Into<String>, label: impl Into<String>) -> Self {
        self.labels.insert(attr.into(), label.into());
        self
    }

    pub fn method(mut self, name: impl Into<String>, validator: impl Validator + 'static) -> Self {
        self.methods.insert(name.into(), Arc::new(validator));
        self
    }

    pub fn build(self) -> Entity {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Entity {
            cid: next_cid(),
            attributes: RwLock::new(self.attributes),
            rules: self.rules,
            labels: self.labels,
            methods: self.methods,
            events,
        }
    }
}

/// Membership change on a [`Collection`].
#[derive(Clone)]
pub enum CollectionEvent {
    Add(Arc<dyn Model>),
    Remove(Arc<dyn Model>),
}

impl fmt::Debug for CollectionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionEvent::Add(m) => write!(f, "Add({})", m.cid()),
            CollectionEvent::Remove(m) => write!(f, "Remove({})", m.cid()),
        }
    }
}

/// An ordered set of models that announces membership changes.
pub struct Collection {
    models: RwLock<Vec<Arc<dyn Model>>>,
    events: broadcast::Sender<CollectionEvent>,
}

impl Collection {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            models: RwLock::new(Vec::new()),
            events,
        }
    }

    /// Create a collection holding `models`. No add events are sent for them.
    pub fn with_models(models: Vec<Arc<dyn Model>>) -> Self {
        let collection = Self::new();
        *collection.models.write().unwrap_or_else(|e| e.into_inner()) = models;
        collection
    }

    /// Add a model. Adding a model that is already a member is a no-op.
    pub fn add(&self, model: Arc<dyn Model>) {
        {
            let mut models = self.models.write().unwrap_or_else(|e| e.into_inner());
            if models.iter().any(|m| m.cid() == model.cid()) {
                return;
            }
            models.push(model.clone());
        }
        let _ = self.events.send(CollectionEvent::Add(model));
    }

    /// Remove a model by client id. Returns the removed model, if it was a member.
    pub fn remove(&self, cid: &str) -> Option<Arc<dyn Model>> {
        let removed = {
            let mut models = self.models.write().unwrap_or_else(|e| e.into_inner());
            let idx = models.iter().position(|m| m.cid() == cid)?;
            models.remove(idx)
        };
        let _ = self.events.send(CollectionEvent::Remove(removed.clone()));
        Some(removed)
    }

    /// Snapshot of current members, in insertion order.
    pub fn models(&self) -> Vec<Arc<dyn Model>> {
        self.models.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn get(&self, cid: &str) -> Option<Arc<dyn Model>> {
        self.models
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .find(|m| m.cid() == cid)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.models.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Subscribe to membership changes.
    pub fn subscribe(&self) -> broadcast::Receiver<CollectionEvent> {
        self.events.subscribe()
    }
}

impl Default for Collection {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cids: Vec<String> = self.models().iter().map(|m| m.cid().to_string()).collect();
        f.debug_struct("Collection").field("models", &cids).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Value, attributes_from_json};
    use serde_json::json;

    fn entity() -> Arc<dyn Model> {
        Arc::new(Entity::new(Attributes::new(), Rules::new()))
    }

    #[test]
    fn cids_are_unique() {
        let a = Entity::new(Attributes::new(), Rules::new());
        let b = Entity::new(Attributes::new(), Rules::new());
        assert_ne!(a.cid(), b.cid());
        assert!(a.cid().starts_with('c'));
    }

    #[test]
    fn apply_merges_shallowly() {
        let e = Entity::new(attributes_from_json(json!({"a": 1, "b": {"x": 1}})), Rules::new());
        e.apply(attributes_from_json(json!({"b": {"y": 2}, "c": 3})));

        let attrs = e.attributes();
        assert_eq!(attrs["a"], Value::Int(1));
        assert_eq!(attrs["b"], Value::Object(attributes_from_json(json!({"y": 2}))));
        assert_eq!(attrs["c"], Value::Int(3));
    }

    #[tokio::test]
    async fn trigger_reaches_subscribers() {
        let e = Entity::new(Attributes::new(), Rules::new());
        let mut rx = e.subscribe();
        e.trigger(ModelEvent::ValidatedValid {
            invalid_attrs: InvalidAttrs::new(),
        });
        let event = rx.recv().await.unwrap();
        assert_eq!(event.name(), "validated:valid");
    }

    #[test]
    fn collection_membership_events() {
        let collection = Collection::new();
        let mut rx = collection.subscribe();
        let m = entity();

        collection.add(m.clone());
        collection.add(m.clone()); // duplicate ignored
        assert_eq!(collection.len(), 1);

        let removed = collection.remove(m.cid()).unwrap();
        assert_eq!(removed.cid(), m.cid());
        assert!(collection.is_empty());
        assert!(collection.remove(m.cid()).is_none());

        assert!(matches!(rx.try_recv().unwrap(), CollectionEvent::Add(_)));
        assert!(matches!(rx.try_recv().unwrap(), CollectionEvent::Remove(_)));
        assert!(rx.try_recv().is_err());
    }
}
