//! Validation bound to every member of a collection.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use tokio::sync::broadcast::{self, error::TryRecvError};

use crate::error::BindError;
use crate::model::{Collection, CollectionEvent};

use super::{ModelBinding, Validation, View};

/// One [`ModelBinding`] per member, kept in step with membership changes by
/// [`sync`](Self::sync).
pub struct CollectionBinding {
    validation: Validation,
    collection: Arc<Collection>,
    view: Arc<View>,
    members: IndexMap<String, ModelBinding>,
    events: broadcast::Receiver<CollectionEvent>,
}

impl CollectionBinding {
    pub(crate) fn new(
        validation: &Validation,
        collection: Arc<Collection>,
        view: Arc<View>,
    ) -> Result<Self, BindError> {
        // Subscribe first so nothing added during binding is missed.
        let events = collection.subscribe();
        let mut binding = Self {
            validation: validation.clone(),
            collection,
            view,
            members: IndexMap::new(),
            events,
        };
        binding.resync()?;
        Ok(binding)
    }

    /// Apply pending membership changes: bind added models, drop removed ones.
    ///
    /// Returns how many notifications were applied. If notifications were
    /// missed, membership is rebuilt from the collection instead.
    pub fn sync(&mut self) -> Result<usize, BindError> {
        let mut applied = 0;
        loop {
            match self.events.try_recv() {
                Ok(CollectionEvent::Add(model)) => {
                    if !self.members.contains_key(model.cid()) {
                        let cid = model.cid().to_string();
                        let binding = self.validation.bind_model(model, Some(Arc::clone(&self.view)))?;
                        self.members.insert(cid, binding);
                    }
                    applied += 1;
                }
                Ok(CollectionEvent::Remove(model)) => {
                    if let Some(binding) = self.members.shift_remove(model.cid()) {
                        binding.unbind();
                    }
                    applied += 1;
                }
                Err(TryRecvError::Lagged(missed)) => {
                    tracing::warn!(missed, view = self.view.name(), "membership events lagged, resyncing");
                    self.resync()?;
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
        Ok(applied)
    }

    /// Rebuild membership from the collection's current models.
    fn resync(&mut self) -> Result<(), BindError> {
        let models = self.collection.models();

        self.members
            .retain(|cid, _| models.iter().any(|m| m.cid() == cid.as_str()));

        for model in models {
            if self.members.contains_key(model.cid()) {
                continue;
            }
            let cid = model.cid().to_string();
            let binding = self.validation.bind_model(model, Some(Arc::clone(&self.view)))?;
            self.members.insert(cid, binding);
        }
        Ok(())
    }

    /// Binding for one member.
    pub fn get(&self, cid: &str) -> Option<&ModelBinding> {
        self.members.get(cid)
    }

    /// Bindings in membership order.
    pub fn members(&self) -> impl Iterator<Item = &ModelBinding> {
        self.members.values()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    /// Unbind every member and stop following the collection.
    pub fn unbind(self) {
        tracing::debug!(view = self.view.name(), members = self.members.len(), "unbinding collection");
        for (_, binding) in self.members {
            binding.unbind();
        }
    }
}

impl fmt::Debug for CollectionBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionBinding")
            .field("view", &self.view.name())
            .field("members", &self.members.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidationConfig;
    use crate::model::{Entity, Model};
    use crate::rules::{RuleMap, Rules};
    use crate::value::Attributes;

    fn member() -> Arc<dyn Model> {
        Arc::new(Entity::new(
            Attributes::new(),
            Rules::new().attr("name", RuleMap::new().required(true)),
        ))
    }

    fn bind(collection: &Arc<Collection>) -> CollectionBinding {
        let validation = Validation::new(ValidationConfig::default()).unwrap();
        validation
            .bind(View::new("list").with_collection(Arc::clone(collection)))
            .unwrap()
            .into_collection()
            .unwrap()
    }

    #[test]
    fn follows_adds_and_removes() {
        let first = member();
        let collection = Arc::new(Collection::with_models(vec![first.clone()]));
        let mut binding = bind(&collection);
        assert_eq!(binding.len(), 1);

        let second = member();
        collection.add(second.clone());
        collection.remove(first.cid());
        assert_eq!(binding.sync().unwrap(), 2);

        assert!(binding.get(first.cid()).is_none());
        assert!(binding.get(second.cid()).is_some());
        assert_eq!(binding.get(second.cid()).unwrap().view().map(View::name), Some("list"));
    }

    #[test]
    fn duplicate_add_is_ignored() {
        let collection = Arc::new(Collection::new());
        let mut binding = bind(&collection);
        let m = member();
        collection.add(m.clone());
        collection.add(m.clone());
        binding.sync().unwrap();
        assert_eq!(binding.len(), 1);
    }

    #[test]
    fn lagged_receiver_resyncs() {
        let collection = Arc::new(Collection::new());
        let mut binding = bind(&collection);

        let mut kept = Vec::new();
        for _ in 0..100 {
            let m = member();
            collection.add(m.clone());
            kept.push(m);
        }
        for m in kept.iter().take(10) {
            collection.remove(m.cid());
        }

        binding.sync().unwrap();
        assert_eq!(binding.len(), 90);
        for m in kept.iter().skip(10) {
            assert!(binding.get(m.cid()).is_some());
        }
    }

    #[test]
    fn added_member_with_bad_rules_is_an_error() {
        let collection = Arc::new(Collection::new());
        let mut binding = bind(&collection);
        let bad: Arc<dyn Model> = Arc::new(Entity::new(
            Attributes::new(),
            Rules::new().attr("x", "noSuchMethod"),
        ));
        collection.add(bad);
        assert!(matches!(binding.sync(), Err(BindError::MissingMethod { .. })));
    }
}
