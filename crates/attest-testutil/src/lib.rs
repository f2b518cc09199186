//! Test doubles for attest.
//!
//! - [`CountingValidator`]: counts invocations, then passes or fails
//! - [`DeferredValidator`]: suspends for a number of scheduler turns first
//! - [`FaultyValidator`]: always raises
//! - [`RecordingHooks`]: records valid/invalid callbacks
//! - [`OrderLog`]: shared log of which validator ran when

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::anyhow;
use async_trait::async_trait;

use attest_kernel::{
    Attributes, Check, Entity, Hooks, Outcome, Rules, Validator, ValidatorFault, View,
    attributes_from_json,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Install a fmt subscriber that writes through the test harness.
///
/// Safe to call from every test; only the first call installs.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Entity from a JSON object and rules.
pub fn entity(attrs: serde_json::Value, rules: Rules) -> Arc<Entity> {
    Arc::new(Entity::new(attributes_from_json(attrs), rules))
}

/// Attributes from a JSON object.
pub fn attrs(json: serde_json::Value) -> Attributes {
    attributes_from_json(json)
}

/// Ordered record of validator invocations, shared between validators.
#[derive(Debug, Clone, Default)]
pub struct OrderLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl OrderLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, entry: impl Into<String>) {
        lock(&self.entries).push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        lock(&self.entries).clone()
    }

    pub fn clear(&self) {
        lock(&self.entries).clear();
    }
}

/// Counts how often it runs. Clones share the counter.
#[derive(Debug, Clone)]
pub struct CountingValidator {
    name: String,
    outcome: Outcome,
    calls: Arc<AtomicUsize>,
    log: Option<OrderLog>,
}

impl CountingValidator {
    pub fn passing(name: impl Into<String>) -> Self {
        Self::new(name, Outcome::Pass)
    }

    pub fn failing(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(name, Outcome::fail(message))
    }

    pub fn new(name: impl Into<String>, outcome: Outcome) -> Self {
        Self {
            name: name.into(),
            outcome,
            calls: Arc::new(AtomicUsize::new(0)),
            log: None,
        }
    }

    /// Also record `"<name>:<attr>"` into `log` on every call.
    pub fn with_log(mut self, log: OrderLog) -> Self {
        self.log = Some(log);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Validator for CountingValidator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn validate(&self, check: &Check<'_>) -> Result<Outcome, ValidatorFault> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(log) = &self.log {
            log.record(format!("{}:{}", self.name, check.attr));
        }
        Ok(self.outcome.clone())
    }
}

/// Yields to the scheduler `turns` times before deciding.
///
/// Logs `"<name>:<attr>:start"` on entry and `"<name>:<attr>:end"` once it
/// decides, so tests can see that nothing else ran in between.
#[derive(Debug, Clone)]
pub struct DeferredValidator {
    name: String,
    turns: usize,
    outcome: Outcome,
    log: OrderLog,
}

impl DeferredValidator {
    pub fn new(name: impl Into<String>, turns: usize, outcome: Outcome, log: OrderLog) -> Self {
        Self {
            name: name.into(),
            turns,
            outcome,
            log,
        }
    }
}

#[async_trait]
impl Validator for DeferredValidator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn validate(&self, check: &Check<'_>) -> Result<Outcome, ValidatorFault> {
        self.log.record(format!("{}:{}:start", self.name, check.attr));
        for _ in 0..self.turns {
            tokio::task::yield_now().await;
        }
        self.log.record(format!("{}:{}:end", self.name, check.attr));
        Ok(self.outcome.clone())
    }
}

/// Raises on every call.
#[derive(Debug, Clone)]
pub struct FaultyValidator {
    name: String,
}

impl FaultyValidator {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl Validator for FaultyValidator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn validate(&self, check: &Check<'_>) -> Result<Outcome, ValidatorFault> {
        Err(anyhow!("{} exploded on {}", self.name, check.attr).into())
    }
}

/// One recorded callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookCall {
    Valid {
        view: Option<String>,
        attr: String,
        selector: String,
    },
    Invalid {
        view: Option<String>,
        attr: String,
        message: String,
        selector: String,
    },
}

/// Hooks that remember every call. Clones share the record.
#[derive(Debug, Clone, Default)]
pub struct RecordingHooks {
    calls: Arc<Mutex<Vec<HookCall>>>,
}

impl RecordingHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<HookCall> {
        lock(&self.calls).clone()
    }

    /// Attributes reported valid, in call order.
    pub fn valid_attrs(&self) -> Vec<String> {
        lock(&self.calls)
            .iter()
            .filter_map(|call| match call {
                HookCall::Valid { attr, .. } => Some(attr.clone()),
                HookCall::Invalid { .. } => None,
            })
            .collect()
    }

    /// `(attr, message)` pairs reported invalid, in call order.
    pub fn invalid_attrs(&self) -> Vec<(String, String)> {
        lock(&self.calls)
            .iter()
            .filter_map(|call| match call {
                HookCall::Invalid { attr, message, .. } => Some((attr.clone(), message.clone())),
                HookCall::Valid { .. } => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        lock(&self.calls).clear();
    }
}

impl Hooks for RecordingHooks {
    fn valid(&self, view: Option<&View>, attr: &str, selector: &str) {
        lock(&self.calls).push(HookCall::Valid {
            view: view.map(|v| v.name().to_string()),
            attr: attr.to_string(),
            selector: selector.to_string(),
        });
    }

    fn invalid(&self, view: Option<&View>, attr: &str, message: &str, selector: &str) {
        lock(&self.calls).push(HookCall::Invalid {
            view: view.map(|v| v.name().to_string()),
            attr: attr.to_string(),
            message: message.to_string(),
            selector: selector.to_string(),
        });
    }
}
