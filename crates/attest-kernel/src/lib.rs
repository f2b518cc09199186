//! attest-kernel: async rule validation for attribute-bearing entities.
//!
//! This crate provides:
//!
//! - **Rules**: per-attribute declarations normalized into ordered validator steps
//! - **Validators**: the async `Validator` trait, a registry, and the built-in library
//! - **Engine**: the attribute chain (short-circuits) and the entity chain (doesn't)
//! - **Binding**: `validate` / `pre_validate` / `is_valid` on models and collections,
//!   with valid/invalid callbacks and `validated` events
//!
//! # Example
//!
//! ```ignore
//! let user = Arc::new(
//!     Entity::builder()
//!         .attributes(attributes_from_json(json!({"age": 15})))
//!         .rule("age", RuleMap::new().required(true).min(18))
//!         .build(),
//! );
//!
//! let validation = Validation::new(ValidationConfig::default())?;
//! let binding = validation.attach(user)?;
//!
//! match binding.validate(None, RunOptions::default()).await {
//!     Decision::Accept => {}
//!     Decision::Reject(invalid) => {
//!         assert_eq!(invalid["age"], "Age must be greater than or equal to 18");
//!     }
//! }
//! ```

pub mod binding;
pub mod config;
pub mod engine;
pub mod error;
pub mod flatten;
pub mod messages;
pub mod model;
pub mod patterns;
pub mod rules;
pub mod validators;
pub mod value;

pub use binding::{Bound, CollectionBinding, Hooks, LogHooks, ModelBinding, Query, Validation, View};
pub use config::{RunOptions, ValidationConfig};
pub use engine::{Decision, Engine, InvalidAttrs, RunReport, Verdict};
pub use error::{BindError, ConfigError};
pub use messages::{LabelFormatter, Messages};
pub use model::{Collection, CollectionEvent, Entity, Model, ModelEvent};
pub use rules::{Declaration, Descriptor, Param, RuleMap, Rules, ValidatorKind};
pub use validators::{
    Check, Outcome, Validator, ValidatorFault, ValidatorRegistry, validator_fn,
};
pub use value::{Attributes, Value, attributes_from_json};
