//! Core runtime for Ardent: entities, the validate-then-save lifecycle,
//! declarative relation descriptors, and the collaborator seams exported
//! via the `prelude`.

// public exports are one module level down
pub mod bag;
pub mod config;
pub mod entity;
pub mod error;
pub mod hash;
pub mod lifecycle;
pub mod obs;
pub mod relation;
pub mod rules;
pub mod save;
pub mod traits;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_support;

pub use error::{ConfigError, Error, InvalidEntity};

///
/// Prelude
///
/// Prelude contains only domain vocabulary plus the collaborator seams
/// needed to wire an executor.
///

pub mod prelude {
    pub use crate::{
        bag::{AttributeBag, ErrorBag},
        config::EntityConfig,
        entity::Entity,
        error::{ConfigError, Error, InvalidEntity},
        hash::Sha256Hasher,
        lifecycle::{Hook, HookDecision, LifecyclePhase},
        relation::{RelationDescriptor, RelationKind, RelationOptions},
        rules::RuleSet,
        save::{SaveExecutor, SaveOptions},
        traits::{
            AttributeLabels, Hasher, MessageOverrides, Persister, PersistOptions, Relation,
            RelationMapper, RequestInput, ValidationOutcome, Validator,
        },
        value::Value,
    };
}
