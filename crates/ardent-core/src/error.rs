use crate::{bag::ErrorBag, entity::Entity};
use std::sync::Arc;
use thiserror::Error as ThisError;

///
/// ConfigError
///
/// Malformed relation declarations. Raised at resolution time, before any
/// relation handle is constructed; never retried.
///

#[remain::sorted]
#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error(
        "relation '{relation}' on entity '{entity}' is polymorphic-belongs-to and must not declare a target type"
    )]
    ForbiddenTargetType { entity: String, relation: String },

    #[error("relation '{relation}' on entity '{entity}' is missing required option(s): {missing}")]
    MissingOptions {
        entity: String,
        relation: String,
        missing: String,
    },

    #[error("relation '{relation}' on entity '{entity}' requires a target type")]
    MissingTargetType { entity: String, relation: String },

    #[error("relation '{relation}' on entity '{entity}' is not registered")]
    UnknownRelation { entity: String, relation: String },

    #[error(
        "relation '{relation}' on entity '{entity}' has no usable morph discriminator in attribute '{attribute}'"
    )]
    UnresolvedMorphTarget {
        entity: String,
        relation: String,
        attribute: String,
    },
}

///
/// InvalidEntity
///
/// Validation failed while the entity type is configured to throw.
/// Carries the failing entity's name and its error-bag snapshot so callers
/// can decide recovery without holding the entity itself.
///

#[derive(Debug, ThisError)]
#[error("entity '{entity}' failed validation")]
pub struct InvalidEntity {
    pub entity: String,
    pub errors: Arc<ErrorBag>,
}

impl InvalidEntity {
    #[must_use]
    pub fn new(entity: &Entity) -> Self {
        Self {
            entity: entity.config().name().to_string(),
            errors: entity.errors(),
        }
    }
}

///
/// Error
///
/// Union surface for the executor and resolver entry points. Persistence
/// failures never appear here; the persister's own boolean contract is
/// passed through untouched.
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    InvalidEntity(#[from] InvalidEntity),
}
