use crate::{
    bag::AttributeBag,
    config::EntityConfig,
    error::ConfigError,
    obs::sink::{self, MetricsEvent},
    relation::{RelationDescriptor, RelationKind},
    traits::{Relation, RelationMapper},
};
use convert_case::{Case, Casing};

/// Resolve a registered relation declaration into a host mapper handle.
///
/// Shape validation (kind/target/required options) happens before any
/// relation handle is constructed. The registered relation name is passed to
/// the mapper explicitly; it is never inferred from execution context.
pub fn resolve(
    config: &EntityConfig,
    attributes: &AttributeBag,
    name: &str,
    mapper: &dyn RelationMapper,
) -> Result<Box<dyn Relation>, ConfigError> {
    let Some(descriptor) = config.relation(name) else {
        return Err(ConfigError::UnknownRelation {
            entity: config.name().to_string(),
            relation: name.to_string(),
        });
    };

    let target = check_target_type(config, descriptor)?;
    let handle = dispatch(config, attributes, descriptor, target.as_deref(), mapper)?;

    sink::record(MetricsEvent::RelationResolved {
        entity: config.name(),
    });

    Ok(handle)
}

// Enforce the target-type shape rule for the descriptor's kind.
fn check_target_type(
    config: &EntityConfig,
    descriptor: &RelationDescriptor,
) -> Result<Option<String>, ConfigError> {
    if descriptor.kind.requires_target_type() {
        match &descriptor.target_type {
            Some(target) => Ok(Some(target.clone())),
            None => Err(ConfigError::MissingTargetType {
                entity: config.name().to_string(),
                relation: descriptor.name.clone(),
            }),
        }
    } else if descriptor.target_type.is_some() {
        Err(ConfigError::ForbiddenTargetType {
            entity: config.name().to_string(),
            relation: descriptor.name.clone(),
        })
    } else {
        Ok(None)
    }
}

// Per-kind dispatch in fixed argument order (see module docs).
fn dispatch(
    config: &EntityConfig,
    attributes: &AttributeBag,
    descriptor: &RelationDescriptor,
    target: Option<&str>,
    mapper: &dyn RelationMapper,
) -> Result<Box<dyn Relation>, ConfigError> {
    let name = descriptor.name.as_str();
    let opts = &descriptor.options;

    let handle = match descriptor.kind {
        RelationKind::OneToOne => mapper.has_one(
            required_target(target),
            opts.foreign_key.as_deref(),
            opts.local_key.as_deref(),
        ),

        RelationKind::OneToMany => mapper.has_many(
            required_target(target),
            opts.foreign_key.as_deref(),
            opts.local_key.as_deref(),
        ),

        RelationKind::ManyThroughOne => {
            let Some(through) = opts.through.as_deref() else {
                return Err(missing_options(config, descriptor, "through"));
            };
            mapper.has_many_through(
                required_target(target),
                through,
                opts.first_key.as_deref(),
                opts.second_key.as_deref(),
                opts.local_key.as_deref(),
            )
        }

        RelationKind::BelongsToOne => {
            // Conventional default: snake-cased relation name + `_id`.
            let foreign_key = opts
                .foreign_key
                .clone()
                .unwrap_or_else(|| format!("{}_id", name.to_case(Case::Snake)));
            mapper.belongs_to(
                required_target(target),
                &foreign_key,
                opts.other_key.as_deref(),
                name,
            )
        }

        RelationKind::BelongsToMany => mapper.belongs_to_many(
            required_target(target),
            opts.table.as_deref(),
            opts.foreign_key.as_deref(),
            opts.other_key.as_deref(),
            name,
        ),

        RelationKind::PolymorphicBelongsTo => {
            // The morph name defaults to the registered relation name; the
            // discriminator attribute's value supplies the target type.
            let morph = opts
                .morph_name
                .clone()
                .unwrap_or_else(|| name.to_case(Case::Snake));
            let (type_column, id_column) = morph_columns(descriptor, &morph);

            let resolved = attributes.get(&type_column).and_then(|v| v.as_text());
            let Some(resolved) = resolved.filter(|t| !t.is_empty()) else {
                return Err(ConfigError::UnresolvedMorphTarget {
                    entity: config.name().to_string(),
                    relation: descriptor.name.clone(),
                    attribute: type_column,
                });
            };
            mapper.belongs_to(resolved, &id_column, opts.other_key.as_deref(), name)
        }

        RelationKind::PolymorphicOne | RelationKind::PolymorphicMany => {
            let Some(morph) = opts.morph_name.as_deref() else {
                return Err(missing_options(config, descriptor, "morph_name"));
            };
            let (type_column, id_column) = morph_columns(descriptor, morph);

            if descriptor.kind == RelationKind::PolymorphicOne {
                mapper.morph_one(
                    required_target(target),
                    morph,
                    &type_column,
                    &id_column,
                    opts.local_key.as_deref(),
                )
            } else {
                mapper.morph_many(
                    required_target(target),
                    morph,
                    &type_column,
                    &id_column,
                    opts.local_key.as_deref(),
                )
            }
        }

        RelationKind::PolymorphicBelongsToMany | RelationKind::PolymorphicBelongsToManyInverse => {
            let Some(morph) = opts.morph_name.as_deref() else {
                return Err(missing_options(config, descriptor, "morph_name"));
            };
            mapper.morph_to_many(
                required_target(target),
                morph,
                opts.table.as_deref(),
                opts.foreign_key.as_deref(),
                opts.other_key.as_deref(),
                descriptor.kind == RelationKind::PolymorphicBelongsToManyInverse,
            )
        }
    };

    Ok(post_configure(descriptor, handle))
}

// Target presence is checked before dispatch; this keeps the arms terse.
fn required_target(target: Option<&str>) -> &str {
    target.unwrap_or_default()
}

// Discriminator/foreign-id column names, defaulted from the morph name.
fn morph_columns(descriptor: &RelationDescriptor, morph: &str) -> (String, String) {
    let type_column = descriptor
        .options
        .morph_type_column
        .clone()
        .unwrap_or_else(|| format!("{morph}_type"));
    let id_column = descriptor
        .options
        .morph_id_column
        .clone()
        .unwrap_or_else(|| format!("{morph}_id"));

    (type_column, id_column)
}

// Pivot-column and timestamp post-configuration for the belongs-to-many family.
fn post_configure(
    descriptor: &RelationDescriptor,
    mut handle: Box<dyn Relation>,
) -> Box<dyn Relation> {
    if descriptor.kind.is_belongs_to_many_family() {
        if !descriptor.options.pivot_columns.is_empty() {
            handle.set_pivot_columns(&descriptor.options.pivot_columns);
        }
        if descriptor.options.with_timestamps {
            handle.set_timestamps();
        }
    }

    handle
}

fn missing_options(
    config: &EntityConfig,
    descriptor: &RelationDescriptor,
    missing: &str,
) -> ConfigError {
    ConfigError::MissingOptions {
        entity: config.name().to_string(),
        relation: descriptor.name.clone(),
        missing: missing.to_string(),
    }
}

///
/// TESTS
///
