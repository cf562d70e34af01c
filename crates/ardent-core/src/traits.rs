use crate::{bag::AttributeBag, bag::ErrorBag, rules::RuleSet, value::Value};
use std::collections::BTreeMap;

/// Custom message overrides, keyed `field.rule` or `rule`.
pub type MessageOverrides = BTreeMap<String, String>;

/// Human-readable labels substituted for raw field names in messages.
pub type AttributeLabels = BTreeMap<String, String>;

/// Pass-through options handed to the persister unchanged.
pub type PersistOptions = BTreeMap<String, Value>;

///
/// ValidationOutcome
///

#[derive(Clone, Debug)]
pub struct ValidationOutcome {
    pub passed: bool,
    pub errors: ErrorBag,
}

impl ValidationOutcome {
    #[must_use]
    pub const fn pass() -> Self {
        Self {
            passed: true,
            errors: ErrorBag::new(),
        }
    }

    #[must_use]
    pub const fn fail(errors: ErrorBag) -> Self {
        Self {
            passed: false,
            errors,
        }
    }
}

///
/// Validator
///
/// The pluggable rule engine. Receives the attribute bag under validation,
/// the effective rules, and the type's message/label customizations.
///

pub trait Validator {
    fn validate(
        &self,
        data: &AttributeBag,
        rules: &RuleSet,
        messages: &MessageOverrides,
        labels: &AttributeLabels,
    ) -> ValidationOutcome;
}

///
/// Persister
///
/// Host persistence boundary. Create-or-update semantics and the meaning of
/// the returned boolean are the persister's own; the save executor never
/// wraps or reinterprets them.
///

pub trait Persister {
    fn save(&mut self, attributes: &AttributeBag, options: &PersistOptions) -> bool;
}

///
/// RequestInput
///
/// External request input used for auto-hydration and failed-validation
/// flashing. `flash` re-stashes the current input for one request cycle.
///

pub trait RequestInput {
    fn all(&self) -> AttributeBag;

    fn flash(&self);

    fn has_session_store(&self) -> bool;
}

///
/// Hasher
///
/// Opaque one-way digest for password attributes.
///

pub trait Hasher {
    fn make(&self, plaintext: &str) -> String;
}

///
/// Relation
///
/// Handle returned by the host mapper for one resolved relation. Pivot and
/// timestamp post-configuration only applies to the belongs-to-many family;
/// other handles ignore it.
///

pub trait Relation {
    /// Execute the relation's fetch and return its results.
    fn fetch(&self) -> Value;

    fn set_pivot_columns(&mut self, _columns: &[String]) {}

    fn set_timestamps(&mut self) {}
}

///
/// RelationMapper
///
/// One constructor per relation kind, mirroring the host mapper's relation
/// primitives. The registered relation name is always passed explicitly;
/// implementations must not infer it from execution context.
///

pub trait RelationMapper {
    fn has_one(
        &self,
        target: &str,
        foreign_key: Option<&str>,
        local_key: Option<&str>,
    ) -> Box<dyn Relation>;

    fn has_many(
        &self,
        target: &str,
        foreign_key: Option<&str>,
        local_key: Option<&str>,
    ) -> Box<dyn Relation>;

    fn has_many_through(
        &self,
        target: &str,
        through: &str,
        first_key: Option<&str>,
        second_key: Option<&str>,
        local_key: Option<&str>,
    ) -> Box<dyn Relation>;

    fn belongs_to(
        &self,
        target: &str,
        foreign_key: &str,
        other_key: Option<&str>,
        relation: &str,
    ) -> Box<dyn Relation>;

    fn belongs_to_many(
        &self,
        target: &str,
        table: Option<&str>,
        foreign_key: Option<&str>,
        other_key: Option<&str>,
        relation: &str,
    ) -> Box<dyn Relation>;

    fn morph_one(
        &self,
        target: &str,
        morph_name: &str,
        type_column: &str,
        id_column: &str,
        local_key: Option<&str>,
    ) -> Box<dyn Relation>;

    fn morph_many(
        &self,
        target: &str,
        morph_name: &str,
        type_column: &str,
        id_column: &str,
        local_key: Option<&str>,
    ) -> Box<dyn Relation>;

    fn morph_to_many(
        &self,
        target: &str,
        morph_name: &str,
        table: Option<&str>,
        foreign_key: Option<&str>,
        other_key: Option<&str>,
        inverse: bool,
    ) -> Box<dyn Relation>;
}
