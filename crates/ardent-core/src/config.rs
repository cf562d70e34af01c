use crate::{
    relation::RelationDescriptor,
    rules::RuleSet,
    traits::{AttributeLabels, MessageOverrides},
};
use std::collections::BTreeMap;

///
/// EntityConfig
///
/// Per-type immutable configuration supplied at entity-type registration
/// time: default rules, message/label customizations, the relation
/// descriptor table, password attributes, reserved input keys, and the
/// lifecycle behavior flags. Entities share it behind an `Arc`; nothing
/// here changes after registration.
///

#[derive(Clone, Debug)]
pub struct EntityConfig {
    name: String,
    table: String,
    primary_key: String,
    rules: RuleSet,
    messages: MessageOverrides,
    labels: AttributeLabels,
    relations: BTreeMap<String, RelationDescriptor>,
    password_attributes: Vec<String>,
    reserved_input_keys: Vec<String>,
    auto_hydrate: bool,
    force_hydrate: bool,
    auto_purge: bool,
    auto_hash: bool,
    throw_on_validation: bool,
}

impl EntityConfig {
    #[must_use]
    pub fn new(name: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            primary_key: "id".to_string(),
            rules: RuleSet::new(),
            messages: MessageOverrides::new(),
            labels: AttributeLabels::new(),
            relations: BTreeMap::new(),
            password_attributes: vec!["password".to_string()],
            // HTTP-verb override and CSRF token names; opaque reserved
            // names, replaceable per deployment.
            reserved_input_keys: vec!["_method".to_string(), "_token".to_string()],
            auto_hydrate: false,
            force_hydrate: false,
            auto_purge: false,
            auto_hash: false,
            throw_on_validation: false,
        }
    }

    // ======================================================================
    // Builder surface
    // ======================================================================

    #[must_use]
    pub fn with_primary_key(mut self, key: impl Into<String>) -> Self {
        self.primary_key = key.into();
        self
    }

    #[must_use]
    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    #[must_use]
    pub fn with_messages(mut self, messages: MessageOverrides) -> Self {
        self.messages = messages;
        self
    }

    #[must_use]
    pub fn with_labels(mut self, labels: AttributeLabels) -> Self {
        self.labels = labels;
        self
    }

    /// Register a relation descriptor under its own name.
    #[must_use]
    pub fn with_relation(mut self, descriptor: RelationDescriptor) -> Self {
        self.relations.insert(descriptor.name.clone(), descriptor);
        self
    }

    #[must_use]
    pub fn with_password_attributes<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.password_attributes = names.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_reserved_input_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reserved_input_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_auto_hydrate(mut self, enabled: bool) -> Self {
        self.auto_hydrate = enabled;
        self
    }

    #[must_use]
    pub fn with_force_hydrate(mut self, enabled: bool) -> Self {
        self.force_hydrate = enabled;
        self
    }

    #[must_use]
    pub fn with_auto_purge(mut self, enabled: bool) -> Self {
        self.auto_purge = enabled;
        self
    }

    #[must_use]
    pub fn with_auto_hash(mut self, enabled: bool) -> Self {
        self.auto_hash = enabled;
        self
    }

    #[must_use]
    pub fn with_throw_on_validation(mut self, enabled: bool) -> Self {
        self.throw_on_validation = enabled;
        self
    }

    // ======================================================================
    // Accessors
    // ======================================================================

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    #[must_use]
    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    #[must_use]
    pub const fn rules(&self) -> &RuleSet {
        &self.rules
    }

    #[must_use]
    pub const fn messages(&self) -> &MessageOverrides {
        &self.messages
    }

    #[must_use]
    pub const fn labels(&self) -> &AttributeLabels {
        &self.labels
    }

    #[must_use]
    pub fn relation(&self, name: &str) -> Option<&RelationDescriptor> {
        self.relations.get(name)
    }

    #[must_use]
    pub const fn relations(&self) -> &BTreeMap<String, RelationDescriptor> {
        &self.relations
    }

    #[must_use]
    pub fn password_attributes(&self) -> &[String] {
        &self.password_attributes
    }

    #[must_use]
    pub fn reserved_input_keys(&self) -> &[String] {
        &self.reserved_input_keys
    }

    #[must_use]
    pub const fn auto_hydrate(&self) -> bool {
        self.auto_hydrate
    }

    #[must_use]
    pub const fn force_hydrate(&self) -> bool {
        self.force_hydrate
    }

    #[must_use]
    pub const fn auto_purge(&self) -> bool {
        self.auto_purge
    }

    #[must_use]
    pub const fn auto_hash(&self) -> bool {
        self.auto_hash
    }

    #[must_use]
    pub const fn throw_on_validation(&self) -> bool {
        self.throw_on_validation
    }
}

///
/// TESTS
///
