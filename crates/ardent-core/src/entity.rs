use crate::{
    bag::{AttributeBag, ErrorBag},
    config::EntityConfig,
    error::ConfigError,
    relation,
    traits::RelationMapper,
    value::Value,
};
use convert_case::{Case, Casing};
use std::{collections::BTreeMap, sync::Arc};

///
/// Entity
///
/// One in-memory record mapped to persisted storage by the host persister.
/// Owns its attribute bag, an `original` snapshot of the last-persisted
/// values (change detection for password hashing), a per-instance relation
/// cache, and the current error-bag snapshot handle.
///

pub struct Entity {
    config: Arc<EntityConfig>,
    attributes: AttributeBag,
    original: AttributeBag,
    relations: BTreeMap<String, Value>,
    errors: Arc<ErrorBag>,
}

impl Entity {
    #[must_use]
    pub fn new(config: Arc<EntityConfig>) -> Self {
        Self {
            config,
            attributes: AttributeBag::new(),
            original: AttributeBag::new(),
            relations: BTreeMap::new(),
            errors: Arc::new(ErrorBag::new()),
        }
    }

    #[must_use]
    pub fn with_attributes(config: Arc<EntityConfig>, attributes: AttributeBag) -> Self {
        let mut entity = Self::new(config);
        entity.attributes = attributes;
        entity
    }

    #[must_use]
    pub fn config(&self) -> &EntityConfig {
        &self.config
    }

    pub(crate) fn shared_config(&self) -> Arc<EntityConfig> {
        Arc::clone(&self.config)
    }

    // ======================================================================
    // Attributes
    // ======================================================================

    #[must_use]
    pub const fn attributes(&self) -> &AttributeBag {
        &self.attributes
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.attributes.insert(key, value);
    }

    /// Merge key/value pairs into the attribute bag.
    pub fn fill<I>(&mut self, values: I)
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        for (key, value) in values {
            self.attributes.insert(key, value);
        }
    }

    /// Wholesale-replace the attribute bag (purge and hash passes).
    pub(crate) fn replace_attributes(&mut self, attributes: AttributeBag) {
        self.attributes = attributes;
    }

    #[must_use]
    pub const fn original(&self) -> &AttributeBag {
        &self.original
    }

    /// Snapshot the current attributes as the last-persisted state.
    pub fn sync_original(&mut self) {
        self.original = self.attributes.clone();
    }

    /// Current primary-key value, when present.
    #[must_use]
    pub fn primary_key_value(&self) -> Option<&Value> {
        self.attributes
            .get(self.config.primary_key())
            .filter(|value| !value.is_null())
    }

    // ======================================================================
    // Validation errors
    // ======================================================================

    /// The current error-bag snapshot handle. Always available; empty before
    /// any validation has run.
    #[must_use]
    pub fn errors(&self) -> Arc<ErrorBag> {
        Arc::clone(&self.errors)
    }

    pub(crate) fn set_errors(&mut self, errors: ErrorBag) {
        self.errors = Arc::new(errors);
    }

    /// Replace a previously non-empty bag with a fresh empty one. External
    /// holders of the old handle keep their stale-but-consistent snapshot.
    pub(crate) fn reset_errors(&mut self) {
        if !self.errors.is_empty() {
            self.errors = Arc::new(ErrorBag::new());
        }
    }

    // ======================================================================
    // Dynamic attribute access
    // ======================================================================

    /// Attribute lookup with registered-relation fallback.
    ///
    /// A plain attribute wins. On a miss, the camel-cased key is checked
    /// against the relation table; a registered relation is resolved,
    /// fetched once, and memoized for the lifetime of this instance.
    pub fn attribute(
        &mut self,
        key: &str,
        mapper: &dyn RelationMapper,
    ) -> Result<Option<Value>, ConfigError> {
        if let Some(value) = self.attributes.get(key) {
            return Ok(Some(value.clone()));
        }
        if let Some(cached) = self.relations.get(key) {
            return Ok(Some(cached.clone()));
        }

        let camel = key.to_case(Case::Camel);
        if self.config.relation(&camel).is_none() {
            return Ok(None);
        }

        let handle = relation::resolve(&self.config, &self.attributes, &camel, mapper)?;
        let results = handle.fetch();
        self.relations.insert(key.to_string(), results.clone());

        Ok(Some(results))
    }

    /// Resolve a registered relation without fetching or caching.
    pub fn relation(
        &self,
        name: &str,
        mapper: &dyn RelationMapper,
    ) -> Result<Box<dyn crate::traits::Relation>, ConfigError> {
        relation::resolve(&self.config, &self.attributes, name, mapper)
    }
}

///
/// TESTS
///
