use crate::{
    bag::AttributeBag,
    config::EntityConfig,
    entity::Entity,
    error::{Error, InvalidEntity},
    hash::Sha256Hasher,
    lifecycle::{Hook, HookDecision, Hooks, LifecyclePhase},
    obs::sink::{self, MetricsEvent},
    rules::{self, RuleSet},
    traits::{
        AttributeLabels, Hasher, MessageOverrides, Persister, PersistOptions, RequestInput,
        Validator,
    },
    value::Value,
};

///
/// SaveOptions
///
/// Per-call overrides for one save: rules, message/label customizations,
/// persister pass-through options, and transient before/after hooks that
/// live only for the duration of the call.
///

#[derive(Default)]
pub struct SaveOptions {
    pub rules: RuleSet,
    pub messages: MessageOverrides,
    pub labels: AttributeLabels,
    pub persist: PersistOptions,
    pub before_save: Option<Hook>,
    pub after_save: Option<Hook>,
}

/// Boolean filter deciding whether an attribute is persisted. Predicates
/// compose by logical AND; an attribute survives only if every predicate
/// accepts it.
pub type PurgePredicate = Box<dyn Fn(&str) -> bool>;

///
/// SaveExecutor
///
/// Validate-then-save lifecycle orchestration for entities of one type:
/// rule resolution, optional auto-hydration, validator invocation, error
/// recording, lifecycle hooks, attribute purging and password hashing, then
/// delegation to the host persister.
///

pub struct SaveExecutor {
    validator: Box<dyn Validator>,
    persister: Box<dyn Persister>,
    hasher: Box<dyn Hasher>,
    input: Option<Box<dyn RequestInput>>,
    hooks: Hooks,
    purge_filters: Vec<PurgePredicate>,
    debug: bool,
}

impl SaveExecutor {
    // ======================================================================
    // Construction & configuration
    // ======================================================================

    #[must_use]
    pub fn new(validator: Box<dyn Validator>, persister: Box<dyn Persister>) -> Self {
        Self {
            validator,
            persister,
            hasher: Box::new(Sha256Hasher::new()),
            input: None,
            hooks: Hooks::new(),
            purge_filters: Vec::new(),
            debug: false,
        }
    }

    #[must_use]
    pub fn with_hasher(mut self, hasher: Box<dyn Hasher>) -> Self {
        self.hasher = hasher;
        self
    }

    #[must_use]
    pub fn with_input(mut self, input: Box<dyn RequestInput>) -> Self {
        self.input = Some(input);
        self
    }

    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Register a lifecycle hook for every save handled by this executor.
    pub fn on(&mut self, phase: LifecyclePhase, hook: Hook) {
        self.hooks.on(phase, hook);
    }

    /// Register an additional purge predicate, ANDed with the defaults.
    pub fn add_purge_filter(&mut self, predicate: PurgePredicate) {
        self.purge_filters.push(predicate);
    }

    fn debug_log(&self, s: impl Into<String>) {
        if self.debug {
            println!("[debug] {}", s.into());
        }
    }

    // ======================================================================
    // Validation
    // ======================================================================

    /// Validate with the type's default rules and customizations.
    pub fn validate(&mut self, entity: &mut Entity) -> Result<bool, Error> {
        self.validate_with(
            entity,
            &RuleSet::new(),
            &MessageOverrides::new(),
            &AttributeLabels::new(),
        )
    }

    /// Validate with per-call overrides. Empty overrides fall back to the
    /// type's configuration.
    pub fn validate_with(
        &mut self,
        entity: &mut Entity,
        rules: &RuleSet,
        messages: &MessageOverrides,
        labels: &AttributeLabels,
    ) -> Result<bool, Error> {
        let config = entity.shared_config();
        sink::record(MetricsEvent::ValidateStart {
            entity: config.name(),
        });

        if self.hooks.fire(LifecyclePhase::BeforeValidate, entity) == HookDecision::Reject {
            self.debug_log(format!(
                "validation of {} rejected by before-validate hook",
                config.name()
            ));
            if config.throw_on_validation() {
                return Err(InvalidEntity::new(entity).into());
            }
            return Ok(false);
        }

        let effective = rules::effective(rules, config.rules());

        let success = if effective.is_empty() {
            true
        } else {
            self.hydrate_from_input(entity, &effective);

            let messages = if messages.is_empty() {
                config.messages()
            } else {
                messages
            };
            let labels = if labels.is_empty() {
                config.labels()
            } else {
                labels
            };

            let outcome = self
                .validator
                .validate(entity.attributes(), &effective, messages, labels);

            if outcome.passed {
                entity.reset_errors();
            } else {
                entity.set_errors(outcome.errors);
                self.flash_input(&config);
            }

            outcome.passed
        };

        sink::record(MetricsEvent::ValidateFinish {
            entity: config.name(),
            passed: success,
        });
        self.hooks.fire(LifecyclePhase::AfterValidate, entity);

        if !success && config.throw_on_validation() {
            return Err(InvalidEntity::new(entity).into());
        }

        Ok(success)
    }

    /// Validate with uniqueness rules rewritten to ignore the entity's own
    /// row.
    pub fn validate_uniques(
        &mut self,
        entity: &mut Entity,
        rules: &RuleSet,
        messages: &MessageOverrides,
    ) -> Result<bool, Error> {
        let rules = Self::build_unique_exclusion_rules(entity, rules);
        self.validate_with(entity, &rules, messages, &AttributeLabels::new())
    }

    // Populate an empty attribute bag from request input, restricted to the
    // keys named by the effective rules.
    fn hydrate_from_input(&self, entity: &mut Entity, effective: &RuleSet) {
        let (auto, force) = {
            let config = entity.config();
            (config.auto_hydrate(), config.force_hydrate())
        };
        if !(force || (auto && entity.attributes().is_empty())) {
            return;
        }
        let Some(input) = self.input.as_deref() else {
            return;
        };

        entity.fill(
            input
                .all()
                .into_iter()
                .filter(|(key, _)| effective.contains_key(key)),
        );
    }

    // Stash the submitted input for re-display when a session is available.
    fn flash_input(&self, config: &EntityConfig) {
        if let Some(input) = self.input.as_deref() {
            if input.has_session_store() {
                input.flash();
                sink::record(MetricsEvent::InputFlashed {
                    entity: config.name(),
                });
            }
        }
    }

    // ======================================================================
    // Saving
    // ======================================================================

    /// Validate, then persist when validation passes.
    pub fn save(&mut self, entity: &mut Entity, opts: SaveOptions) -> Result<bool, Error> {
        self.internal_save(entity, opts, false)
    }

    /// Persist even when validation fails. The full purge/hash/persist
    /// sequence still runs, and the error bag is still populated.
    pub fn force_save(&mut self, entity: &mut Entity, opts: SaveOptions) -> Result<bool, Error> {
        self.internal_save(entity, opts, true)
    }

    /// Save with uniqueness rules rewritten to ignore the entity's own row.
    pub fn update_uniques(&mut self, entity: &mut Entity, mut opts: SaveOptions) -> Result<bool, Error> {
        opts.rules = Self::build_unique_exclusion_rules(entity, &opts.rules);
        self.save(entity, opts)
    }

    fn internal_save(
        &mut self,
        entity: &mut Entity,
        opts: SaveOptions,
        force: bool,
    ) -> Result<bool, Error> {
        let config = entity.shared_config();
        sink::record(MetricsEvent::SaveStart {
            entity: config.name(),
        });

        let SaveOptions {
            rules,
            messages,
            labels,
            persist,
            before_save,
            after_save,
        } = opts;

        let valid = self.validate_with(entity, &rules, &messages, &labels)?;

        let persisted = if force || valid {
            self.perform_save(entity, &persist, before_save.as_ref(), after_save.as_ref())
        } else {
            self.debug_log(format!(
                "save of {} rejected: validation failed",
                config.name()
            ));
            false
        };

        sink::record(MetricsEvent::SaveFinish {
            entity: config.name(),
            persisted,
        });

        Ok(persisted)
    }

    // The persistence sequence: before-save hooks, purge, hash, persist,
    // original sync + after-save hooks on success.
    fn perform_save(
        &mut self,
        entity: &mut Entity,
        persist: &PersistOptions,
        before_save: Option<&Hook>,
        after_save: Option<&Hook>,
    ) -> bool {
        let config = entity.shared_config();

        if self.hooks.fire(LifecyclePhase::BeforeSave, entity) == HookDecision::Reject {
            return false;
        }
        if let Some(hook) = before_save {
            if hook(entity) == HookDecision::Reject {
                return false;
            }
        }

        if config.auto_purge() {
            let (kept, removed) = self.purge_attributes(&config, entity.attributes());
            entity.replace_attributes(kept);
            if removed > 0 {
                sink::record(MetricsEvent::AttributesPurged {
                    entity: config.name(),
                    removed,
                });
            }
        }

        if config.auto_hash() {
            let (hashed, rewritten) =
                self.hash_password_attributes(&config, entity.attributes(), entity.original());
            entity.replace_attributes(hashed);
            if rewritten > 0 {
                sink::record(MetricsEvent::AttributesHashed {
                    entity: config.name(),
                    rewritten,
                });
            }
        }

        let persisted = self.persister.save(entity.attributes(), persist);
        self.debug_log(format!(
            "persist of {} returned {persisted}",
            config.name()
        ));

        if persisted {
            entity.sync_original();
            self.hooks.fire(LifecyclePhase::AfterSave, entity);
            if let Some(hook) = after_save {
                hook(entity);
            }
        }

        persisted
    }

    // ======================================================================
    // Attribute rewriting passes
    // ======================================================================

    // Keep only attributes accepted by every purge predicate.
    fn purge_attributes(
        &self,
        config: &EntityConfig,
        attributes: &AttributeBag,
    ) -> (AttributeBag, u64) {
        let mut kept = AttributeBag::new();
        let mut removed = 0u64;

        for (key, value) in attributes.iter() {
            if self.attribute_survives(config, key) {
                kept.insert(key.clone(), value.clone());
            } else {
                removed = removed.saturating_add(1);
            }
        }

        (kept, removed)
    }

    // Default predicates (confirmation twins, reserved input keys) ANDed
    // with the registered ones; the first rejection wins.
    fn attribute_survives(&self, config: &EntityConfig, key: &str) -> bool {
        if key.ends_with("_confirmation") {
            return false;
        }
        if config.reserved_input_keys().iter().any(|r| r == key) {
            return false;
        }

        self.purge_filters.iter().all(|predicate| predicate(key))
    }

    // Replace changed, non-null password attributes with their digest.
    // Values equal to the last-persisted original stay untouched, so a
    // stored digest is never re-hashed on repeated saves.
    fn hash_password_attributes(
        &self,
        config: &EntityConfig,
        attributes: &AttributeBag,
        original: &AttributeBag,
    ) -> (AttributeBag, u64) {
        if config.password_attributes().is_empty() {
            return (attributes.clone(), 0);
        }

        let mut out = AttributeBag::new();
        let mut rewritten = 0u64;

        for (key, value) in attributes.iter() {
            let is_password = config.password_attributes().iter().any(|p| p == key);
            if is_password && !value.is_null() && original.get(key) != Some(value) {
                let plaintext = value
                    .as_text()
                    .map_or_else(|| value.to_string(), str::to_string);
                out.insert(key.clone(), Value::Text(self.hasher.make(&plaintext)));
                rewritten = rewritten.saturating_add(1);
            } else {
                out.insert(key.clone(), value.clone());
            }
        }

        (out, rewritten)
    }

    // ======================================================================
    // Uniqueness-rule rewriting
    // ======================================================================

    /// Rewrite uniqueness rules so the check ignores the entity's own row.
    /// Falls back to the type's default rules when the given set is empty.
    #[must_use]
    pub fn build_unique_exclusion_rules(entity: &Entity, rules: &RuleSet) -> RuleSet {
        let config = entity.config();
        let source = if rules.is_empty() {
            config.rules()
        } else {
            rules
        };

        rules::build_unique_exclusion_rules(
            source,
            config.table(),
            config.primary_key(),
            entity.primary_key_value(),
        )
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::{SaveExecutor, SaveOptions};
    use crate::{
        bag::{AttributeBag, ErrorBag},
        config::EntityConfig,
        entity::Entity,
        error::Error,
        lifecycle::{HookDecision, LifecyclePhase},
        rules::RuleSet,
        test_support::{IdentityHasher, PersistLog, RecordingPersister, StaticInput, StubValidator},
        value::Value,
    };
    use std::{cell::RefCell, rc::Rc, sync::Arc};

    fn executor(pass: bool, log: &Rc<RefCell<PersistLog>>) -> SaveExecutor {
        SaveExecutor::new(
            Box::new(StubValidator::passing(pass)),
            Box::new(RecordingPersister::new(log)),
        )
    }

    fn entity(config: EntityConfig) -> Entity {
        Entity::new(Arc::new(config))
    }

    #[test]
    fn save_persists_when_validation_passes() {
        let log = PersistLog::shared();
        let mut executor = executor(true, &log);
        let mut entity = entity(EntityConfig::new("User", "users"));
        entity.set("name", "ada");

        let saved = executor.save(&mut entity, SaveOptions::default()).unwrap();
        assert!(saved);
        assert_eq!(log.borrow().calls, 1);
    }

    #[test]
    fn save_never_touches_storage_on_failure() {
        let log = PersistLog::shared();
        let config = EntityConfig::new("User", "users")
            .with_rules(RuleSet::new().rule("name", "required"));
        let mut executor = executor(false, &log);
        let mut entity = entity(config);

        let saved = executor.save(&mut entity, SaveOptions::default()).unwrap();
        assert!(!saved);
        assert_eq!(log.borrow().calls, 0);
    }

    #[test]
    fn force_save_persists_despite_failure() {
        let log = PersistLog::shared();
        let config = EntityConfig::new("User", "users")
            .with_rules(RuleSet::new().rule("name", "required"));
        let mut executor = executor(false, &log);
        let mut entity = entity(config);

        let saved = executor
            .force_save(&mut entity, SaveOptions::default())
            .unwrap();
        assert!(saved);
        assert_eq!(log.borrow().calls, 1);
        assert!(!entity.errors().is_empty());
    }

    #[test]
    fn empty_rules_pass_trivially_without_validator() {
        let log = PersistLog::shared();
        // A failing validator proves it is never consulted.
        let mut executor = executor(false, &log);
        let mut entity = entity(EntityConfig::new("User", "users"));

        assert!(executor.validate(&mut entity).unwrap());
    }

    #[test]
    fn passing_validation_replaces_stale_error_bag() {
        let log = PersistLog::shared();
        let config = EntityConfig::new("User", "users")
            .with_rules(RuleSet::new().rule("name", "required"));
        let mut executor = executor(true, &log);
        let mut entity = entity(config);

        let mut stale = ErrorBag::new();
        stale.add("name", "required");
        entity.set_errors(stale);
        let old = entity.errors();

        assert!(executor.validate(&mut entity).unwrap());
        let new = entity.errors();
        assert!(new.is_empty());
        assert!(!Arc::ptr_eq(&old, &new));
        assert_eq!(old.count(), 1);
    }

    #[test]
    fn failing_validation_records_validator_messages() {
        let log = PersistLog::shared();
        let mut errors = ErrorBag::new();
        errors.add("name", "the name field is required");
        let mut executor = SaveExecutor::new(
            Box::new(StubValidator::failing(errors)),
            Box::new(RecordingPersister::new(&log)),
        );
        let config = EntityConfig::new("User", "users")
            .with_rules(RuleSet::new().rule("name", "required"));
        let mut entity = entity(config);

        assert!(!executor.validate(&mut entity).unwrap());
        assert_eq!(
            entity.errors().first("name"),
            Some("the name field is required")
        );
    }

    #[test]
    fn throw_configured_failure_returns_invalid_entity() {
        let log = PersistLog::shared();
        let config = EntityConfig::new("User", "users")
            .with_rules(RuleSet::new().rule("name", "required"))
            .with_throw_on_validation(true);
        let mut executor = executor(false, &log);
        let mut entity = entity(config);

        let err = executor.validate(&mut entity).unwrap_err();
        assert!(matches!(err, Error::InvalidEntity(_)));
    }

    #[test]
    fn before_validate_rejection_skips_rule_evaluation() {
        let log = PersistLog::shared();
        let after_fired = Rc::new(RefCell::new(false));
        // A passing validator; rejection must come from the hook alone.
        let mut executor = executor(true, &log);
        executor.on(
            LifecyclePhase::BeforeValidate,
            Box::new(|_| HookDecision::Reject),
        );
        let fired = Rc::clone(&after_fired);
        executor.on(
            LifecyclePhase::AfterValidate,
            Box::new(move |_| {
                *fired.borrow_mut() = true;
                HookDecision::Proceed
            }),
        );

        let mut entity = entity(EntityConfig::new("User", "users"));
        assert!(!executor.validate(&mut entity).unwrap());
        assert!(!*after_fired.borrow());
    }

    #[test]
    fn after_validate_fires_even_with_empty_rules() {
        let log = PersistLog::shared();
        let fired = Rc::new(RefCell::new(false));
        let mut executor = executor(true, &log);
        let flag = Rc::clone(&fired);
        executor.on(
            LifecyclePhase::AfterValidate,
            Box::new(move |_| {
                *flag.borrow_mut() = true;
                HookDecision::Proceed
            }),
        );

        let mut entity = entity(EntityConfig::new("User", "users"));
        assert!(executor.validate(&mut entity).unwrap());
        assert!(*fired.borrow());
    }

    #[test]
    fn before_save_rejection_returns_false_without_persisting() {
        let log = PersistLog::shared();
        let mut executor = executor(true, &log);
        executor.on(LifecyclePhase::BeforeSave, Box::new(|_| HookDecision::Reject));

        let mut entity = entity(EntityConfig::new("User", "users"));
        let saved = executor.save(&mut entity, SaveOptions::default()).unwrap();
        assert!(!saved);
        assert_eq!(log.borrow().calls, 0);
    }

    #[test]
    fn transient_hooks_fire_for_one_call_only() {
        let log = PersistLog::shared();
        let before_calls = Rc::new(RefCell::new(0u32));
        let mut executor = executor(true, &log);
        let mut entity = entity(EntityConfig::new("User", "users"));

        let counter = Rc::clone(&before_calls);
        let opts = SaveOptions {
            before_save: Some(Box::new(move |_| {
                *counter.borrow_mut() += 1;
                HookDecision::Proceed
            })),
            ..SaveOptions::default()
        };
        executor.save(&mut entity, opts).unwrap();
        executor.save(&mut entity, SaveOptions::default()).unwrap();

        assert_eq!(*before_calls.borrow(), 1);
    }

    #[test]
    fn purge_drops_confirmation_and_reserved_keys() {
        let log = PersistLog::shared();
        let config = EntityConfig::new("User", "users").with_auto_purge(true);
        let mut executor = executor(true, &log);
        let mut entity = entity(config);
        entity.set("name", "ada");
        entity.set("password_confirmation", "secret");
        entity.set("_token", "csrf");
        entity.set("_method", "PUT");

        executor.save(&mut entity, SaveOptions::default()).unwrap();

        let persisted = log.borrow().last_attributes.clone().unwrap();
        assert!(persisted.contains_key("name"));
        assert!(!persisted.contains_key("password_confirmation"));
        assert!(!persisted.contains_key("_token"));
        assert!(!persisted.contains_key("_method"));
    }

    #[test]
    fn custom_purge_predicates_compose_by_and() {
        let log = PersistLog::shared();
        let config = EntityConfig::new("User", "users").with_auto_purge(true);
        let mut executor = executor(true, &log);
        executor.add_purge_filter(Box::new(|key| !key.starts_with("tmp_")));
        let mut entity = entity(config);
        entity.set("name", "ada");
        entity.set("tmp_scratch", "x");

        executor.save(&mut entity, SaveOptions::default()).unwrap();

        let persisted = log.borrow().last_attributes.clone().unwrap();
        assert!(persisted.contains_key("name"));
        assert!(!persisted.contains_key("tmp_scratch"));
    }

    #[test]
    fn hashing_rewrites_changed_passwords_only() {
        let log = PersistLog::shared();
        let config = EntityConfig::new("User", "users").with_auto_hash(true);
        let mut executor = executor(true, &log);
        let mut entity = entity(config);
        entity.set("password", "plaintext");
        entity.set("name", "ada");

        executor.save(&mut entity, SaveOptions::default()).unwrap();
        let first = log.borrow().last_attributes.clone().unwrap();
        let digest = first.get("password").cloned().unwrap();
        assert_ne!(digest, Value::Text("plaintext".into()));
        assert_eq!(first.get("name"), Some(&Value::Text("ada".into())));

        // Second save without modification must not double-hash.
        executor.save(&mut entity, SaveOptions::default()).unwrap();
        let second = log.borrow().last_attributes.clone().unwrap();
        assert_eq!(second.get("password"), Some(&digest));
    }

    #[test]
    fn custom_hashers_replace_the_default() {
        let log = PersistLog::shared();
        let config = EntityConfig::new("User", "users").with_auto_hash(true);
        let mut executor = SaveExecutor::new(
            Box::new(StubValidator::passing(true)),
            Box::new(RecordingPersister::new(&log)),
        )
        .with_hasher(Box::new(IdentityHasher))
        .with_debug(true);
        let mut entity = entity(config);
        entity.set("password", "plaintext");

        executor.save(&mut entity, SaveOptions::default()).unwrap();
        let persisted = log.borrow().last_attributes.clone().unwrap();
        assert_eq!(
            persisted.get("password"),
            Some(&Value::Text("hashed:plaintext".into()))
        );
    }

    #[test]
    fn validate_uniques_rewrites_before_validating() {
        let log = PersistLog::shared();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let recorder = RecordingRulesValidator {
            seen: Rc::clone(&seen),
        };
        let mut executor = SaveExecutor::new(
            Box::new(recorder),
            Box::new(RecordingPersister::new(&log)),
        );
        let config = EntityConfig::new("User", "users")
            .with_rules(RuleSet::new().rule("email", "unique"));
        let mut entity = entity(config);
        entity.set("id", Value::Int(42));

        executor
            .validate_uniques(&mut entity, &RuleSet::new(), &Default::default())
            .unwrap();
        assert_eq!(seen.borrow()[0], "unique:users,email,42,id");
    }

    struct RecordingRulesValidator {
        seen: Rc<RefCell<Vec<String>>>,
    }

    impl crate::traits::Validator for RecordingRulesValidator {
        fn validate(
            &self,
            _data: &AttributeBag,
            rules: &RuleSet,
            _messages: &crate::traits::MessageOverrides,
            _labels: &crate::traits::AttributeLabels,
        ) -> crate::traits::ValidationOutcome {
            for list in rules.values() {
                for rule in list {
                    self.seen.borrow_mut().push(rule.clone());
                }
            }
            crate::traits::ValidationOutcome::pass()
        }
    }

    #[test]
    fn null_passwords_are_left_alone() {
        let log = PersistLog::shared();
        let config = EntityConfig::new("User", "users").with_auto_hash(true);
        let mut executor = executor(true, &log);
        let mut entity = entity(config);
        entity.set("password", Value::Null);

        executor.save(&mut entity, SaveOptions::default()).unwrap();
        let persisted = log.borrow().last_attributes.clone().unwrap();
        assert_eq!(persisted.get("password"), Some(&Value::Null));
    }

    #[test]
    fn failed_validation_flashes_session_input() {
        let log = PersistLog::shared();
        let flashes = Rc::new(RefCell::new(0u32));
        let input = StaticInput::new(AttributeBag::new(), true, &flashes);
        let config = EntityConfig::new("User", "users")
            .with_rules(RuleSet::new().rule("name", "required"));

        let mut executor = SaveExecutor::new(
            Box::new(StubValidator::passing(false)),
            Box::new(RecordingPersister::new(&log)),
        )
        .with_input(Box::new(input));
        let mut entity = entity(config);

        assert!(!executor.validate(&mut entity).unwrap());
        assert_eq!(*flashes.borrow(), 1);
    }

    #[test]
    fn sessionless_input_is_not_flashed() {
        let log = PersistLog::shared();
        let flashes = Rc::new(RefCell::new(0u32));
        let input = StaticInput::new(AttributeBag::new(), false, &flashes);
        let config = EntityConfig::new("User", "users")
            .with_rules(RuleSet::new().rule("name", "required"));

        let mut executor = SaveExecutor::new(
            Box::new(StubValidator::passing(false)),
            Box::new(RecordingPersister::new(&log)),
        )
        .with_input(Box::new(input));
        let mut entity = entity(config);

        assert!(!executor.validate(&mut entity).unwrap());
        assert_eq!(*flashes.borrow(), 0);
    }

    #[test]
    fn auto_hydration_fills_rule_keys_only() {
        let log = PersistLog::shared();
        let flashes = Rc::new(RefCell::new(0u32));
        let request = AttributeBag::new()
            .with("name", "ada")
            .with("email", "ada@example.com")
            .with("junk", "ignored");
        let input = StaticInput::new(request, false, &flashes);
        let config = EntityConfig::new("User", "users")
            .with_rules(RuleSet::new().rule("name", "required").rule("email", "email"))
            .with_auto_hydrate(true);

        let mut executor = SaveExecutor::new(
            Box::new(StubValidator::passing(true)),
            Box::new(RecordingPersister::new(&log)),
        )
        .with_input(Box::new(input));
        let mut entity = entity(config);

        assert!(executor.validate(&mut entity).unwrap());
        assert_eq!(
            entity.attributes().get("name"),
            Some(&Value::Text("ada".into()))
        );
        assert_eq!(entity.attributes().get("junk"), None);
    }

    #[test]
    fn hydration_skips_non_empty_bags_unless_forced() {
        let log = PersistLog::shared();
        let flashes = Rc::new(RefCell::new(0u32));
        let request = AttributeBag::new().with("name", "from_request");
        let input = StaticInput::new(request, false, &flashes);
        let config = EntityConfig::new("User", "users")
            .with_rules(RuleSet::new().rule("name", "required"))
            .with_auto_hydrate(true);

        let mut executor = SaveExecutor::new(
            Box::new(StubValidator::passing(true)),
            Box::new(RecordingPersister::new(&log)),
        )
        .with_input(Box::new(input));
        let mut entity = entity(config);
        entity.set("name", "manual");

        executor.validate(&mut entity).unwrap();
        assert_eq!(
            entity.attributes().get("name"),
            Some(&Value::Text("manual".into()))
        );
    }

    #[test]
    fn unique_exclusion_uses_entity_table_and_key() {
        let config = EntityConfig::new("User", "users")
            .with_rules(RuleSet::new().rule("email", "unique"));
        let mut entity = entity(config);
        entity.set("id", Value::Int(42));

        let rules = SaveExecutor::build_unique_exclusion_rules(&entity, &RuleSet::new());
        assert_eq!(rules.get("email").unwrap()[0], "unique:users,email,42,id");
    }

    #[test]
    fn persist_options_reach_the_persister_untouched() {
        let log = PersistLog::shared();
        let mut executor = executor(true, &log);
        let mut entity = entity(EntityConfig::new("User", "users"));

        let mut persist = crate::traits::PersistOptions::new();
        persist.insert("touch_timestamps".to_string(), Value::Bool(false));
        let opts = SaveOptions {
            persist: persist.clone(),
            ..SaveOptions::default()
        };

        executor.save(&mut entity, opts).unwrap();
        assert_eq!(log.borrow().last_options, persist);
    }

    #[test]
    fn successful_save_syncs_original_snapshot() {
        let log = PersistLog::shared();
        let mut executor = executor(true, &log);
        let mut entity = entity(EntityConfig::new("User", "users"));
        entity.set("name", "ada");

        assert!(entity.original().is_empty());
        executor.save(&mut entity, SaveOptions::default()).unwrap();
        assert_eq!(
            entity.original().get("name"),
            Some(&Value::Text("ada".into()))
        );
    }
}
