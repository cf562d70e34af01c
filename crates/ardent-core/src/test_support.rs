//! Stub collaborators shared by unit tests.

use crate::{
    bag::{AttributeBag, ErrorBag},
    rules::RuleSet,
    traits::{
        AttributeLabels, MessageOverrides, Persister, PersistOptions, RequestInput,
        ValidationOutcome, Validator,
    },
};
use std::{cell::RefCell, rc::Rc};

///
/// StubValidator
///

pub(crate) struct StubValidator {
    pass: bool,
    errors: ErrorBag,
}

impl StubValidator {
    pub(crate) fn passing(pass: bool) -> Self {
        let mut errors = ErrorBag::new();
        if !pass {
            errors.add("stub", "validation failed");
        }
        Self { pass, errors }
    }

    pub(crate) fn failing(errors: ErrorBag) -> Self {
        Self { pass: false, errors }
    }
}

impl Validator for StubValidator {
    fn validate(
        &self,
        _data: &AttributeBag,
        _rules: &RuleSet,
        _messages: &MessageOverrides,
        _labels: &AttributeLabels,
    ) -> ValidationOutcome {
        if self.pass {
            ValidationOutcome::pass()
        } else {
            ValidationOutcome::fail(self.errors.clone())
        }
    }
}

///
/// RecordingPersister
///

#[derive(Debug, Default)]
pub(crate) struct PersistLog {
    pub(crate) calls: u64,
    pub(crate) result: bool,
    pub(crate) last_attributes: Option<AttributeBag>,
    pub(crate) last_options: PersistOptions,
}

impl PersistLog {
    pub(crate) fn shared() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self {
            result: true,
            ..Self::default()
        }))
    }
}

pub(crate) struct RecordingPersister {
    log: Rc<RefCell<PersistLog>>,
}

impl RecordingPersister {
    pub(crate) fn new(log: &Rc<RefCell<PersistLog>>) -> Self {
        Self {
            log: Rc::clone(log),
        }
    }
}

impl Persister for RecordingPersister {
    fn save(&mut self, attributes: &AttributeBag, options: &PersistOptions) -> bool {
        let mut log = self.log.borrow_mut();
        log.calls += 1;
        log.last_attributes = Some(attributes.clone());
        log.last_options = options.clone();
        log.result
    }
}

///
/// IdentityHasher
///

pub(crate) struct IdentityHasher;

impl crate::traits::Hasher for IdentityHasher {
    fn make(&self, plaintext: &str) -> String {
        format!("hashed:{plaintext}")
    }
}

///
/// StaticInput
///

pub(crate) struct StaticInput {
    values: AttributeBag,
    session: bool,
    flashes: Rc<RefCell<u32>>,
}

impl StaticInput {
    pub(crate) fn new(values: AttributeBag, session: bool, flashes: &Rc<RefCell<u32>>) -> Self {
        Self {
            values,
            session,
            flashes: Rc::clone(flashes),
        }
    }
}

impl RequestInput for StaticInput {
    fn all(&self) -> AttributeBag {
        self.values.clone()
    }

    fn flash(&self) {
        *self.flashes.borrow_mut() += 1;
    }

    fn has_session_store(&self) -> bool {
        self.session
    }
}
