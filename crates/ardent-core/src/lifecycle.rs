use crate::entity::Entity;
use std::collections::BTreeMap;

///
/// LifecyclePhase
///
/// Explicit, fixed-order lifecycle phases. Registration is by explicit
/// callback list; there is no naming-convention discovery.
///

#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum LifecyclePhase {
    BeforeValidate,
    AfterValidate,
    BeforeSave,
    AfterSave,
}

///
/// HookDecision
///
/// Rejections are honored in the before-phases only; after-phase returns
/// are ignored.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum HookDecision {
    #[default]
    Proceed,
    Reject,
}

/// A lifecycle callback. Hooks run synchronously on the calling thread and
/// may block; the executor neither bounds nor retries them.
pub type Hook = Box<dyn Fn(&mut Entity) -> HookDecision>;

///
/// Hooks
///

#[derive(Default)]
pub struct Hooks {
    registered: BTreeMap<LifecyclePhase, Vec<Hook>>,
}

impl Hooks {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            registered: BTreeMap::new(),
        }
    }

    pub fn on(&mut self, phase: LifecyclePhase, hook: Hook) {
        self.registered.entry(phase).or_default().push(hook);
    }

    /// Fire all hooks for a phase in registration order. The first rejection
    /// wins and short-circuits the rest.
    pub(crate) fn fire(&self, phase: LifecyclePhase, entity: &mut Entity) -> HookDecision {
        let Some(hooks) = self.registered.get(&phase) else {
            return HookDecision::Proceed;
        };

        for hook in hooks {
            if hook(entity) == HookDecision::Reject {
                return HookDecision::Reject;
            }
        }

        HookDecision::Proceed
    }
}

///
/// TESTS
///
