//! ## Crate layout
//! - `base`: builtin rule engine and rule library.
//! - `core`: runtime entities, the validate-then-save lifecycle, relation
//!   descriptors, and collaborator seams.
//!
//! The `prelude` module mirrors the runtime surface used by calling code.

pub use ardent_core as core;

pub mod base;

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Prelude
///

pub mod prelude {
    pub use crate::base::{PresenceVerifier, RuleEngine};
    pub use ardent_core::prelude::*;
}
