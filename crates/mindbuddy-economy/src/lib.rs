//! # MindBuddy Economy
//!
//! The virtual economy engine: the XP currency ledger, task-completion
//! rewards, store purchases with a multiset inventory, and the bounded
//! pet happiness resource.
//!
//! Every operation is transactional from the caller's point of view —
//! guards run before any state is touched, so a rejected purchase or
//! feed leaves the session exactly as it was.

pub mod engine;
pub mod ledger;
pub mod pet;

pub use engine::EconomyEngine;
pub use ledger::XpLedger;
pub use pet::{Pet, PetMood};
