//! # MindBuddy Learning
//!
//! The learning progress tracker: the module/lesson unlock graph and the
//! quiz scoring state machine.
//!
//! The tracker enforces the lock gate (it never computes unlocks — the
//! unlock policy is content-defined) and reports lesson outcomes carrying
//! the reward to be credited. It never touches the XP ledger itself; the
//! composition root routes outcomes into the economy engine.

pub mod quiz;
pub mod tracker;

pub use quiz::{QuizAttempt, quiz_passes};
pub use tracker::{LearningTracker, LessonOutcome, ModuleProgress};
