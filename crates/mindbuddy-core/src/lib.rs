//! # MindBuddy Core
//!
//! Core types, errors, and collaborator ports for the MindBuddy stack.
//!
//! This crate provides the foundational abstractions shared by every
//! subsystem: who the user is, what content exists, what can go wrong,
//! and the narrow interfaces behind which the outside world lives.
//!
//! ## Key Traits
//!
//! - [`IdentityProvider`]: external credential verification and session invalidation
//! - [`MessageLog`]: durable append + ordered event stream for chat
//! - [`CallSignaling`]: presentation-only call control stub
//!
//! ## Key Types
//!
//! - [`Identity`] / [`Role`]: the authenticated user for the session
//! - [`Catalog`]: the static content configuration (tasks, lessons, food)
//! - [`ChatEvent`] / [`RewardEvent`]: events flowing between subsystems
//! - [`AppError`]: umbrella error over the per-concern taxonomies

pub mod catalog;
pub mod error;
pub mod event;
pub mod identity;
pub mod mock;
pub mod traits;

// Re-export main types
pub use catalog::*;
pub use error::*;
pub use event::*;
pub use identity::*;
pub use mock::*;
pub use traits::*;
