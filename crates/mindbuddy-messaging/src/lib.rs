//! # MindBuddy Messaging
//!
//! The messaging synchronizer: merges locally composed messages with the
//! externally maintained, append-only, server-ordered message log.
//!
//! Sends are optimistic — the message is visible immediately with status
//! `Sent` — and later reconciled with the log's authoritative echo so
//! self-sent messages never duplicate. Delivery status only advances
//! (`Sent → Delivered → Read`) and is driven exclusively by remote
//! updates. The synchronizer tolerates out-of-order arrival: the echo
//! may land before the durable append resolves, and a status update for
//! a message not yet seen is dropped (its `Posted` event carries the
//! current status anyway).

pub mod message;
pub mod sync;

pub use message::{ChatMessage, MessageKey};
pub use sync::ChatSync;
