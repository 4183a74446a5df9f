//! Local message model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mindbuddy_core::{DeliveryStatus, MessageId, Role};

/// Identity of a message in the local view.
///
/// Optimistic entries carry a random local nonce until the log's echo
/// arrives; reconciliation swaps the key for the authoritative remote id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKey {
    /// Locally composed, not yet acknowledged by the log
    Local(u64),
    /// Identified by the external message log
    Remote(MessageId),
}

/// A message in the rendered conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub key: MessageKey,
    pub text: String,
    pub sender: Role,
    pub timestamp: DateTime<Utc>,
    pub status: DeliveryStatus,
    /// Durable append failed; the entry stays visible and can be retried
    pub failed: bool,
    /// Optimistic entry still waiting for the log's echo
    pub pending: bool,
}

impl ChatMessage {
    /// Create an optimistic local entry for a just-sent message
    pub fn optimistic(text: impl Into<String>, sender: Role) -> Self {
        Self {
            key: MessageKey::Local(rand::random()),
            text: text.into(),
            sender,
            timestamp: Utc::now(),
            status: DeliveryStatus::Sent,
            failed: false,
            pending: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optimistic_entry_defaults() {
        let message = ChatMessage::optimistic("hello", Role::Student);
        assert!(matches!(message.key, MessageKey::Local(_)));
        assert_eq!(message.status, DeliveryStatus::Sent);
        assert!(message.pending);
        assert!(!message.failed);
    }

    #[test]
    fn test_local_keys_are_distinct() {
        let a = ChatMessage::optimistic("one", Role::Student);
        let b = ChatMessage::optimistic("one", Role::Student);
        assert_ne!(a.key, b.key);
    }
}
