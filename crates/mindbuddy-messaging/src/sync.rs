//! The conversation synchronizer

use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, warn};

use mindbuddy_core::{ChatError, ChatEvent, MessageLog, RemoteMessage, Role};

use crate::message::{ChatMessage, MessageKey};

/// Maximum timestamp skew between an optimistic entry and the log echo
/// that still counts as the same message.
const RECONCILE_WINDOW_SECS: i64 = 30;

struct Entry {
    message: ChatMessage,
    /// Arrival order, the tiebreak for equal timestamps
    arrival: u64,
}

/// Merges optimistic local sends with the authoritative message log into
/// one consistent, time-ordered conversation.
pub struct ChatSync {
    self_role: Role,
    log: Arc<dyn MessageLog>,
    entries: Vec<Entry>,
    next_arrival: u64,
}

impl ChatSync {
    pub fn new(self_role: Role, log: Arc<dyn MessageLog>) -> Self {
        Self {
            self_role,
            log,
            entries: Vec::new(),
            next_arrival: 0,
        }
    }

    fn push(&mut self, message: ChatMessage) {
        let arrival = self.next_arrival;
        self.next_arrival += 1;
        self.entries.push(Entry { message, arrival });
    }

    /// Send a message.
    ///
    /// The optimistic entry is visible immediately with status `Sent`.
    /// If the durable append fails the entry is marked `failed` (never
    /// silently dropped) and the error is returned; [`ChatSync::retry`]
    /// re-attempts it.
    pub async fn send(&mut self, text: &str) -> Result<MessageKey, ChatError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let message = ChatMessage::optimistic(text, self.self_role);
        let key = message.key;
        self.push(message);

        match self.log.append(text, self.self_role).await {
            Ok(remote_id) => {
                // The echo may already have reconciled this entry while
                // the append was in flight; only upgrade if still local.
                if let Some(entry) = self.entry_mut(key) {
                    entry.message.key = MessageKey::Remote(remote_id);
                    Ok(entry.message.key)
                } else {
                    Ok(MessageKey::Remote(remote_id))
                }
            }
            Err(err) => {
                warn!(%err, "durable append failed, marking message");
                if let Some(entry) = self.entry_mut(key) {
                    entry.message.failed = true;
                }
                Err(err)
            }
        }
    }

    /// Re-attempt the durable append for a failed message.
    pub async fn retry(&mut self, key: MessageKey) -> Result<MessageKey, ChatError> {
        let (text, failed) = match self.entry_mut(key) {
            Some(entry) => (entry.message.text.clone(), entry.message.failed),
            None => return Err(ChatError::UnknownMessage),
        };
        if !failed {
            // Nothing to do; the append already went through.
            return Ok(key);
        }

        match self.log.append(&text, self.self_role).await {
            Ok(remote_id) => {
                if let Some(entry) = self.entry_mut(key) {
                    entry.message.failed = false;
                    entry.message.key = MessageKey::Remote(remote_id);
                    Ok(entry.message.key)
                } else {
                    Ok(MessageKey::Remote(remote_id))
                }
            }
            Err(err) => Err(err),
        }
    }

    /// Apply one event from the message log stream.
    ///
    /// Events from the stream are applied in delivery order; this is the
    /// only place delivery status ever advances.
    pub fn apply(&mut self, event: ChatEvent) {
        match event {
            ChatEvent::Posted(remote) => self.apply_posted(remote),
            ChatEvent::StatusChanged { id, status } => {
                match self.entries.iter_mut().find(|e| e.message.key == MessageKey::Remote(id)) {
                    Some(entry) => {
                        entry.message.status = entry.message.status.merge(status);
                    }
                    None => {
                        // Out-of-order stream: the Posted event for this id
                        // has not arrived yet and will carry its status.
                        debug!(id = id.0, "status update for unknown message dropped");
                    }
                }
            }
        }
    }

    fn apply_posted(&mut self, remote: RemoteMessage) {
        // Already known under its remote id (redelivery or post-append echo)
        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|e| e.message.key == MessageKey::Remote(remote.id))
        {
            entry.message.status = entry.message.status.merge(remote.status);
            entry.message.timestamp = remote.timestamp;
            entry.message.pending = false;
            entry.message.failed = false;
            return;
        }

        // Echo of one of our optimistic sends still keyed locally
        if remote.sender == self.self_role {
            let window = Duration::seconds(RECONCILE_WINDOW_SECS);
            if let Some(entry) = self.entries.iter_mut().find(|e| {
                matches!(e.message.key, MessageKey::Local(_))
                    && e.message.sender == remote.sender
                    && e.message.text == remote.text
                    && (e.message.timestamp - remote.timestamp).abs() <= window
            }) {
                debug!(id = remote.id.0, "optimistic entry reconciled with echo");
                entry.message.key = MessageKey::Remote(remote.id);
                entry.message.timestamp = remote.timestamp;
                entry.message.status = entry.message.status.merge(remote.status);
                entry.message.pending = false;
                entry.message.failed = false;
                return;
            }
        }

        self.push(ChatMessage {
            key: MessageKey::Remote(remote.id),
            text: remote.text,
            sender: remote.sender,
            timestamp: remote.timestamp,
            status: remote.status,
            failed: false,
            pending: false,
        });
    }

    /// The rendered conversation: total order by timestamp, ties broken
    /// by arrival order from the stream.
    pub fn messages(&self) -> Vec<ChatMessage> {
        let mut ordered: Vec<&Entry> = self.entries.iter().collect();
        ordered.sort_by_key(|e| (e.message.timestamp, e.arrival));
        ordered.into_iter().map(|e| e.message.clone()).collect()
    }

    /// Keys of messages whose append failed and can be retried
    pub fn failed_keys(&self) -> Vec<MessageKey> {
        self.entries
            .iter()
            .filter(|e| e.message.failed)
            .map(|e| e.message.key)
            .collect()
    }

    /// Drop the whole local view (logout)
    pub fn clear(&mut self) {
        self.entries.clear();
        self.next_arrival = 0;
    }

    fn entry_mut(&mut self, key: MessageKey) -> Option<&mut Entry> {
        self.entries.iter_mut().find(|e| e.message.key == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindbuddy_core::{DeliveryStatus, MockMessageLog};

    fn sync_with_log() -> (ChatSync, Arc<MockMessageLog>) {
        let log = Arc::new(MockMessageLog::new());
        (ChatSync::new(Role::Student, log.clone()), log)
    }

    fn drain(sync: &mut ChatSync, rx: &mut tokio::sync::broadcast::Receiver<ChatEvent>) {
        while let Ok(event) = rx.try_recv() {
            sync.apply(event);
        }
    }

    #[tokio::test]
    async fn test_empty_message_rejected() {
        let (mut sync, _log) = sync_with_log();
        assert_eq!(sync.send("").await.unwrap_err(), ChatError::EmptyMessage);
        assert_eq!(sync.send("   \n\t").await.unwrap_err(), ChatError::EmptyMessage);
        assert!(sync.messages().is_empty());
    }

    #[tokio::test]
    async fn test_optimistic_send_visible_immediately() {
        let (mut sync, log) = sync_with_log();
        log.set_echo_appends(false);

        sync.send("  hello there  ").await.unwrap();

        let messages = sync.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].text, "hello there");
        assert_eq!(messages[0].status, DeliveryStatus::Sent);
        assert!(messages[0].pending);
    }

    #[tokio::test]
    async fn test_echo_reconciles_without_duplicate() {
        let (mut sync, log) = sync_with_log();
        let mut rx = log.subscribe();

        sync.send("hello").await.unwrap();
        drain(&mut sync, &mut rx);

        let messages = sync.messages();
        assert_eq!(messages.len(), 1);
        assert!(matches!(messages[0].key, MessageKey::Remote(_)));
        assert!(!messages[0].pending);
    }

    #[tokio::test]
    async fn test_echo_matches_local_entry_after_lost_ack() {
        // The append ack is lost but the server persisted the message;
        // the echo must reconcile the still-local failed entry.
        let (mut sync, log) = sync_with_log();
        let mut rx = log.subscribe();

        log.fail_next_append();
        assert!(sync.send("hello").await.is_err());
        assert_eq!(sync.failed_keys().len(), 1);

        log.post_remote("hello", Role::Student);
        drain(&mut sync, &mut rx);

        let messages = sync.messages();
        assert_eq!(messages.len(), 1);
        assert!(matches!(messages[0].key, MessageKey::Remote(_)));
        assert!(!messages[0].failed);
        assert!(sync.failed_keys().is_empty());
    }

    #[tokio::test]
    async fn test_same_text_from_other_sender_not_reconciled() {
        let (mut sync, log) = sync_with_log();
        let mut rx = log.subscribe();

        sync.send("hello").await.unwrap();
        log.post_remote("hello", Role::Mentor);
        drain(&mut sync, &mut rx);

        assert_eq!(sync.messages().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_send_stays_visible_and_retries() {
        let (mut sync, log) = sync_with_log();
        let mut rx = log.subscribe();

        log.fail_next_append();
        let err = sync.send("are you there?").await.unwrap_err();
        assert!(matches!(err, ChatError::AppendFailed(_)));

        let messages = sync.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].failed);

        let key = sync.failed_keys()[0];
        sync.retry(key).await.unwrap();
        drain(&mut sync, &mut rx);

        let messages = sync.messages();
        assert_eq!(messages.len(), 1);
        assert!(!messages[0].failed);
        assert_eq!(log.entries().len(), 1);
    }

    #[tokio::test]
    async fn test_status_advances_only_via_remote_updates() {
        let (mut sync, log) = sync_with_log();
        let mut rx = log.subscribe();

        let key = sync.send("hello").await.unwrap();
        drain(&mut sync, &mut rx);
        assert_eq!(sync.messages()[0].status, DeliveryStatus::Sent);

        let MessageKey::Remote(id) = key else {
            panic!("send should have adopted the remote id");
        };

        log.set_status(id, DeliveryStatus::Delivered);
        log.set_status(id, DeliveryStatus::Read);
        drain(&mut sync, &mut rx);
        assert_eq!(sync.messages()[0].status, DeliveryStatus::Read);

        // A stale update never regresses the status
        sync.apply(ChatEvent::StatusChanged {
            id,
            status: DeliveryStatus::Delivered,
        });
        assert_eq!(sync.messages()[0].status, DeliveryStatus::Read);
    }

    #[tokio::test]
    async fn test_status_for_unknown_message_dropped() {
        let (mut sync, _log) = sync_with_log();
        sync.apply(ChatEvent::StatusChanged {
            id: mindbuddy_core::MessageId(42),
            status: DeliveryStatus::Read,
        });
        assert!(sync.messages().is_empty());
    }

    #[tokio::test]
    async fn test_redelivered_posted_event_not_duplicated() {
        let (mut sync, log) = sync_with_log();
        let mut rx = log.subscribe();

        let id = log.post_remote("hi!", Role::Mentor);
        log.redeliver(id);
        drain(&mut sync, &mut rx);

        assert_eq!(sync.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_ordering_by_timestamp_then_arrival() {
        let (mut sync, log) = sync_with_log();
        let mut rx = log.subscribe();

        log.post_remote("first", Role::Mentor);
        log.post_remote("second", Role::Mentor);
        sync.send("third").await.unwrap();
        drain(&mut sync, &mut rx);

        let texts: Vec<_> = sync.messages().into_iter().map(|m| m.text).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_clear_empties_view() {
        let (mut sync, log) = sync_with_log();
        let mut rx = log.subscribe();

        log.post_remote("hi", Role::Mentor);
        drain(&mut sync, &mut rx);
        assert_eq!(sync.messages().len(), 1);

        sync.clear();
        assert!(sync.messages().is_empty());
    }
}
