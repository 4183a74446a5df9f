//! Mock collaborators for testing
//!
//! In-memory implementations of the collaborator ports, used by unit
//! tests, integration tests, and the demo binary.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mindbuddy_core::{MockIdentityProvider, MockMessageLog, Role};
//!
//! let provider = MockIdentityProvider::new()
//!     .with_profile("alex@example.com", "hunter2", Role::Student, "Alex");
//!
//! let log = MockMessageLog::new();
//! let mut rx = log.subscribe();
//! log.append("hello", Role::Student).await.unwrap();
//! let event = rx.recv().await.unwrap(); // Posted echo of the append
//! ```

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::broadcast;

use crate::error::{AuthError, ChatError};
use crate::event::{ChatEvent, DeliveryStatus, MessageId, RemoteMessage};
use crate::identity::{Credentials, Identity, Role};
use crate::traits::{CallSignaling, IdentityProvider, MessageLog};

/// A registered account in the mock provider
struct MockAccount {
    password: String,
    /// None models an account that authenticates but has no profile record
    profile: Option<(Role, String)>,
}

/// Mock identity provider backed by a registered-profile table
pub struct MockIdentityProvider {
    accounts: Mutex<HashMap<String, MockAccount>>,
    invalidations: AtomicUsize,
}

impl MockIdentityProvider {
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
            invalidations: AtomicUsize::new(0),
        }
    }

    /// Register an account with a full profile
    pub fn with_profile(
        self,
        email: &str,
        password: &str,
        role: Role,
        display_name: &str,
    ) -> Self {
        self.accounts.lock().unwrap().insert(
            email.to_string(),
            MockAccount {
                password: password.to_string(),
                profile: Some((role, display_name.to_string())),
            },
        );
        self
    }

    /// Register an account that authenticates but has no profile record
    pub fn with_orphan_account(self, email: &str, password: &str) -> Self {
        self.accounts.lock().unwrap().insert(
            email.to_string(),
            MockAccount {
                password: password.to_string(),
                profile: None,
            },
        );
        self
    }

    /// How many times the external session was invalidated
    pub fn invalidations(&self) -> usize {
        self.invalidations.load(Ordering::SeqCst)
    }
}

impl Default for MockIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn verify(
        &self,
        requested: Role,
        credentials: &Credentials,
    ) -> Result<Identity, AuthError> {
        let accounts = self.accounts.lock().unwrap();
        let account = accounts
            .get(&credentials.email)
            .filter(|a| a.password == credentials.password)
            .ok_or(AuthError::InvalidCredentials)?;

        let (actual, display_name) = account.profile.clone().ok_or(AuthError::ProfileMissing)?;

        if actual != requested {
            return Err(AuthError::RoleMismatch { actual, requested });
        }

        Ok(Identity::new(actual, display_name, credentials.email.clone()))
    }

    async fn invalidate(&self) {
        tracing::debug!("external session invalidated");
        self.invalidations.fetch_add(1, Ordering::SeqCst);
    }
}

/// Mock append-only message log with broadcast fan-out
///
/// Appends are echoed back on the event stream like a real server-ordered
/// log would, so the synchronizer's reconciliation path is exercised.
/// Failures can be injected per-append.
pub struct MockMessageLog {
    entries: Mutex<Vec<RemoteMessage>>,
    next_id: AtomicU64,
    tx: broadcast::Sender<ChatEvent>,
    fail_next_append: AtomicBool,
    echo_appends: AtomicBool,
}

impl MockMessageLog {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(256);
        Self {
            entries: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            tx,
            fail_next_append: AtomicBool::new(false),
            echo_appends: AtomicBool::new(true),
        }
    }

    /// Make the next `append` fail with `ChatError::AppendFailed`
    pub fn fail_next_append(&self) {
        self.fail_next_append.store(true, Ordering::SeqCst);
    }

    /// Control whether appends are echoed back as `Posted` events
    /// (on by default). Turning it off models a slow stream.
    pub fn set_echo_appends(&self, echo: bool) {
        self.echo_appends.store(echo, Ordering::SeqCst);
    }

    fn insert(&self, text: &str, sender: Role) -> RemoteMessage {
        let id = MessageId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let message = RemoteMessage {
            id,
            text: text.to_string(),
            sender,
            timestamp: Utc::now(),
            status: DeliveryStatus::Sent,
        };
        self.entries.lock().unwrap().push(message.clone());
        message
    }

    /// Append from the other party, always delivered on the stream
    pub fn post_remote(&self, text: &str, sender: Role) -> MessageId {
        let message = self.insert(text, sender);
        let id = message.id;
        let _ = self.tx.send(ChatEvent::Posted(message));
        id
    }

    /// Re-deliver a stored message on the stream (for out-of-order tests)
    pub fn redeliver(&self, id: MessageId) {
        let entries = self.entries.lock().unwrap();
        if let Some(message) = entries.iter().find(|m| m.id == id) {
            let _ = self.tx.send(ChatEvent::Posted(message.clone()));
        }
    }

    /// Push a delivery-status update onto the stream
    pub fn set_status(&self, id: MessageId, status: DeliveryStatus) {
        let mut entries = self.entries.lock().unwrap();
        if let Some(message) = entries.iter_mut().find(|m| m.id == id) {
            message.status = message.status.merge(status);
        }
        drop(entries);
        let _ = self.tx.send(ChatEvent::StatusChanged { id, status });
    }

    /// Snapshot of the durable log, in append order
    pub fn entries(&self) -> Vec<RemoteMessage> {
        self.entries.lock().unwrap().clone()
    }
}

impl Default for MockMessageLog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageLog for MockMessageLog {
    async fn append(&self, text: &str, sender: Role) -> Result<MessageId, ChatError> {
        if self.fail_next_append.swap(false, Ordering::SeqCst) {
            return Err(ChatError::AppendFailed("injected append failure".to_string()));
        }

        let message = self.insert(text, sender);
        let id = message.id;
        tracing::debug!(id = id.0, %sender, "append accepted");
        if self.echo_appends.load(Ordering::SeqCst) {
            let _ = self.tx.send(ChatEvent::Posted(message));
        }
        Ok(id)
    }

    fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.tx.subscribe()
    }
}

/// Mock call signaling that just counts the control messages sent
#[derive(Default)]
pub struct MockCallSignaling {
    accepted: AtomicUsize,
    declined: AtomicUsize,
    ended: AtomicUsize,
}

impl MockCallSignaling {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accepted(&self) -> usize {
        self.accepted.load(Ordering::SeqCst)
    }

    pub fn declined(&self) -> usize {
        self.declined.load(Ordering::SeqCst)
    }

    pub fn ended(&self) -> usize {
        self.ended.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CallSignaling for MockCallSignaling {
    async fn accept(&self) {
        self.accepted.fetch_add(1, Ordering::SeqCst);
    }

    async fn decline(&self) {
        self.declined.fetch_add(1, Ordering::SeqCst);
    }

    async fn end(&self) {
        self.ended.fetch_add(1, Ordering::SeqCst);
    }
}
