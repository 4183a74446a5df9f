//! Collaborator ports
//!
//! The core never talks to the outside world directly. Authentication,
//! message durability, and call signaling live behind these traits so
//! the application logic is testable without any real backend.
//!
//! All external I/O is non-blocking: calls suspend at the boundary and
//! results come back as values or as discrete events on a stream.

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::error::{AuthError, ChatError};
use crate::event::{ChatEvent, MessageId};
use crate::identity::{Credentials, Identity, Role};

/// External identity provider
///
/// Verifies credentials and reports the externally recorded role, which
/// the core trusts as ground truth. On any rejected login the external
/// session must be invalidated before the error is surfaced, so the app
/// never holds an authenticated external session behind a rejected
/// local login.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Check credentials and confirm the requested role.
    ///
    /// Returns `RoleMismatch` when the recorded role differs from
    /// `requested`, `InvalidCredentials` for bad credentials, and
    /// `ProfileMissing` when the account authenticates but has no
    /// profile record.
    async fn verify(&self, requested: Role, credentials: &Credentials) -> Result<Identity, AuthError>;

    /// Invalidate any external session state (sign out).
    async fn invalidate(&self);
}

/// External append-only, server-ordered message log
///
/// The log owns message identity, ordering, and delivery status. The
/// local synchronizer only merges what the log delivers.
#[async_trait]
pub trait MessageLog: Send + Sync {
    /// Durably append a message tagged with the sending role.
    async fn append(&self, text: &str, sender: Role) -> Result<MessageId, ChatError>;

    /// Subscribe to the ordered event stream.
    ///
    /// Events arrive in log order and keep flowing until the receiver is
    /// dropped at logout.
    fn subscribe(&self) -> broadcast::Receiver<ChatEvent>;
}

/// Call signaling stub
///
/// Presentation-only: no state crosses into the core beyond "the call
/// overlay is open".
#[async_trait]
pub trait CallSignaling: Send + Sync {
    async fn accept(&self);
    async fn decline(&self);
    async fn end(&self);
}
