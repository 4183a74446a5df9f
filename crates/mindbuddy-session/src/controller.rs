//! Session controller

use std::sync::Arc;

use tracing::{debug, info, warn};

use mindbuddy_core::{AppError, AuthError, Credentials, Identity, IdentityProvider, Role};

use crate::state::{Overlay, SessionState, Tab};

/// Owns the session lifecycle and the overlay/navigation state.
///
/// All mutation goes through `&mut self`; there is exactly one logical
/// thread of application logic, so no further locking is needed.
pub struct SessionController {
    provider: Arc<dyn IdentityProvider>,
    state: SessionState,
}

impl SessionController {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self {
            provider,
            state: SessionState::LoggedOut,
        }
    }

    /// Log in with the role picked on the login screen.
    ///
    /// The provider's recorded role is ground truth; a mismatch rejects
    /// the login. On any failure the external session is invalidated
    /// before the error is returned, so a rejected local login never
    /// leaves an authenticated external session behind.
    ///
    /// Logging in while already logged in replaces the session with a
    /// fresh one.
    pub async fn login(
        &mut self,
        requested: Role,
        credentials: &Credentials,
    ) -> Result<Identity, AuthError> {
        match self.provider.verify(requested, credentials).await {
            Ok(identity) => {
                info!(role = %identity.role, "login confirmed");
                self.state = SessionState::LoggedIn {
                    identity: identity.clone(),
                    tab: Tab::default(),
                    overlay: None,
                };
                Ok(identity)
            }
            Err(err) => {
                warn!(%err, "login rejected, invalidating external session");
                self.provider.invalidate().await;
                self.state = SessionState::LoggedOut;
                Err(err)
            }
        }
    }

    /// Clear the identity and all navigation state. Idempotent.
    pub async fn logout(&mut self) {
        if self.state.is_logged_in() {
            info!("logging out");
            self.provider.invalidate().await;
        }
        self.state = SessionState::LoggedOut;
    }

    /// Switch the active tab.
    ///
    /// Only valid while no overlay is open; with an overlay up the tab
    /// bar is not reachable, so the call is a no-op rather than an error.
    pub fn navigate(&mut self, target: Tab) -> Result<(), AppError> {
        match &mut self.state {
            SessionState::LoggedOut => Err(AppError::LoggedOut),
            SessionState::LoggedIn { overlay: Some(_), .. } => {
                debug!(?target, "navigate ignored while overlay is open");
                Ok(())
            }
            SessionState::LoggedIn { tab, .. } => {
                *tab = target;
                Ok(())
            }
        }
    }

    /// Open an overlay, replacing any overlay already open.
    pub fn open_overlay(&mut self, kind: Overlay) -> Result<Option<Overlay>, AppError> {
        match &mut self.state {
            SessionState::LoggedOut => Err(AppError::LoggedOut),
            SessionState::LoggedIn { overlay, .. } => {
                let replaced = overlay.replace(kind);
                if let Some(previous) = replaced {
                    debug!(?previous, opened = ?kind, "overlay replaced");
                }
                Ok(replaced)
            }
        }
    }

    /// Close the current overlay, returning to the underlying tab.
    ///
    /// Returns the overlay that was closed, if any.
    pub fn close_overlay(&mut self) -> Result<Option<Overlay>, AppError> {
        match &mut self.state {
            SessionState::LoggedOut => Err(AppError::LoggedOut),
            SessionState::LoggedIn { overlay, .. } => Ok(overlay.take()),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_logged_in(&self) -> bool {
        self.state.is_logged_in()
    }

    pub fn identity(&self) -> Option<&Identity> {
        match &self.state {
            SessionState::LoggedIn { identity, .. } => Some(identity),
            SessionState::LoggedOut => None,
        }
    }

    pub fn role(&self) -> Option<Role> {
        self.identity().map(|i| i.role)
    }

    pub fn tab(&self) -> Option<Tab> {
        match &self.state {
            SessionState::LoggedIn { tab, .. } => Some(*tab),
            SessionState::LoggedOut => None,
        }
    }

    pub fn overlay(&self) -> Option<Overlay> {
        match &self.state {
            SessionState::LoggedIn { overlay, .. } => *overlay,
            SessionState::LoggedOut => None,
        }
    }
}
