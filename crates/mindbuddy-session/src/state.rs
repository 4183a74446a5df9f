//! Navigation state types

use serde::{Deserialize, Serialize};

use mindbuddy_core::Identity;

/// Bottom-level navigation tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Home,
    Chat,
    Learn,
    Progress,
    Profile,
}

/// A full-screen modal view, exclusive of the tabbed background.
///
/// Overlays never stack: opening one while another is open replaces it,
/// and closing always returns to the underlying tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Overlay {
    Chat,
    Call,
    Lesson,
    Store,
}

/// Top-level session phase
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// No authenticated identity; nothing else runs
    LoggedOut,
    /// Authenticated, showing a tab with at most one overlay above it
    LoggedIn {
        identity: Identity,
        tab: Tab,
        overlay: Option<Overlay>,
    },
}

impl SessionState {
    pub fn is_logged_in(&self) -> bool {
        matches!(self, SessionState::LoggedIn { .. })
    }
}
