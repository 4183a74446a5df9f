//! # MindBuddy Session
//!
//! The session controller: identity, tab navigation, and the single-slot
//! overlay stack. Root of composition — everything else in the app is
//! gated on this crate's state.
//!
//! State machine:
//!
//! ```text
//! LoggedOut --login ok--> LoggedIn(tab, overlay=None)
//! LoggedIn <--open/close overlay--> LoggedIn(overlay=X)
//! LoggedIn --logout--> LoggedOut
//! ```
//!
//! There is no terminal state; logout is the only reset transition.

pub mod controller;
pub mod state;

pub use controller::SessionController;
pub use state::{Overlay, SessionState, Tab};
