//! User identity for the current session
//!
//! An [`Identity`] is created only by a successful login through the
//! external [`IdentityProvider`](crate::traits::IdentityProvider) and is
//! immutable until logout tears the session down.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// Which side of the mentorship a user is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A student receiving wellness support
    Student,
    /// A peer mentor providing support
    Mentor,
}

impl Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Student => write!(f, "student"),
            Role::Mentor => write!(f, "mentor"),
        }
    }
}

/// The authenticated user for the current session.
///
/// Constructed from the identity provider's confirmed profile, never
/// from the role the user picked on the login screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Confirmed role, as recorded by the identity provider
    pub role: Role,
    /// Display name from the external profile
    pub display_name: String,
    /// Email the user signed in with
    pub email: String,
}

impl Identity {
    /// Create an identity from a confirmed profile
    pub fn new(role: Role, display_name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            role,
            display_name: display_name.into(),
            email: email.into(),
        }
    }
}

/// Raw login credentials, forwarded to the identity provider unchecked.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_display() {
        assert_eq!(Role::Student.to_string(), "student");
        assert_eq!(Role::Mentor.to_string(), "mentor");
    }

    #[test]
    fn test_role_serde_round_trip() {
        let json = serde_json::to_string(&Role::Mentor).unwrap();
        assert_eq!(json, "\"mentor\"");
        let role: Role = serde_json::from_str(&json).unwrap();
        assert_eq!(role, Role::Mentor);
    }

    #[test]
    fn test_identity_construction() {
        let id = Identity::new(Role::Student, "Alex", "alex@example.com");
        assert_eq!(id.role, Role::Student);
        assert_eq!(id.display_name, "Alex");
    }
}
