//! Error types for the MindBuddy core
//!
//! Every failure is local to the attempted operation: a rejected
//! purchase, a locked lesson, a failed append. There is no fatal error
//! class; callers recover by retrying or choosing a different action.

use thiserror::Error;

use crate::identity::Role;

/// Top-level error type for the application core
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Chat error: {0}")]
    Chat(#[from] ChatError),

    #[error("Economy error: {0}")]
    Economy(#[from] EconomyError),

    #[error("Learning error: {0}")]
    Learning(#[from] LearningError),

    /// An operation that requires an authenticated session was attempted
    /// while logged out
    #[error("Not logged in")]
    LoggedOut,
}

/// Errors from the login flow
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Registered as {actual}, not {requested}")]
    RoleMismatch { actual: Role, requested: Role },

    #[error("No profile record for this account")]
    ProfileMissing,
}

/// Errors from the messaging synchronizer
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChatError {
    /// Empty or whitespace-only message text
    #[error("Message text is empty")]
    EmptyMessage,

    /// The durable append to the message log failed; the local entry is
    /// marked failed and can be retried
    #[error("Append to message log failed: {0}")]
    AppendFailed(String),

    /// No message with the given key
    #[error("Unknown message")]
    UnknownMessage,
}

/// Errors from the economy engine
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EconomyError {
    /// The task's completed flag is already set; no double reward
    #[error("Task already completed")]
    AlreadyCompleted,

    #[error("Insufficient funds: balance {balance}, price {price}")]
    InsufficientFunds { balance: u32, price: u32 },

    /// No units of the item left to feed
    #[error("Item not in inventory")]
    EmptyInventory,

    /// Happiness is already at the cap; feeding is rejected and the
    /// inventory is not consumed
    #[error("Pet is already full")]
    PetSatisfied,

    #[error("Unknown task: {0}")]
    UnknownTask(String),

    #[error("Unknown item: {0}")]
    UnknownItem(String),
}

/// Errors from the learning progress tracker
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LearningError {
    /// The lesson's lock gate has not been released
    #[error("Lesson is locked")]
    Locked,

    #[error("Unknown lesson: {0}")]
    UnknownLesson(String),

    /// answer/advance called with no lesson in progress
    #[error("No lesson in progress")]
    NoActiveLesson,

    /// answer called on a non-quiz lesson
    #[error("Active lesson is not a quiz")]
    NotAQuiz,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        let err: AppError = EconomyError::AlreadyCompleted.into();
        assert!(matches!(err, AppError::Economy(EconomyError::AlreadyCompleted)));
    }

    #[test]
    fn test_role_mismatch_message() {
        let err = AuthError::RoleMismatch {
            actual: Role::Mentor,
            requested: Role::Student,
        };
        assert_eq!(err.to_string(), "Registered as mentor, not student");
    }
}
