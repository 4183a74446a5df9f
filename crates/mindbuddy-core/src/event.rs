//! Events flowing between subsystems
//!
//! Two families: [`ChatEvent`]s delivered by the external message log
//! stream, and [`RewardEvent`]s emitted by the economy engine when XP is
//! credited.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::Role;

/// Identifier assigned by the external message log.
///
/// Locally composed messages do not have one until the log's
/// authoritative echo arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MessageId(pub u64);

/// Delivery status of a message, as reported by the message log.
///
/// The ordering is the lifecycle: `Sent < Delivered < Read`. Status only
/// ever advances; see [`DeliveryStatus::merge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Sent,
    Delivered,
    Read,
}

impl DeliveryStatus {
    /// Merge an incoming status report, keeping the more advanced state.
    ///
    /// A stale `Delivered` arriving after `Read` is ignored.
    pub fn merge(self, incoming: DeliveryStatus) -> DeliveryStatus {
        self.max(incoming)
    }
}

/// A message as the external log knows it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteMessage {
    pub id: MessageId,
    pub text: String,
    pub sender: Role,
    pub timestamp: DateTime<Utc>,
    pub status: DeliveryStatus,
}

/// Events delivered by the message log stream, in log order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChatEvent {
    /// A message was durably appended (including echoes of our own sends)
    Posted(RemoteMessage),

    /// A message's delivery status changed
    StatusChanged {
        id: MessageId,
        status: DeliveryStatus,
    },
}

/// XP credited by the economy engine, with the cause attached.
///
/// The learning tracker never constructs these itself; it reports
/// outcomes and the economy engine turns them into rewards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RewardEvent {
    TaskCompleted { task_id: String, xp: u32 },
    LessonCompleted { lesson_id: String, xp: u32 },
    QuizPassed { lesson_id: String, xp: u32, correct: usize, total: usize },
}

impl RewardEvent {
    /// XP credited by this event
    pub fn xp(&self) -> u32 {
        match self {
            Self::TaskCompleted { xp, .. } => *xp,
            Self::LessonCompleted { xp, .. } => *xp,
            Self::QuizPassed { xp, .. } => *xp,
        }
    }
}
