//! Result of an external attempt to handle a message.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::message::MessageId;

/// Why a resolution attempt was turned down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// The source carries no fixable condition (Family messages).
    NotResolvable,
    /// The workspace does not satisfy the message's fix condition yet.
    NotFixed,
    /// The message already reached court; nothing left to handle.
    AlreadyEscalated,
}

impl RejectReason {
    /// User-facing explanation.
    pub fn message(&self) -> &'static str {
        match self {
            Self::NotResolvable => "This message can't be handled.",
            Self::NotFixed => "You haven't fixed the issue in the workspace yet!",
            Self::AlreadyEscalated => "Too late, this issue already went to court.",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Outcome of `resolve(id)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ResolveOutcome {
    /// The fix was confirmed and the message is now resolved.
    Accepted { id: MessageId },
    /// The message was resolved earlier; nothing changed.
    AlreadyResolved { id: MessageId },
    /// The attempt was turned down; state is unchanged.
    Rejected { id: MessageId, reason: RejectReason },
    /// No message with that id exists.
    NotFound { id: MessageId },
}

impl ResolveOutcome {
    /// Whether the message ends up resolved.
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. } | Self::AlreadyResolved { .. })
    }

    /// Text suitable for an alert-style notice.
    pub fn describe(&self) -> String {
        match self {
            Self::Accepted { .. } => "Issue resolved!".to_string(),
            Self::AlreadyResolved { id } => format!("Message {id} was already resolved."),
            Self::Rejected { reason, .. } => reason.message().to_string(),
            Self::NotFound { id } => format!("No message with id {id}."),
        }
    }
}
