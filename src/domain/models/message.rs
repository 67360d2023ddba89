//! Message domain model.
//!
//! A message is a single inbound item on the board. Boss and Agile messages
//! can escalate to urgent and then to court if the workspace issue they name
//! is not fixed in time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::errors::DomainError;

/// Unique, monotonically increasing message identifier.
pub type MessageId = u64;

/// Handle to an armed escalation timer.
///
/// Handles are never reused within an engine, so a stale handle can always be
/// told apart from the one currently recorded on a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimerHandle(pub u64);

impl fmt::Display for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer-{}", self.0)
    }
}

/// Where a message came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageSource {
    /// Engine-generated notices (the welcome message).
    System,
    /// Work requests that escalate.
    Boss,
    /// Personal messages; never escalate and cannot be handled.
    Family,
    /// Sprint tickets that escalate.
    Agile,
    /// Messages enqueued by an external caller.
    Manual,
}

impl MessageSource {
    /// Sources the generator picks from.
    pub const GENERATED: [Self; 3] = [Self::Boss, Self::Family, Self::Agile];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "System",
            Self::Boss => "Boss",
            Self::Family => "Family",
            Self::Agile => "Agile",
            Self::Manual => "Manual",
        }
    }

    /// Whether messages from this source enter the escalation state machine.
    pub fn escalates(&self) -> bool {
        matches!(self, Self::Boss | Self::Agile)
    }

    /// Whether an external actor may attempt to resolve messages from this source.
    pub fn is_resolvable(&self) -> bool {
        !matches!(self, Self::Family)
    }

    /// Catalog of texts the generator draws from for this source.
    pub fn catalog(&self) -> &'static [&'static str] {
        match self {
            Self::Boss => &["fix input validation", "fix secure database"],
            Self::Family => &[
                "Dinner is ready!",
                "Can you pick up kids after work?",
                "Take a short break!",
            ],
            Self::Agile => &["fix alt in img1", "fix user login"],
            Self::System | Self::Manual => &[],
        }
    }
}

impl fmt::Display for MessageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MessageSource {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "system" => Ok(Self::System),
            "boss" => Ok(Self::Boss),
            "family" => Ok(Self::Family),
            "agile" => Ok(Self::Agile),
            "manual" => Ok(Self::Manual),
            _ => Err(DomainError::UnknownSource(s.to_string())),
        }
    }
}

/// Display stage derived from the message flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageStage {
    Normal,
    Urgent,
    Court,
    Resolved,
}

impl MessageStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Urgent => "urgent",
            Self::Court => "court",
            Self::Resolved => "resolved",
        }
    }
}

impl fmt::Display for MessageStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub source: MessageSource,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub urgent: bool,
    pub resolved: bool,
    /// Reached the terminal court stage.
    pub escalated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_escalation: Option<TimerHandle>,
}

impl Message {
    /// Create a fresh message. The store assigns the final id on append.
    pub fn new(source: MessageSource, text: impl Into<String>) -> Self {
        Self {
            id: 0,
            source,
            text: text.into(),
            created_at: Utc::now(),
            urgent: false,
            resolved: false,
            escalated: false,
            pending_escalation: None,
        }
    }

    pub fn stage(&self) -> MessageStage {
        if self.resolved {
            MessageStage::Resolved
        } else if self.escalated {
            MessageStage::Court
        } else if self.urgent {
            MessageStage::Urgent
        } else {
            MessageStage::Normal
        }
    }

    /// Urgent and not yet resolved; the key for duplicate suppression.
    pub fn is_unresolved_urgent(&self) -> bool {
        self.urgent && !self.resolved
    }

    /// Apply a patch. Flags only ever move from false to true.
    pub fn apply(&mut self, patch: &MessagePatch) {
        if patch.urgent {
            self.urgent = true;
        }
        if patch.resolved && !self.escalated {
            self.resolved = true;
        }
        if patch.escalated && !self.resolved {
            self.escalated = true;
        }
        if let Some(pending) = patch.pending_escalation {
            self.pending_escalation = pending;
        }
    }
}

/// Partial update for a stored message.
///
/// Flags can be set but never cleared; only the pending handle can be removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessagePatch {
    urgent: bool,
    resolved: bool,
    escalated: bool,
    pending_escalation: Option<Option<TimerHandle>>,
}

impl MessagePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_urgent(mut self) -> Self {
        self.urgent = true;
        self
    }

    pub fn mark_resolved(mut self) -> Self {
        self.resolved = true;
        self
    }

    pub fn mark_escalated(mut self) -> Self {
        self.escalated = true;
        self
    }

    pub fn arm(mut self, handle: TimerHandle) -> Self {
        self.pending_escalation = Some(Some(handle));
        self
    }

    pub fn disarm(mut self) -> Self {
        self.pending_escalation = Some(None);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_parsing_is_case_insensitive() {
        assert_eq!("boss".parse::<MessageSource>().unwrap(), MessageSource::Boss);
        assert_eq!("AGILE".parse::<MessageSource>().unwrap(), MessageSource::Agile);
        assert!(matches!(
            "intern".parse::<MessageSource>(),
            Err(DomainError::UnknownSource(s)) if s == "intern"
        ));
    }

    #[test]
    fn test_only_boss_and_agile_escalate() {
        assert!(MessageSource::Boss.escalates());
        assert!(MessageSource::Agile.escalates());
        assert!(!MessageSource::Family.escalates());
        assert!(!MessageSource::System.escalates());
        assert!(!MessageSource::Manual.escalates());
    }

    #[test]
    fn test_family_is_not_resolvable() {
        assert!(!MessageSource::Family.is_resolvable());
        assert!(MessageSource::Manual.is_resolvable());
    }

    #[test]
    fn test_patch_flags_never_revert() {
        let mut msg = Message::new(MessageSource::Boss, "fix secure database");
        msg.apply(&MessagePatch::new().mark_urgent());
        assert!(msg.urgent);

        msg.apply(&MessagePatch::new());
        assert!(msg.urgent, "empty patch must not clear urgent");
        assert_eq!(msg.stage(), MessageStage::Urgent);
    }

    #[test]
    fn test_resolved_and_escalated_are_exclusive() {
        let mut msg = Message::new(MessageSource::Agile, "fix user login");
        msg.apply(&MessagePatch::new().mark_urgent().mark_escalated());
        msg.apply(&MessagePatch::new().mark_resolved());
        assert!(msg.escalated);
        assert!(!msg.resolved);
        assert_eq!(msg.stage(), MessageStage::Court);
    }

    #[test]
    fn test_arm_and_disarm() {
        let mut msg = Message::new(MessageSource::Boss, "fix input validation");
        msg.apply(&MessagePatch::new().arm(TimerHandle(7)));
        assert_eq!(msg.pending_escalation, Some(TimerHandle(7)));

        msg.apply(&MessagePatch::new().mark_urgent());
        assert_eq!(msg.pending_escalation, Some(TimerHandle(7)));

        msg.apply(&MessagePatch::new().disarm());
        assert_eq!(msg.pending_escalation, None);
    }
}
