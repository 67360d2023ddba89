//! Engine notification bus.
//!
//! Provides a broadcast-based, fire-and-forget channel for the notifications
//! the engine raises (urgent, escalated, resolved, lifecycle changes).
//! Publishing never blocks and never fails; with no subscribers events are dropped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;

use crate::domain::models::{MessageId, MessageSource};

/// Monotonically increasing sequence number assigned by the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SequenceNumber(pub u64);

impl std::fmt::Display for SequenceNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventPayload {
    /// A message was put on the board.
    MessageAdded {
        id: MessageId,
        source: MessageSource,
        text: String,
    },
    /// A message left the board (welcome expiry).
    MessageRemoved { id: MessageId },
    /// A message was not fixed at its first deadline and became urgent.
    Urgent { id: MessageId, text: String },
    /// A message was still not fixed at its second deadline and went to court.
    Escalated { id: MessageId, text: String },
    /// An external actor resolved a message.
    Resolved { id: MessageId, text: String },
    /// The engine started or resumed.
    Enabled,
    /// The engine stopped; timers are gone, the board is kept.
    Disabled,
    /// The engine was torn down and the board cleared.
    Reset,
}

impl EventPayload {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MessageAdded { .. } => "message_added",
            Self::MessageRemoved { .. } => "message_removed",
            Self::Urgent { .. } => "urgent",
            Self::Escalated { .. } => "escalated",
            Self::Resolved { .. } => "resolved",
            Self::Enabled => "enabled",
            Self::Disabled => "disabled",
            Self::Reset => "reset",
        }
    }
}

/// Event envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineEvent {
    pub sequence: SequenceNumber,
    pub timestamp: DateTime<Utc>,
    pub payload: EventPayload,
}

/// Configuration for the EventBus.
#[derive(Debug, Clone)]
pub struct EventBusConfig {
    /// Channel capacity for the broadcast channel.
    pub channel_capacity: usize,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 256,
        }
    }
}

/// Broadcasts engine events to any number of subscribers.
pub struct EventBus {
    sender: broadcast::Sender<EngineEvent>,
    sequence: AtomicU64,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(EventBusConfig::default())
    }
}

impl EventBus {
    /// Create a new EventBus with the given configuration.
    pub fn new(config: EventBusConfig) -> Self {
        let (sender, _) = broadcast::channel(config.channel_capacity.max(1));
        Self {
            sender,
            sequence: AtomicU64::new(0),
        }
    }

    /// Publish an event.
    pub fn publish(&self, payload: EventPayload) {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
        let event = EngineEvent {
            sequence: SequenceNumber(seq),
            timestamp: Utc::now(),
            payload,
        };

        // No subscribers is fine; notifications are fire-and-forget
        let _ = self.sender.send(event);
    }

    /// Subscribe to the event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.sender.subscribe()
    }

    /// Get the current sequence number.
    pub fn current_sequence(&self) -> SequenceNumber {
        SequenceNumber(self.sequence.load(Ordering::SeqCst))
    }

    /// Get the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
