//! Domain models: messages, resolution outcomes and configuration.

pub mod config;
pub mod message;
pub mod resolution;

pub use config::{Config, EscalationConfig, GeneratorConfig, LoggingConfig, NotificationConfig};
pub use message::{Message, MessageId, MessagePatch, MessageSource, MessageStage, TimerHandle};
pub use resolution::{RejectReason, ResolveOutcome};
