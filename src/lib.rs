//! Courtroom - time-driven message escalation engine
//!
//! Messages land on a board. Boss and Agile messages name a workspace issue;
//! if the issue is still present in the workspace snapshot after the first
//! delay the message turns urgent, and after the second delay it goes to court.
//! An external actor can resolve a message once the fix is in place.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): Messages, outcomes, configuration and ports
//! - **Service Layer** (`services`): Fix evaluator, board, timer scheduler, generator, notifications
//! - **Application Layer** (`application`): Lifecycle controller and its tokio driver
//! - **Infrastructure Layer** (`infrastructure`): Clocks, snapshot sources, config loading, logging
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use courtroom::application::CourtEngine;
//! use courtroom::infrastructure::{ManualClock, StaticSnapshot};
//! use courtroom::services::SeededPicker;
//!
//! let clock = ManualClock::new();
//! let mut engine = CourtEngine::new(
//!     &courtroom::Config::default(),
//!     Arc::new(StaticSnapshot::new("")),
//!     Arc::new(clock.clone()),
//!     Box::new(SeededPicker::from_seed(1)),
//! );
//! engine.enable();
//! clock.advance(std::time::Duration::from_secs(8));
//! engine.advance();
//! ```

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use application::{CourtEngine, EngineRuntime, EngineState};
pub use domain::models::{
    Config, EscalationConfig, GeneratorConfig, LoggingConfig, Message, MessageId, MessageSource,
    MessageStage, NotificationConfig, RejectReason, ResolveOutcome,
};
pub use domain::ports::{Clock, Picker, SnapshotSource};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{is_fixed, EngineEvent, EventPayload, FixRule};
