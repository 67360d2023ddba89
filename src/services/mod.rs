//! Service layer: evaluator, board, timers, generator and notifications.

pub mod escalation_scheduler;
pub mod event_bus;
pub mod fix_evaluator;
pub mod generator;
pub mod message_store;

pub use escalation_scheduler::{EscalationContext, EscalationScheduler, FiredTimer, TimerKind};
pub use event_bus::{EngineEvent, EventBus, EventBusConfig, EventPayload, SequenceNumber};
pub use fix_evaluator::{is_fixed, FixRule};
pub use generator::{Generator, SeededPicker, SequencePicker, WELCOME_TEXT};
pub use message_store::MessageStore;
