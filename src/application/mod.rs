//! Application layer: lifecycle controller and its tokio driver.

pub mod engine;
pub mod runtime;

pub use engine::{CourtEngine, EngineState};
pub use runtime::EngineRuntime;
