//! Clock implementations
//!
//! - `TokioClock`: real time via `tokio::time::Instant` (honours `tokio::time::pause`)
//! - `ManualClock`: explicitly advanced, for simulation and tests

pub mod manual;
pub mod tokio_clock;

pub use manual::ManualClock;
pub use tokio_clock::TokioClock;
