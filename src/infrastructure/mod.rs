//! Infrastructure layer: configuration, logging, clocks and snapshot sources.

pub mod clock;
pub mod config;
pub mod logging;
pub mod snapshot;

pub use clock::{ManualClock, TokioClock};
pub use config::{ConfigError, ConfigLoader};
pub use logging::{LogConfig, LoggerImpl};
pub use snapshot::{FileSnapshotSource, StaticSnapshot};
