use std::time::Duration;
use tokio::time::Instant;

use crate::domain::ports::Clock;

/// Elapsed time since construction, measured with tokio's clock.
#[derive(Debug, Clone, Copy)]
pub struct TokioClock {
    epoch: Instant,
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TokioClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }

    /// The instant an engine-relative deadline falls on.
    pub fn instant_at(&self, offset: Duration) -> Instant {
        self.epoch + offset
    }
}

impl Clock for TokioClock {
    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }
}
