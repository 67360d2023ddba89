//! Ports the engine depends on.
//!
//! The engine is synchronous and deterministic; everything that touches the
//! outside world (workspace state, time, randomness) comes in through these traits.

use std::time::Duration;

/// Source of the current workspace snapshot.
///
/// Implementations must not fail: an unavailable snapshot is reported as an
/// empty string, which the evaluator treats as "not fixed".
pub trait SnapshotSource: Send + Sync {
    /// Get the current workspace state as text
    fn snapshot(&self) -> String;
}

impl<F> SnapshotSource for F
where
    F: Fn() -> String + Send + Sync,
{
    fn snapshot(&self) -> String {
        self()
    }
}

/// Monotonic time source for deadlines.
pub trait Clock: Send + Sync {
    /// Time elapsed since the clock's epoch
    fn now(&self) -> Duration;
}

/// Uniform choice over a finite range.
///
/// Isolated so generator output can be replayed from a seed or scripted in tests.
pub trait Picker: Send {
    /// Pick an index in `0..len`. `len` is always non-zero.
    fn pick(&mut self, len: usize) -> usize;
}
