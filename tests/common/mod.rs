//! Common test utilities for integration tests
//!
//! Provides a deterministic engine harness driven by a manual clock and a
//! settable snapshot.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use courtroom::application::CourtEngine;
use courtroom::domain::models::Config;
use courtroom::infrastructure::{ManualClock, StaticSnapshot};
use courtroom::services::{EngineEvent, EventPayload, SequencePicker};
use tokio::sync::broadcast::{self, error::TryRecvError};

/// Engine plus the handles a test needs to drive it.
pub struct Harness {
    pub engine: CourtEngine,
    pub clock: ManualClock,
    pub snapshot: Arc<StaticSnapshot>,
    rx: broadcast::Receiver<EngineEvent>,
}

impl Harness {
    /// Engine whose generator always posts Family / "Dinner is ready!".
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let clock = ManualClock::new();
        let snapshot = Arc::new(StaticSnapshot::new(""));
        let engine = CourtEngine::new(
            &config,
            snapshot.clone(),
            Arc::new(clock.clone()),
            Box::new(SequencePicker::new(vec![1, 0])),
        );
        let rx = engine.bus().subscribe();
        Self {
            engine,
            clock,
            snapshot,
            rx,
        }
    }

    /// Enabled engine with the startup events already drained.
    pub fn running() -> Self {
        let mut harness = Self::new();
        harness.engine.enable();
        harness.events();
        harness
    }

    /// Move the clock to `ms` and fire everything due.
    pub fn at(&mut self, ms: u64) -> usize {
        self.clock.set(Duration::from_millis(ms));
        self.engine.advance()
    }

    /// Everything published since the last call.
    pub fn events(&mut self) -> Vec<EventPayload> {
        let mut out = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(event) => out.push(event.payload),
                Err(TryRecvError::Lagged(_)) => {}
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
        out
    }
}

pub fn count_urgent(events: &[EventPayload], id: u64) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, EventPayload::Urgent { id: i, .. } if *i == id))
        .count()
}

pub fn count_escalated(events: &[EventPayload], id: u64) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, EventPayload::Escalated { id: i, .. } if *i == id))
        .count()
}
