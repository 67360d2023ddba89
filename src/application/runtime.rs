//! Tokio driver for the escalation engine.
//!
//! Wraps a [`CourtEngine`] in an async mutex and runs one scheduler loop task
//! that sleeps until the earliest outstanding deadline, wakes early whenever an
//! external call changes the timer table, and fires everything that is due.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{broadcast, Mutex, Notify};
use tokio::task::JoinHandle;

use super::engine::{CourtEngine, EngineState};
use crate::domain::models::{Config, Message, MessageId, MessageSource, ResolveOutcome};
use crate::domain::ports::{Picker, SnapshotSource};
use crate::infrastructure::TokioClock;
use crate::services::{EngineEvent, EventBus};

/// Real-time handle to a running engine. Cheap to clone.
#[derive(Clone)]
pub struct EngineRuntime {
    engine: Arc<Mutex<CourtEngine>>,
    bus: Arc<EventBus>,
    clock: TokioClock,
    wake: Arc<Notify>,
    running: Arc<AtomicBool>,
}

impl EngineRuntime {
    /// Build an engine on a tokio clock. Nothing runs until [`EngineRuntime::spawn`].
    pub fn new(
        config: &Config,
        snapshots: Arc<dyn SnapshotSource>,
        picker: Box<dyn Picker>,
    ) -> Self {
        let clock = TokioClock::new();
        let engine = CourtEngine::new(config, snapshots, Arc::new(clock), picker);
        let bus = engine.bus();
        Self {
            engine: Arc::new(Mutex::new(engine)),
            bus,
            clock,
            wake: Arc::new(Notify::new()),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start the scheduler loop task.
    pub fn spawn(&self) -> JoinHandle<()> {
        self.running.store(true, Ordering::SeqCst);

        let engine = self.engine.clone();
        let wake = self.wake.clone();
        let running = self.running.clone();
        let clock = self.clock;

        tokio::spawn(async move {
            tracing::debug!("scheduler loop started");
            while running.load(Ordering::SeqCst) {
                let next = engine.lock().await.next_deadline();
                match next {
                    Some(deadline) => {
                        tokio::select! {
                            () = tokio::time::sleep_until(clock.instant_at(deadline)) => {
                                // Checks read the snapshot synchronously under the lock.
                                let fired = engine.lock().await.advance();
                                tracing::trace!(fired, "timers fired");
                            }
                            () = wake.notified() => {}
                        }
                    }
                    None => wake.notified().await,
                }
            }
            tracing::debug!("scheduler loop stopped");
        })
    }

    /// Stop the scheduler loop. Engine state is left untouched.
    pub fn shutdown(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.wake.notify_one();
    }

    /// Check if the scheduler loop is running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Subscribe to engine notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.bus.subscribe()
    }

    pub async fn enable(&self) -> bool {
        let changed = self.engine.lock().await.enable();
        self.wake.notify_one();
        changed
    }

    pub async fn disable(&self) -> bool {
        let changed = self.engine.lock().await.disable();
        self.wake.notify_one();
        changed
    }

    pub async fn reset(&self) {
        self.engine.lock().await.reset();
        self.wake.notify_one();
    }

    pub async fn enqueue(&self, source: MessageSource, text: impl Into<String>) -> MessageId {
        let id = self.engine.lock().await.enqueue(source, text);
        self.wake.notify_one();
        id
    }

    pub async fn resolve(&self, id: MessageId) -> ResolveOutcome {
        let outcome = self.engine.lock().await.resolve(id);
        self.wake.notify_one();
        outcome
    }

    /// Current board, newest first.
    pub async fn messages(&self) -> Vec<Message> {
        self.engine.lock().await.messages()
    }

    pub async fn state(&self) -> EngineState {
        self.engine.lock().await.state()
    }
}
