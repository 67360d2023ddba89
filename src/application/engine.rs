//! Lifecycle controller for the escalation engine.
//!
//! `CourtEngine` bundles the board, the scheduler and the generator and is the
//! only entry point external callers use. It is a plain synchronous state
//! machine: time only moves when [`CourtEngine::advance`] is called, which makes
//! it deterministic under a [`ManualClock`](crate::infrastructure::ManualClock).

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::domain::models::{Config, Message, MessageId, MessageSource, ResolveOutcome};
use crate::domain::ports::{Clock, Picker, SnapshotSource};
use crate::services::{
    EscalationContext, EscalationScheduler, EventBus, EventBusConfig, EventPayload, Generator,
    MessageStore, TimerKind,
};

/// Lifecycle state of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    /// Never started, or reset since.
    Idle,
    /// Generator and escalation timers are live.
    Running,
    /// Started earlier, then disabled; the board is kept.
    Disabled,
}

impl EngineState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Disabled => "disabled",
        }
    }
}

/// Time-driven escalation engine.
pub struct CourtEngine {
    state: EngineState,
    store: MessageStore,
    scheduler: EscalationScheduler,
    generator: Generator,
    /// Welcome message still on the board, if any.
    welcome: Option<MessageId>,
    snapshots: Arc<dyn SnapshotSource>,
    clock: Arc<dyn Clock>,
    bus: Arc<EventBus>,
}

impl CourtEngine {
    pub fn new(
        config: &Config,
        snapshots: Arc<dyn SnapshotSource>,
        clock: Arc<dyn Clock>,
        picker: Box<dyn Picker>,
    ) -> Self {
        let bus = Arc::new(EventBus::new(EventBusConfig {
            channel_capacity: config.notifications.channel_capacity,
        }));
        Self {
            state: EngineState::Idle,
            store: MessageStore::new(),
            scheduler: EscalationScheduler::new(config.escalation.clone()),
            generator: Generator::new(&config.generator, picker),
            welcome: None,
            snapshots,
            clock,
            bus,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn bus(&self) -> Arc<EventBus> {
        self.bus.clone()
    }

    /// Start the engine. Alias of [`CourtEngine::enable`].
    pub fn start(&mut self) -> bool {
        self.enable()
    }

    /// Stop the engine. Alias of [`CourtEngine::disable`].
    pub fn stop(&mut self) -> bool {
        self.disable()
    }

    /// Start or resume.
    ///
    /// From idle this posts the welcome message and starts the generator.
    /// From disabled it restarts the generator and the expiry of a welcome
    /// message still on the board; escalations are not re-armed. While running
    /// it does nothing. Returns whether the state changed.
    pub fn enable(&mut self) -> bool {
        let now = self.clock.now();
        match self.state {
            EngineState::Running => {
                debug!("enable ignored, already running");
                return false;
            }
            EngineState::Idle => {
                let welcome = self.generator.welcome();
                let id = self.insert(welcome, now);
                self.welcome = Some(id);
                let ttl = self.generator.welcome_ttl();
                self.scheduler.schedule(now + ttl, TimerKind::WelcomeExpiry(id));
            }
            EngineState::Disabled => {
                if let Some(id) = self.welcome {
                    let ttl = self.generator.welcome_ttl();
                    self.scheduler.schedule(now + ttl, TimerKind::WelcomeExpiry(id));
                }
            }
        }

        let interval = self.generator.interval();
        self.scheduler.schedule(now + interval, TimerKind::Generate);
        self.state = EngineState::Running;
        info!(now_ms = millis(now), "engine enabled");
        self.bus.publish(EventPayload::Enabled);
        true
    }

    /// Stop the generator and cancel every timer.
    ///
    /// The board is left as is. Returns whether the state changed.
    pub fn disable(&mut self) -> bool {
        if self.state != EngineState::Running {
            debug!(state = self.state.as_str(), "disable ignored, not running");
            return false;
        }
        let cancelled = self.scheduler.pending();
        self.scheduler.clear(&mut self.store);
        self.state = EngineState::Disabled;
        info!(cancelled, "engine disabled");
        self.bus.publish(EventPayload::Disabled);
        true
    }

    /// Full teardown: cancel every timer, clear the board, restart ids and
    /// return to idle so the next enable initializes from scratch.
    pub fn reset(&mut self) {
        self.scheduler.clear(&mut self.store);
        self.store.clear();
        self.welcome = None;
        self.state = EngineState::Idle;
        info!("engine reset");
        self.bus.publish(EventPayload::Reset);
    }

    /// Put a message on the board on behalf of an external caller.
    ///
    /// Escalation rules are the same as for generated messages; while the
    /// engine is not running the message is posted without timers.
    pub fn enqueue(&mut self, source: MessageSource, text: impl Into<String>) -> MessageId {
        let now = self.clock.now();
        self.insert(Message::new(source, text), now)
    }

    /// External attempt to handle a message.
    pub fn resolve(&mut self, id: MessageId) -> ResolveOutcome {
        let mut ctx = EscalationContext {
            store: &mut self.store,
            snapshots: self.snapshots.as_ref(),
            bus: &self.bus,
        };
        self.scheduler.resolve(&mut ctx, id)
    }

    /// Fire every timer whose deadline is at or before the clock's current time,
    /// in deadline order. Returns how many fired.
    ///
    /// Timers armed while firing are measured from the firing timer's deadline,
    /// so a large jump replays exactly like small steps would.
    pub fn advance(&mut self) -> usize {
        let now = self.clock.now();
        let mut fired = 0;

        while let Some(timer) = self.scheduler.pop_due(now) {
            fired += 1;
            match timer.kind {
                TimerKind::UrgentCheck(id) => {
                    let mut ctx = EscalationContext {
                        store: &mut self.store,
                        snapshots: self.snapshots.as_ref(),
                        bus: &self.bus,
                    };
                    self.scheduler.on_urgent_check(&mut ctx, id, timer.deadline);
                }
                TimerKind::CourtCheck(id) => {
                    let mut ctx = EscalationContext {
                        store: &mut self.store,
                        snapshots: self.snapshots.as_ref(),
                        bus: &self.bus,
                    };
                    self.scheduler.on_court_check(&mut ctx, id);
                }
                TimerKind::Generate => {
                    let message = self.generator.next_message();
                    self.insert(message, timer.deadline);
                    let next = timer.deadline + self.generator.interval();
                    self.scheduler.schedule(next, TimerKind::Generate);
                }
                TimerKind::WelcomeExpiry(id) => {
                    if self.welcome == Some(id) {
                        self.welcome = None;
                    }
                    if self.store.remove(id).is_some() {
                        debug!(message_id = id, "welcome message expired");
                        self.bus.publish(EventPayload::MessageRemoved { id });
                    }
                }
            }
        }
        fired
    }

    /// Earliest outstanding deadline, relative to the clock's epoch.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.scheduler.next_deadline()
    }

    /// Current board, newest first.
    pub fn messages(&self) -> Vec<Message> {
        self.store.snapshot()
    }

    pub fn message(&self, id: MessageId) -> Option<Message> {
        self.store.get(id).cloned()
    }

    /// Number of timers outstanding, of any kind.
    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending()
    }

    fn insert(&mut self, message: Message, at: Duration) -> MessageId {
        let source = message.source;
        let text = message.text.clone();
        let id = self.store.append(message);
        debug!(message_id = id, %source, %text, "message added");
        self.bus.publish(EventPayload::MessageAdded { id, source, text });

        if self.state == EngineState::Running {
            let mut ctx = EscalationContext {
                store: &mut self.store,
                snapshots: self.snapshots.as_ref(),
                bus: &self.bus,
            };
            self.scheduler.arm_escalation(&mut ctx, id, at);
        }
        id
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
