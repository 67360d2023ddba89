//! Escalation scheduler.
//!
//! Owns every timer in the engine: per-message escalation checks, the
//! generator tick and the welcome expiry. Timers live in a deadline-ordered
//! queue; escalation timers are additionally indexed by message id so they can
//! be cancelled the moment a message is resolved.
//!
//! Per-message state machine (Boss and Agile only):
//!
//! ```text
//! NORMAL --urgent_delay--> check 1 --fixed-----------> NORMAL (terminal)
//!                                  --duplicate urgent-> NORMAL (terminal)
//!                                  --not fixed-------> URGENT --court_delay--> check 2
//!                                                              check 2 --fixed-----> URGENT (terminal)
//!                                                                      --not fixed-> COURT (terminal)
//! ```
//!
//! Timer callbacks never hold a copy of the message: each check looks up the
//! live record by id.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use tracing::{debug, info};

use super::event_bus::{EventBus, EventPayload};
use super::fix_evaluator::is_fixed;
use super::message_store::MessageStore;
use crate::domain::models::{
    EscalationConfig, MessageId, MessagePatch, RejectReason, ResolveOutcome, TimerHandle,
};
use crate::domain::ports::SnapshotSource;

/// What a timer does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// First deadline: become urgent unless fixed.
    UrgentCheck(MessageId),
    /// Second deadline: go to court unless fixed.
    CourtCheck(MessageId),
    /// Generator interval tick.
    Generate,
    /// Remove the welcome message.
    WelcomeExpiry(MessageId),
}

/// A timer taken off the queue because its deadline passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FiredTimer {
    pub handle: TimerHandle,
    pub deadline: Duration,
    pub kind: TimerKind,
}

#[derive(Debug, Clone, Copy)]
struct ArmedEscalation {
    handle: TimerHandle,
    deadline: Duration,
}

/// Everything an escalation transition reads or writes besides the timer table.
pub struct EscalationContext<'a> {
    pub store: &'a mut MessageStore,
    pub snapshots: &'a dyn SnapshotSource,
    pub bus: &'a EventBus,
}

/// Timer table and escalation state machine.
#[derive(Debug)]
pub struct EscalationScheduler {
    config: EscalationConfig,
    /// Ties on deadline fire in arming order (handles only grow).
    queue: BTreeMap<(Duration, TimerHandle), TimerKind>,
    armed: HashMap<MessageId, ArmedEscalation>,
    next_handle: u64,
}

impl EscalationScheduler {
    pub fn new(config: EscalationConfig) -> Self {
        Self {
            config,
            queue: BTreeMap::new(),
            armed: HashMap::new(),
            next_handle: 1,
        }
    }

    /// Put a one-shot timer on the queue.
    pub fn schedule(&mut self, deadline: Duration, kind: TimerKind) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        self.queue.insert((deadline, handle), kind);
        debug!(%handle, deadline_ms = deadline.as_millis() as u64, ?kind, "timer armed");
        handle
    }

    /// Remove a timer before it fires. Returns true if it was still pending.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let key = self.queue.keys().find(|(_, h)| *h == handle).copied();
        match key {
            Some(key) => {
                self.queue.remove(&key);
                self.armed.retain(|_, armed| armed.handle != handle);
                debug!(%handle, "timer cancelled");
                true
            }
            None => false,
        }
    }

    /// Earliest outstanding deadline.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.queue.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Take the earliest timer off the queue if its deadline is at or before `now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<FiredTimer> {
        let (&(next, _), _) = self.queue.first_key_value()?;
        if next > now {
            return None;
        }
        let ((deadline, handle), kind) = self.queue.pop_first()?;
        if let TimerKind::UrgentCheck(id) | TimerKind::CourtCheck(id) = kind {
            if self.armed.get(&id).is_some_and(|armed| armed.handle == handle) {
                self.armed.remove(&id);
            }
        }
        Some(FiredTimer {
            handle,
            deadline,
            kind,
        })
    }

    /// Arm the first escalation deadline for a freshly created message.
    ///
    /// Only sources that escalate get a timer; returns the handle if one was armed.
    pub fn arm_escalation(
        &mut self,
        ctx: &mut EscalationContext<'_>,
        id: MessageId,
        created_at: Duration,
    ) -> Option<TimerHandle> {
        let message = ctx.store.get(id)?;
        if !message.source.escalates() || message.resolved || message.escalated {
            return None;
        }
        if let Some(previous) = self.armed.get(&id).map(|armed| armed.handle) {
            self.cancel(previous);
        }

        let deadline = created_at + self.config.urgent_delay();
        let handle = self.schedule(deadline, TimerKind::UrgentCheck(id));
        self.armed.insert(id, ArmedEscalation { handle, deadline });
        ctx.store.update(id, &MessagePatch::new().arm(handle));
        Some(handle)
    }

    /// Cancel the pending escalation timer of one message, if any.
    pub fn cancel_escalation(&mut self, store: &mut MessageStore, id: MessageId) -> bool {
        let Some(armed) = self.armed.remove(&id) else {
            return false;
        };
        self.queue.remove(&(armed.deadline, armed.handle));
        store.update(id, &MessagePatch::new().disarm());
        debug!(message_id = id, handle = %armed.handle, "escalation cancelled");
        true
    }

    /// Cancel every escalation timer, leaving other timers in place.
    pub fn cancel_all_escalations(&mut self, store: &mut MessageStore) -> usize {
        let ids: Vec<MessageId> = self.armed.keys().copied().collect();
        for id in &ids {
            self.cancel_escalation(store, *id);
        }
        ids.len()
    }

    /// Drop every timer of any kind.
    pub fn clear(&mut self, store: &mut MessageStore) {
        self.cancel_all_escalations(store);
        self.queue.clear();
    }

    /// Number of timers on the queue.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Number of messages with an escalation timer outstanding.
    pub fn armed_escalations(&self) -> usize {
        self.armed.len()
    }

    /// First deadline: promote to urgent unless the workspace is fixed or an
    /// identical message is already urgent.
    pub fn on_urgent_check(
        &mut self,
        ctx: &mut EscalationContext<'_>,
        id: MessageId,
        fired_at: Duration,
    ) {
        let Some(message) = ctx.store.get(id) else {
            debug!(message_id = id, "urgent check for missing message ignored");
            return;
        };
        if message.resolved || message.urgent {
            return;
        }
        let text = message.text.clone();
        ctx.store.update(id, &MessagePatch::new().disarm());

        let snapshot = ctx.snapshots.snapshot();
        if is_fixed(&text, &snapshot) {
            info!(message_id = id, %text, "fixed before first deadline");
            return;
        }

        // Checked against the live board at the instant of promotion
        if ctx.store.has_unresolved_urgent(&text, id) {
            info!(message_id = id, %text, "urgent duplicate suppressed");
            return;
        }

        let deadline = fired_at + self.config.court_delay();
        let handle = self.schedule(deadline, TimerKind::CourtCheck(id));
        self.armed.insert(id, ArmedEscalation { handle, deadline });
        ctx.store.update(id, &MessagePatch::new().mark_urgent().arm(handle));

        info!(message_id = id, %text, "message became urgent");
        ctx.bus.publish(EventPayload::Urgent { id, text });
    }

    /// Second deadline: send to court unless the workspace is fixed by now.
    pub fn on_court_check(&mut self, ctx: &mut EscalationContext<'_>, id: MessageId) {
        let Some(message) = ctx.store.get(id) else {
            debug!(message_id = id, "court check for missing message ignored");
            return;
        };
        if message.resolved || message.escalated {
            return;
        }
        let text = message.text.clone();
        ctx.store.update(id, &MessagePatch::new().disarm());

        let snapshot = ctx.snapshots.snapshot();
        if is_fixed(&text, &snapshot) {
            info!(message_id = id, %text, "fixed before court deadline");
            return;
        }

        ctx.store.update(id, &MessagePatch::new().mark_escalated());
        info!(message_id = id, %text, "escalated to court");
        ctx.bus.publish(EventPayload::Escalated { id, text });
    }

    /// External attempt to handle a message.
    ///
    /// Accepts only when the workspace satisfies the message's fix condition,
    /// in which case any pending timer is cancelled before the message is marked
    /// resolved.
    pub fn resolve(&mut self, ctx: &mut EscalationContext<'_>, id: MessageId) -> ResolveOutcome {
        let Some(message) = ctx.store.get(id) else {
            return ResolveOutcome::NotFound { id };
        };
        if !message.source.is_resolvable() {
            return ResolveOutcome::Rejected {
                id,
                reason: RejectReason::NotResolvable,
            };
        }
        if message.resolved {
            return ResolveOutcome::AlreadyResolved { id };
        }
        if message.escalated {
            return ResolveOutcome::Rejected {
                id,
                reason: RejectReason::AlreadyEscalated,
            };
        }

        let text = message.text.clone();
        let snapshot = ctx.snapshots.snapshot();
        if !is_fixed(&text, &snapshot) {
            debug!(message_id = id, %text, "resolution rejected, not fixed");
            return ResolveOutcome::Rejected {
                id,
                reason: RejectReason::NotFixed,
            };
        }

        self.cancel_escalation(ctx.store, id);
        ctx.store.update(id, &MessagePatch::new().mark_resolved().disarm());
        info!(message_id = id, %text, "message resolved");
        ctx.bus.publish(EventPayload::Resolved { id, text });
        ResolveOutcome::Accepted { id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Message, MessageSource, MessageStage};
    use std::sync::Mutex;

    struct TestSnapshot(Mutex<String>);

    impl TestSnapshot {
        fn new(text: &str) -> Self {
            Self(Mutex::new(text.to_string()))
        }

        fn set(&self, text: &str) {
            *self.0.lock().unwrap() = text.to_string();
        }
    }

    impl SnapshotSource for TestSnapshot {
        fn snapshot(&self) -> String {
            self.0.lock().unwrap().clone()
        }
    }

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    fn drain(scheduler: &mut EscalationScheduler, ctx: &mut EscalationContext<'_>, now: Duration) {
        while let Some(timer) = scheduler.pop_due(now) {
            match timer.kind {
                TimerKind::UrgentCheck(id) => scheduler.on_urgent_check(ctx, id, timer.deadline),
                TimerKind::CourtCheck(id) => scheduler.on_court_check(ctx, id),
                TimerKind::Generate | TimerKind::WelcomeExpiry(_) => {}
            }
        }
    }

    #[test]
    fn test_queue_orders_by_deadline_then_arming() {
        let mut scheduler = EscalationScheduler::new(EscalationConfig::default());
        let late = scheduler.schedule(ms(500), TimerKind::Generate);
        let first = scheduler.schedule(ms(100), TimerKind::WelcomeExpiry(1));
        let second = scheduler.schedule(ms(100), TimerKind::Generate);

        assert_eq!(scheduler.next_deadline(), Some(ms(100)));
        assert!(scheduler.pop_due(ms(99)).is_none());
        assert_eq!(scheduler.pop_due(ms(1000)).unwrap().handle, first);
        assert_eq!(scheduler.pop_due(ms(1000)).unwrap().handle, second);
        assert_eq!(scheduler.pop_due(ms(1000)).unwrap().handle, late);
        assert!(scheduler.pop_due(ms(1000)).is_none());
    }

    #[test]
    fn test_cancel_prevents_firing() {
        let mut scheduler = EscalationScheduler::new(EscalationConfig::default());
        let handle = scheduler.schedule(ms(10), TimerKind::Generate);
        assert!(scheduler.cancel(handle));
        assert!(!scheduler.cancel(handle));
        assert!(scheduler.pop_due(ms(100)).is_none());
    }

    #[test]
    fn test_family_is_never_armed() {
        let mut scheduler = EscalationScheduler::new(EscalationConfig::default());
        let mut store = MessageStore::new();
        let snapshots = TestSnapshot::new("");
        let bus = EventBus::default();
        let mut ctx = EscalationContext {
            store: &mut store,
            snapshots: &snapshots,
            bus: &bus,
        };

        let id = ctx.store.append(Message::new(MessageSource::Family, "Dinner is ready!"));
        assert!(scheduler.arm_escalation(&mut ctx, id, ms(0)).is_none());
        assert_eq!(scheduler.pending(), 0);
        assert!(ctx.store.get(id).unwrap().pending_escalation.is_none());
    }

    #[test]
    fn test_unfixed_message_goes_urgent_then_court() {
        let mut scheduler = EscalationScheduler::new(EscalationConfig::default());
        let mut store = MessageStore::new();
        let snapshots = TestSnapshot::new("");
        let bus = EventBus::default();
        let mut rx = bus.subscribe();
        let mut ctx = EscalationContext {
            store: &mut store,
            snapshots: &snapshots,
            bus: &bus,
        };

        let id = ctx
            .store
            .append(Message::new(MessageSource::Boss, "fix input validation"));
        let handle = scheduler.arm_escalation(&mut ctx, id, ms(0)).unwrap();
        assert_eq!(ctx.store.get(id).unwrap().pending_escalation, Some(handle));

        drain(&mut scheduler, &mut ctx, ms(7999));
        assert_eq!(ctx.store.get(id).unwrap().stage(), MessageStage::Normal);

        drain(&mut scheduler, &mut ctx, ms(8000));
        let message = ctx.store.get(id).unwrap();
        assert_eq!(message.stage(), MessageStage::Urgent);
        assert!(message.pending_escalation.is_some());
        assert_eq!(
            rx.try_recv().unwrap().payload,
            EventPayload::Urgent {
                id,
                text: "fix input validation".to_string()
            }
        );

        drain(&mut scheduler, &mut ctx, ms(16_000));
        let message = ctx.store.get(id).unwrap();
        assert_eq!(message.stage(), MessageStage::Court);
        assert!(message.pending_escalation.is_none());
        assert_eq!(
            rx.try_recv().unwrap().payload,
            EventPayload::Escalated {
                id,
                text: "fix input validation".to_string()
            }
        );
        assert!(rx.try_recv().is_err());
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_fixed_at_first_check_stays_normal() {
        let mut scheduler = EscalationScheduler::new(EscalationConfig::default());
        let mut store = MessageStore::new();
        let snapshots = TestSnapshot::new("");
        let bus = EventBus::default();
        let mut ctx = EscalationContext {
            store: &mut store,
            snapshots: &snapshots,
            bus: &bus,
        };

        let id = ctx.store.append(Message::new(MessageSource::Agile, "fix alt in img1"));
        scheduler.arm_escalation(&mut ctx, id, ms(0));
        snapshots.set(r#"<img alt="x">"#);

        drain(&mut scheduler, &mut ctx, ms(60_000));
        let message = ctx.store.get(id).unwrap();
        assert_eq!(message.stage(), MessageStage::Normal);
        assert!(message.pending_escalation.is_none());
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_fixed_at_court_check_stays_urgent() {
        let mut scheduler = EscalationScheduler::new(EscalationConfig::default());
        let mut store = MessageStore::new();
        let snapshots = TestSnapshot::new("");
        let bus = EventBus::default();
        let mut ctx = EscalationContext {
            store: &mut store,
            snapshots: &snapshots,
            bus: &bus,
        };

        let id = ctx
            .store
            .append(Message::new(MessageSource::Boss, "fix secure database"));
        scheduler.arm_escalation(&mut ctx, id, ms(0));
        drain(&mut scheduler, &mut ctx, ms(8000));
        snapshots.set("https://db.internal");
        drain(&mut scheduler, &mut ctx, ms(16_000));

        let message = ctx.store.get(id).unwrap();
        assert!(message.urgent);
        assert!(!message.escalated);
        assert!(!message.resolved);
    }

    #[test]
    fn test_duplicate_urgent_is_suppressed() {
        let mut scheduler = EscalationScheduler::new(EscalationConfig::default());
        let mut store = MessageStore::new();
        let snapshots = TestSnapshot::new("");
        let bus = EventBus::default();
        let mut ctx = EscalationContext {
            store: &mut store,
            snapshots: &snapshots,
            bus: &bus,
        };

        let first = ctx.store.append(Message::new(MessageSource::Agile, "fix user login"));
        scheduler.arm_escalation(&mut ctx, first, ms(0));
        let second = ctx.store.append(Message::new(MessageSource::Agile, "fix user login"));
        scheduler.arm_escalation(&mut ctx, second, ms(1000));

        drain(&mut scheduler, &mut ctx, ms(9000));
        assert!(ctx.store.get(first).unwrap().urgent);
        let dup = ctx.store.get(second).unwrap();
        assert!(!dup.urgent);
        assert!(dup.pending_escalation.is_none());
    }

    #[test]
    fn test_resolve_cancels_pending_timer() {
        let mut scheduler = EscalationScheduler::new(EscalationConfig::default());
        let mut store = MessageStore::new();
        let snapshots = TestSnapshot::new("");
        let bus = EventBus::default();
        let mut ctx = EscalationContext {
            store: &mut store,
            snapshots: &snapshots,
            bus: &bus,
        };

        let id = ctx.store.append(Message::new(MessageSource::Agile, "fix user login"));
        scheduler.arm_escalation(&mut ctx, id, ms(0));

        assert_eq!(
            scheduler.resolve(&mut ctx, id),
            ResolveOutcome::Rejected {
                id,
                reason: RejectReason::NotFixed
            }
        );
        assert_eq!(scheduler.armed_escalations(), 1);

        snapshots.set(r#"<form><input type="password"></form>"#);
        assert_eq!(scheduler.resolve(&mut ctx, id), ResolveOutcome::Accepted { id });
        assert_eq!(scheduler.armed_escalations(), 0);
        assert_eq!(scheduler.pending(), 0);

        let message = ctx.store.get(id).unwrap();
        assert!(message.resolved);
        assert!(message.pending_escalation.is_none());
        assert_eq!(
            scheduler.resolve(&mut ctx, id),
            ResolveOutcome::AlreadyResolved { id }
        );
    }

    #[test]
    fn test_resolve_unknown_id() {
        let mut scheduler = EscalationScheduler::new(EscalationConfig::default());
        let mut store = MessageStore::new();
        let snapshots = TestSnapshot::new("");
        let bus = EventBus::default();
        let mut ctx = EscalationContext {
            store: &mut store,
            snapshots: &snapshots,
            bus: &bus,
        };
        assert_eq!(
            scheduler.resolve(&mut ctx, 99),
            ResolveOutcome::NotFound { id: 99 }
        );
    }

    #[test]
    fn test_cancel_all_escalations_keeps_other_timers() {
        let mut scheduler = EscalationScheduler::new(EscalationConfig::default());
        let mut store = MessageStore::new();
        let snapshots = TestSnapshot::new("");
        let bus = EventBus::default();
        let mut ctx = EscalationContext {
            store: &mut store,
            snapshots: &snapshots,
            bus: &bus,
        };

        let id = ctx.store.append(Message::new(MessageSource::Boss, "fix secure database"));
        scheduler.arm_escalation(&mut ctx, id, ms(0));
        scheduler.schedule(ms(30_000), TimerKind::WelcomeExpiry(1));

        assert_eq!(scheduler.cancel_all_escalations(ctx.store), 1);
        assert_eq!(scheduler.pending(), 1);
        assert!(ctx.store.get(id).unwrap().pending_escalation.is_none());

        scheduler.clear(ctx.store);
        assert_eq!(scheduler.pending(), 0);
        assert_eq!(scheduler.next_deadline(), None);
    }
}
