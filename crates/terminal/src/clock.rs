//! Injected time and cancellable timers.
//!
//! The original terminal faked latency with wall-clock timeouts. Here the
//! delays are explicit entries in a [`TimerQueue`] keyed off an injected
//! [`Clock`], so the session can drain due timers cooperatively and tests can
//! drive the 500 ms / 2 s / 3 s windows deterministically.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeDelta, Utc};

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time, used by the CLI binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Hand-advanced clock for deterministic tests.
///
/// Clones share the same underlying instant, so a test can keep a handle
/// while the session owns its own copy.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn starting_at(now: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    pub fn advance(&self, delta: TimeDelta) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += delta;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// What a pending timer will do when it fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerKind {
    /// Simulated barcode scan: resolve the code against the catalog.
    BarcodeLookup { code: String },
    /// Simulated payment settlement (always succeeds).
    PaymentSettlement,
    /// Auto-clear of the order-complete banner.
    BannerExpiry,
}

/// Handle for cancelling a scheduled timer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct PendingTimer {
    id: TimerId,
    due: DateTime<Utc>,
    kind: TimerKind,
}

/// Ordered queue of pending timers.
#[derive(Debug, Clone, Default)]
pub struct TimerQueue {
    next_id: u64,
    pending: Vec<PendingTimer>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Schedule a timer to fire at `due`.
    pub fn schedule(&mut self, due: DateTime<Utc>, kind: TimerKind) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.push(PendingTimer { id, due, kind });
        id
    }

    /// Cancel a pending timer. Returns whether it was still pending.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|t| t.id != id);
        before != self.pending.len()
    }

    /// The earliest due instant among pending timers.
    pub fn next_due(&self) -> Option<DateTime<Utc>> {
        self.pending.iter().map(|t| t.due).min()
    }

    /// Drain every timer due at or before `now`, earliest first.
    pub fn fire_due(&mut self, now: DateTime<Utc>) -> Vec<TimerKind> {
        let mut due: Vec<PendingTimer> = Vec::new();
        self.pending.retain(|t| {
            if t.due <= now {
                due.push(t.clone());
                false
            } else {
                true
            }
        });
        due.sort_by_key(|t| (t.due, t.id.0));
        due.into_iter().map(|t| t.kind).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t0() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn fires_only_timers_that_are_due() {
        let mut queue = TimerQueue::new();
        queue.schedule(t0() + TimeDelta::milliseconds(500), TimerKind::PaymentSettlement);
        queue.schedule(t0() + TimeDelta::milliseconds(2000), TimerKind::BannerExpiry);

        assert!(queue.fire_due(t0()).is_empty());
        let fired = queue.fire_due(t0() + TimeDelta::milliseconds(500));
        assert_eq!(fired, vec![TimerKind::PaymentSettlement]);
        assert!(!queue.is_empty());
    }

    #[test]
    fn fires_in_due_order() {
        let mut queue = TimerQueue::new();
        queue.schedule(t0() + TimeDelta::milliseconds(300), TimerKind::BannerExpiry);
        queue.schedule(
            t0() + TimeDelta::milliseconds(100),
            TimerKind::BarcodeLookup {
                code: "1001".to_string(),
            },
        );

        let fired = queue.fire_due(t0() + TimeDelta::seconds(1));
        assert_eq!(
            fired,
            vec![
                TimerKind::BarcodeLookup {
                    code: "1001".to_string()
                },
                TimerKind::BannerExpiry,
            ]
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let mut queue = TimerQueue::new();
        let id = queue.schedule(t0(), TimerKind::PaymentSettlement);
        assert!(queue.cancel(id));
        assert!(!queue.cancel(id));
        assert!(queue.fire_due(t0() + TimeDelta::seconds(10)).is_empty());
    }

    #[test]
    fn manual_clock_advances_shared_instant() {
        let clock = ManualClock::starting_at(t0());
        let handle = clock.clone();
        handle.advance(TimeDelta::milliseconds(750));
        assert_eq!(clock.now(), t0() + TimeDelta::milliseconds(750));
    }
}
