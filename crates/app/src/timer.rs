//! Timer manager — delayed delivery of a payload, with cancel and in-place reset.
//!
//! The manager never runs code on its own: the owner asks for the
//! [`next_deadline`](TimerManager::next_deadline), sleeps until then on its
//! own execution context, and collects due payloads with
//! [`pop_expired`](TimerManager::pop_expired). The payload plays the role of
//! the callback, so firing is always serialized with everything else the
//! owner does.
//!
//! Time comes from [`tokio::time::Instant`], which tests can pause and advance.

use std::collections::HashMap;
use std::time::Duration;

use gdoormon_domain::id::TimerId;
use tokio::time::Instant;

/// Longest delay a timer accepts. Longer delays are clamped to it.
pub const MAX_DELAY: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Exclusive handle to one scheduled timer.
///
/// Deliberately not `Clone`: only the owner that scheduled the timer may
/// cancel or reset it.
#[derive(Debug, PartialEq, Eq)]
pub struct TimerHandle {
    id: TimerId,
}

impl TimerHandle {
    /// Identity of the timer; stable across resets.
    #[must_use]
    pub fn id(&self) -> TimerId {
        self.id
    }
}

#[derive(Debug)]
struct Scheduled<T> {
    deadline: Instant,
    seq: u64,
    payload: T,
}

/// Queue of pending timers keyed by [`TimerId`].
#[derive(Debug)]
pub struct TimerManager<T> {
    pending: HashMap<TimerId, Scheduled<T>>,
    next_seq: u64,
}

impl<T> Default for TimerManager<T> {
    fn default() -> Self {
        Self {
            pending: HashMap::new(),
            next_seq: 0,
        }
    }
}

impl<T> TimerManager<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a timer that delivers `payload` once `delay` has elapsed.
    pub fn schedule(&mut self, delay: Duration, payload: T) -> TimerHandle {
        let id = TimerId::new();
        let seq = self.bump_seq();
        self.pending.insert(
            id,
            Scheduled {
                deadline: deadline_after(delay),
                seq,
                payload,
            },
        );
        tracing::debug!(timer = %id, delay_secs = delay.as_secs_f64(), "timer scheduled");
        TimerHandle { id }
    }

    /// Disarm a timer. Returns `false` when it had already fired or been
    /// cancelled, in which case nothing happens.
    pub fn cancel(&mut self, handle: &TimerHandle) -> bool {
        let removed = self.pending.remove(&handle.id).is_some();
        if removed {
            tracing::debug!(timer = %handle.id, "timer cancelled");
        }
        removed
    }

    /// Re-arm a pending timer so it fires `delay` from now, keeping its
    /// identity and payload. Returns `false` (and does nothing) when the
    /// timer is no longer pending.
    pub fn reset(&mut self, handle: &TimerHandle, delay: Duration) -> bool {
        let seq = self.bump_seq();
        let Some(entry) = self.pending.get_mut(&handle.id) else {
            return false;
        };
        entry.deadline = deadline_after(delay);
        entry.seq = seq;
        tracing::debug!(timer = %handle.id, delay_secs = delay.as_secs_f64(), "timer reset");
        true
    }

    /// Whether the timer behind `handle` is still waiting to fire.
    #[must_use]
    pub fn is_pending(&self, handle: &TimerHandle) -> bool {
        self.pending.contains_key(&handle.id)
    }

    /// Deadline of the pending timer that fires first.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().map(|entry| entry.deadline).min()
    }

    /// Remaining delay of a pending timer.
    #[must_use]
    pub fn remaining(&self, handle: &TimerHandle) -> Option<Duration> {
        self.pending
            .get(&handle.id)
            .map(|entry| entry.deadline.saturating_duration_since(Instant::now()))
    }

    /// Remove and return the earliest timer whose deadline is at or before
    /// `now`. Call repeatedly until `None` to drain everything that is due.
    pub fn pop_expired(&mut self, now: Instant) -> Option<(TimerId, T)> {
        let id = self
            .pending
            .iter()
            .filter(|(_, entry)| entry.deadline <= now)
            .min_by_key(|(_, entry)| (entry.deadline, entry.seq))
            .map(|(id, _)| *id)?;
        let entry = self.pending.remove(&id)?;
        tracing::debug!(timer = %id, "timer fired");
        Some((id, entry.payload))
    }

    /// Number of armed timers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether no timer is armed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }
}

fn deadline_after(delay: Duration) -> Instant {
    let now = Instant::now();
    match now.checked_add(delay) {
        Some(deadline) if delay <= MAX_DELAY => deadline,
        _ => {
            tracing::warn!(delay_secs = delay.as_secs_f64(), "timer delay clamped");
            now + MAX_DELAY
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    #[tokio::test(start_paused = true)]
    async fn should_fire_once_after_delay() {
        let mut timers = TimerManager::new();
        let handle = timers.schedule(Duration::from_secs(10), "timeout");

        advance(Duration::from_secs(9)).await;
        assert!(timers.pop_expired(Instant::now()).is_none());

        advance(Duration::from_secs(1)).await;
        let (id, payload) = timers.pop_expired(Instant::now()).unwrap();
        assert_eq!(id, handle.id());
        assert_eq!(payload, "timeout");
        assert!(timers.pop_expired(Instant::now()).is_none());
        assert!(!timers.is_pending(&handle));
    }

    #[tokio::test(start_paused = true)]
    async fn should_not_fire_after_cancel() {
        let mut timers = TimerManager::new();
        let handle = timers.schedule(Duration::from_secs(5), ());
        assert!(timers.cancel(&handle));

        advance(Duration::from_secs(60)).await;
        assert!(timers.pop_expired(Instant::now()).is_none());
        assert!(timers.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn should_treat_repeated_cancel_as_noop() {
        let mut timers = TimerManager::new();
        let handle = timers.schedule(Duration::from_secs(5), ());
        assert!(timers.cancel(&handle));
        assert!(!timers.cancel(&handle));
    }

    #[tokio::test(start_paused = true)]
    async fn should_treat_cancel_after_fire_as_noop() {
        let mut timers = TimerManager::new();
        let handle = timers.schedule(Duration::from_secs(5), ());
        advance(Duration::from_secs(5)).await;
        assert!(timers.pop_expired(Instant::now()).is_some());
        assert!(!timers.cancel(&handle));
    }

    #[tokio::test(start_paused = true)]
    async fn should_measure_reset_delay_from_reset_time() {
        let mut timers = TimerManager::new();
        let handle = timers.schedule(Duration::from_secs(300), ());

        advance(Duration::from_secs(150)).await;
        assert!(timers.reset(&handle, Duration::from_secs(100)));

        advance(Duration::from_secs(99)).await;
        assert!(timers.pop_expired(Instant::now()).is_none());

        advance(Duration::from_secs(1)).await;
        let (id, ()) = timers.pop_expired(Instant::now()).unwrap();
        assert_eq!(id, handle.id());
    }

    #[tokio::test(start_paused = true)]
    async fn should_not_rearm_fired_timer_on_reset() {
        let mut timers = TimerManager::new();
        let handle = timers.schedule(Duration::from_secs(1), ());
        advance(Duration::from_secs(1)).await;
        timers.pop_expired(Instant::now());

        assert!(!timers.reset(&handle, Duration::from_secs(10)));
        assert!(timers.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn should_report_earliest_deadline() {
        let mut timers = TimerManager::new();
        assert!(timers.next_deadline().is_none());

        let start = Instant::now();
        let _late = timers.schedule(Duration::from_secs(20), 2);
        let _early = timers.schedule(Duration::from_secs(10), 1);
        assert_eq!(timers.next_deadline(), Some(start + Duration::from_secs(10)));

        advance(Duration::from_secs(30)).await;
        let now = Instant::now();
        assert_eq!(timers.pop_expired(now).map(|(_, p)| p), Some(1));
        assert_eq!(timers.pop_expired(now).map(|(_, p)| p), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn should_report_remaining_delay() {
        let mut timers = TimerManager::new();
        let handle = timers.schedule(Duration::from_secs(10), ());
        advance(Duration::from_secs(4)).await;
        assert_eq!(timers.remaining(&handle), Some(Duration::from_secs(6)));
    }

    #[tokio::test(start_paused = true)]
    async fn should_clamp_oversized_delays() {
        let mut timers = TimerManager::new();
        let handle = timers.schedule(Duration::MAX, ());
        assert_eq!(timers.remaining(&handle), Some(MAX_DELAY));

        advance(Duration::from_secs(60)).await;
        assert!(timers.reset(&handle, Duration::from_secs(u64::MAX / 2)));
        assert_eq!(timers.remaining(&handle), Some(MAX_DELAY));

        advance(MAX_DELAY).await;
        assert!(timers.pop_expired(Instant::now()).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn should_keep_timer_id_across_resets() {
        let mut timers = TimerManager::new();
        let first = timers.schedule(Duration::from_secs(10), "first");
        let second = timers.schedule(Duration::from_secs(10), "second");
        assert_ne!(first.id(), second.id());

        let id = first.id();
        timers.reset(&first, Duration::from_secs(5));
        timers.reset(&first, Duration::from_secs(1));
        assert_eq!(first.id(), id);

        advance(Duration::from_secs(1)).await;
        assert_eq!(timers.pop_expired(Instant::now()), Some((id, "first")));
        assert!(timers.is_pending(&second));
    }
}
