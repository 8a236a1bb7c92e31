//! Sliding-window request budget.
//!
//! Answers "may the names API be called now, and if not, when?" for a budget
//! of `N` calls per rolling window of width `MinDiff`.
//!
//! The window is a fixed ring of the `N` most recent call instants plus a
//! cursor pointing at the oldest one. A call is allowed when the oldest of the
//! last `N` calls is at least `MinDiff` in the past, which is exactly "no more
//! than `N` calls in any `MinDiff`-wide interval". Slots that were never
//! written count as infinitely old, so a cold start may burst up to `N` calls.
//!
//! The tracker is owned by the producer task alone and takes no locks.

use std::time::Duration;

use tokio::time::Instant;

/// Outcome of [`RateBudgetTracker::allow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetDecision {
    /// A call may be made now.
    Allowed,
    /// The budget is spent; retry no earlier than this instant.
    WaitUntil(Instant),
}

impl BudgetDecision {
    /// True when a call may be made now.
    pub fn is_allowed(&self) -> bool {
        matches!(self, BudgetDecision::Allowed)
    }
}

/// Ring of recent call instants with a cursor at the oldest slot.
#[derive(Debug, Clone)]
pub struct RateBudgetTracker {
    slots: Vec<Option<Instant>>,
    pos: usize,
    min_diff: Duration,
}

impl RateBudgetTracker {
    /// Creates a tracker allowing `budget_count` calls per `min_diff`.
    ///
    /// A budget of zero is clamped to one; `PipelineConfig::validate` rejects
    /// it before it gets here.
    pub fn new(budget_count: usize, min_diff: Duration) -> Self {
        let budget_count = budget_count.max(1);
        RateBudgetTracker {
            slots: vec![None; budget_count],
            pos: 0,
            min_diff,
        }
    }

    /// Decides whether a call may be made at `now`.
    pub fn allow(&self, now: Instant) -> BudgetDecision {
        match self.oldest() {
            None => BudgetDecision::Allowed,
            Some(oldest) => {
                let ready_at = oldest + self.min_diff;
                if now >= ready_at {
                    BudgetDecision::Allowed
                } else {
                    BudgetDecision::WaitUntil(ready_at)
                }
            }
        }
    }

    /// Records a call made at `now`, overwriting the oldest slot.
    ///
    /// Failed calls are recorded too: the upstream counts them regardless of
    /// what it answered.
    pub fn record(&mut self, now: Instant) {
        self.slots[self.pos] = Some(now);
        self.advance();
    }

    /// The oldest of the last `N` recorded instants, or `None` while fewer than
    /// `N` calls have been recorded.
    pub fn oldest(&self) -> Option<Instant> {
        self.slots[self.pos]
    }

    /// Number of calls the window admits (`N`).
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Current cursor position, always in `0..capacity()`.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of calls recorded within `min_diff` before `now`.
    pub fn recorded_within_window(&self, now: Instant) -> usize {
        self.slots
            .iter()
            .flatten()
            .filter(|t| now.saturating_duration_since(**t) < self.min_diff)
            .count()
    }

    /// The rolling window length.
    pub fn min_diff(&self) -> Duration {
        self.min_diff
    }

    fn advance(&mut self) {
        if self.pos >= self.slots.len() - 1 {
            self.pos = 0;
        } else {
            self.pos += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_never_leaves_range() {
        let mut tracker = RateBudgetTracker::new(7, Duration::from_secs(61));
        let now = Instant::now();
        for i in 0..(7 * 3 + 2) {
            assert!(tracker.position() < tracker.capacity());
            assert_eq!(tracker.position(), i % 7);
            tracker.record(now);
        }
    }

    #[test]
    fn test_single_slot_budget_wraps() {
        let mut tracker = RateBudgetTracker::new(1, Duration::from_secs(1));
        let now = Instant::now();
        for _ in 0..5 {
            tracker.record(now);
            assert_eq!(tracker.position(), 0);
        }
    }

    #[test]
    fn test_zero_budget_is_clamped() {
        let tracker = RateBudgetTracker::new(0, Duration::from_secs(1));
        assert_eq!(tracker.capacity(), 1);
    }

    #[test]
    fn test_cold_start_allows_full_burst() {
        let mut tracker = RateBudgetTracker::new(6, Duration::from_secs(61));
        let t0 = Instant::now();
        for _ in 0..6 {
            assert_eq!(tracker.allow(t0), BudgetDecision::Allowed);
            tracker.record(t0);
        }
    }

    #[test]
    fn test_seventh_call_waits_for_oldest_plus_window() {
        let mut tracker = RateBudgetTracker::new(6, Duration::from_secs(61));
        let t0 = Instant::now();
        for _ in 0..6 {
            assert!(tracker.allow(t0).is_allowed());
            tracker.record(t0);
        }

        let t5 = t0 + Duration::from_secs(5);
        assert_eq!(
            tracker.allow(t5),
            BudgetDecision::WaitUntil(t0 + Duration::from_secs(61))
        );
        assert!(!tracker.allow(t0 + Duration::from_secs(60)).is_allowed());
        assert!(tracker.allow(t0 + Duration::from_secs(61)).is_allowed());
    }

    #[test]
    fn test_window_slides_with_spread_calls() {
        let mut tracker = RateBudgetTracker::new(2, Duration::from_secs(10));
        let t0 = Instant::now();
        tracker.record(t0);
        tracker.record(t0 + Duration::from_secs(4));

        // Oldest is t0, so the next call opens at t0+10
        assert_eq!(
            tracker.allow(t0 + Duration::from_secs(5)),
            BudgetDecision::WaitUntil(t0 + Duration::from_secs(10))
        );
        tracker.record(t0 + Duration::from_secs(10));

        // Oldest is now t0+4, so the next call opens at t0+14
        assert_eq!(
            tracker.allow(t0 + Duration::from_secs(11)),
            BudgetDecision::WaitUntil(t0 + Duration::from_secs(14))
        );
    }

    #[test]
    fn test_never_more_than_budget_in_any_window() {
        let budget = 5;
        let window = Duration::from_millis(1000);
        let mut tracker = RateBudgetTracker::new(budget, window);
        let t0 = Instant::now();
        let mut calls = Vec::new();

        // Poll every 37ms for 20 seconds, calling whenever allowed
        let mut offset = Duration::ZERO;
        while offset < Duration::from_secs(20) {
            let now = t0 + offset;
            if tracker.allow(now).is_allowed() {
                tracker.record(now);
                calls.push(now);
            }
            offset += Duration::from_millis(37);
        }

        assert!(calls.len() > budget);
        for (i, start) in calls.iter().enumerate() {
            let in_window = calls[i..]
                .iter()
                .take_while(|t| t.duration_since(*start) < window)
                .count();
            assert!(
                in_window <= budget,
                "{} calls within one window starting at call {}",
                in_window,
                i
            );
        }
    }

    #[test]
    fn test_recorded_within_window() {
        let mut tracker = RateBudgetTracker::new(4, Duration::from_secs(10));
        let t0 = Instant::now();
        assert_eq!(tracker.recorded_within_window(t0), 0);
        tracker.record(t0);
        tracker.record(t0 + Duration::from_secs(6));
        assert_eq!(tracker.recorded_within_window(t0 + Duration::from_secs(7)), 2);
        assert_eq!(tracker.recorded_within_window(t0 + Duration::from_secs(12)), 1);
    }
}
