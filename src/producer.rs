//! Budgeted prefetch of names.
//!
//! The producer is the only caller of the names API. Each pass of its loop:
//!
//! 1. waits until the request budget admits a call, re-checking after every
//!    sleep since the deadline is a lower bound and the scheduler may be late;
//! 2. skips the call and pauses if the queue is full, so no fetched batch is
//!    ever thrown away;
//! 3. calls the names API and records the attempt against the budget whatever
//!    the outcome;
//! 4. pushes every fetched name, waiting if the queue fills mid-batch.
//!
//! Throttling (429, or a malformed body which is how the names API throttles)
//! adds a cooldown on top of the budget wait. No upstream failure stops the
//! loop; only the shutdown token does.

use std::sync::Arc;

use tokio::time::{sleep, sleep_until, Instant};
use tokio_util::sync::CancellationToken;

use crate::budget::{BudgetDecision, RateBudgetTracker};
use crate::config::PipelineConfig;
use crate::error_handling::{update_name_error_stats, InfoType, ProcessingStats};
use crate::names::{Name, NameSource};
use crate::queue::BoundedQueue;

/// What one pass of the producer loop did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// A batch was fetched and this many names were queued.
    Fetched(usize),
    /// The queue was full; no call was made.
    Backpressure,
    /// The upstream signalled throttling; the cooldown has been served.
    Throttled,
    /// The call failed for another reason.
    Failed,
}

/// Fetches names under a request budget and feeds them to the queue.
pub struct PrefetchProducer<S> {
    source: S,
    tracker: RateBudgetTracker,
    queue: Arc<BoundedQueue<Name>>,
    config: PipelineConfig,
    stats: Arc<ProcessingStats>,
}

impl<S: NameSource> PrefetchProducer<S> {
    /// Creates a producer with an empty budget ring sized from `config`.
    pub fn new(
        source: S,
        queue: Arc<BoundedQueue<Name>>,
        config: PipelineConfig,
        stats: Arc<ProcessingStats>,
    ) -> Self {
        let tracker = RateBudgetTracker::new(config.budget_count, config.window_duration);
        PrefetchProducer {
            source,
            tracker,
            queue,
            config,
            stats,
        }
    }

    /// Runs the producer loop until `shutdown` is cancelled.
    pub async fn run(mut self, shutdown: CancellationToken) {
        log::info!(
            "Prefetching names: budget {} calls per {:?}, queue capacity {}",
            self.tracker.capacity(),
            self.tracker.min_diff(),
            self.queue.capacity()
        );
        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    log::debug!("Name producer shutting down");
                    break;
                }
                outcome = self.step() => {
                    log::trace!("Producer step finished: {:?}", outcome);
                }
            }
        }
    }

    /// Runs one pass of the loop: budget wait, backpressure check, fetch, push.
    pub async fn step(&mut self) -> StepOutcome {
        self.wait_for_budget().await;

        if self.queue.is_full() {
            log::debug!(
                "Name queue is full ({} names), pausing {:?}",
                self.queue.len(),
                self.config.backpressure_interval
            );
            self.stats.increment_info(InfoType::BackpressurePause);
            sleep(self.config.backpressure_interval).await;
            return StepOutcome::Backpressure;
        }

        let attempted_at = Instant::now();
        let result = self.source.fetch_batch().await;
        self.tracker.record(attempted_at);

        match result {
            Ok(names) => {
                let count = names.len();
                self.stats.increment_info(InfoType::NamesBatchFetched);
                log::debug!("Fetched {} names", count);
                self.push_all(names).await;
                StepOutcome::Fetched(count)
            }
            Err(e) if e.is_throttling() => {
                update_name_error_stats(&self.stats, &e);
                log::warn!(
                    "Names API is throttling ({}), cooling down for {:?}",
                    e,
                    self.config.cooldown_duration
                );
                self.stats.increment_info(InfoType::Cooldown);
                sleep(self.config.cooldown_duration).await;
                StepOutcome::Throttled
            }
            Err(e) => {
                update_name_error_stats(&self.stats, &e);
                log::error!("Unable to get names from names client: {}", e);
                StepOutcome::Failed
            }
        }
    }

    /// Sleeps until the budget admits a call.
    async fn wait_for_budget(&self) {
        let mut waited = false;
        while let BudgetDecision::WaitUntil(deadline) = self.tracker.allow(Instant::now()) {
            if !waited {
                let now = Instant::now();
                log::debug!(
                    "Request budget spent ({} calls in the last {:?}), waiting {:?}",
                    self.tracker.recorded_within_window(now),
                    self.tracker.min_diff(),
                    deadline.saturating_duration_since(now)
                );
                self.stats.increment_info(InfoType::BudgetWait);
                waited = true;
            }
            sleep_until(deadline).await;
        }
    }

    async fn push_all(&self, names: Vec<Name>) {
        for name in names {
            self.queue.push(name).await;
            self.stats.increment_info(InfoType::NamesQueued);
        }
    }

    /// Budget state, for inspection.
    pub fn tracker(&self) -> &RateBudgetTracker {
        &self.tracker
    }
}
