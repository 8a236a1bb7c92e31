//! Periodic status logging.

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::info;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error_handling::{InfoType, ProcessingStats};
use crate::names::Name;
use crate::queue::BoundedQueue;

/// Logs queue depth and throughput since `start_time`.
pub fn log_queue_status(
    start_time: Instant,
    queue: &BoundedQueue<Name>,
    stats: &ProcessingStats,
) {
    let elapsed_secs = start_time.elapsed().as_secs_f64();
    let served = stats.get_info_count(InfoType::JokeServed);
    let rate = if elapsed_secs > 0.0 {
        served as f64 / elapsed_secs
    } else {
        0.0
    };
    info!(
        "Queue {}/{} names, {} jokes served in {:.0}s (~{:.2}/sec), {} name errors",
        queue.len(),
        queue.capacity(),
        served,
        elapsed_secs,
        rate,
        stats.total_name_errors()
    );
}

/// Spawns a task that calls [`log_queue_status`] every `interval` until `cancel` fires.
pub fn spawn_status_logger(
    queue: Arc<BoundedQueue<Name>>,
    stats: Arc<ProcessingStats>,
    interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    let start_time = Instant::now();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(interval);
        // First tick completes immediately; skip it so the first line has data
        interval.tick().await;
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    log_queue_status(start_time, &queue, &stats);
                }
                _ = cancel.cancelled() => {
                    break;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_status_logger_stops_on_cancel() {
        let queue = Arc::new(BoundedQueue::new(4));
        let stats = Arc::new(ProcessingStats::new());
        let cancel = CancellationToken::new();

        let handle = spawn_status_logger(queue, stats, Duration::from_secs(30), cancel.clone());
        tokio::time::sleep(Duration::from_secs(95)).await;
        cancel.cancel();

        assert!(handle.await.is_ok());
    }
}
