//! Server state and response bodies.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use crate::consumer::RequestConsumer;
use crate::error_handling::ProcessingStats;

/// Shared state for all routes.
#[derive(Clone)]
pub struct AppState {
    /// Serves `/` requests from the name queue.
    pub consumer: RequestConsumer,
    /// Counters shared with the producer.
    pub stats: Arc<ProcessingStats>,
    /// When the server started, for uptime.
    pub start_time: Arc<Instant>,
}

impl AppState {
    /// Creates state with the uptime clock starting now.
    pub fn new(consumer: RequestConsumer, stats: Arc<ProcessingStats>) -> Self {
        AppState {
            consumer,
            stats,
            start_time: Arc::new(Instant::now()),
        }
    }
}

/// JSON response for `/status`
#[derive(Serialize)]
pub struct StatusResponse {
    /// Seconds since the server started
    pub uptime_seconds: f64,
    /// Name buffer occupancy
    pub queue: QueueStatus,
    /// Producer side counters
    pub names: NameCounts,
    /// Request side counters
    pub requests: RequestCounts,
}

/// Name buffer occupancy.
#[derive(Serialize)]
pub struct QueueStatus {
    /// Names currently buffered (advisory)
    pub len: usize,
    /// Maximum names buffered
    pub capacity: usize,
}

/// Names API activity.
#[derive(Serialize)]
pub struct NameCounts {
    /// Successful upstream calls
    pub batches_fetched: usize,
    /// Names pushed onto the queue
    pub queued: usize,
    /// Times the producer waited for budget
    pub budget_waits: usize,
    /// Times the producer paused on a full queue
    pub backpressure_pauses: usize,
    /// Cooldowns taken after throttling
    pub cooldowns: usize,
    /// 429 responses
    pub rate_limited: usize,
    /// Bodies that did not decode as names
    pub malformed_responses: usize,
    /// Unexpected statuses and transport failures
    pub other_errors: usize,
}

/// `/` request outcomes.
#[derive(Serialize)]
pub struct RequestCounts {
    /// Requests answered with a joke
    pub jokes_served: usize,
    /// Requests that found no name before the pop timeout
    pub starved: usize,
    /// Requests whose jokes API call failed
    pub joke_errors: usize,
}
