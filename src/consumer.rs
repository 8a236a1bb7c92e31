//! Per-request consumption of prefetched names.

use std::sync::Arc;
use std::time::Duration;

use crate::error_handling::{InfoType, ProcessingStats, ServeError};
use crate::jokes::JokeProvider;
use crate::names::Name;
use crate::queue::BoundedQueue;

/// Turns one queued name into one joke.
///
/// Each call pops exactly one name. The name is spent even when the jokes API
/// then fails; it never goes back on the queue.
#[derive(Clone)]
pub struct RequestConsumer {
    queue: Arc<BoundedQueue<Name>>,
    jokes: Arc<dyn JokeProvider>,
    pop_timeout: Duration,
    stats: Arc<ProcessingStats>,
}

impl RequestConsumer {
    /// Creates a consumer that waits at most `pop_timeout` for a name.
    pub fn new(
        queue: Arc<BoundedQueue<Name>>,
        jokes: Arc<dyn JokeProvider>,
        pop_timeout: Duration,
        stats: Arc<ProcessingStats>,
    ) -> Self {
        RequestConsumer {
            queue,
            jokes,
            pop_timeout,
            stats,
        }
    }

    /// Pops a name (waiting up to the pop timeout) and fetches a joke for it.
    pub async fn serve(&self) -> Result<String, ServeError> {
        let result = self.serve_inner().await;
        match &result {
            Ok(_) => self.stats.increment_info(InfoType::JokeServed),
            Err(e) => self.stats.increment_error(e.error_type()),
        }
        result
    }

    async fn serve_inner(&self) -> Result<String, ServeError> {
        let name = self.queue.pop(self.pop_timeout).await.map_err(|e| {
            log::error!("Timeout getting name: {}", e);
            ServeError::from(e)
        })?;
        log::debug!("Serving joke for {}", name);

        let joke = self
            .jokes
            .fetch_joke(&name.first, &name.last)
            .await
            .map_err(|e| {
                log::error!("Failed to get joke with custom name: {}", e);
                ServeError::from(e)
            })?;
        Ok(joke)
    }

    /// The queue this consumer pops from.
    pub fn queue(&self) -> &Arc<BoundedQueue<Name>> {
        &self.queue
    }
}
