//! Error handling and processing statistics.
//!
//! This module provides:
//! - Typed errors for the upstream clients, the queue and the request path
//! - Classification of upstream responses into those errors
//! - Processing statistics (error and info counters, response statuses)
//!
//! Nothing here is fatal to the process. Names API failures slow the producer
//! down; queue starvation and jokes API failures become 500 responses.

mod categorization;
mod stats;
mod types;

// Re-export public API
pub use categorization::{
    categorize_joke_error, categorize_names_error, classify_names_response,
    update_name_error_stats,
};
pub use stats::ProcessingStats;
pub use types::{
    ErrorType, InfoType, InitializationError, JokeError, NameSourceError, QueueError, ServeError,
};
