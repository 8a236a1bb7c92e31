//! Process-level plumbing: shutdown signals and periodic status logging.

pub mod logging;
pub mod shutdown;

pub use logging::spawn_status_logger;
pub use shutdown::{cancel_on_signal, shutdown_gracefully};
