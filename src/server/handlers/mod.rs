//! HTTP handlers.

mod joke;
mod metrics;
mod status;

pub use joke::joke_handler;
pub use metrics::{metrics_handler, render_metrics};
pub use status::status_handler;
