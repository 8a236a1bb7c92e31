//! Application initialization and resource setup.
//!
//! Logger and shared HTTP client construction. Both return
//! `InitializationError` so the binary can report a single error type.

mod client;
mod logger;

pub use client::init_client;
pub use logger::init_logger_with;
