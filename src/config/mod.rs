//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (budget, queue and timeout defaults)
//! - CLI option types and parsing
//! - The explicit pipeline configuration object

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub use types::{
    parse_url, Config, ConfigError, LogFormat, LogLevel, Opt, PipelineConfig, ServerTimeouts,
};
