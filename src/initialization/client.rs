//! HTTP client initialization.

use std::sync::Arc;
use std::time::Duration;

use reqwest::ClientBuilder;

use crate::config::{Config, HTTP_POOL_IDLE_TIMEOUT, HTTP_POOL_MAX_IDLE_PER_HOST};
use crate::error_handling::InitializationError;

/// Initializes the HTTP client shared by the names and jokes clients.
///
/// Every upstream call is bounded by `http_timeout_seconds`; idle
/// connections to both APIs are kept in a small pool between requests.
///
/// # Errors
///
/// Returns `InitializationError::HttpClientError` if the client cannot be built.
pub fn init_client(config: &Config) -> Result<Arc<reqwest::Client>, InitializationError> {
    let client = ClientBuilder::new()
        .timeout(Duration::from_secs(config.http_timeout_seconds))
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .pool_max_idle_per_host(HTTP_POOL_MAX_IDLE_PER_HOST)
        .pool_idle_timeout(HTTP_POOL_IDLE_TIMEOUT)
        .build()?;
    Ok(Arc::new(client))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_client_with_defaults() {
        let config = Config::default();
        assert!(init_client(&config).is_ok());
    }

    #[test]
    fn test_init_client_with_zero_timeout() {
        // A zero timeout is odd but still a valid client
        let config = Config {
            http_timeout_seconds: 0,
            ..Default::default()
        };
        assert!(init_client(&config).is_ok());
    }
}
