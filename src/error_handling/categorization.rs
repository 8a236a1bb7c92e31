//! Error categorization.
//!
//! Turns raw upstream outcomes (status code, body, `reqwest::Error`) into the
//! typed failures the producer and request handlers act on. The names API
//! classification is an explicit rule so it can be tested on its own:
//!
//! | status       | body              | outcome                 |
//! |--------------|-------------------|-------------------------|
//! | 429          | any               | `RateLimited`           |
//! | non-2xx      | any               | `UnexpectedStatus`      |
//! | 2xx          | JSON list of names| `Ok(names)`             |
//! | 2xx          | anything else     | `MalformedResponse`     |

use crate::config::HTTP_STATUS_TOO_MANY_REQUESTS;
use crate::names::Name;

use super::stats::ProcessingStats;
use super::types::{ErrorType, JokeError, NameSourceError};

/// Classifies a names API response from its status code and raw body.
pub fn classify_names_response(status: u16, body: &str) -> Result<Vec<Name>, NameSourceError> {
    if status == HTTP_STATUS_TOO_MANY_REQUESTS {
        return Err(NameSourceError::RateLimited);
    }
    if !(200..300).contains(&status) {
        return Err(NameSourceError::UnexpectedStatus(status));
    }
    serde_json::from_str::<Vec<Name>>(body)
        .map_err(|e| NameSourceError::MalformedResponse(e.to_string()))
}

/// Categorizes a `reqwest::Error` raised while talking to the names API.
pub fn categorize_names_error(error: reqwest::Error) -> NameSourceError {
    if let Some(status) = error.status() {
        if status.as_u16() == HTTP_STATUS_TOO_MANY_REQUESTS {
            return NameSourceError::RateLimited;
        }
        return NameSourceError::UnexpectedStatus(status.as_u16());
    }
    if error.is_decode() {
        return NameSourceError::MalformedResponse(error.to_string());
    }
    NameSourceError::Transport(error)
}

/// Categorizes a `reqwest::Error` raised while talking to the jokes API.
pub fn categorize_joke_error(error: reqwest::Error) -> JokeError {
    if let Some(status) = error.status() {
        return JokeError::UnexpectedStatus(status.as_u16());
    }
    if error.is_decode() {
        return JokeError::MalformedResponse(error.to_string());
    }
    JokeError::Transport(error)
}

/// Records a names API failure in the processing statistics.
pub fn update_name_error_stats(stats: &ProcessingStats, error: &NameSourceError) -> ErrorType {
    let error_type = error.error_type();
    stats.increment_error(error_type);
    error_type
}
