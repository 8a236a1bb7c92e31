//! Error type definitions.
//!
//! This module defines the typed errors returned by the upstream clients, the
//! queue and the request path, together with the error and info taxonomies
//! counted in `ProcessingStats`.

use std::time::Duration;

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

use crate::config::ConfigError;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    ConfigError(#[from] ConfigError),
}

/// Failure of a single names API call.
///
/// Every variant maps to one of the classes the producer reacts to:
/// rate limited, malformed response, or other.
#[derive(Error, Debug)]
pub enum NameSourceError {
    /// The names API answered 429 Too Many Requests.
    #[error("too many name requests within the last window")]
    RateLimited,

    /// The body could not be decoded as a list of names.
    #[error("unable to unmarshal names API response body: {0}")]
    MalformedResponse(String),

    /// The names API answered with a status other than 2xx or 429.
    #[error("names API returned unexpected status {0}")]
    UnexpectedStatus(u16),

    /// The request never produced a response (timeout, refused, reset).
    #[error("unable to get new names: {0}")]
    Transport(#[source] ReqwestError),
}

impl NameSourceError {
    /// Returns true when this failure means the upstream is throttling us.
    ///
    /// A malformed body counts as throttling: the names API serves an HTML
    /// throttle page with status 200 once its window is exceeded. This rule is
    /// specific to that upstream and is not assumed to hold for others.
    pub fn is_throttling(&self) -> bool {
        matches!(
            self,
            NameSourceError::RateLimited | NameSourceError::MalformedResponse(_)
        )
    }

    /// The counter this failure is recorded under.
    pub fn error_type(&self) -> ErrorType {
        match self {
            NameSourceError::RateLimited => ErrorType::NamesRateLimited,
            NameSourceError::MalformedResponse(_) => ErrorType::NamesMalformedResponse,
            NameSourceError::UnexpectedStatus(_) => ErrorType::NamesUnexpectedStatus,
            NameSourceError::Transport(_) => ErrorType::NamesTransportError,
        }
    }
}

/// Failure of a single jokes API call.
#[derive(Error, Debug)]
pub enum JokeError {
    /// The jokes API reported a non-success response type.
    #[error("general error getting new joke")]
    Unsuccessful,

    /// The body could not be decoded as a joke.
    #[error("unable to unmarshal jokes API response body: {0}")]
    MalformedResponse(String),

    /// The jokes API answered with a non-2xx status.
    #[error("jokes API returned unexpected status {0}")]
    UnexpectedStatus(u16),

    /// The request never produced a response.
    #[error("unable to get new joke: {0}")]
    Transport(#[source] ReqwestError),
}

impl JokeError {
    /// The counter this failure is recorded under.
    pub fn error_type(&self) -> ErrorType {
        match self {
            JokeError::Unsuccessful => ErrorType::JokeUnsuccessful,
            JokeError::MalformedResponse(_) => ErrorType::JokeMalformedResponse,
            JokeError::UnexpectedStatus(_) => ErrorType::JokeUnexpectedStatus,
            JokeError::Transport(_) => ErrorType::JokeTransportError,
        }
    }
}

/// Errors returned by `BoundedQueue`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    /// No item became available before the deadline.
    #[error("timed out after {0:?} waiting for an item")]
    Timeout(Duration),
}

/// Errors surfaced to an inbound HTTP request.
#[derive(Error, Debug)]
pub enum ServeError {
    /// The queue stayed empty for the whole pop timeout.
    #[error("the server has no names to provide")]
    NoNamesAvailable(#[from] QueueError),

    /// The jokes API failed for the popped name.
    #[error(transparent)]
    Joke(#[from] JokeError),
}

impl ServeError {
    /// The counter this failure is recorded under.
    pub fn error_type(&self) -> ErrorType {
        match self {
            ServeError::NoNamesAvailable(_) => ErrorType::QueueStarvation,
            ServeError::Joke(e) => e.error_type(),
        }
    }
}

/// Types of errors counted while the service runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorType {
    // Names API
    /// Names API answered 429.
    NamesRateLimited,
    /// Names API body did not decode; counted as throttling.
    NamesMalformedResponse,
    /// Names API answered a status other than 200 or 429.
    NamesUnexpectedStatus,
    /// Names API call failed before a response arrived.
    NamesTransportError,
    // Request path
    /// A request found no name before the pop timeout.
    QueueStarvation,
    // Jokes API
    /// Jokes API answered with a `type` other than `success`.
    JokeUnsuccessful,
    /// Jokes API body did not decode.
    JokeMalformedResponse,
    /// Jokes API answered a non-200 status.
    JokeUnexpectedStatus,
    /// Jokes API call failed before a response arrived.
    JokeTransportError,
}

/// Informational events counted while the service runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum InfoType {
    /// One successful names API call.
    NamesBatchFetched,
    /// One name pushed onto the queue.
    NamesQueued,
    /// The producer slept until budget freed up.
    BudgetWait,
    /// The producer found the queue full.
    BackpressurePause,
    /// The producer took the throttling cooldown.
    Cooldown,
    /// A request was answered with a joke.
    JokeServed,
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorType {
    /// Human-readable description, used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::NamesRateLimited => "Names API rate limited (429)",
            ErrorType::NamesMalformedResponse => "Names API malformed response",
            ErrorType::NamesUnexpectedStatus => "Names API unexpected status",
            ErrorType::NamesTransportError => "Names API transport error",
            ErrorType::QueueStarvation => "No names available",
            ErrorType::JokeUnsuccessful => "Jokes API unsuccessful response",
            ErrorType::JokeMalformedResponse => "Jokes API malformed response",
            ErrorType::JokeUnexpectedStatus => "Jokes API unexpected status",
            ErrorType::JokeTransportError => "Jokes API transport error",
        }
    }

    /// Metric label for this error type.
    pub fn label(&self) -> &'static str {
        match self {
            ErrorType::NamesRateLimited => "names_rate_limited",
            ErrorType::NamesMalformedResponse => "names_malformed_response",
            ErrorType::NamesUnexpectedStatus => "names_unexpected_status",
            ErrorType::NamesTransportError => "names_transport_error",
            ErrorType::QueueStarvation => "queue_starvation",
            ErrorType::JokeUnsuccessful => "joke_unsuccessful",
            ErrorType::JokeMalformedResponse => "joke_malformed_response",
            ErrorType::JokeUnexpectedStatus => "joke_unexpected_status",
            ErrorType::JokeTransportError => "joke_transport_error",
        }
    }
}

impl std::fmt::Display for InfoType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl InfoType {
    /// Human-readable description, used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            InfoType::NamesBatchFetched => "Names batch fetched",
            InfoType::NamesQueued => "Name queued",
            InfoType::BudgetWait => "Waited for request budget",
            InfoType::BackpressurePause => "Paused on full queue",
            InfoType::Cooldown => "Cooled down after throttling",
            InfoType::JokeServed => "Joke served",
        }
    }

    /// Metric label for this info type.
    pub fn label(&self) -> &'static str {
        match self {
            InfoType::NamesBatchFetched => "names_batch_fetched",
            InfoType::NamesQueued => "names_queued",
            InfoType::BudgetWait => "budget_wait",
            InfoType::BackpressurePause => "backpressure_pause",
            InfoType::Cooldown => "cooldown",
            InfoType::JokeServed => "joke_served",
        }
    }
}
