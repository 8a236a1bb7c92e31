//! Configuration constants.
//!
//! Defaults for the prefetch pipeline, the upstream HTTP clients and the
//! inbound HTTP server. Every value here can be overridden through `Config`.

use std::time::Duration;

// Upstreams
/// Default names API URL. Returns up to 500 names per call.
pub const DEFAULT_NAMES_URL: &str = "https://uinames.com/api/?amount=500";
/// Default jokes API URL (without query parameters).
pub const DEFAULT_JOKES_URL: &str = "http://api.icndb.com/jokes/random";
/// Joke category requested from the jokes API.
pub const JOKE_CATEGORY: &str = "nerdy";

// Request budget for the names API
/// Maximum number of names API calls inside one rolling window.
///
/// The names API does not document its limit. Seven calls per 61 seconds is
/// what it has been observed to tolerate without returning throttle pages.
pub const DEFAULT_BUDGET_COUNT: usize = 7;
/// Width of the rolling window in seconds.
/// One second of slack over a minute so clock skew never lands us on the edge.
pub const DEFAULT_WINDOW_SECS: u64 = 61;

// Queue
/// Number of names buffered between the producer and request handlers.
pub const DEFAULT_QUEUE_CAPACITY: usize = 500;
/// How long a request handler waits for a name before giving up.
pub const DEFAULT_POP_TIMEOUT_SECS: u64 = 5;

// Producer pauses
/// Pause taken when the upstream signals throttling (429 or a malformed body).
pub const DEFAULT_COOLDOWN_SECS: u64 = 10;
/// Pause taken when the queue is full and fetching would be wasted.
pub const DEFAULT_BACKPRESSURE_MILLIS: u64 = 1000;

// HTTP client
/// Per-request timeout for both upstream clients.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 5;
/// Idle connections kept per upstream host.
pub const HTTP_POOL_MAX_IDLE_PER_HOST: usize = 10;
/// How long idle upstream connections are kept open.
pub const HTTP_POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(30);

// HTTP server
/// Default listening port for the jokes endpoint.
pub const DEFAULT_PORT: u16 = 8080;
/// Interval between queue depth log lines.
pub const STATUS_LOGGING_INTERVAL_SECS: u64 = 30;
/// Time a client has to send a complete request head.
///
/// hyper arms the same timer while a keep-alive connection waits for its next
/// request, so this also closes idle connections.
pub const DEFAULT_HEADER_READ_TIMEOUT_SECS: u64 = 3;
/// Upper bound on handling one request, from head received to response ready.
/// Covers the pop timeout plus one jokes API call.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

// HTTP status codes (for clarity and consistency)
/// Status the names API uses to signal throttling.
pub const HTTP_STATUS_TOO_MANY_REQUESTS: u16 = 429;
