//! JSON status handler.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::super::types::{AppState, NameCounts, QueueStatus, RequestCounts, StatusResponse};
use crate::error_handling::{ErrorType, InfoType};

/// JSON status endpoint with queue depth and pipeline counters
pub async fn status_handler(State(state): State<AppState>) -> Response {
    let stats = &state.stats;
    let queue = state.consumer.queue();

    let response = StatusResponse {
        uptime_seconds: state.start_time.elapsed().as_secs_f64(),
        queue: QueueStatus {
            len: queue.len(),
            capacity: queue.capacity(),
        },
        names: NameCounts {
            batches_fetched: stats.get_info_count(InfoType::NamesBatchFetched),
            queued: stats.get_info_count(InfoType::NamesQueued),
            budget_waits: stats.get_info_count(InfoType::BudgetWait),
            backpressure_pauses: stats.get_info_count(InfoType::BackpressurePause),
            cooldowns: stats.get_info_count(InfoType::Cooldown),
            rate_limited: stats.get_error_count(ErrorType::NamesRateLimited),
            malformed_responses: stats.get_error_count(ErrorType::NamesMalformedResponse),
            other_errors: stats.get_error_count(ErrorType::NamesUnexpectedStatus)
                + stats.get_error_count(ErrorType::NamesTransportError),
        },
        requests: RequestCounts {
            jokes_served: stats.get_info_count(InfoType::JokeServed),
            starved: stats.get_error_count(ErrorType::QueueStarvation),
            joke_errors: stats.get_error_count(ErrorType::JokeUnsuccessful)
                + stats.get_error_count(ErrorType::JokeMalformedResponse)
                + stats.get_error_count(ErrorType::JokeUnexpectedStatus)
                + stats.get_error_count(ErrorType::JokeTransportError),
        },
    };

    let json = match serde_json::to_string_pretty(&response) {
        Ok(json) => json,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to serialize status: {}", e),
            )
                .into_response();
        }
    };

    (StatusCode::OK, [("content-type", "application/json")], json).into_response()
}
