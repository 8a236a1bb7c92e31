//! Joke handler.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use super::super::types::AppState;

/// Serves one joke built around the next prefetched name.
///
/// Plain text either way: the joke on 200, the error on 500.
pub async fn joke_handler(State(state): State<AppState>) -> Response {
    let (status, body) = match state.consumer.serve().await {
        Ok(joke) => (StatusCode::OK, format!("{}\n", joke)),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, format!("{}\n", e)),
    };
    state.stats.record_response(status.as_u16());

    (
        status,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body,
    )
        .into_response()
}
