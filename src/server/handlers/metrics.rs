//! Prometheus metrics handler.

use std::fmt::Write;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use strum::IntoEnumIterator;

use super::super::types::AppState;
use crate::error_handling::{ErrorType, InfoType, ProcessingStats};

/// Prometheus-compatible metrics endpoint
pub async fn metrics_handler(State(state): State<AppState>) -> Response {
    let queue = state.consumer.queue();
    let body = render_metrics(&state.stats, queue.len(), queue.capacity());
    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4")],
        body,
    )
        .into_response()
}

/// Renders all counters in the Prometheus text exposition format.
pub fn render_metrics(stats: &ProcessingStats, queue_len: usize, queue_capacity: usize) -> String {
    let mut out = format!(
        r#"# HELP jokes_on_tap_queue_names Names currently buffered
# TYPE jokes_on_tap_queue_names gauge
jokes_on_tap_queue_names {}

# HELP jokes_on_tap_queue_capacity Capacity of the name buffer
# TYPE jokes_on_tap_queue_capacity gauge
jokes_on_tap_queue_capacity {}

# HELP http_request_total Total number of http requests to the server.
# TYPE http_request_total counter
"#,
        queue_len, queue_capacity
    );

    // Writing to a String cannot fail
    for (status, count) in stats.response_counts() {
        let _ = writeln!(out, "http_request_total{{statuscode=\"{}\"}} {}", status, count);
    }

    out.push_str(
        "\n# HELP jokes_on_tap_errors_total Errors by type\n# TYPE jokes_on_tap_errors_total counter\n",
    );
    for error_type in ErrorType::iter() {
        let _ = writeln!(
            out,
            "jokes_on_tap_errors_total{{type=\"{}\"}} {}",
            error_type.label(),
            stats.get_error_count(error_type)
        );
    }

    out.push_str(
        "\n# HELP jokes_on_tap_events_total Pipeline events by type\n# TYPE jokes_on_tap_events_total counter\n",
    );
    for info_type in InfoType::iter() {
        let _ = writeln!(
            out,
            "jokes_on_tap_events_total{{type=\"{}\"}} {}",
            info_type.label(),
            stats.get_info_count(info_type)
        );
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_metrics_includes_status_codes_and_counters() {
        let stats = ProcessingStats::new();
        stats.record_response(200);
        stats.record_response(200);
        stats.record_response(500);
        stats.increment_error(ErrorType::NamesRateLimited);
        stats.add_info(InfoType::NamesQueued, 42);

        let body = render_metrics(&stats, 3, 500);

        assert!(body.contains("jokes_on_tap_queue_names 3\n"));
        assert!(body.contains("jokes_on_tap_queue_capacity 500\n"));
        assert!(body.contains("http_request_total{statuscode=\"200\"} 2\n"));
        assert!(body.contains("http_request_total{statuscode=\"500\"} 1\n"));
        assert!(body.contains("jokes_on_tap_errors_total{type=\"names_rate_limited\"} 1\n"));
        assert!(body.contains("jokes_on_tap_events_total{type=\"names_queued\"} 42\n"));
    }

    #[test]
    fn test_render_metrics_lists_every_type_even_when_zero() {
        let stats = ProcessingStats::new();
        let body = render_metrics(&stats, 0, 1);
        for error_type in ErrorType::iter() {
            assert!(body.contains(&format!("type=\"{}\"}} 0", error_type.label())));
        }
        assert!(!body.contains("statuscode"));
    }
}
