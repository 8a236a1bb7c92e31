// Shared test helpers: mock upstreams and a running service on an ephemeral port.

use std::net::SocketAddr;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use jokes_on_tap::{Config, PipelineConfig};

/// A service started by [`start_service`].
#[allow(dead_code)] // Not every test file uses every field
pub struct TestService {
    pub addr: SocketAddr,
    pub shutdown: CancellationToken,
    pub handle: JoinHandle<anyhow::Result<()>>,
}

#[allow(dead_code)]
impl TestService {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Pipeline settings that keep tests fast: short pop timeout and backpressure.
#[allow(dead_code)]
pub fn fast_pipeline() -> PipelineConfig {
    PipelineConfig {
        budget_count: 7,
        window_duration: Duration::from_secs(61),
        queue_capacity: 500,
        pop_timeout: Duration::from_secs(1),
        cooldown_duration: Duration::from_secs(10),
        backpressure_interval: Duration::from_millis(50),
    }
}

/// Mounts a names API answering every call with `names`.
#[allow(dead_code)]
pub async fn mount_names(server: &MockServer, names: &[(&str, &str)]) {
    let body: Vec<Value> = names
        .iter()
        .map(|(first, last)| {
            json!({"name": first, "surname": last, "gender": "male", "region": "England"})
        })
        .collect();
    mount_names_response(
        server,
        ResponseTemplate::new(200).set_body_json(Value::Array(body)),
    )
    .await;
}

/// Mounts a names API answering every call with `response`.
#[allow(dead_code)]
pub async fn mount_names_response(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/api/"))
        .and(query_param("amount", "500"))
        .respond_with(response)
        .mount(server)
        .await;
}

/// Mounts a jokes API that puts the requested name into an HTML-escaped joke.
#[allow(dead_code)]
pub async fn mount_echo_jokes(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/jokes/random"))
        .and(query_param("limitTo", "[nerdy]"))
        .respond_with(|request: &Request| {
            let param = |key: &str| {
                request
                    .url
                    .query_pairs()
                    .find(|(k, _)| k == key)
                    .map(|(_, v)| v.into_owned())
                    .unwrap_or_default()
            };
            let joke = format!(
                "{} {} &quot;counted&quot; to infinity. Twice.",
                param("firstName"),
                param("lastName")
            );
            ResponseTemplate::new(200)
                .set_body_json(json!({"type": "success", "value": {"id": 1, "joke": joke}}))
        })
        .mount(server)
        .await;
}

/// Starts the service against the two mock upstreams on an ephemeral port.
#[allow(dead_code)]
pub async fn start_service(
    names: &MockServer,
    jokes: &MockServer,
    pipeline: PipelineConfig,
) -> TestService {
    let config = Config {
        port: 0,
        names_url: format!("{}/api/?amount=500", names.uri()),
        jokes_url: format!("{}/jokes/random", jokes.uri()),
        http_timeout_seconds: 2,
        pipeline,
        ..Default::default()
    };

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to read local address");
    let shutdown = CancellationToken::new();

    let handle = tokio::spawn(jokes_on_tap::serve(listener, config, shutdown.clone()));

    TestService {
        addr,
        shutdown,
        handle,
    }
}

/// Fetches `/status` as JSON.
#[allow(dead_code)]
pub async fn status(service: &TestService) -> Value {
    reqwest::get(service.url("/status"))
        .await
        .expect("status request failed")
        .json()
        .await
        .expect("status body is not JSON")
}

/// Polls `/status` until `pointer` reaches at least `min`.
#[allow(dead_code)]
pub async fn wait_for_status(service: &TestService, pointer: &str, min: u64) -> Value {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        let snapshot = status(service).await;
        if snapshot.pointer(pointer).and_then(Value::as_u64).unwrap_or(0) >= min {
            return snapshot;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "{} never reached {}: {}",
            pointer,
            min,
            snapshot
        );
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
}
