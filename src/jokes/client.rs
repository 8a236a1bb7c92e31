//! HTTP client for the jokes API.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use url::Url;

use super::JokeProvider;
use crate::config::JOKE_CATEGORY;
use crate::error_handling::{categorize_joke_error, JokeError};

/// Body returned by the jokes API.
#[derive(Debug, Deserialize)]
pub struct JokeResponse {
    /// `success` or an exception name
    #[serde(rename = "type")]
    pub kind: String,
    /// The joke itself
    pub value: JokeValue,
}

/// One joke as the API returns it.
#[derive(Debug, Deserialize)]
pub struct JokeValue {
    /// Upstream identifier
    #[serde(default)]
    pub id: i64,
    /// HTML-escaped joke text
    pub joke: String,
}

impl JokeResponse {
    /// The API reports failures in-band with a type other than "success".
    pub fn successful(&self) -> bool {
        self.kind == "success"
    }
}

/// Adds the name and category parameters to the jokes API base URL.
pub fn joke_url_with_name(base: &Url, first: &str, last: &str, category: &str) -> Url {
    let mut url = base.clone();
    url.query_pairs_mut()
        .clear()
        .append_pair("firstName", first)
        .append_pair("lastName", last)
        .append_pair("limitTo", &format!("[{}]", category));
    url
}

/// Requests jokes with a custom name from the jokes API.
#[derive(Clone)]
pub struct JokeClient {
    api_url: Url,
    http: Arc<reqwest::Client>,
}

impl JokeClient {
    /// Creates a client for the jokes API at `api_url`.
    pub fn new(api_url: Url, http: Arc<reqwest::Client>) -> Self {
        JokeClient { api_url, http }
    }

    /// Fetches a joke with the API's own default name and no category.
    pub async fn joke(&self) -> Result<String, JokeError> {
        log::trace!("Getting default joke");
        self.joke_from_url(self.api_url.clone()).await
    }

    async fn joke_from_url(&self, url: Url) -> Result<String, JokeError> {
        let response = self
            .http
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(categorize_joke_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(JokeError::UnexpectedStatus(status.as_u16()));
        }
        let body = response.text().await.map_err(categorize_joke_error)?;
        let joke: JokeResponse = serde_json::from_str(&body)
            .map_err(|e| JokeError::MalformedResponse(e.to_string()))?;
        if !joke.successful() {
            return Err(JokeError::Unsuccessful);
        }
        Ok(html_escape::decode_html_entities(&joke.value.joke).into_owned())
    }
}

#[async_trait]
impl JokeProvider for JokeClient {
    async fn fetch_joke(&self, first: &str, last: &str) -> Result<String, JokeError> {
        log::trace!("Getting joke with custom name");
        let url = joke_url_with_name(&self.api_url, first, last, JOKE_CATEGORY);
        self.joke_from_url(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> JokeClient {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .expect("Failed to build client");
        let url = Url::parse(&format!("{}/jokes/random", server.uri()))
            .expect("mock server URI should parse");
        JokeClient::new(url, Arc::new(http))
    }

    #[test]
    fn test_joke_url_encodes_parameters() {
        let base = Url::parse("http://api.icndb.com/jokes/random").unwrap();
        let url = joke_url_with_name(&base, "John", "Smith", "nerdy");
        assert_eq!(
            url.as_str(),
            "http://api.icndb.com/jokes/random?firstName=John&lastName=Smith&limitTo=%5Bnerdy%5D"
        );
    }

    #[test]
    fn test_joke_url_escapes_names() {
        let base = Url::parse("http://api.icndb.com/jokes/random").unwrap();
        let url = joke_url_with_name(&base, "Mary Ann", "O'Neil&Co", "nerdy");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs[0], ("firstName".into(), "Mary Ann".into()));
        assert_eq!(pairs[1], ("lastName".into(), "O'Neil&Co".into()));
    }

    #[test]
    fn test_joke_url_replaces_existing_query() {
        let base = Url::parse("http://api.icndb.com/jokes/random?escape=javascript").unwrap();
        let url = joke_url_with_name(&base, "A", "B", "nerdy");
        assert!(!url.as_str().contains("escape"));
    }

    #[tokio::test]
    async fn test_fetch_joke_success_unescapes_html() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/jokes/random"))
            .and(query_param("firstName", "John"))
            .and(query_param("lastName", "Smith"))
            .and(query_param("limitTo", "[nerdy]"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{"type": "success", "value": {"id": 1, "joke": "John Smith&#039;s code compiles &quot;first try&quot;."}}"#,
                "application/json",
            ))
            .mount(&server)
            .await;

        let joke = client_for(&server)
            .fetch_joke("John", "Smith")
            .await
            .expect("should fetch joke");

        assert_eq!(joke, r#"John Smith's code compiles "first try"."#);
    }

    #[tokio::test]
    async fn test_default_joke_sends_no_name() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/jokes/random"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{"type": "success", "value": {"id": 7, "joke": "Chuck Norris &amp; the compiler agree."}}"#,
                "application/json",
            ))
            .mount(&server)
            .await;

        let joke = client_for(&server).joke().await.expect("should fetch joke");
        assert_eq!(joke, "Chuck Norris & the compiler agree.");

        let requests = server.received_requests().await.expect("recording is on");
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url.query(), None);
    }

    #[tokio::test]
    async fn test_fetch_joke_unsuccessful_type() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{"type": "NoSuchQuoteException", "value": {"joke": ""}}"#,
                "application/json",
            ))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_joke("A", "B").await.unwrap_err();
        assert!(matches!(err, JokeError::Unsuccessful));
    }

    #[tokio::test]
    async fn test_fetch_joke_invalid_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(r#"{"invalid""#, "text/plain"))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_joke("A", "B").await.unwrap_err();
        assert!(matches!(err, JokeError::MalformedResponse(_)));
        assert!(err
            .to_string()
            .contains("unable to unmarshal jokes API response body"));
    }

    #[tokio::test]
    async fn test_fetch_joke_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_joke("A", "B").await.unwrap_err();
        assert!(matches!(err, JokeError::UnexpectedStatus(502)));
    }
}
