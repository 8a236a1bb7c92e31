//! HTTP client for the names API.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use url::Url;

use super::{Name, NameSource};
use crate::error_handling::{categorize_names_error, classify_names_response, NameSourceError};

/// Requests batches of names from the names API.
///
/// The URL is queried as-is, so the batch size is part of it
/// (`?amount=500`). Budgeting is not this client's job; the producer decides
/// when to call it.
#[derive(Clone)]
pub struct NameClient {
    api_url: Url,
    http: Arc<reqwest::Client>,
}

impl NameClient {
    /// Creates a client for the names API at `api_url`.
    pub fn new(api_url: Url, http: Arc<reqwest::Client>) -> Self {
        NameClient { api_url, http }
    }

    /// The names API endpoint.
    pub fn api_url(&self) -> &Url {
        &self.api_url
    }
}

#[async_trait]
impl NameSource for NameClient {
    async fn fetch_batch(&self) -> Result<Vec<Name>, NameSourceError> {
        log::trace!("Requesting names from {}", self.api_url);
        let response = self
            .http
            .get(self.api_url.clone())
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(categorize_names_error)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(categorize_names_error)?;
        classify_names_response(status, &body)
    }
}
