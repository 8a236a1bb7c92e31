//! Names upstream.
//!
//! `Name` is the unit buffered by the prefetch pipeline. `NameSource` is the
//! capability the producer needs from the names API; `NameClient` implements
//! it over HTTP.

mod client;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error_handling::NameSourceError;

pub use client::NameClient;

/// A first and last name, consumed by exactly one request.
///
/// The names API calls these `name` and `surname`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Name {
    /// Given name
    #[serde(rename = "name")]
    pub first: String,
    /// Family name
    #[serde(rename = "surname")]
    pub last: String,
}

impl Name {
    /// Builds a name from its two parts.
    pub fn new(first: impl Into<String>, last: impl Into<String>) -> Self {
        Name {
            first: first.into(),
            last: last.into(),
        }
    }
}

impl std::fmt::Display for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.first, self.last)
    }
}

/// Fetches batches of names from an upstream.
///
/// Each call is one upstream request and spends one unit of the request
/// budget, whatever the outcome.
#[async_trait]
pub trait NameSource: Send + Sync {
    /// Makes one upstream call and returns every name it produced.
    async fn fetch_batch(&self) -> Result<Vec<Name>, NameSourceError>;
}
