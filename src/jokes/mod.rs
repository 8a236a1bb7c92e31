//! Jokes upstream.
//!
//! `JokeProvider` is the capability a request handler needs: turn a first and
//! last name into joke text. `JokeClient` implements it against an ICNDB-style
//! API.

mod client;

use async_trait::async_trait;

use crate::error_handling::JokeError;

pub use client::{joke_url_with_name, JokeClient, JokeResponse};

/// Builds joke text around a name.
#[async_trait]
pub trait JokeProvider: Send + Sync {
    /// Returns one joke featuring `first` `last`, already unescaped.
    async fn fetch_joke(&self, first: &str, last: &str) -> Result<String, JokeError>;
}
