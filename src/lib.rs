//! jokes_on_tap library: a prefetching joke server
//!
//! Names come from a rate-limited names API that allows only a handful of calls
//! per rolling window but returns hundreds of names per call. A background
//! producer spends that budget to keep a bounded queue of names topped up; each
//! HTTP request pops one name and asks the jokes API for a joke about it.
//!
//! # Example
//!
//! ```no_run
//! use jokes_on_tap::{run_server, Config};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let config = Config {
//!     port: 9000,
//!     ..Default::default()
//! };
//!
//! // Serves until ctrl-c or SIGTERM
//! run_server(config).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime with the time driver enabled.

#![warn(missing_docs)]

mod app;
pub mod budget;
pub mod config;
pub mod consumer;
mod error_handling;
pub mod initialization;
pub mod jokes;
pub mod names;
pub mod producer;
pub mod queue;
pub mod server;

// Re-export public API
pub use budget::{BudgetDecision, RateBudgetTracker};
pub use config::{Config, ConfigError, LogFormat, LogLevel, Opt, PipelineConfig, ServerTimeouts};
pub use consumer::RequestConsumer;
pub use error_handling::{
    ErrorType, InfoType, InitializationError, JokeError, NameSourceError, ProcessingStats,
    QueueError, ServeError,
};
pub use jokes::{JokeClient, JokeProvider};
pub use names::{Name, NameClient, NameSource};
pub use producer::{PrefetchProducer, StepOutcome};
pub use queue::BoundedQueue;
pub use run::{run_server, serve, serve_with};

// Internal run module (wires the pipeline to the HTTP server)
mod run {
    use std::sync::Arc;
    use std::time::Duration;

    use anyhow::{Context, Result};
    use tokio::net::TcpListener;
    use tokio_util::sync::CancellationToken;

    use crate::app::{cancel_on_signal, shutdown_gracefully, spawn_status_logger};
    use crate::config::{
        parse_url, Config, PipelineConfig, ServerTimeouts, STATUS_LOGGING_INTERVAL_SECS,
    };
    use crate::consumer::RequestConsumer;
    use crate::error_handling::ProcessingStats;
    use crate::initialization::init_client;
    use crate::jokes::{JokeClient, JokeProvider};
    use crate::names::{NameClient, NameSource};
    use crate::producer::PrefetchProducer;
    use crate::queue::BoundedQueue;
    use crate::server::{self, AppState};

    /// Runs the service on `config.port` until ctrl-c or SIGTERM.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the HTTP client cannot
    /// be built, the port cannot be bound, or the server fails while running.
    pub async fn run_server(config: Config) -> Result<()> {
        config.validate().context("Invalid configuration")?;

        let listener = server::bind(config.port).await?;
        let shutdown = CancellationToken::new();
        tokio::spawn(cancel_on_signal(shutdown.clone()));

        serve(listener, config, shutdown).await
    }

    /// Serves on an already bound `listener` using the upstream URLs in `config`.
    ///
    /// Returns once `shutdown` is cancelled and the producer has stopped.
    pub async fn serve(
        listener: TcpListener,
        config: Config,
        shutdown: CancellationToken,
    ) -> Result<()> {
        config.validate().context("Invalid configuration")?;
        let names_url = parse_url("names", &config.names_url)?;
        let jokes_url = parse_url("jokes", &config.jokes_url)?;

        let http = init_client(&config).context("Failed to initialize HTTP client")?;
        log::info!("Names API: {}", names_url);
        log::info!("Jokes API: {}", jokes_url);

        let names = NameClient::new(names_url, Arc::clone(&http));
        let jokes: Arc<dyn JokeProvider> = Arc::new(JokeClient::new(jokes_url, http));

        serve_with(listener, names, jokes, config.pipeline, config.server, shutdown).await
    }

    /// Serves on `listener` with caller-supplied upstreams.
    ///
    /// Spawns the producer and the status logger, runs the HTTP server until
    /// `shutdown` fires, then stops the background tasks.
    pub async fn serve_with<S>(
        listener: TcpListener,
        source: S,
        jokes: Arc<dyn JokeProvider>,
        pipeline: PipelineConfig,
        timeouts: ServerTimeouts,
        shutdown: CancellationToken,
    ) -> Result<()>
    where
        S: NameSource + 'static,
    {
        pipeline.validate().context("Invalid pipeline configuration")?;
        timeouts.validate().context("Invalid server timeouts")?;

        let stats = Arc::new(ProcessingStats::new());
        let queue = Arc::new(BoundedQueue::new(pipeline.queue_capacity));

        let background = shutdown.child_token();
        let producer = PrefetchProducer::new(
            source,
            Arc::clone(&queue),
            pipeline.clone(),
            Arc::clone(&stats),
        );
        let producer_task = tokio::spawn(producer.run(background.clone()));
        let logging_task = spawn_status_logger(
            Arc::clone(&queue),
            Arc::clone(&stats),
            Duration::from_secs(STATUS_LOGGING_INTERVAL_SECS),
            background.clone(),
        );

        let consumer = RequestConsumer::new(queue, jokes, pipeline.pop_timeout, Arc::clone(&stats));
        let state = AppState::new(consumer, stats);
        let result = server::start_server(listener, state, timeouts, shutdown).await;

        shutdown_gracefully(background, vec![producer_task, logging_task]).await;
        result
    }
}
