//! HTTP server exposing the metrics endpoint.
//!
//! Acquisition failures are fatal for the process: the failing request gets a
//! `500`, the server stops accepting connections and [`serve`] returns the
//! error so the binary can exit non-zero.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use tokio::runtime::Runtime;
use tokio::sync::watch;
use tokio::task::JoinError;
use tracing::{debug, error, info, warn};

use super::config::ExporterConfig;
use super::encode::{CONTENT_TYPE, encode};
use crate::collector::{CollectError, Scrape, StatsCollector};

/// Shared state of the HTTP handlers.
#[derive(Clone)]
pub struct ExporterState {
    collector: Arc<StatsCollector>,
    metrics_path: Arc<str>,
    scrape_timeout: Option<Duration>,
    fatal: Arc<watch::Sender<Option<String>>>,
}

impl ExporterState {
    /// Creates handler state and the receiver notified on a fatal error.
    pub fn new(
        collector: StatsCollector,
        metrics_path: &str,
        scrape_timeout: Option<Duration>,
    ) -> (Self, watch::Receiver<Option<String>>) {
        let (tx, rx) = watch::channel(None);
        let state = Self {
            collector: Arc::new(collector),
            metrics_path: Arc::from(metrics_path),
            scrape_timeout,
            fatal: Arc::new(tx),
        };
        (state, rx)
    }

    fn fail(&self, message: String) {
        self.fatal.send_replace(Some(message));
    }
}

/// Builds the router: the metrics endpoint, `/health` and a landing page.
pub fn router(state: ExporterState) -> Router {
    let metrics_path = state.metrics_path.to_string();
    Router::new()
        .route(&metrics_path, get(handle_metrics))
        .route("/health", get(handle_health))
        .route("/", get(handle_index))
        .with_state(state)
}

async fn handle_metrics(State(state): State<ExporterState>) -> Response {
    let collector = Arc::clone(&state.collector);
    let mut task = tokio::task::spawn_blocking(move || collector.collect());

    let joined = match state.scrape_timeout {
        Some(limit) => match tokio::time::timeout(limit, &mut task).await {
            Ok(joined) => joined,
            Err(_) => {
                warn!(timeout = ?limit, "scrape timed out");
                // The acquisition keeps running; a late failure is still fatal.
                let late = state.clone();
                tokio::spawn(async move {
                    if let Err(message) = scrape_outcome(task.await) {
                        late.fail(message);
                    }
                });
                return (StatusCode::GATEWAY_TIMEOUT, "scrape timed out\n").into_response();
            }
        },
        None => task.await,
    };

    let scrape = match scrape_outcome(joined) {
        Ok(scrape) => scrape,
        Err(message) => {
            let body = format!("statistics acquisition failed: {}\n", message);
            state.fail(message);
            return (StatusCode::INTERNAL_SERVER_ERROR, body).into_response();
        }
    };

    debug!(
        samples = scrape.samples.len(),
        statistics = scrape.statistics,
        acquisition = ?scrape.timing.acquisition,
        "serving scrape"
    );

    match encode(&scrape.samples) {
        Ok(body) => ([(header::CONTENT_TYPE, CONTENT_TYPE)], body).into_response(),
        Err(e) => {
            error!(error = %e, "failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("failed to encode metrics: {}\n", e),
            )
                .into_response()
        }
    }
}

/// Unwraps a finished scrape task, logging any failure.
fn scrape_outcome(
    joined: Result<Result<Scrape, CollectError>, JoinError>,
) -> Result<Scrape, String> {
    match joined {
        Ok(Ok(scrape)) => Ok(scrape),
        Ok(Err(e)) => {
            error!(error = %e, kind = ?e.kind(), "statistics acquisition failed, shutting down");
            Err(e.to_string())
        }
        Err(e) => {
            error!(error = %e, "scrape task failed, shutting down");
            Err(format!("scrape task failed: {}", e))
        }
    }
}

async fn handle_health() -> &'static str {
    "ok"
}

async fn handle_index(State(state): State<ExporterState>) -> Html<String> {
    Html(format!(
        "<html>\n<head><title>systemd-resolved exporter</title></head>\n<body>\n\
         <h1>systemd-resolved exporter</h1>\n\
         <p>Acquisition mode: {mode}</p>\n\
         <p><a href=\"{path}\">Metrics</a></p>\n</body>\n</html>\n",
        mode = state.collector.mode(),
        path = state.metrics_path,
    ))
}

/// Error returned by [`serve`].
#[derive(Debug)]
pub enum ServeError {
    /// Binding or running the listener failed.
    Io(std::io::Error),
    /// Statistics acquisition failed during a scrape.
    Acquisition(String),
}

impl std::fmt::Display for ServeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServeError::Io(e) => write!(f, "server error: {}", e),
            ServeError::Acquisition(msg) => write!(f, "statistics acquisition failed: {}", msg),
        }
    }
}

impl std::error::Error for ServeError {}

impl From<std::io::Error> for ServeError {
    fn from(e: std::io::Error) -> Self {
        ServeError::Io(e)
    }
}

/// Serves metrics until interrupted or until an acquisition fails.
pub async fn serve(config: &ExporterConfig, collector: StatsCollector) -> Result<(), ServeError> {
    let (state, fatal) =
        ExporterState::new(collector, &config.metrics_path, config.scrape_timeout);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(config.listen).await?;
    info!(addr = %config.listen, path = %config.metrics_path, "listening");

    let shutdown = fatal.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::select! {
                _ = wait_for_fatal(shutdown) => {}
                _ = tokio::signal::ctrl_c() => info!("interrupted, shutting down"),
            }
        })
        .await?;

    let outcome = fatal.borrow().clone();
    match outcome {
        Some(message) => Err(ServeError::Acquisition(message)),
        None => Ok(()),
    }
}

/// Resolves once a handler has reported a fatal error.
async fn wait_for_fatal(mut fatal: watch::Receiver<Option<String>>) {
    while fatal.changed().await.is_ok() {
        if fatal.borrow().is_some() {
            return;
        }
    }
    std::future::pending::<()>().await
}

/// How long shutdown waits for scrapes still blocked in the resolver.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Builds a multi-threaded runtime and serves on it.
///
/// Blocking scrapes left over from timed out requests get at most
/// [`SHUTDOWN_GRACE`] to finish once the server has stopped.
pub fn run(config: &ExporterConfig, collector: StatsCollector) -> Result<(), ServeError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    block_on_with_grace(runtime, serve(config, collector), SHUTDOWN_GRACE)
}

fn block_on_with_grace<F: Future>(runtime: Runtime, future: F, grace: Duration) -> F::Output {
    let output = runtime.block_on(future);
    runtime.shutdown_timeout(grace);
    output
}
