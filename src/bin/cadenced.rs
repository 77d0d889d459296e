//! Cadence service binary.
//!
//! Usage:
//!
//! ```text
//! cadenced [settings-path]
//! ```
//!
//! The JSON settings file (default `settings.json`) must carry the watched
//! `project_gid` and `tracked_section_gid`, and an `api_token` unless the
//! `CADENCE_API_TOKEN` environment variable is set. A representative file
//! is:
//!
//! ```json
//! {
//!   "api_token": "pat-...",
//!   "project_gid": "1208840851929433",
//!   "tracked_section_gid": "1208840851929440",
//!   "poll_interval_secs": 60,
//!   "bind_addr": "0.0.0.0:8080",
//!   "database_url": "postgres://cadence@localhost/cadence"
//! }
//! ```
//!
//! Without a `database_url` the extension ledger is held in memory and does
//! not survive a restart.

use cadence::config::Settings;
use cadence::poller::Poller;
use cadence::scheduling::{
    adapters::{http::ApiTaskStore, memory::InMemoryExtensionLedger, postgres::PostgresExtensionLedger},
    ports::ExtensionLedger,
    services::{AutomationEngine, EngineConfig},
};
use cadence::webhook::{WebhookState, build_router};
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use mockable::DefaultClock;
use std::env;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{Mutex, watch};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Settings file consulted when no path argument is given.
const DEFAULT_SETTINGS_PATH: &str = "settings.json";

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings_path = env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_SETTINGS_PATH.to_owned());
    let settings = Settings::load(Path::new(&settings_path))?;
    let store = ApiTaskStore::new(settings.base_url(), settings.api_token())?;

    match settings.database_url() {
        Some(url) => {
            let manager = ConnectionManager::<PgConnection>::new(url);
            let pool = Pool::builder().build(manager)?;
            let ledger = PostgresExtensionLedger::new(pool);
            ledger.ensure_schema().await?;
            run_service(store, ledger, &settings).await
        }
        None => {
            warn!("no database_url configured; extension records will not survive a restart");
            run_service(store, InMemoryExtensionLedger::new(), &settings).await
        }
    }
}

/// Wires the engine, the webhook server, and the poller, then serves until
/// interrupted.
async fn run_service<L>(store: ApiTaskStore, ledger: L, settings: &Settings) -> Result<(), BoxError>
where
    L: ExtensionLedger + 'static,
{
    let engine_config = EngineConfig::new(
        settings.project().clone(),
        settings.tracked_section().clone(),
    );
    let engine = AutomationEngine::new(
        Arc::new(store),
        Arc::new(ledger),
        Arc::new(DefaultClock),
        engine_config,
    );
    let shared_engine = Arc::new(Mutex::new(engine));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let poller = Poller::new(settings.poll_interval());
    let poller_engine = Arc::clone(&shared_engine);
    let poller_task = tokio::spawn(async move { poller.run(poller_engine, shutdown_rx).await });

    let state = WebhookState::new(shared_engine, settings.tracked_section().clone());
    let router = build_router(state);
    let listener = TcpListener::bind(settings.bind_addr()).await?;
    info!("webhook server listening on {}", settings.bind_addr());
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal(shutdown_tx))
        .await?;

    poller_task.await?;
    Ok(())
}

/// Waits for an interrupt, then asks the poller to stop after its current
/// cycle.
async fn shutdown_signal(shutdown_tx: watch::Sender<bool>) {
    if tokio::signal::ctrl_c().await.is_err() {
        warn!("could not listen for the interrupt signal; shutting down");
    }
    info!("shutdown requested; the in-flight cycle finishes first");
    if shutdown_tx.send(true).is_err() {
        warn!("poller already stopped");
    }
}
