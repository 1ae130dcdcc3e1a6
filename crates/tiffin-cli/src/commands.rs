//! Commands that run against the engine.

use std::time::Duration;

use anyhow::Context;
use chrono::Utc;

use tiffin_core::{PageRequest, TiffinConfig};
use tiffin_engine::Engine;
use tiffin_engine::assignment::QueueFilter;
use tiffin_store::{JsonFileSnapshots, Store};

use crate::cli::{MaintenanceAction, QueueAction};

/// How long `serve` waits for the listener before giving up.
pub const STARTUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Opens the configured store and wires the engine over it.
///
/// Without `storage.data_file` the store lives in memory and is lost on
/// exit.
pub fn open_engine(config: &TiffinConfig) -> anyhow::Result<Engine> {
    let store = match &config.storage.data_file {
        Some(path) => {
            tracing::info!(path = %path.display(), "Opening data file");
            Store::open(JsonFileSnapshots::new(path.clone()))
                .with_context(|| format!("Failed to open data file {}", path.display()))?
        }
        None => {
            tracing::warn!("No data file configured, state will not persist");
            Store::in_memory()
        }
    };
    Ok(Engine::new(store, config))
}

/// Serves the HTTP API until Ctrl+C or SIGTERM.
///
/// Returns early with an error if the listener is not ready within
/// [`STARTUP_TIMEOUT`].
pub async fn serve(config: &TiffinConfig) -> anyhow::Result<()> {
    let engine = open_engine(config)?;
    let address = config.bind_address();
    let state = tiffin_api::AppState::new(engine);
    let service = state.service.clone();

    let server = tokio::spawn({
        let address = address.clone();
        async move { tiffin_api::serve(state, &address).await }
    });

    if let Err(e) = service.wait_ready(STARTUP_TIMEOUT).await {
        server.abort();
        return Err(e).with_context(|| format!("Server on {address} did not start"));
    }
    tracing::info!(
        %address,
        startup_ms = service.uptime().as_millis() as u64,
        "Tiffin API ready"
    );

    server
        .await
        .context("Server task panicked")?
        .with_context(|| format!("Server on {address} failed"))
}

/// Runs a queue subcommand and returns its output.
pub fn queue(engine: &Engine, action: QueueAction) -> anyhow::Result<String> {
    let assignments = engine.assignments();
    match action {
        QueueAction::List { limit } => {
            let page = assignments.queue(&QueueFilter::default(), PageRequest::new(1, limit))?;
            if page.items.is_empty() {
                return Ok("Queue is empty".to_string());
            }
            let mut lines = vec![format!(
                "{} pending, showing {}",
                page.total,
                page.items.len()
            )];
            lines.extend(page.items.iter().map(|q| {
                format!(
                    "{}  {:<18}  {:<7}  {:>4}h  subscription {}",
                    q.request.id,
                    q.request.kind.to_string(),
                    q.effective_priority.to_string(),
                    q.waiting_hours,
                    q.request.subscription
                )
            }));
            Ok(lines.join("\n"))
        }
        QueueAction::AutoAssign {
            limit,
            processed_by,
        } => {
            let report = assignments.auto_assign(limit, &processed_by)?;
            Ok(serde_json::to_string_pretty(&report)?)
        }
        QueueAction::Stats => Ok(serde_json::to_string_pretty(&assignments.stats()?)?),
    }
}

/// Runs a maintenance subcommand and returns its output.
pub fn maintenance(engine: &Engine, action: MaintenanceAction) -> anyhow::Result<String> {
    match action {
        MaintenanceAction::Expire => {
            let today = Utc::now().date_naive();
            let expired = engine.subscriptions().expire_due(today)?;
            Ok(format!("Expired {} subscription(s)", expired.len()))
        }
    }
}
