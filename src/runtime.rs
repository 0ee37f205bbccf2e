use std::future::Future;
use std::sync::Arc;

use anyhow::anyhow;
use tracing::{error, info, warn};

use crate::config::Config;
use chatpulse_storage::db::Database;

/// Process-wide context handed to every handler.
pub struct AppState {
    pub config: Config,
    pub db: Arc<Database>,
}

/// Spawn `fut` as its own task and log how it ended. A panic or early exit
/// of one component never brings down the others.
pub fn spawn_supervised<F>(name: &'static str, fut: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    let handle = tokio::spawn(fut);
    tokio::spawn(async move {
        match handle.await {
            Ok(()) => warn!("{name} task exited"),
            Err(e) if e.is_panic() => error!("{name} task panicked: {e}"),
            Err(e) => warn!("{name} task cancelled: {e}"),
        }
    });
}

/// Start the liveness server, then the Telegram component if it has a token
/// and a usable store. Returns whether the Telegram component was started.
pub fn start_components(config: Config) -> bool {
    let web_host = config.web_host.clone();
    let web_port = config.port;
    info!("Starting liveness server on {}:{}", web_host, web_port);
    spawn_supervised("liveness", async move {
        crate::web::start_web_server(&web_host, web_port).await;
    });

    if !config.has_telegram_token() {
        error!("TELEGRAM_BOT_TOKEN is not set; the chat component will not start");
        return false;
    }

    let db = match Database::new(&config.data_dir) {
        Ok(db) => db,
        Err(e) => {
            error!(
                "Failed to open database at {}: {}; the chat component will not start",
                config.database_path().display(),
                e
            );
            return false;
        }
    };
    match db.schema_version() {
        Ok(version) => info!(
            "Database initialized at {} (schema v{})",
            config.database_path().display(),
            version
        ),
        Err(e) => warn!("Failed to read database schema version: {e}"),
    }

    let bot = teloxide::Bot::new(&config.telegram_bot_token);
    let state = Arc::new(AppState {
        config,
        db: Arc::new(db),
    });
    info!("Starting Telegram bot adapter");
    spawn_supervised("telegram", async move {
        if let Err(e) = crate::telegram::start_telegram_bot(state, bot).await {
            error!("Telegram bot stopped: {e}");
        }
    });
    true
}

pub async fn run(config: Config) -> anyhow::Result<()> {
    if !start_components(config) {
        warn!("Serving liveness only");
    }

    info!("Runtime active; waiting for Ctrl-C");
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow!("Failed to listen for Ctrl-C: {e}"))?;
    info!("Shutting down");
    Ok(())
}
