//! Startup helpers for the Mika bot.

use std::process::ExitCode;
use std::sync::Arc;

use thiserror::Error;

use crate::config::{BotConfig, ConfigError};
use crate::dialogue::DialogueOrchestrator;
use crate::discord::{self, MikaHandler};
use crate::llm::{CompletionBackend, CompletionError, GeminiBackend};
use crate::memory::{HistoryService, MemoryError};
use crate::scraping::{LinkPreviewService, ScrapingError};
use crate::server;

/// Errors that stop the bot from starting or keep it from running.
#[derive(Debug, Error)]
pub enum StartupError {
    /// Configuration is missing or invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// History could not be set up.
    #[error(transparent)]
    Memory(#[from] MemoryError),
    /// Link preview clients could not be built.
    #[error(transparent)]
    Scraping(#[from] ScrapingError),
    /// Completion backend could not be built.
    #[error(transparent)]
    Completion(#[from] CompletionError),
    /// Gateway connection failed.
    #[error("discord gateway error: {0}")]
    Gateway(#[from] serenity::Error),
    /// The liveness thread or runtime could not be created.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Run the bot until Ctrl+C or a gateway failure.
///
/// # Returns
/// `ExitCode::SUCCESS` on graceful shutdown, `1` on failure.
#[must_use]
pub fn run() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting Mika v{}", env!("CARGO_PKG_VERSION"));

    match start() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Mika stopped: {e}");
            ExitCode::from(1)
        }
    }
}

fn start() -> Result<(), StartupError> {
    let config = BotConfig::from_env()?;
    tracing::debug!(?config, "Loaded configuration");

    server::spawn_liveness_thread(config.port)?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run_bot(config))
}

/// Wire every component together and drive the gateway.
///
/// # Errors
/// Returns an error if a component cannot be built or the gateway fails.
pub async fn run_bot(config: BotConfig) -> Result<(), StartupError> {
    let history = HistoryService::start(&config.history).await?;
    let previews = Arc::new(LinkPreviewService::with_defaults()?);
    let backend: Arc<dyn CompletionBackend> = Arc::new(GeminiBackend::new(&config.gemini)?);
    tracing::info!("Completion model: {}", config.gemini.model);

    let dialogue = Arc::new(
        DialogueOrchestrator::new(backend, history.store())
            .with_timeout(config.completion_timeout),
    );
    let handler = MikaHandler::new(previews, dialogue);

    let result = discord::run_gateway(&config.discord_token, handler, shutdown_signal()).await;

    history.shutdown().await;
    tracing::info!("Mika signing off. See you among the stars! 💫");
    result.map_err(StartupError::from)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Ctrl+C received");
}
