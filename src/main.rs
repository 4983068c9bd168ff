use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use dotenvy::dotenv;
use teloxide::prelude::*;
use teloxide::types::{ChatId, UserId};

use linkdrop::cli::{Cli, Commands};
use linkdrop::console::ConsoleGateway;
use linkdrop::core::{config, init_logger, log_startup_configuration};
use linkdrop::download::ytdlp::{self, YtDlpRunner};
use linkdrop::download::{
    DownloadOrchestrator, JobOutcome, MediaMode, OrchestratorConfig, ProgressParser, SessionStore,
};
use linkdrop::telegram::{create_bot, schema, setup_bot_commands, HandlerDeps, TelegramGateway};

/// Main entry point for the Telegram bot
///
/// Parses CLI arguments and dispatches to appropriate subcommand.
///
/// # Errors
/// Returns an error if initialization fails (logging, missing token, bot creation).
#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env if present, before any config is read
    let _ = dotenv();

    let cli = Cli::parse_args();

    // Jobs run on spawned tasks; make their panics visible in the log
    std::panic::set_hook(Box::new(|panic_info| {
        log::error!("Panic caught: {:?}", panic_info);
        if let Some(location) = panic_info.location() {
            log::error!("Panic at {}:{}:{}", location.file(), location.line(), location.column());
        }
    }));

    // Initialize logger (console + file)
    init_logger(&config::LOG_FILE_PATH)?;

    match cli.command {
        Some(Commands::Run) | None => run_bot().await,
        Some(Commands::Download { url, mode, output }) => run_cli_download(url, mode, PathBuf::from(output)).await,
        Some(Commands::CheckYtdlp) => {
            ytdlp::print_ytdlp_version().await?;
            Ok(())
        }
    }
}

/// Runs the bot in long polling mode until Ctrl+C
async fn run_bot() -> Result<()> {
    log::info!("Starting bot...");

    let token = config::BOT_TOKEN.as_str();
    if token.is_empty() {
        return Err(anyhow::anyhow!("BOT_TOKEN environment variable not set"));
    }

    log_startup_configuration();

    let bot = create_bot(token)?;
    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to register bot commands: {}", e);
    }

    let orchestrator = Arc::new(DownloadOrchestrator::new(
        Arc::new(TelegramGateway::new(bot.clone())),
        Arc::new(YtDlpRunner::from_config()),
        Arc::new(SessionStore::new()),
        ProgressParser::new(),
        OrchestratorConfig::from_env(),
    ));
    let handler = schema(HandlerDeps::new(orchestrator));

    log::info!("📡 Ready to receive updates (long polling)");

    use teloxide::update_listeners::Polling;

    // Create polling listener that drops pending updates on start
    let listener = Polling::builder(bot.clone()).drop_pending_updates().build();

    Dispatcher::builder(bot, handler)
        .enable_ctrlc_handler()
        .build()
        .dispatch_with_listener(
            listener,
            LoggingErrorHandler::with_custom_text("An error from the update listener"),
        )
        .await;

    log::info!("Dispatcher shutdown gracefully");
    Ok(())
}

/// Runs one job through the orchestrator with console output
async fn run_cli_download(url: String, mode: MediaMode, output: PathBuf) -> Result<()> {
    println!("🎬 LinkDrop CLI Download");
    println!("========================");
    println!("URL: {}", url);
    println!("Mode: {}", mode);

    let user = UserId(0);
    let sessions = Arc::new(SessionStore::new());
    sessions.put(user, url);

    let orchestrator = DownloadOrchestrator::new(
        Arc::new(ConsoleGateway::new(output)),
        Arc::new(YtDlpRunner::from_config()),
        sessions,
        ProgressParser::new(),
        OrchestratorConfig::from_env(),
    );

    match orchestrator.handle_mode_selection(user, ChatId(0), mode).await {
        JobOutcome::Done { .. } => Ok(()),
        outcome => Err(anyhow::anyhow!("Download did not complete: {:?}", outcome)),
    }
}
