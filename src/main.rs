use std::sync::Arc;

use chatpulse::config::Config;
use chatpulse::report::{
    build_chat_stats_report, build_user_record_report, build_user_stats_report,
};
use chatpulse::{db, logging, runtime};
use clap::{Parser, Subcommand};
use tracing::info;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const ABOUT: &str = concat!(
    "ChatPulse v",
    env!("CARGO_PKG_VERSION"),
    "\n",
    "Counts messages per user in Telegram group chats.\n",
    "\n",
    "Environment:\n",
    "  TELEGRAM_BOT_TOKEN  bot token (required to start the bot)\n",
    "  PORT                liveness HTTP port (default 8000)",
);

#[derive(Debug, Parser)]
#[command(name = "chatpulse", version = VERSION, about = ABOUT)]
struct Cli {
    #[command(subcommand)]
    command: Option<MainCommand>,
}

#[derive(Debug, Subcommand)]
enum MainCommand {
    /// Start the bot and the liveness endpoint (default)
    Start,
    /// Print chat statistics from the local store
    Stats {
        /// Show per-user counts for this chat instead of per-chat totals
        #[arg(long, allow_negative_numbers = true)]
        chat: Option<i64>,
        /// Show the count of one user in the chat given by --chat
        #[arg(long, requires = "chat")]
        user: Option<i64>,
    },
    /// Show version
    Version,
}

async fn print_stats(chat: Option<i64>, user: Option<i64>) -> anyhow::Result<()> {
    let config = Config::load()?;
    let db = Arc::new(db::Database::new(&config.data_dir)?);
    let report = match (chat, user) {
        (Some(chat_id), Some(user_id)) => build_user_record_report(db, chat_id, user_id).await,
        (Some(chat_id), None) => build_user_stats_report(db, chat_id).await,
        (None, _) => build_chat_stats_report(db).await,
    }
    .map_err(|e| anyhow::anyhow!("failed to read statistics: {e}"))?;
    println!("{report}");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(MainCommand::Start) {
        MainCommand::Start => {}
        MainCommand::Stats { chat, user } => return print_stats(chat, user).await,
        MainCommand::Version => {
            println!("chatpulse {VERSION}");
            return Ok(());
        }
    }

    let config = Config::load()?;
    if config.log_to_file {
        logging::init_logging(&config.data_dir)?;
    } else {
        logging::init_console_logging();
    }
    info!("Starting ChatPulse bot...");

    runtime::run(config).await
}
