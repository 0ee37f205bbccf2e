use std::sync::Arc;

use tracing::error;

use crate::db::Database;
use crate::report::{build_chat_stats_report, build_user_stats_report};
use crate::text::parse_slash_command;

pub const START_TEXT: &str =
    "Привет! Я бот для отслеживания активности. Отправляй сообщения — я буду считать их.";
pub const STATS_FAILED_TEXT: &str = "Не удалось получить статистику. Попробуйте позже.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatCommand {
    Start,
    Stats,
    UserStats,
}

impl ChatCommand {
    pub const ALL: [ChatCommand; 3] = [
        ChatCommand::Start,
        ChatCommand::Stats,
        ChatCommand::UserStats,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ChatCommand::Start => "start",
            ChatCommand::Stats => "stats",
            ChatCommand::UserStats => "userstats",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ChatCommand::Start => "Приветствие",
            ChatCommand::Stats => "Статистика по чатам",
            ChatCommand::UserStats => "Статистика по пользователям этого чата",
        }
    }
}

/// Recognize one of our commands. Commands addressed to a different bot via
/// `/cmd@other_bot` are not ours. An empty `bot_username` accepts any target.
pub fn parse_chat_command(text: &str, bot_username: &str) -> Option<ChatCommand> {
    let cmd = parse_slash_command(text)?;
    if let Some(target) = cmd.target {
        if !bot_username.is_empty() && !target.eq_ignore_ascii_case(bot_username) {
            return None;
        }
    }
    ChatCommand::ALL
        .into_iter()
        .find(|c| cmd.name.eq_ignore_ascii_case(c.name()))
}

pub async fn handle_chat_command(db: Arc<Database>, chat_id: i64, command: ChatCommand) -> String {
    let report = match command {
        ChatCommand::Start => return START_TEXT.to_string(),
        ChatCommand::Stats => build_chat_stats_report(db).await,
        ChatCommand::UserStats => build_user_stats_report(db, chat_id).await,
    };
    match report {
        Ok(text) => text,
        Err(e) => {
            error!(
                "Failed to build /{} report for chat {}: {}",
                command.name(),
                chat_id,
                e
            );
            STATS_FAILED_TEXT.to_string()
        }
    }
}
