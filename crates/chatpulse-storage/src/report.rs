//! Plain-text reports for the `/stats` and `/userstats` commands.
//!
//! Wording is fixed to Russian, the language the bot has always answered in.

use std::sync::Arc;

use crate::db::{call_blocking, ChatTotal, Database, EngagementRecord, UserTotal};

pub const NO_CHAT_STATS_TEXT: &str = "Нет данных для статистики.";
pub const NO_USER_STATS_TEXT: &str = "Нет данных по пользователям в этом чате.";
pub const NO_USER_RECORD_TEXT: &str = "Нет данных по этому пользователю.";

/// The chat with the highest total. Scans in the given order and only moves on
/// a strictly greater total, so the earliest chat wins a tie.
pub fn top_chat(totals: &[ChatTotal]) -> Option<&ChatTotal> {
    let mut best: Option<&ChatTotal> = None;
    for total in totals {
        match best {
            Some(current) if total.total_messages <= current.total_messages => {}
            _ => best = Some(total),
        }
    }
    best
}

pub fn format_chat_stats(totals: &[ChatTotal]) -> String {
    let Some(top) = top_chat(totals) else {
        return NO_CHAT_STATS_TEXT.to_string();
    };

    let mut out = String::from("Статистика по чатам:\n");
    for total in totals {
        out.push_str(&format!(
            "Чат: {} - Сообщений: {}, Пользователей: {}\n",
            total.chat_id, total.total_messages, total.distinct_users
        ));
    }
    out.push_str(&format!(
        "\nЛучший чат: {} с {} сообщениями.",
        top.chat_id, top.total_messages
    ));
    out
}

pub fn format_user_stats(totals: &[UserTotal]) -> String {
    if totals.is_empty() {
        return NO_USER_STATS_TEXT.to_string();
    }

    let mut out = String::from("Статистика по пользователям:\n");
    for user in totals {
        out.push_str(&format!(
            "{}: {} сообщений\n",
            user.user_name, user.message_count
        ));
    }
    out
}

pub fn format_user_record(record: Option<&EngagementRecord>) -> String {
    match record {
        Some(r) => format!("{}: {} сообщений", r.user_name, r.message_count),
        None => NO_USER_RECORD_TEXT.to_string(),
    }
}

pub async fn build_chat_stats_report(db: Arc<Database>) -> Result<String, String> {
    let totals = call_blocking(db, |d| d.chat_totals())
        .await
        .map_err(|e| e.to_string())?;
    Ok(format_chat_stats(&totals))
}

pub async fn build_user_stats_report(db: Arc<Database>, chat_id: i64) -> Result<String, String> {
    let totals = call_blocking(db, move |d| d.user_totals(chat_id))
        .await
        .map_err(|e| e.to_string())?;
    Ok(format_user_stats(&totals))
}

/// Count for a single (chat, user) pair.
pub async fn build_user_record_report(
    db: Arc<Database>,
    chat_id: i64,
    user_id: i64,
) -> Result<String, String> {
    let record = call_blocking(db, move |d| d.get_record(chat_id, user_id))
        .await
        .map_err(|e| e.to_string())?;
    Ok(format_user_record(record.as_ref()))
}
