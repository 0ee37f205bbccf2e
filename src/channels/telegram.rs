use std::sync::Arc;

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{BotCommand, Chat, MessageId, ReplyParameters};
use tracing::{info, warn};

use crate::channel::{ChatKind, InboundEvent, Sender};
use crate::channel_adapter::ChannelAdapter;
use crate::chat_commands::ChatCommand;
use crate::error::ChatPulseError;
use crate::handler::handle_inbound_event;
use crate::runtime::AppState;
use crate::text::split_text;

pub const TELEGRAM_CHANNEL_NAME: &str = "telegram";
const TELEGRAM_MAX_MESSAGE_LEN: usize = 4096;

pub struct TelegramAdapter {
    bot: Bot,
}

impl TelegramAdapter {
    pub fn new(bot: Bot) -> Self {
        TelegramAdapter { bot }
    }
}

#[async_trait]
impl ChannelAdapter for TelegramAdapter {
    fn name(&self) -> &str {
        TELEGRAM_CHANNEL_NAME
    }

    async fn send_text(
        &self,
        chat_id: i64,
        text: &str,
        reply_to: Option<i32>,
    ) -> Result<(), String> {
        for (idx, chunk) in split_text(text, TELEGRAM_MAX_MESSAGE_LEN)
            .into_iter()
            .enumerate()
        {
            let mut req = self.bot.send_message(ChatId(chat_id), chunk);
            // Only the first chunk is threaded under the command.
            if let (0, Some(message_id)) = (idx, reply_to) {
                req = req.reply_parameters(
                    ReplyParameters::new(MessageId(message_id)).allow_sending_without_reply(),
                );
            }
            req.await.map_err(|e| {
                ChatPulseError::Telegram(format!("sendMessage failed: {e}")).to_string()
            })?;
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct TelegramRuntimeContext {
    pub bot_username: String,
}

pub fn chat_kind_of(chat: &Chat) -> ChatKind {
    if chat.is_private() {
        ChatKind::Private
    } else if chat.is_supergroup() {
        ChatKind::Supergroup
    } else if chat.is_group() {
        ChatKind::Group
    } else {
        ChatKind::Channel
    }
}

pub fn inbound_event_from_message(msg: &Message) -> InboundEvent {
    InboundEvent {
        chat_id: msg.chat.id.0,
        chat_kind: chat_kind_of(&msg.chat),
        message_id: Some(msg.id.0),
        sender: msg.from.as_ref().map(|user| Sender {
            id: user.id.0 as i64,
            display_name: user.full_name(),
        }),
        text: msg.text().map(str::to_string),
    }
}

fn command_menu() -> Vec<BotCommand> {
    ChatCommand::ALL
        .into_iter()
        .map(|c| BotCommand::new(c.name(), c.description()))
        .collect()
}

/// The bot's `@username`. Fails when Telegram rejects the token or cannot
/// be reached.
pub async fn fetch_bot_username(bot: &Bot) -> Result<String, ChatPulseError> {
    let me = bot
        .get_me()
        .await
        .map_err(|e| ChatPulseError::Telegram(format!("getMe failed: {e}")))?;
    Ok(me.user.username.clone().unwrap_or_default())
}

pub async fn start_telegram_bot(state: Arc<AppState>, bot: Bot) -> Result<(), ChatPulseError> {
    let bot_username = fetch_bot_username(&bot).await?;
    if let Err(e) = bot.set_my_commands(command_menu()).await {
        warn!("Failed to register Telegram command menu: {e}");
    }

    let ctx = TelegramRuntimeContext { bot_username };
    let adapter = Arc::new(TelegramAdapter::new(bot.clone()));
    info!(
        "Telegram adapter '{}' running as @{}",
        TELEGRAM_CHANNEL_NAME, ctx.bot_username
    );

    let handler = Update::filter_message().endpoint(handle_message);
    Dispatcher::builder(bot, handler)
        .default_handler(|_| async {})
        .dependencies(dptree::deps![state, ctx, adapter])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

async fn handle_message(
    msg: Message,
    state: Arc<AppState>,
    ctx: TelegramRuntimeContext,
    adapter: Arc<TelegramAdapter>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let event = inbound_event_from_message(&msg);
    handle_inbound_event(&state, adapter.as_ref(), &ctx.bot_username, &event).await;
    Ok(())
}
