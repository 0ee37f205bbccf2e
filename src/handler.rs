use tracing::{debug, warn};

use crate::channel::InboundEvent;
use crate::channel_adapter::ChannelAdapter;
use crate::chat_commands::{handle_chat_command, parse_chat_command};
use crate::runtime::AppState;
use crate::tracker::track_message;

/// Route one inbound event: our commands get a reply, everything else is
/// offered to the engagement tracker.
pub async fn handle_inbound_event(
    state: &AppState,
    adapter: &dyn ChannelAdapter,
    bot_username: &str,
    event: &InboundEvent,
) {
    let Some(command_text) = event.command_text() else {
        track_message(state.db.clone(), event).await;
        return;
    };

    let Some(command) = parse_chat_command(command_text, bot_username) else {
        debug!("Ignoring unhandled command in chat {}", event.chat_id);
        return;
    };

    let reply = handle_chat_command(state.db.clone(), event.chat_id, command).await;
    if let Err(e) = adapter
        .send_text(event.chat_id, &reply, event.message_id)
        .await
    {
        warn!(
            "Failed to deliver /{} reply via {} to chat {}: {}",
            command.name(),
            adapter.name(),
            event.chat_id,
            e
        );
    }
}
