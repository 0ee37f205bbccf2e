use chatpulse_core::text::is_slash_command;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatKind {
    Private,
    Group,
    Supergroup,
    Channel,
}

impl ChatKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ChatKind::Private => "private",
            ChatKind::Group => "group",
            ChatKind::Supergroup => "supergroup",
            ChatKind::Channel => "channel",
        }
    }

    /// Only groups and supergroups are counted.
    pub fn is_group_context(self) -> bool {
        matches!(self, ChatKind::Group | ChatKind::Supergroup)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub id: i64,
    pub display_name: String,
}

/// One inbound update, reduced to what counting and commands need.
/// `text` is `None` for media, service messages and other non-text updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub chat_id: i64,
    pub chat_kind: ChatKind,
    pub message_id: Option<i32>,
    pub sender: Option<Sender>,
    pub text: Option<String>,
}

impl InboundEvent {
    pub fn command_text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| is_slash_command(t))
    }

    pub fn is_command(&self) -> bool {
        self.command_text().is_some()
    }
}
