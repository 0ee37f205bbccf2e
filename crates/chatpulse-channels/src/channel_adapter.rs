use async_trait::async_trait;

#[async_trait]
pub trait ChannelAdapter: Send + Sync {
    /// Unique name, e.g. "telegram".
    fn name(&self) -> &str;

    /// Send text to a chat, optionally as a reply to one of its messages.
    async fn send_text(
        &self,
        chat_id: i64,
        text: &str,
        reply_to: Option<i32>,
    ) -> Result<(), String>;
}
