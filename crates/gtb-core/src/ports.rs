use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageRef, Turn},
    Result,
};

/// Capabilities / feature flags of a messenger implementation.
#[derive(Clone, Copy, Debug)]
pub struct MessagingCapabilities {
    pub supports_html: bool,
    pub supports_chat_actions: bool,
    pub max_message_len: usize,
}

/// Outgoing "chat action" (typing indicator).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChatAction {
    Typing,
}

/// Cross-messenger port.
///
/// Telegram is the first implementation; the shape is kept small so future
/// adapters can fit behind the same interface with capability flags.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    fn capabilities(&self) -> MessagingCapabilities;

    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageRef>;
    async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<MessageRef>;
    async fn send_chat_action(&self, chat_id: ChatId, action: ChatAction) -> Result<()>;
}

/// Result of one exchange with the remote model: the reply text plus the
/// full updated turn sequence (prior turns + this exchange). The core stores
/// the sequence opaquely and passes it back on the next call.
#[derive(Clone, Debug)]
pub struct ChatExchange {
    pub reply: String,
    pub history: Vec<Turn>,
}

/// Port for the remote generative-language backend.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn send_message(&self, history: &[Turn], text: &str) -> Result<ChatExchange>;
}
