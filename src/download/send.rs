//! Outbound chat boundary used by the orchestrator
//!
//! The orchestrator only talks to the chat through [`ChatGateway`], so the
//! Telegram client, the console runner and test doubles are interchangeable.

use std::path::Path;

use async_trait::async_trait;
use teloxide::types::{ChatId, MessageId};

use crate::core::error::AppError;

/// Handle to a message the gateway sent and may later edit or delete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageHandle {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

#[async_trait]
pub trait ChatGateway: Send + Sync {
    async fn send_text(&self, chat: ChatId, text: &str) -> Result<MessageHandle, AppError>;

    async fn edit_text(&self, message: MessageHandle, text: &str) -> Result<(), AppError>;

    async fn delete_message(&self, message: MessageHandle) -> Result<(), AppError>;

    async fn send_audio(&self, chat: ChatId, path: &Path) -> Result<(), AppError>;

    async fn send_video(&self, chat: ChatId, path: &Path) -> Result<(), AppError>;
}
