//! [`ChatGateway`] implementation over the Telegram Bot API

use std::path::Path;

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{ChatId, InputFile};

use crate::core::error::AppError;
use crate::download::send::{ChatGateway, MessageHandle};

#[derive(Clone)]
pub struct TelegramGateway {
    bot: Bot,
}

impl TelegramGateway {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl ChatGateway for TelegramGateway {
    async fn send_text(&self, chat: ChatId, text: &str) -> Result<MessageHandle, AppError> {
        let msg = self.bot.send_message(chat, text).await?;
        Ok(MessageHandle {
            chat_id: msg.chat.id,
            message_id: msg.id,
        })
    }

    async fn edit_text(&self, message: MessageHandle, text: &str) -> Result<(), AppError> {
        match self
            .bot
            .edit_message_text(message.chat_id, message.message_id, text)
            .await
        {
            Ok(_) => Ok(()),
            // Same text as before, nothing to do
            Err(e) if e.to_string().contains("message is not modified") => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_message(&self, message: MessageHandle) -> Result<(), AppError> {
        self.bot.delete_message(message.chat_id, message.message_id).await?;
        Ok(())
    }

    async fn send_audio(&self, chat: ChatId, path: &Path) -> Result<(), AppError> {
        self.bot.send_audio(chat, InputFile::file(path.to_path_buf())).await?;
        Ok(())
    }

    async fn send_video(&self, chat: ChatId, path: &Path) -> Result<(), AppError> {
        self.bot
            .send_video(chat, InputFile::file(path.to_path_buf()))
            .supports_streaming(true)
            .await?;
        Ok(())
    }
}
