//! Console [`ChatGateway`] for the `download` subcommand
//!
//! Status messages are printed to stdout and the delivered file is copied
//! into the output directory before the orchestrator removes the artifact.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI32, Ordering};

use async_trait::async_trait;
use teloxide::types::{ChatId, MessageId};

use crate::core::error::AppError;
use crate::download::send::{ChatGateway, MessageHandle};

pub struct ConsoleGateway {
    output_dir: PathBuf,
    next_message_id: AtomicI32,
}

impl ConsoleGateway {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            next_message_id: AtomicI32::new(1),
        }
    }

    async fn deliver(&self, path: &Path) -> Result<(), AppError> {
        let file_name = path
            .file_name()
            .ok_or_else(|| AppError::Gateway(format!("{} has no file name", path.display())))?;
        fs_err::tokio::create_dir_all(&self.output_dir).await?;
        let target = self.output_dir.join(file_name);
        fs_err::tokio::copy(path, &target).await?;
        println!("✅ Saved to {}", target.display());
        Ok(())
    }
}

#[async_trait]
impl ChatGateway for ConsoleGateway {
    async fn send_text(&self, chat: ChatId, text: &str) -> Result<MessageHandle, AppError> {
        let id = self.next_message_id.fetch_add(1, Ordering::Relaxed);
        println!("{}", text);
        Ok(MessageHandle {
            chat_id: chat,
            message_id: MessageId(id),
        })
    }

    async fn edit_text(&self, _message: MessageHandle, text: &str) -> Result<(), AppError> {
        println!("{}", text);
        Ok(())
    }

    async fn delete_message(&self, _message: MessageHandle) -> Result<(), AppError> {
        Ok(())
    }

    async fn send_audio(&self, _chat: ChatId, path: &Path) -> Result<(), AppError> {
        self.deliver(path).await
    }

    async fn send_video(&self, _chat: ChatId, path: &Path) -> Result<(), AppError> {
        self.deliver(path).await
    }
}
