//! Chat gateway double that records every call

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use linkdrop::download::{ChatGateway, MessageHandle};
use linkdrop::AppError;
use teloxide::types::{ChatId, MessageId};

/// One recorded gateway call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    SendText { chat: i64, text: String },
    EditText { message_id: i32, text: String },
    Delete { message_id: i32 },
    SendAudio { path: PathBuf, existed: bool },
    SendVideo { path: PathBuf, existed: bool },
}

#[derive(Debug, Default)]
pub struct RecordingGateway {
    calls: Mutex<Vec<GatewayCall>>,
    next_id: AtomicI32,
    fail_send_text: bool,
    fail_edits: bool,
    fail_uploads: bool,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// `send_text` fails, so a job never gets a status message
    pub fn failing_send_text(mut self) -> Self {
        self.fail_send_text = true;
        self
    }

    /// Edits and deletes fail
    pub fn failing_edits(mut self) -> Self {
        self.fail_edits = true;
        self
    }

    /// `send_audio` and `send_video` fail
    pub fn failing_uploads(mut self) -> Self {
        self.fail_uploads = true;
        self
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Texts shown in the chat in order, sent messages and edits alike
    pub fn texts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                GatewayCall::SendText { text, .. } | GatewayCall::EditText { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn last_text(&self) -> Option<String> {
        self.texts().pop()
    }

    pub fn edits_starting_with(&self, prefix: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                GatewayCall::EditText { text, .. } if text.starts_with(prefix) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn uploads(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, GatewayCall::SendAudio { .. } | GatewayCall::SendVideo { .. }))
            .count()
    }

    fn record(&self, call: GatewayCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn rejected(what: &str) -> AppError {
        AppError::Gateway(format!("{} rejected by test gateway", what))
    }
}

#[async_trait]
impl ChatGateway for RecordingGateway {
    async fn send_text(&self, chat: ChatId, text: &str) -> Result<MessageHandle, AppError> {
        self.record(GatewayCall::SendText {
            chat: chat.0,
            text: text.to_string(),
        });
        if self.fail_send_text {
            return Err(Self::rejected("send_text"));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(MessageHandle {
            chat_id: chat,
            message_id: MessageId(id),
        })
    }

    async fn edit_text(&self, message: MessageHandle, text: &str) -> Result<(), AppError> {
        self.record(GatewayCall::EditText {
            message_id: message.message_id.0,
            text: text.to_string(),
        });
        if self.fail_edits {
            return Err(Self::rejected("edit_text"));
        }
        Ok(())
    }

    async fn delete_message(&self, message: MessageHandle) -> Result<(), AppError> {
        self.record(GatewayCall::Delete {
            message_id: message.message_id.0,
        });
        if self.fail_edits {
            return Err(Self::rejected("delete_message"));
        }
        Ok(())
    }

    async fn send_audio(&self, _chat: ChatId, path: &Path) -> Result<(), AppError> {
        self.record(GatewayCall::SendAudio {
            path: path.to_path_buf(),
            existed: path.exists(),
        });
        if self.fail_uploads {
            return Err(Self::rejected("send_audio"));
        }
        Ok(())
    }

    async fn send_video(&self, _chat: ChatId, path: &Path) -> Result<(), AppError> {
        self.record(GatewayCall::SendVideo {
            path: path.to_path_buf(),
            existed: path.exists(),
        });
        if self.fail_uploads {
            return Err(Self::rejected("send_video"));
        }
        Ok(())
    }
}
