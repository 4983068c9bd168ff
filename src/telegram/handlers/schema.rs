//! Dispatcher schema and handler chain builders

use std::sync::Arc;

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::{CallbackQuery, ChatId, Message};

use super::types::{HandlerDeps, HandlerError};
use crate::download::job::MediaMode;
use crate::download::orchestrator::BUSY_TEXT;
use crate::download::session::PutOutcome;
use crate::telegram::bot::Command;
use crate::telegram::menu::{extract_url, format_keyboard, SELECT_FORMAT_TEXT, WELCOME_TEXT};
use crate::telegram::Bot;

/// Creates the main dispatcher schema for the Telegram bot.
///
/// # Arguments
/// * `deps` - Handler dependencies (session store, orchestrator)
///
/// # Returns
/// The complete handler tree for the bot
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let deps_messages = deps.clone();
    let deps_callback = deps;

    dptree::entry()
        // Command handler
        .branch(command_handler())
        // Message handler for links
        .branch(message_handler(deps_messages))
        // Format selector buttons
        .branch(callback_handler(deps_callback))
}

/// Handler for /start and /help
fn command_handler() -> UpdateHandler<HandlerError> {
    Update::filter_message().branch(dptree::entry().filter_command::<Command>().endpoint(
        move |bot: Bot, msg: Message, cmd: Command| async move {
            log::info!("🎯 Received command: {:?} from chat {}", cmd, msg.chat.id.0);
            match cmd {
                Command::Start | Command::Help => {
                    bot.send_message(msg.chat.id, WELCOME_TEXT).await?;
                }
            }
            Ok(())
        },
    ))
}

/// Stores the submitted link and offers the format selector
fn message_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.text().map(|text| text.contains("http")).unwrap_or(false))
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                let Some(user) = msg.from.as_ref() else {
                    return Ok(());
                };
                let Some(url) = msg.text().and_then(extract_url) else {
                    return Ok(());
                };

                log::info!(
                    "🔗 Link from user {} (@{}): {}",
                    user.id.0,
                    user.username.as_deref().unwrap_or("-"),
                    url
                );

                match deps.sessions.put(user.id, url) {
                    PutOutcome::Busy => {
                        bot.send_message(msg.chat.id, BUSY_TEXT).await?;
                    }
                    PutOutcome::Stored | PutOutcome::Replaced => {
                        bot.send_message(msg.chat.id, SELECT_FORMAT_TEXT)
                            .reply_markup(format_keyboard())
                            .await?;
                    }
                }
                Ok(())
            }
        })
}

/// Starts a job for the pressed format button on its own task
fn callback_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_callback_query().endpoint(move |bot: Bot, q: CallbackQuery| {
        let deps = deps.clone();
        async move {
            // Stop the loading spinner on the button right away
            if let Err(e) = bot.answer_callback_query(q.id.clone()).await {
                log::debug!("Failed to answer callback query from user {}: {}", q.from.id.0, e);
            }

            let Some(mode) = q.data.as_deref().and_then(MediaMode::from_callback_data) else {
                log::debug!("Ignoring unknown callback data: {:?}", q.data);
                return Ok(());
            };

            let user = q.from.id;
            let chat = q
                .message
                .as_ref()
                .map(|m| m.chat().id)
                .unwrap_or_else(|| ChatId::from(user));

            log::info!("🎛️  User {} selected {}", user.0, mode);

            let orchestrator = Arc::clone(&deps.orchestrator);
            tokio::spawn(async move {
                orchestrator.handle_mode_selection(user, chat, mode).await;
            });
            Ok(())
        }
    })
}
