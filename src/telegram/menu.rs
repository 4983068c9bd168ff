//! Welcome text, link intake and the format selector keyboard

use once_cell::sync::Lazy;
use regex::Regex;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::download::job::MediaMode;

/// Cached regex for matching URLs
/// Compiled once at startup and reused for all requests
static URL_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://[^\s]+").expect("Failed to compile URL regex"));

pub const WELCOME_TEXT: &str = "👋 Welcome to LinkDrop!\n\n\
    I can download videos and audio from:\n\
    • YouTube & YT Shorts\n\
    • Instagram (Reels & Posts)\n\
    • X (Twitter)\n\n\
    🚀 How to use: just paste a link here and I'll do the rest!";

pub const SELECT_FORMAT_TEXT: &str = "Select format:";

/// Returns the first http(s) link in a message, if any
pub fn extract_url(text: &str) -> Option<String> {
    let candidate = URL_REGEX.find(text.trim())?.as_str();
    url::Url::parse(candidate).ok()?;
    Some(candidate.to_string())
}

/// Inline keyboard with one button per download mode
pub fn format_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![[MediaMode::Video, MediaMode::Audio]
        .into_iter()
        .map(|mode| InlineKeyboardButton::callback(mode.button_label(), mode.callback_data()))
        .collect::<Vec<_>>()])
}
