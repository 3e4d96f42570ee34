//! Typed client for the Telegram Bot API.
//!
//! Covers the handful of methods the relay needs: long-polling updates,
//! sending plain or keyboard-equipped messages, answering callback queries,
//! and fetching voice attachments.

pub mod client;
pub mod types;

pub use client::TelegramClient;
pub use types::{
    ApiResponse, CallbackQuery, Chat, InlineKeyboardButton, InlineKeyboardMarkup, Message,
    TelegramFile, Update, User, Voice,
};
