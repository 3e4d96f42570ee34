//! Inbound event model and outbound reply type.
//!
//! Platform updates are normalized into [`Event`] values before routing, so
//! the router never touches platform objects. Voice payloads are downloaded
//! by the dispatch layer and carried as bytes.

use parley_telegram::{InlineKeyboardButton, InlineKeyboardMarkup};

/// A normalized inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The start command.
    Start,
    /// The reset command.
    Reset,
    /// A plain text message.
    Text { text: String },
    /// A voice note, already downloaded (OGG/Opus bytes).
    Voice { audio: Vec<u8> },
    /// Activation of the reset inline button.
    ButtonReset,
}

/// Classify message text as a command or an ordinary text event.
///
/// Commands may carry a bot mention (`/start@SomeBot`) and trailing
/// arguments; both are tolerated.
pub fn classify_text(text: &str) -> Event {
    let first = text.split_whitespace().next().unwrap_or("");
    let command = first.split('@').next().unwrap_or("");
    match command {
        "/start" => Event::Start,
        "/reset" => Event::Reset,
        _ => Event::Text {
            text: text.to_string(),
        },
    }
}

/// One outbound reply: text plus an optional inline keyboard.
#[derive(Debug, Clone)]
pub struct Reply {
    pub text: String,
    pub keyboard: Option<InlineKeyboardMarkup>,
}

impl Reply {
    /// A plain text reply.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
        }
    }

    /// A reply carrying a single inline button.
    pub fn with_button(text: impl Into<String>, label: &str, callback_data: &str) -> Self {
        Self {
            text: text.into(),
            keyboard: Some(InlineKeyboardMarkup::single(InlineKeyboardButton {
                text: label.to_string(),
                callback_data: callback_data.to_string(),
            })),
        }
    }
}
