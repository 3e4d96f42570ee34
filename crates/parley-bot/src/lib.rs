//! Message router for the conversational relay.
//!
//! Pulls updates from Telegram over long polling, normalizes each one into
//! an [`Event`], and hands it to the [`Router`], which drives the session
//! store and the completion and transcription adapters. Each update is
//! handled in its own task; events from the same user are not serialized
//! and last-write-wins races on the session are accepted.

pub mod events;
pub mod router;

use std::sync::Arc;
use std::time::Duration;

use parley_core::error::Result;
use parley_core::types::UserId;
use parley_telegram::{TelegramClient, Update};

pub use events::{classify_text, Event, Reply};
pub use router::Router;

use router::{RESET_CALLBACK, VOICE_FAILED};

/// Delay before retrying after a failed getUpdates call.
const POLL_RETRY_DELAY: Duration = Duration::from_secs(3);

/// The long-poll dispatch loop.
pub struct Bot {
    telegram: Arc<TelegramClient>,
    router: Arc<Router>,
    poll_timeout_secs: u64,
}

impl Bot {
    /// Create a bot over an injected platform client and router.
    pub fn new(telegram: Arc<TelegramClient>, router: Arc<Router>, poll_timeout_secs: u64) -> Self {
        Self {
            telegram,
            router,
            poll_timeout_secs,
        }
    }

    /// Poll for updates forever, spawning one handler task per update.
    ///
    /// The offset advances past every fetched update whether or not its
    /// handler succeeds, so an event is delivered at most once.
    pub async fn run(&self) -> Result<()> {
        tracing::info!("Bot is running");
        let mut offset: i64 = 0;

        loop {
            let updates = match self
                .telegram
                .get_updates(offset, self.poll_timeout_secs)
                .await
            {
                Ok(updates) => updates,
                Err(e) => {
                    tracing::warn!(error = %e, "getUpdates failed; retrying");
                    tokio::time::sleep(POLL_RETRY_DELAY).await;
                    continue;
                }
            };

            for update in updates {
                offset = offset.max(update.update_id + 1);

                let telegram = Arc::clone(&self.telegram);
                let router = Arc::clone(&self.router);
                tokio::spawn(async move {
                    let update_id = update.update_id;
                    if let Err(e) = dispatch_update(telegram, router, update).await {
                        tracing::error!(update_id, error = %e, "Update handling failed");
                    }
                });
            }
        }
    }
}

/// Normalize one update into an event, route it, and send the reply.
async fn dispatch_update(
    telegram: Arc<TelegramClient>,
    router: Arc<Router>,
    update: Update,
) -> Result<()> {
    if let Some(query) = update.callback_query {
        // Stop the client-side spinner regardless of what the query holds.
        if let Err(e) = telegram.answer_callback_query(&query.id).await {
            tracing::warn!(error = %e, "answerCallbackQuery failed");
        }

        if query.data.as_deref() == Some(RESET_CALLBACK) {
            let user = UserId(query.from.id);
            let chat_id = query
                .message
                .as_ref()
                .map(|m| m.chat.id)
                .unwrap_or(query.from.id);
            let reply = router.handle(user, Event::ButtonReset).await?;
            send_reply(&telegram, chat_id, &reply).await?;
        }
        return Ok(());
    }

    let Some(message) = update.message else {
        return Ok(());
    };
    // Channel posts and service messages carry no sender; nothing to route.
    let Some(from) = message.from.as_ref() else {
        return Ok(());
    };
    let user = UserId(from.id);
    let chat_id = message.chat.id;

    let event = if let Some(voice) = &message.voice {
        tracing::debug!(user = %user, duration = voice.duration, "Fetching voice note");
        match telegram.download_voice(&voice.file_id).await {
            Ok(audio) => Event::Voice { audio },
            Err(e) => {
                tracing::error!(user = %user, error = %e, "Voice download failed");
                telegram.send_message(chat_id, VOICE_FAILED).await?;
                return Ok(());
            }
        }
    } else if let Some(text) = &message.text {
        classify_text(text)
    } else {
        // Stickers, photos, and other attachments are outside the relay.
        return Ok(());
    };

    let reply = router.handle(user, event).await?;
    send_reply(&telegram, chat_id, &reply).await
}

async fn send_reply(telegram: &TelegramClient, chat_id: i64, reply: &Reply) -> Result<()> {
    match &reply.keyboard {
        Some(keyboard) => {
            telegram
                .send_message_with_keyboard(chat_id, &reply.text, keyboard)
                .await?;
        }
        None => {
            telegram.send_message(chat_id, &reply.text).await?;
        }
    }
    Ok(())
}
