//! Event routing and the conversation turn pipeline.

use std::sync::Arc;

use parley_completion::Completion;
use parley_core::error::Result;
use parley_core::types::{ChatTurn, UserId};
use parley_session::SessionStore;
use parley_transcribe::Transcription;

use crate::events::{Event, Reply};

/// Greeting sent in response to the start command.
pub const GREETING: &str = "Hi! I'm your AI assistant. Ask me anything.";
/// Label of the reset inline button.
pub const RESET_BUTTON_LABEL: &str = "Reset Memory";
/// Callback token carried by the reset inline button.
pub const RESET_CALLBACK: &str = "reset";
/// Acknowledgement after clearing a session.
pub const RESET_ACK: &str = "\u{2705} Memory cleared.";
/// Generic user-facing message for a failed completion.
pub const COMPLETION_FAILED: &str = "\u{26a0}\u{fe0f} Error occurred. Try again.";
/// Generic user-facing message for an unprocessable voice note.
pub const VOICE_FAILED: &str = "\u{274c} Couldn't process voice message.";

/// Dispatches normalized events to the session store and the completion and
/// transcription adapters.
///
/// All collaborators are injected at construction; the router holds no
/// platform handles and no per-turn state of its own.
pub struct Router {
    store: Arc<dyn SessionStore>,
    completion: Arc<dyn Completion>,
    transcription: Arc<dyn Transcription>,
}

impl Router {
    /// Create a router over the given collaborators.
    pub fn new(
        store: Arc<dyn SessionStore>,
        completion: Arc<dyn Completion>,
        transcription: Arc<dyn Transcription>,
    ) -> Self {
        Self {
            store,
            completion,
            transcription,
        }
    }

    /// Handle one inbound event for `user`, producing exactly one reply.
    ///
    /// Service failures (completion, transcription, audio decode) are
    /// absorbed into generic replies; session-store failures propagate and
    /// abort the event.
    pub async fn handle(&self, user: UserId, event: Event) -> Result<Reply> {
        match event {
            Event::Start => Ok(Reply::with_button(
                GREETING,
                RESET_BUTTON_LABEL,
                RESET_CALLBACK,
            )),
            Event::Reset | Event::ButtonReset => {
                self.store.clear(user).await?;
                tracing::info!(user = %user, "Session cleared");
                Ok(Reply::text(RESET_ACK))
            }
            Event::Text { text } => self.text_turn(user, text).await,
            Event::Voice { audio } => match self.transcription.transcribe(&audio).await {
                Ok(text) => {
                    tracing::info!(user = %user, text_len = text.len(), "Voice note transcribed");
                    self.text_turn(user, text).await
                }
                Err(e) => {
                    tracing::error!(user = %user, error = %e, "Voice processing failed");
                    Ok(Reply::text(VOICE_FAILED))
                }
            },
        }
    }

    /// Run one conversation turn.
    ///
    /// The session is persisted exactly once per turn, after the completion
    /// attempt: with the assistant's reply appended on success, or with just
    /// the user's message on failure so the next turn retries with the same
    /// unanswered context.
    async fn text_turn(&self, user: UserId, text: String) -> Result<Reply> {
        let mut session = self.store.load(user).await?;
        session.push(ChatTurn::user(text));

        match self.completion.complete(&session).await {
            Ok(reply) => {
                session.push(ChatTurn::assistant(reply.clone()));
                self.store.save(user, &session).await?;
                Ok(Reply::text(reply))
            }
            Err(e) => {
                tracing::error!(user = %user, error = %e, "Completion failed");
                self.store.save(user, &session).await?;
                Ok(Reply::text(COMPLETION_FAILED))
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
