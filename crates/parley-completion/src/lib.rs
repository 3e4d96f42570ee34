//! Chat-completion adapter.
//!
//! Submits a fixed system instruction plus the caller's session history to
//! the external completion service and returns the generated reply text.

pub mod openai;

use async_trait::async_trait;

use parley_core::error::Result;
use parley_core::types::ChatTurn;

pub use openai::OpenAiCompletion;

/// Produces one assistant reply for an ordered conversation history.
#[async_trait]
pub trait Completion: Send + Sync {
    /// Generate the reply for `history` (oldest first). The returned text
    /// has leading and trailing whitespace trimmed.
    async fn complete(&self, history: &[ChatTurn]) -> Result<String>;
}
