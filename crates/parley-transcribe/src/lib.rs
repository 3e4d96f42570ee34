//! Speech-to-text adapter.
//!
//! Telegram delivers voice notes as Opus audio in an OGG container. The
//! adapter decodes that to PCM, re-encodes it as WAV in memory, and submits
//! the result to the external transcription service. Nothing touches disk;
//! all intermediate buffers are request-scoped.

pub mod decode;
pub mod whisper_api;

use async_trait::async_trait;

use parley_core::error::Result;

pub use whisper_api::WhisperApiTranscription;

/// Converts a compressed voice recording into recognized text.
#[async_trait]
pub trait Transcription: Send + Sync {
    /// Transcribe an OGG/Opus voice payload.
    async fn transcribe(&self, audio: &[u8]) -> Result<String>;
}
