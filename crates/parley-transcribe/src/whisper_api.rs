//! Whisper API transcription backend.

use async_openai::config::OpenAIConfig;
use async_openai::types::{AudioInput, CreateTranscriptionRequestArgs};
use async_openai::Client;
use async_trait::async_trait;

use parley_core::error::{ParleyError, Result};

use crate::decode::ogg_opus_to_wav;
use crate::Transcription;

/// Transcription adapter backed by the OpenAI audio API.
///
/// Decodes the compressed voice payload locally, then submits the WAV bytes
/// in a single request.
pub struct WhisperApiTranscription {
    client: Client<OpenAIConfig>,
    model: String,
}

impl WhisperApiTranscription {
    /// Create an adapter using the given transcription `model`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

#[async_trait]
impl Transcription for WhisperApiTranscription {
    async fn transcribe(&self, audio: &[u8]) -> Result<String> {
        let wav = ogg_opus_to_wav(audio)?;

        let request = CreateTranscriptionRequestArgs::default()
            .file(AudioInput::from_vec_u8("voice.wav".to_string(), wav))
            .model(self.model.as_str())
            .build()
            .map_err(|e| ParleyError::Transcription(e.to_string()))?;

        tracing::debug!(model = %self.model, bytes = audio.len(), "Requesting transcription");

        let response = self
            .client
            .audio()
            .transcribe(request)
            .await
            .map_err(|e| ParleyError::Transcription(e.to_string()))?;

        tracing::debug!(text_len = response.text.len(), "Transcription received");
        Ok(response.text)
    }
}
