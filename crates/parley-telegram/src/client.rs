//! HTTP client for the Bot API.

use serde::de::DeserializeOwned;
use serde_json::json;

use parley_core::error::{ParleyError, Result};

use crate::types::{ApiResponse, InlineKeyboardMarkup, Message, TelegramFile, Update};

/// Thin client over the Telegram Bot API.
///
/// All calls go through the JSON envelope; an `ok: false` response surfaces
/// as `ParleyError::Telegram` carrying the API's description.
pub struct TelegramClient {
    http: reqwest::Client,
    api_base: String,
    token: String,
}

impl TelegramClient {
    /// Create a client for the bot identified by `token`.
    pub fn new(api_base: &str, token: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }

    fn file_url(&self, file_path: &str) -> String {
        format!("{}/file/bot{}/{}", self.api_base, self.token, file_path)
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, payload: serde_json::Value) -> Result<T> {
        tracing::trace!(method, "Bot API call");
        let response = self
            .http
            .post(self.method_url(method))
            .json(&payload)
            .send()
            .await
            .map_err(|e| ParleyError::Telegram(format!("{}: {}", method, e)))?;

        let envelope: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| ParleyError::Telegram(format!("{}: {}", method, e)))?;

        if !envelope.ok {
            let description = envelope
                .description
                .unwrap_or_else(|| "request failed".to_string());
            return Err(ParleyError::Telegram(format!("{}: {}", method, description)));
        }

        envelope
            .result
            .ok_or_else(|| ParleyError::Telegram(format!("{}: response missing result", method)))
    }

    /// Fetch pending updates, long-polling for up to `timeout_secs`.
    ///
    /// `offset` should be one past the last update already handled.
    pub async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>> {
        self.call(
            "getUpdates",
            json!({
                "offset": offset,
                "timeout": timeout_secs,
                "allowed_updates": ["message", "callback_query"],
            }),
        )
        .await
    }

    /// Send a plain text message.
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<Message> {
        self.call("sendMessage", json!({ "chat_id": chat_id, "text": text }))
            .await
    }

    /// Send a text message with an inline keyboard attached.
    pub async fn send_message_with_keyboard(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: &InlineKeyboardMarkup,
    ) -> Result<Message> {
        self.call(
            "sendMessage",
            json!({ "chat_id": chat_id, "text": text, "reply_markup": keyboard }),
        )
        .await
    }

    /// Acknowledge a callback query so the client stops its spinner.
    pub async fn answer_callback_query(&self, callback_query_id: &str) -> Result<bool> {
        self.call(
            "answerCallbackQuery",
            json!({ "callback_query_id": callback_query_id }),
        )
        .await
    }

    /// Resolve a file identifier to its download path.
    pub async fn get_file(&self, file_id: &str) -> Result<TelegramFile> {
        self.call("getFile", json!({ "file_id": file_id })).await
    }

    /// Download a file's bytes given the path from [`Self::get_file`].
    pub async fn download_file(&self, file_path: &str) -> Result<Vec<u8>> {
        let response = self
            .http
            .get(self.file_url(file_path))
            .send()
            .await
            .map_err(|e| ParleyError::Telegram(format!("download: {}", e)))?;

        if !response.status().is_success() {
            return Err(ParleyError::Telegram(format!(
                "download: unexpected status {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ParleyError::Telegram(format!("download: {}", e)))?;
        Ok(bytes.to_vec())
    }

    /// Fetch a voice attachment's bytes by file identifier.
    pub async fn download_voice(&self, file_id: &str) -> Result<Vec<u8>> {
        let file = self.get_file(file_id).await?;
        let path = file
            .file_path
            .ok_or_else(|| ParleyError::Telegram("getFile: response missing file_path".into()))?;
        self.download_file(&path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_url_shape() {
        let client = TelegramClient::new("https://api.telegram.org", "123:abc");
        assert_eq!(
            client.method_url("getUpdates"),
            "https://api.telegram.org/bot123:abc/getUpdates"
        );
    }

    #[test]
    fn test_method_url_strips_trailing_slash() {
        let client = TelegramClient::new("https://api.telegram.org/", "123:abc");
        assert_eq!(
            client.method_url("sendMessage"),
            "https://api.telegram.org/bot123:abc/sendMessage"
        );
    }

    #[test]
    fn test_file_url_shape() {
        let client = TelegramClient::new("https://api.telegram.org", "123:abc");
        assert_eq!(
            client.file_url("voice/file_1.oga"),
            "https://api.telegram.org/file/bot123:abc/voice/file_1.oga"
        );
    }
}
