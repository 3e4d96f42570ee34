//! OpenAI chat-completions backend.

use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;

use parley_core::error::{ParleyError, Result};
use parley_core::types::{ChatTurn, Role};

use crate::Completion;

/// Completion adapter backed by the OpenAI chat API.
pub struct OpenAiCompletion {
    client: Client<OpenAIConfig>,
    model: String,
    system_prompt: String,
}

impl OpenAiCompletion {
    /// Create an adapter using `model`, prepending `system_prompt` to every
    /// request.
    pub fn new(client: Client<OpenAIConfig>, model: String, system_prompt: String) -> Self {
        Self {
            client,
            model,
            system_prompt,
        }
    }
}

/// Map a system prompt plus session history to ordered request messages.
///
/// The system instruction always comes first; history order is preserved.
pub(crate) fn to_request_messages(
    system_prompt: &str,
    history: &[ChatTurn],
) -> Result<Vec<ChatCompletionRequestMessage>> {
    let mut messages: Vec<ChatCompletionRequestMessage> = Vec::with_capacity(history.len() + 1);

    messages.push(
        ChatCompletionRequestSystemMessageArgs::default()
            .content(system_prompt)
            .build()
            .map_err(|e| ParleyError::Completion(e.to_string()))?
            .into(),
    );

    for turn in history {
        let message = match turn.role {
            Role::System => ChatCompletionRequestSystemMessageArgs::default()
                .content(turn.content.as_str())
                .build()
                .map_err(|e| ParleyError::Completion(e.to_string()))?
                .into(),
            Role::User => ChatCompletionRequestUserMessageArgs::default()
                .content(turn.content.as_str())
                .build()
                .map_err(|e| ParleyError::Completion(e.to_string()))?
                .into(),
            Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                .content(turn.content.as_str())
                .build()
                .map_err(|e| ParleyError::Completion(e.to_string()))?
                .into(),
        };
        messages.push(message);
    }

    Ok(messages)
}

#[async_trait]
impl Completion for OpenAiCompletion {
    async fn complete(&self, history: &[ChatTurn]) -> Result<String> {
        let messages = to_request_messages(&self.system_prompt, history)?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(self.model.as_str())
            .messages(messages)
            .build()
            .map_err(|e| ParleyError::Completion(e.to_string()))?;

        tracing::debug!(model = %self.model, turns = history.len(), "Requesting completion");

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| ParleyError::Completion(e.to_string()))?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ParleyError::Completion("response contained no choices".into()))?;

        let reply = choice
            .message
            .content
            .map(|text| text.trim().to_string())
            .unwrap_or_default();

        if reply.is_empty() {
            return Err(ParleyError::Completion(
                "response contained no message content".into(),
            ));
        }

        tracing::debug!(reply_len = reply.len(), "Completion received");
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roles_of(messages: &[ChatCompletionRequestMessage]) -> Vec<String> {
        messages
            .iter()
            .map(|m| {
                serde_json::to_value(m).unwrap()["role"]
                    .as_str()
                    .unwrap()
                    .to_string()
            })
            .collect()
    }

    fn content_of(message: &ChatCompletionRequestMessage) -> String {
        serde_json::to_value(message).unwrap()["content"]
            .as_str()
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_system_prompt_is_first_message() {
        let history = vec![ChatTurn::user("Hello")];
        let messages = to_request_messages("You are a helpful assistant.", &history).unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(roles_of(&messages), vec!["system", "user"]);
        assert_eq!(content_of(&messages[0]), "You are a helpful assistant.");
    }

    #[test]
    fn test_history_order_preserved() {
        let history = vec![
            ChatTurn::user("first"),
            ChatTurn::assistant("second"),
            ChatTurn::user("third"),
        ];
        let messages = to_request_messages("sys", &history).unwrap();
        assert_eq!(roles_of(&messages), vec!["system", "user", "assistant", "user"]);
        assert_eq!(content_of(&messages[1]), "first");
        assert_eq!(content_of(&messages[2]), "second");
        assert_eq!(content_of(&messages[3]), "third");
    }

    #[test]
    fn test_empty_history_yields_only_system() {
        let messages = to_request_messages("sys", &[]).unwrap();
        assert_eq!(roles_of(&messages), vec!["system"]);
    }

    #[test]
    fn test_stored_system_turn_maps_to_system_role() {
        let history = vec![ChatTurn {
            role: Role::System,
            content: "extra instruction".into(),
        }];
        let messages = to_request_messages("sys", &history).unwrap();
        assert_eq!(roles_of(&messages), vec!["system", "system"]);
    }
}
