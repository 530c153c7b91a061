//! Completion backend abstraction and the OpenAI-compatible client.
//!
//! The simulator only sees [`CompletionBackend`], so tests can swap in a
//! scripted stub instead of a live endpoint.

use crate::error::DebateError;
use crate::message::{Message, Role};

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestAssistantMessage, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessage, ChatCompletionRequestUserMessage,
    CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Response of a completion call.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CompletionResponse {
    #[serde(default)]
    pub choices: Vec<CompletionChoice>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletionChoice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl CompletionResponse {
    /// A response with a single choice carrying `text`.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            choices: vec![CompletionChoice {
                message: ChoiceMessage {
                    content: Some(text.into()),
                },
            }],
        }
    }

    /// Text of the first choice.
    ///
    /// A response without choices, or whose first choice has no text, is
    /// unusable and reported as [`DebateError::MalformedResponse`].
    pub fn text(&self) -> Result<&str, DebateError> {
        let choice = self.choices.first().ok_or_else(|| {
            DebateError::MalformedResponse("response contains no choices".to_string())
        })?;

        match choice.message.content.as_deref() {
            Some(content) if !content.is_empty() => Ok(content),
            _ => Err(DebateError::MalformedResponse(
                "first choice has no text content".to_string(),
            )),
        }
    }
}

/// Something that turns a message list into a completion.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Send `messages` and return the raw response.
    ///
    /// `model` overrides the backend's configured model for this call only.
    async fn complete(
        &self,
        model: Option<&str>,
        messages: &[Message],
        temperature: f32,
    ) -> Result<CompletionResponse, DebateError>;
}

/// Check the request shape every backend expects.
pub fn validate_messages(messages: &[Message]) -> Result<(), DebateError> {
    match messages.last() {
        None => Err(DebateError::InvalidRequest(
            "message list is empty".to_string(),
        )),
        Some(last) if last.role() != Role::User => Err(DebateError::InvalidRequest(format!(
            "last message must come from the user, got {}",
            last.role().as_str()
        ))),
        Some(_) => Ok(()),
    }
}

/// Client for any OpenAI-compatible chat-completion endpoint.
pub struct OpenAiCompletionClient {
    client: Client<OpenAIConfig>,
    default_model: Option<String>,
}

impl OpenAiCompletionClient {
    /// Create a client against `api_base`.
    ///
    /// `default_model` is used whenever a call does not name a model.
    pub fn new(
        api_base: impl Into<String>,
        api_key: impl Into<String>,
        default_model: Option<String>,
    ) -> Result<Self, DebateError> {
        let http_client = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| {
                DebateError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        let config = OpenAIConfig::new()
            .with_api_key(api_key.into())
            .with_api_base(api_base.into());

        let client = Client::with_config(config).with_http_client(http_client);

        Ok(Self {
            client,
            default_model: default_model.filter(|m| !m.trim().is_empty()),
        })
    }

    fn resolve_model<'a>(&'a self, model: Option<&'a str>) -> Result<&'a str, DebateError> {
        model
            .filter(|m| !m.trim().is_empty())
            .or(self.default_model.as_deref())
            .ok_or(DebateError::MissingModel)
    }
}

#[async_trait]
impl CompletionBackend for OpenAiCompletionClient {
    async fn complete(
        &self,
        model: Option<&str>,
        messages: &[Message],
        temperature: f32,
    ) -> Result<CompletionResponse, DebateError> {
        let model = self.resolve_model(model)?;
        validate_messages(messages)?;

        let request_messages: Vec<_> = messages.iter().map(to_request_message).collect();
        let request = CreateChatCompletionRequestArgs::default()
            .model(model)
            .temperature(temperature)
            .messages(request_messages)
            .build()?;

        debug!(model, messages = messages.len(), "sending completion request");
        let response = self.client.chat().create(request).await?;

        Ok(CompletionResponse {
            choices: response
                .choices
                .into_iter()
                .map(|choice| CompletionChoice {
                    message: ChoiceMessage {
                        content: choice.message.content,
                    },
                })
                .collect(),
        })
    }
}

fn to_request_message(message: &Message) -> ChatCompletionRequestMessage {
    let content = message.content().to_string();
    match message.role() {
        Role::System => ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
            content: content.into(),
            name: None,
        }),
        Role::User => ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
            content: content.into(),
            name: None,
        }),
        Role::Assistant => {
            ChatCompletionRequestMessage::Assistant(ChatCompletionRequestAssistantMessage {
                content: Some(content.into()),
                name: None,
                tool_calls: None,
                refusal: None,
                audio: None,
                function_call: None,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_from_first_choice() {
        let response = CompletionResponse::from_text("Lower taxes now.");
        assert_eq!(response.text().unwrap(), "Lower taxes now.");
    }

    #[test]
    fn test_text_without_choices_is_malformed() {
        let response = CompletionResponse::default();
        assert!(matches!(
            response.text(),
            Err(DebateError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_text_without_content_is_malformed() {
        let response: CompletionResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert!(matches!(
            response.text(),
            Err(DebateError::MalformedResponse(_))
        ));

        let empty = CompletionResponse::from_text("");
        assert!(empty.text().is_err());
    }

    #[test]
    fn test_validate_messages() {
        assert!(validate_messages(&[]).is_err());
        assert!(validate_messages(&[Message::system("rules"), Message::assistant("hi")]).is_err());
        assert!(validate_messages(&[Message::system("rules"), Message::user("go")]).is_ok());
    }

    #[test]
    fn test_missing_model_is_reported() {
        let client = OpenAiCompletionClient::new("http://localhost:1/v1", "key", None).unwrap();
        assert!(matches!(
            client.resolve_model(None),
            Err(DebateError::MissingModel)
        ));
        assert_eq!(client.resolve_model(Some("gpt-4o")).unwrap(), "gpt-4o");
    }

    #[test]
    fn test_per_call_model_overrides_default() {
        let client =
            OpenAiCompletionClient::new("http://localhost:1/v1", "key", Some("base".into()))
                .unwrap();
        assert_eq!(client.resolve_model(None).unwrap(), "base");
        assert_eq!(client.resolve_model(Some("other")).unwrap(), "other");
    }
}
