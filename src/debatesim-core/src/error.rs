//! Error types for the debate system.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DebateError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("OpenAI API error: {0}")]
    Backend(#[from] async_openai::error::OpenAIError),

    #[error("Malformed completion response: {0}")]
    MalformedResponse(String),

    #[error("Invalid completion request: {0}")]
    InvalidRequest(String),

    #[error("No model configured and none supplied for this call")]
    MissingModel,
}
