// src/errors.rs

use thiserror::Error;

/// Errors surfaced by the client outside of the chat stream itself.
///
/// Stream failures never become a `ChatError` for the caller; they are
/// rendered into the bot turn that owns the stream.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("api error: {0}")]
    Api(String),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ChatResult<T> = Result<T, ChatError>;

impl ChatError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        ChatError::Config(msg.into())
    }

    pub fn api_error(msg: impl Into<String>) -> Self {
        ChatError::Api(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        ChatError::InvalidInput(msg.into())
    }
}
