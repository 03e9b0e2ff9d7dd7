// src/models.rs

use crate::constants::BOT_PLACEHOLDER;
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Who authored a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Bot,
}

/// How a turn's text should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnStyle {
    Normal,
    Pending,
    Error,
}

/// Position of a turn in the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TurnId(pub usize);

/// One message unit in the chat transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatTurn {
    pub role: Role,
    pub text: String,
    pub style: TurnStyle,
    pub timestamp: DateTime<Local>,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            style: TurnStyle::Normal,
            timestamp: Local::now(),
        }
    }

    /// The placeholder shown until the first piece of the reply arrives.
    pub fn bot_placeholder() -> Self {
        Self {
            role: Role::Bot,
            text: BOT_PLACEHOLDER.to_string(),
            style: TurnStyle::Pending,
            timestamp: Local::now(),
        }
    }
}

/// Code generation parameters accepted by `POST /api/settings`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    pub model: String,
    pub temperature: f32,
    pub max_iterations: u32,
    pub reflect: bool,
    pub framework: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UrlUploadRequest {
    pub url: String,
    pub max_depth: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteSourceRequest {
    pub source: String,
}

/// Body returned by the settings and document endpoints. Successful calls
/// carry `status`; failures carry `detail` (and sometimes `status`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerReply {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub detail: Option<Value>,
    #[serde(default)]
    pub files_processed: Option<u32>,
}

impl ServerReply {
    /// `detail` as display text. Validation failures arrive as a list of
    /// `{loc, msg, type}` objects; their messages are joined.
    pub fn detail_text(&self) -> Option<String> {
        let text = match self.detail.as_ref()? {
            Value::Null => return None,
            Value::String(s) => s.clone(),
            Value::Array(items) => items
                .iter()
                .map(|item| match item.get("msg").and_then(Value::as_str) {
                    Some(msg) => msg.to_string(),
                    None => item.to_string(),
                })
                .collect::<Vec<_>>()
                .join("; "),
            other => other.to_string(),
        };
        (!text.is_empty()).then_some(text)
    }

    pub fn status_text(&self) -> Option<String> {
        self.status.clone().filter(|s| !s.is_empty())
    }
}

/// Logs details of each API call.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiCallLog {
    pub timestamp: DateTime<Utc>,
    pub endpoint: String,
    pub request_summary: String,
    pub response_status: u16,
    pub response_time_ms: u128,
}
