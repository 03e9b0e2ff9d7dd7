// src/events.rs

use serde::Deserialize;

/// A typed event pushed by the chat backend for one reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Progress through the backend's processing graph.
    Flow(String),
    /// A fragment to append to the reply.
    Chunk(String),
    /// The whole reply so far, replacing anything received before.
    Full(String),
    /// The backend gave up on this reply.
    Error(String),
    End,
    /// A `type` this client does not know about.
    Unknown(String),
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    content: Option<String>,
}

impl StreamEvent {
    /// Parses the JSON payload of one SSE frame.
    ///
    /// Anything that is not an object with a string `type` (and, if present,
    /// a string or null `content`) is an error.
    pub fn parse(data: &str) -> Result<Self, serde_json::Error> {
        let raw: RawEvent = serde_json::from_str(data)?;
        let content = raw.content.unwrap_or_default();

        Ok(match raw.kind.as_str() {
            "flow" => StreamEvent::Flow(content),
            "chunk" | "message_chunk" => StreamEvent::Chunk(content),
            "full" | "full_message" => StreamEvent::Full(content),
            "error" => StreamEvent::Error(content),
            "end" => StreamEvent::End,
            _ => StreamEvent::Unknown(raw.kind),
        })
    }
}
