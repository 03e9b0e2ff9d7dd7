// src/lib.rs

pub mod api;
pub mod app;
pub mod chat;
pub mod chat_message;
pub mod config;
pub mod constants;
pub mod documents;
pub mod errors;
pub mod events;
pub mod key_handlers;
pub mod logging;
pub mod models;
pub mod panel;
pub mod render;
pub mod settings;
pub mod status_indicator;
pub mod transcript;
pub mod ui;

pub use chat::{ChatBackend, StreamChannel, StreamHandle, StreamId, StreamingChatClient, UiHost};
pub use errors::{ChatError, ChatResult};
