// API endpoints, relative to the configured server url
pub const CHAT_STREAM_PATH: &str = "/api/chat/stream";
pub const SETTINGS_PATH: &str = "/api/settings";
pub const SOURCES_PATH: &str = "/api/documents/sources";
pub const UPLOAD_URL_PATH: &str = "/api/documents/upload_url";
pub const UPLOAD_FILES_PATH: &str = "/api/documents/upload_files";
pub const DELETE_SOURCE_PATH: &str = "/api/documents/delete";

// Chat text
pub const BOT_PLACEHOLDER: &str = "Thinking...";
pub const FLOW_DEFAULT: &str = "Processing...";
pub const STATUS_IDLE: &str = "Idle";
pub const STATUS_ERROR: &str = "Error";
pub const MALFORMED_EVENT_MESSAGE: &str = "Error receiving response.";
pub const CONNECTION_ERROR_MESSAGE: &str = "Connection error.";

// Panel text
pub const SERVER_UNREACHABLE: &str = "Error connecting to server.";

// Form limits, matching the backend's validation
pub const TEMPERATURE_MAX_TENTHS: u8 = 10;
pub const MAX_ITERATIONS_MIN: u32 = 1;
pub const MAX_ITERATIONS_MAX: u32 = 10;
pub const MAX_DEPTH_MAX: u32 = 10;
pub const DEFAULT_MAX_DEPTH: u32 = 2;
pub const ALLOWED_UPLOAD_EXTENSIONS: [&str; 3] = ["pdf", "txt", "md"];

pub const HEADER_TITLE: &str = "codegen-chat";
