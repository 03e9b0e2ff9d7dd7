// src/logging.rs

use crate::config::Config;
use crate::errors::{ChatError, ChatResult};
use crate::models::ApiCallLog;
use flexi_logger::{FileSpec, Logger, LoggerHandle, WriteMode};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

const API_LOG_FILE: &str = "api_calls.log";

/// Starts the file logger. The terminal belongs to the UI, so nothing is
/// written to stdout or stderr while it runs.
pub fn init_logging(config: &Config) -> ChatResult<LoggerHandle> {
    Logger::try_with_str(&config.log_level)
        .map_err(|e| ChatError::config_error(format!("Invalid log level: {}", e)))?
        .log_to_file(
            FileSpec::default()
                .directory(&config.log_dir)
                .basename("codegen-chat"),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .format(flexi_logger::detailed_format)
        .start()
        .map_err(|e| ChatError::config_error(format!("Failed to start logger: {}", e)))
}

pub fn format_api_call(log: &ApiCallLog) -> String {
    format!(
        "[{}] {} - {} - Status: {} - Time: {}ms\n",
        log.timestamp.to_rfc3339(),
        log.endpoint,
        log.request_summary,
        log.response_status,
        log.response_time_ms
    )
}

/// Appends an API call record to `api_calls.log` in the log directory.
pub fn log_api_call(log_dir: &str, log: &ApiCallLog) {
    let path = Path::new(log_dir).join(API_LOG_FILE);
    let entry = format_api_call(log);

    let file = OpenOptions::new().append(true).create(true).open(&path);
    match file {
        Ok(mut file) => {
            if let Err(e) = file.write_all(entry.as_bytes()) {
                log::warn!("Failed to write to {}: {}", path.display(), e);
            }
        }
        Err(e) => log::warn!("Failed to open {}: {}", path.display(), e),
    }
}
