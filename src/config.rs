use crate::errors::{ChatError, ChatResult};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
    sync::{PoisonError, RwLock},
};

pub const SERVER_URL_ENV: &str = "CODEGEN_CHAT_SERVER_URL";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub server_url: String,
    pub log_level: String,
    pub log_dir: String,
    pub default_model: String,
    pub models: Vec<String>,
    pub tick_rate_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8000".to_string(),
            log_level: "info".to_string(),
            log_dir: "logs".to_string(),
            default_model: "gemini-2.0-flash".to_string(),
            models: vec![
                "gemini-2.0-flash".to_string(),
                "gemini-2.0-flash-lite".to_string(),
            ],
            tick_rate_ms: 100,
        }
    }
}

static CONFIG: Lazy<RwLock<Config>> = Lazy::new(|| RwLock::new(Config::default()));

/// Loads the user config (creating it with defaults on first run) and
/// installs it as the global config read by `get_config`.
pub fn initialize_config() -> ChatResult<()> {
    dotenv::dotenv().ok();

    let config_path = get_config_path()?;
    let mut config = load_or_create(&config_path)?;

    if let Ok(url) = env::var(SERVER_URL_ENV) {
        config.server_url = url;
    }
    validate_config(&config)?;

    set_config(config);
    Ok(())
}

fn set_config(config: Config) {
    *CONFIG.write().unwrap_or_else(PoisonError::into_inner) = config;
}

pub fn load_or_create(config_path: &Path) -> ChatResult<Config> {
    if config_path.exists() {
        let config_str = fs::read_to_string(config_path)
            .map_err(|e| ChatError::config_error(format!("Failed to read config file: {}", e)))?;

        let config: Config = serde_json::from_str(&config_str)
            .map_err(|e| ChatError::config_error(format!("Failed to parse config: {}", e)))?;

        validate_config(&config)?;
        return Ok(config);
    }

    let config = Config::default();
    write_config(config_path, &config)?;
    Ok(config)
}

fn write_config(config_path: &Path, config: &Config) -> ChatResult<()> {
    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            ChatError::config_error(format!("Failed to create config directory: {}", e))
        })?;
    }

    let config_str = serde_json::to_string_pretty(config)?;

    fs::write(config_path, config_str)
        .map_err(|e| ChatError::config_error(format!("Failed to write config file: {}", e)))
}

fn get_config_path() -> ChatResult<PathBuf> {
    let home_dir = dirs::home_dir()
        .ok_or_else(|| ChatError::config_error("Could not determine home directory"))?;

    Ok(home_dir
        .join(".config")
        .join("codegen-chat")
        .join("config.json"))
}

pub fn validate_config(config: &Config) -> ChatResult<()> {
    let url = config.server_url.trim();
    if url.is_empty() {
        return Err(ChatError::config_error("server_url is required"));
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ChatError::config_error(
            "server_url must start with http:// or https://",
        ));
    }

    if config.models.iter().all(|m| m.trim().is_empty()) {
        return Err(ChatError::config_error("At least one model name is required"));
    }

    if config.tick_rate_ms == 0 {
        return Err(ChatError::config_error("tick_rate_ms must be greater than 0"));
    }

    if config.log_level.parse::<log::LevelFilter>().is_err() {
        return Err(ChatError::config_error(format!(
            "Unknown log level '{}'",
            config.log_level
        )));
    }

    Ok(())
}

pub fn get_config() -> Config {
    CONFIG
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_validate_config_valid() {
        let config = Config::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_config_rejects_bad_url() {
        let mut config = Config::default();
        config.server_url = "localhost:8000".to_string();
        assert!(validate_config(&config).is_err());

        config.server_url = "  ".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_config_requires_a_model() {
        let mut config = Config::default();
        config.models = vec![" ".to_string()];
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_config_rejects_unknown_log_level() {
        let mut config = Config::default();
        config.log_level = "loud".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_load_or_create_writes_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = load_or_create(&path).unwrap();
        assert_eq!(config, Config::default());
        assert!(path.exists());

        let reloaded = load_or_create(&path).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn test_load_or_create_fills_missing_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "server_url": "https://chat.internal:9000" }"#).unwrap();

        let config = load_or_create(&path).unwrap();
        assert_eq!(config.server_url, "https://chat.internal:9000");
        assert_eq!(config.tick_rate_ms, 100);
    }

    #[test]
    fn test_load_or_create_reads_default_model() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "default_model": "gemini-2.0-flash-lite" }"#).unwrap();

        let config = load_or_create(&path).unwrap();
        assert_eq!(config.default_model, "gemini-2.0-flash-lite");
        assert_eq!(config.models, Config::default().models);
    }

    #[test]
    fn test_installed_config_is_visible_globally() {
        let mut config = Config::default();
        config.server_url = "https://chat.example.test".to_string();
        set_config(config.clone());
        assert_eq!(get_config(), config);
    }

    #[test]
    fn test_load_or_create_rejects_garbage() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();

        assert!(matches!(load_or_create(&path), Err(ChatError::Config(_))));
    }
}
