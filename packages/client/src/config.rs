//! Client configuration.
//!
//! Loaded from an optional TOML file; every field has a default, and the
//! command line overrides whatever the file sets.
//!
//! ```toml
//! server = "http://127.0.0.1:8080"
//! mode = "local"
//! db_path = "/tmp/hiroba.db"
//! pulse_interval_secs = 30
//!
//! [templates]
//! user_item = "* {{username}}"
//! chat_message = "[{{time}}] {{user.username}}: {{content}}"
//! ```

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use thiserror::Error;

use crate::ui::view::{DEFAULT_CHAT_MESSAGE_TEMPLATE, DEFAULT_USER_ITEM_TEMPLATE};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Which persistence backend the session uses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageMode {
    /// HTTP JSON API on the chat server
    #[default]
    Remote,
    /// Embedded SQLite database
    Local,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    /// Chat server origin, e.g. `http://127.0.0.1:8080`
    #[serde(default = "default_server")]
    pub server: String,

    #[serde(default)]
    pub mode: StorageMode,

    /// SQLite file used in local mode
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Value of the client token header sent with every API request
    #[serde(default = "default_client_token")]
    pub client_token: String,

    #[serde(default = "default_pulse_interval")]
    pub pulse_interval_secs: u64,

    #[serde(default)]
    pub templates: TemplateConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TemplateConfig {
    #[serde(default = "default_user_item")]
    pub user_item: String,

    #[serde(default = "default_chat_message")]
    pub chat_message: String,
}

fn default_server() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_db_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("hiroba").join("hiroba.db"))
        .unwrap_or_else(|| PathBuf::from("./hiroba.db"))
}

fn default_client_token() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn default_pulse_interval() -> u64 {
    30
}

fn default_user_item() -> String {
    DEFAULT_USER_ITEM_TEMPLATE.to_string()
}

fn default_chat_message() -> String {
    DEFAULT_CHAT_MESSAGE_TEMPLATE.to_string()
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            user_item: default_user_item(),
            chat_message: default_chat_message(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            mode: StorageMode::default(),
            db_path: default_db_path(),
            client_token: default_client_token(),
            pulse_interval_secs: default_pulse_interval(),
            templates: TemplateConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Load from `path`, or use defaults when no file is given
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                tracing::debug!("Loaded config from {}", path.display());
                Self::from_toml_str(&text)?
            }
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pulse_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "pulse_interval_secs must be at least 1".to_string(),
            ));
        }
        if !self.server.starts_with("http://") && !self.server.starts_with("https://") {
            return Err(ConfigError::Invalid(format!(
                "server must be an http(s) URL (got {})",
                self.server
            )));
        }
        Ok(())
    }

    pub fn pulse_interval(&self) -> Duration {
        Duration::from_secs(self.pulse_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        // テスト項目: 空の設定ファイルではすべてデフォルト値になる
        // when (操作):
        let config = ClientConfig::from_toml_str("").unwrap();

        // then (期待する結果):
        assert_eq!(config.server, "http://127.0.0.1:8080");
        assert_eq!(config.mode, StorageMode::Remote);
        assert_eq!(config.pulse_interval(), Duration::from_secs(30));
        assert_eq!(config.templates, TemplateConfig::default());
        assert!(!config.client_token.is_empty());
    }

    #[test]
    fn test_file_values_override_defaults() {
        // テスト項目: 設定ファイルの値がデフォルト値を上書きする
        // given (前提条件):
        let text = r#"
            server = "https://chat.example.com"
            mode = "local"
            db_path = "/tmp/chat.db"
            pulse_interval_secs = 5

            [templates]
            chat_message = "[{{time}}] {{content}}"
        "#;

        // when (操作):
        let config = ClientConfig::from_toml_str(text).unwrap();

        // then (期待する結果):
        assert_eq!(config.server, "https://chat.example.com");
        assert_eq!(config.mode, StorageMode::Local);
        assert_eq!(config.db_path, PathBuf::from("/tmp/chat.db"));
        assert_eq!(config.pulse_interval_secs, 5);
        assert_eq!(config.templates.chat_message, "[{{time}}] {{content}}");
        assert_eq!(config.templates.user_item, DEFAULT_USER_ITEM_TEMPLATE);
    }

    #[test]
    fn test_unknown_mode_fails_to_parse() {
        // テスト項目: 未知のモードはパースエラーになる
        // when (操作):
        let result = ClientConfig::from_toml_str(r#"mode = "cloud""#);

        // then (期待する結果):
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_zero_pulse_interval_is_invalid() {
        // テスト項目: ハートビート間隔 0 は不正な設定として扱われる
        // given (前提条件):
        let config = ClientConfig {
            pulse_interval_secs: 0,
            ..ClientConfig::default()
        };

        // when (操作):
        let result = config.validate();

        // then (期待する結果):
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        // テスト項目: 存在しない設定ファイルは I/O エラーになる
        // when (操作):
        let result = ClientConfig::load(Some(Path::new("/nonexistent/hiroba.toml")));

        // then (期待する結果):
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_load_from_file() {
        // テスト項目: ファイルから設定を読み込める
        // given (前提条件):
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hiroba.toml");
        std::fs::write(&path, "mode = \"local\"\n").unwrap();

        // when (操作):
        let config = ClientConfig::load(Some(&path)).unwrap();

        // then (期待する結果):
        assert_eq!(config.mode, StorageMode::Local);
    }
}
