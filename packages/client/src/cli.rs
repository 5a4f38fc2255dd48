//! Command line interface.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{ClientConfig, ConfigError, StorageMode};

#[derive(Debug, Parser)]
#[command(name = "hiroba-client", about = "Terminal chat client for Hiroba", version)]
pub struct Cli {
    /// TOML config file
    #[arg(long, env = "HIROBA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Chat server URL
    #[arg(long, env = "HIROBA_SERVER")]
    pub server: Option<String>,

    /// Keep users and messages in the local SQLite store instead of the server API
    #[arg(long)]
    pub local: bool,

    /// SQLite file used with --local
    #[arg(long, env = "HIROBA_DB_PATH")]
    pub db_path: Option<PathBuf>,

    /// Client token sent with every API request
    #[arg(long, env = "HIROBA_CLIENT_TOKEN")]
    pub client_token: Option<String>,

    #[arg(long, env = "HIROBA_USERNAME")]
    pub username: Option<String>,

    #[arg(long, env = "HIROBA_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Create the account before logging in
    #[arg(long)]
    pub register: bool,
}

/// Credentials given up front; missing values are prompted for
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginOptions {
    pub username: Option<String>,
    pub password: Option<String>,
    pub register: bool,
}

impl Cli {
    /// Load the config file and apply command line overrides
    pub fn resolve(self) -> Result<(ClientConfig, LoginOptions), ConfigError> {
        let mut config = ClientConfig::load(self.config.as_deref())?;

        if let Some(server) = self.server {
            config.server = server;
        }
        if self.local {
            config.mode = StorageMode::Local;
        }
        if let Some(db_path) = self.db_path {
            config.db_path = db_path;
        }
        if let Some(client_token) = self.client_token {
            config.client_token = client_token;
        }
        config.validate()?;

        let login = LoginOptions {
            username: self.username,
            password: self.password,
            register: self.register,
        };
        Ok((config, login))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        // テスト項目: コマンドライン引数が設定を上書きする
        // given (前提条件):
        let cli = Cli::try_parse_from([
            "hiroba-client",
            "--server",
            "https://chat.example.com",
            "--local",
            "--db-path",
            "/tmp/x.db",
            "--username",
            "alice",
            "--register",
        ])
        .unwrap();

        // when (操作):
        let (config, login) = cli.resolve().unwrap();

        // then (期待する結果):
        assert_eq!(config.server, "https://chat.example.com");
        assert_eq!(config.mode, StorageMode::Local);
        assert_eq!(config.db_path, PathBuf::from("/tmp/x.db"));
        assert_eq!(login.username.as_deref(), Some("alice"));
        assert!(login.register);
    }

    #[test]
    fn test_invalid_server_is_rejected() {
        // テスト項目: http(s) 以外のサーバー URL はエラーになる
        // given (前提条件):
        let cli = Cli::try_parse_from(["hiroba-client", "--server", "ws://localhost"]).unwrap();

        // when (操作):
        let result = cli.resolve();

        // then (期待する結果):
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }
}
