//! Application context shared by the session controller.

use std::sync::Arc;

use crate::{
    config::{ClientConfig, StorageMode},
    domain::{Message, RealtimeChannel, RepositoryError},
    infrastructure::repository::{
        LocalDatabase, LocalUserBackend, RemoteUserBackend, RestAdapter, build_http_client,
    },
    ui::view::View,
    usecase::{MessageService, UserService},
};

/// Everything the session controller talks to, built once at startup
pub struct AppContext {
    pub user_service: UserService,
    pub message_service: MessageService,
    pub channel: Arc<dyn RealtimeChannel>,
    pub view: Box<dyn View>,
}

/// Build the entity services for the configured storage mode.
///
/// Local mode opens one SQLite database holding both object stores; remote
/// mode points both collections at the chat server.
pub fn build_services(
    config: &ClientConfig,
) -> Result<(UserService, MessageService), RepositoryError> {
    match config.mode {
        StorageMode::Local => {
            let db = LocalDatabase::open(&config.db_path)?;
            tracing::info!("Using local store at {}", config.db_path.display());
            Ok((
                UserService::new(Arc::new(LocalUserBackend::new(db.store()))),
                MessageService::new(Arc::new(db.store::<Message>())),
            ))
        }
        StorageMode::Remote => {
            let client = build_http_client(&config.client_token)?;
            let base = config.server.trim_end_matches('/');
            tracing::info!("Using remote API at {}", base);
            Ok((
                UserService::new(Arc::new(RemoteUserBackend::new(RestAdapter::new(
                    client.clone(),
                    format!("{base}/users"),
                )))),
                MessageService::new(Arc::new(RestAdapter::<Message>::new(
                    client,
                    format!("{base}/messages"),
                ))),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_build_local_services_share_one_database() {
        // テスト項目: ローカルモードでは同じ DB 上にユーザーとメッセージのストアを作る
        // given (前提条件):
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig {
            mode: StorageMode::Local,
            db_path: dir.path().join("hiroba.db"),
            ..ClientConfig::default()
        };

        // when (操作):
        let (users, messages) = build_services(&config).unwrap();
        let registered = users.register("alice", "secret").await.unwrap();
        let authenticated = users.authenticate("alice", "secret").await.unwrap();

        // then (期待する結果):
        assert_eq!(registered.id, authenticated.id);
        assert!(messages.get_all_messages().await.unwrap().is_empty());
        assert!(config.db_path.exists());
    }

    #[test]
    fn test_build_remote_services_without_network() {
        // テスト項目: リモートモードは接続せずにサービスを構築できる
        // given (前提条件):
        let config = ClientConfig::default();

        // when (操作):
        let result = build_services(&config);

        // then (期待する結果):
        assert!(result.is_ok());
    }
}
