//! Entity Service: users
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - UserService::authenticate() / register() / add_existing_users()
//!
//! ### なぜこのテストが必要か
//! - 入力値の検証がバックエンド呼び出しより前に行われることを保証
//! - 既知ユーザーの再保存でパスワードダイジェストが失われないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：認証成功、新規登録、未知ユーザーの保存
//! - 異常系：認証失敗、ユーザー名の重複、空の入力

use std::sync::Arc;

use crate::domain::{PasswordDigest, User, UserBackend, UserIdFactory, Username};

use super::error::SessionError;

/// Typed user operations over the selected backend
#[derive(Clone)]
pub struct UserService {
    backend: Arc<dyn UserBackend>,
}

impl UserService {
    pub fn new(backend: Arc<dyn UserBackend>) -> Self {
        Self { backend }
    }

    /// Resolve the user for the given credentials
    ///
    /// # Returns
    ///
    /// * `Ok(User)` - 認証成功
    /// * `Err(SessionError)` - 入力不正または認証失敗
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, SessionError> {
        let username = Username::new(username.to_string())?;
        self.backend
            .authenticate(&username, password)
            .await
            .map_err(SessionError::Authentication)
    }

    /// Create a new user with a fresh id and the hashed password
    pub async fn register(&self, username: &str, password: &str) -> Result<User, SessionError> {
        let username = Username::new(username.to_string())?;
        let digest = PasswordDigest::from_password(password)?;

        if self
            .backend
            .get_by_username(&username)
            .await
            .map_err(SessionError::Persistence)?
            .is_some()
        {
            return Err(SessionError::UsernameTaken(username.into_string()));
        }

        let user = User::new(UserIdFactory::generate(), username, Some(digest));
        let stored = self
            .backend
            .add_users(vec![user.clone()])
            .await
            .map_err(SessionError::Persistence)?;
        tracing::info!("Registered user '{}' ({})", user.username, user.id);
        Ok(stored.into_iter().next().unwrap_or(user))
    }

    /// Persist users announced by other sessions.
    ///
    /// Users already known by username are skipped so their stored
    /// password digest is kept.
    pub async fn add_existing_users(&self, users: Vec<User>) -> Result<Vec<User>, SessionError> {
        let mut unknown = Vec::new();
        for user in users {
            let known = self
                .backend
                .get_by_username(&user.username)
                .await
                .map_err(SessionError::Persistence)?;
            if known.is_none() {
                unknown.push(user.public());
            }
        }
        if unknown.is_empty() {
            return Ok(unknown);
        }
        self.backend
            .add_users(unknown)
            .await
            .map_err(SessionError::Persistence)
    }
}
