use async_trait::async_trait;

use super::LocalStore;
use crate::domain::{
    Adapter, AttributeFilter, PasswordDigest, RepositoryError, User, UserBackend, Username,
};

/// User backend over the local user store.
///
/// Passwords are kept as MD5 digests, the same form the remote API
/// receives, and compared locally.
pub struct LocalUserBackend {
    store: LocalStore<User>,
}

impl LocalUserBackend {
    pub fn new(store: LocalStore<User>) -> Self {
        Self { store }
    }

    async fn find_by_username(&self, username: &Username) -> Result<Vec<User>, RepositoryError> {
        let filter = AttributeFilter::from([(
            "username".to_string(),
            username.as_str().to_string(),
        )]);
        self.store.get_by_attributes(&filter).await
    }
}

#[async_trait]
impl UserBackend for LocalUserBackend {
    async fn authenticate(
        &self,
        username: &Username,
        password: &str,
    ) -> Result<User, RepositoryError> {
        let digest = PasswordDigest::from_password(password)
            .map_err(|_| RepositoryError::InvalidCredentials(username.to_string()))?;

        self.find_by_username(username)
            .await?
            .into_iter()
            .find(|user| user.password.as_ref() == Some(&digest))
            .ok_or_else(|| RepositoryError::InvalidCredentials(username.to_string()))
    }

    async fn get_by_username(&self, username: &Username) -> Result<Option<User>, RepositoryError> {
        Ok(self.find_by_username(username).await?.into_iter().next())
    }

    async fn add_users(&self, users: Vec<User>) -> Result<Vec<User>, RepositoryError> {
        self.store.add(users).await
    }
}
