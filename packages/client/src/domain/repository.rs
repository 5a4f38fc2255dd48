//! Persistence contracts.
//!
//! The domain defines the traits; `infrastructure::repository` provides the
//! local (SQLite) and remote (REST) implementations.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

use super::{RepositoryError, User, Username};

/// Attribute equality filter used by [`Adapter::get_by_attributes`].
///
/// Keys may be dotted paths into nested objects, e.g. `user.id`.
pub type AttributeFilter = BTreeMap<String, String>;

/// An entity that can be stored by an [`Adapter`]
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Name of the object store holding this entity type
    const COLLECTION: &'static str;

    /// Primary key
    fn key(&self) -> u64;
}

/// Uniform CRUD surface over either persistence backend
#[async_trait]
pub trait Adapter<T: Record>: Send + Sync {
    /// Upsert entities by id and return what the backend stored.
    ///
    /// Fails as a whole on the first failing entity.
    async fn add(&self, entities: Vec<T>) -> Result<Vec<T>, RepositoryError>;

    /// Replace existing entities
    async fn update(&self, entities: Vec<T>) -> Result<Vec<T>, RepositoryError>;

    async fn get(&self, id: u64) -> Result<T, RepositoryError>;

    async fn get_all(&self) -> Result<Vec<T>, RepositoryError>;

    async fn get_by_attributes(&self, filter: &AttributeFilter) -> Result<Vec<T>, RepositoryError>;

    async fn remove(&self, id: u64) -> Result<(), RepositoryError>;
}

/// Backend-specific user operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserBackend: Send + Sync {
    /// Resolve a user from its credentials.
    ///
    /// # Errors
    ///
    /// `RepositoryError::InvalidCredentials` when no user matches
    async fn authenticate(&self, username: &Username, password: &str)
    -> Result<User, RepositoryError>;

    async fn get_by_username(&self, username: &Username) -> Result<Option<User>, RepositoryError>;

    async fn add_users(&self, users: Vec<User>) -> Result<Vec<User>, RepositoryError>;
}
