//! Local persistence backed by an embedded SQLite database.
//!
//! Each entity type lives in its own table ("object store") keyed by id,
//! with the JSON encoding of the entity as the row body.

mod database;
mod store;
mod user_backend;

pub use database::{DATABASE_VERSION, LocalDatabase};
pub use store::LocalStore;
pub use user_backend::LocalUserBackend;

use std::sync::Arc;

use rusqlite::Connection;
use tokio::sync::Mutex;

use crate::domain::RepositoryError;

type SharedConnection = Arc<Mutex<Connection>>;

fn storage_error(e: rusqlite::Error) -> RepositoryError {
    RepositoryError::Storage(e.to_string())
}

/// Run a rusqlite call on the blocking pool while holding the connection
async fn with_connection<R, F>(conn: &SharedConnection, f: F) -> Result<R, RepositoryError>
where
    F: FnOnce(&Connection) -> Result<R, RepositoryError> + Send + 'static,
    R: Send + 'static,
{
    let conn = conn.clone();
    tokio::task::spawn_blocking(move || {
        let conn = conn.blocking_lock();
        f(&conn)
    })
    .await
    .map_err(|e| RepositoryError::Storage(format!("database task failed: {e}")))?
}
