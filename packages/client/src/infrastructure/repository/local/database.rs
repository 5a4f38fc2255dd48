use std::{path::Path, sync::Arc};

use rusqlite::{Connection, OpenFlags};
use tokio::sync::Mutex;

use super::{LocalStore, storage_error, with_connection};
use crate::domain::{Message, Record, RepositoryError, User};

/// Schema version stored in `PRAGMA user_version`
pub const DATABASE_VERSION: i32 = 2;

/// Versioned embedded database holding one object store per entity type
#[derive(Clone)]
pub struct LocalDatabase {
    conn: Arc<Mutex<Connection>>,
}

impl LocalDatabase {
    /// Open (or create) the database file and bring its schema up to date
    pub fn open(path: &Path) -> Result<Self, RepositoryError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .map_err(|e| RepositoryError::Storage(e.to_string()))?;
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(storage_error)?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")
            .map_err(storage_error)?;

        Self::from_connection(conn)
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self, RepositoryError> {
        let conn = Connection::open_in_memory().map_err(storage_error)?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, RepositoryError> {
        upgrade(&conn).map_err(storage_error)?;
        tracing::debug!("Local database ready (schema version {})", DATABASE_VERSION);
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Object store for one entity type
    pub fn store<T: Record>(&self) -> LocalStore<T> {
        LocalStore::new(self.conn.clone())
    }

    /// Schema version currently recorded in the file
    pub async fn version(&self) -> Result<i32, RepositoryError> {
        with_connection(&self.conn, |conn| {
            conn.query_row("PRAGMA user_version", [], |row| row.get(0))
                .map_err(storage_error)
        })
        .await
    }
}

fn upgrade(conn: &Connection) -> rusqlite::Result<()> {
    let version: i32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    if version >= DATABASE_VERSION {
        return Ok(());
    }

    for table in [User::COLLECTION, Message::COLLECTION] {
        conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS \"{table}\" (
                    id INTEGER PRIMARY KEY,
                    body TEXT NOT NULL
                )"
            ),
            [],
        )?;
    }
    conn.pragma_update(None, "user_version", DATABASE_VERSION)?;
    tracing::info!(
        "Upgraded local database from version {} to {}",
        version,
        DATABASE_VERSION
    );
    Ok(())
}
