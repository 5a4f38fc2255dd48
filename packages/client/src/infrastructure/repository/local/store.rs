use std::marker::PhantomData;

use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension, params};
use serde_json::Value;

use super::{SharedConnection, storage_error, with_connection};
use crate::domain::{Adapter, AttributeFilter, Record, RepositoryError};

/// Object store for one entity type inside a [`super::LocalDatabase`]
pub struct LocalStore<T> {
    conn: SharedConnection,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> LocalStore<T> {
    pub(super) fn new(conn: SharedConnection) -> Self {
        Self {
            conn,
            _record: PhantomData,
        }
    }

    async fn put_all(&self, entities: Vec<T>) -> Result<Vec<T>, RepositoryError> {
        with_connection(&self.conn, move |conn| {
            for entity in &entities {
                let body = serde_json::to_string(entity)
                    .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
                conn.execute(
                    &format!(
                        "INSERT OR REPLACE INTO \"{}\" (id, body) VALUES (?1, ?2)",
                        T::COLLECTION
                    ),
                    params![sql_key(entity.key())?, body],
                )
                .map_err(storage_error)?;
            }
            tracing::debug!("Stored {} record(s) in '{}'", entities.len(), T::COLLECTION);
            Ok(entities)
        })
        .await
    }
}

/// SQLite integers are signed
fn sql_key(id: u64) -> Result<i64, RepositoryError> {
    i64::try_from(id).map_err(|_| RepositoryError::Storage(format!("id {id} is out of range")))
}

fn decode<T: Record>(body: &str) -> Result<T, RepositoryError> {
    serde_json::from_str(body).map_err(|e| RepositoryError::Serialization(e.to_string()))
}

fn select_bodies(conn: &Connection, table: &str) -> Result<Vec<String>, RepositoryError> {
    let mut stmt = conn
        .prepare(&format!("SELECT body FROM \"{table}\" ORDER BY id"))
        .map_err(storage_error)?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .map_err(storage_error)?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .map_err(storage_error)
}

/// Every filter key must resolve to a value equal to the expected string.
/// Non-string values compare by their JSON text, so `id=2` matches `2`.
fn matches_filter(value: &Value, filter: &AttributeFilter) -> bool {
    filter.iter().all(|(key, expected)| {
        let pointer = format!("/{}", key.replace('.', "/"));
        match value.pointer(&pointer) {
            Some(Value::String(s)) => s == expected,
            Some(other) => other.to_string() == *expected,
            None => false,
        }
    })
}

#[async_trait]
impl<T: Record> Adapter<T> for LocalStore<T> {
    async fn add(&self, entities: Vec<T>) -> Result<Vec<T>, RepositoryError> {
        self.put_all(entities).await
    }

    async fn update(&self, entities: Vec<T>) -> Result<Vec<T>, RepositoryError> {
        self.put_all(entities).await
    }

    async fn get(&self, id: u64) -> Result<T, RepositoryError> {
        with_connection(&self.conn, move |conn| {
            let body: Option<String> = conn
                .query_row(
                    &format!("SELECT body FROM \"{}\" WHERE id = ?1", T::COLLECTION),
                    params![sql_key(id)?],
                    |row| row.get(0),
                )
                .optional()
                .map_err(storage_error)?;

            match body {
                Some(body) => decode(&body),
                None => Err(RepositoryError::NotFound {
                    collection: T::COLLECTION,
                    id,
                }),
            }
        })
        .await
    }

    async fn get_all(&self) -> Result<Vec<T>, RepositoryError> {
        with_connection(&self.conn, |conn| {
            select_bodies(conn, T::COLLECTION)?
                .iter()
                .map(|body| decode(body))
                .collect()
        })
        .await
    }

    async fn get_by_attributes(&self, filter: &AttributeFilter) -> Result<Vec<T>, RepositoryError> {
        let filter = filter.clone();
        with_connection(&self.conn, move |conn| {
            let mut matched = Vec::new();
            for body in select_bodies(conn, T::COLLECTION)? {
                let value: Value = serde_json::from_str(&body)
                    .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
                if matches_filter(&value, &filter) {
                    matched.push(
                        serde_json::from_value(value)
                            .map_err(|e| RepositoryError::Serialization(e.to_string()))?,
                    );
                }
            }
            Ok(matched)
        })
        .await
    }

    async fn remove(&self, id: u64) -> Result<(), RepositoryError> {
        with_connection(&self.conn, move |conn| {
            conn.execute(
                &format!("DELETE FROM \"{}\" WHERE id = ?1", T::COLLECTION),
                params![sql_key(id)?],
            )
            .map_err(storage_error)?;
            Ok(())
        })
        .await
    }
}
