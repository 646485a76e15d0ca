// SPDX-FileCopyrightText: 2026 Icebreaker Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite-backed [`KvBackend`] for the standalone runner.
//!
//! All access goes through tokio-rusqlite's single background thread. Do NOT
//! create additional Connection instances for writes.

use async_trait::async_trait;
use icebreaker_core::{IcebreakerError, KvBackend};
use rusqlite::{params, OptionalExtension};
use serde_json::Value;
use tokio_rusqlite::Connection;
use tracing::{debug, warn};

/// One-table JSON document store: `kv(key TEXT PRIMARY KEY, value TEXT)`.
#[derive(Debug)]
pub struct SqliteKv {
    conn: Connection,
}

impl SqliteKv {
    /// Open (or create) the database at `path` and prepare the schema.
    pub async fn open(path: &str) -> Result<Self, IcebreakerError> {
        let conn = Connection::open(path)
            .await
            .map_err(IcebreakerError::storage)?;
        Self::prepare(&conn).await?;
        debug!(path, "sqlite kv opened");
        Ok(Self { conn })
    }

    /// Open an in-memory database. Used in tests.
    pub async fn open_in_memory() -> Result<Self, IcebreakerError> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(IcebreakerError::storage)?;
        Self::prepare(&conn).await?;
        Ok(Self { conn })
    }

    async fn prepare(conn: &Connection) -> Result<(), IcebreakerError> {
        conn.call(|conn| -> Result<(), rusqlite::Error> {
            conn.execute_batch(
                "PRAGMA journal_mode=WAL;
                 CREATE TABLE IF NOT EXISTS kv (
                     key TEXT PRIMARY KEY,
                     value TEXT NOT NULL
                 );",
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
    }
}

#[async_trait]
impl KvBackend for SqliteKv {
    async fn get(&self, key: &str) -> Result<Option<Value>, IcebreakerError> {
        let key = key.to_string();
        let text: Option<String> = self
            .conn
            .call(move |conn| -> Result<Option<String>, rusqlite::Error> {
                conn.query_row(
                    "SELECT value FROM kv WHERE key = ?1",
                    params![key],
                    |row| row.get(0),
                )
                .optional()
            })
            .await
            .map_err(map_tr_err)?;

        match text {
            None => Ok(None),
            Some(text) => match serde_json::from_str(&text) {
                Ok(value) => Ok(Some(value)),
                Err(err) => {
                    // Treat a corrupt blob like a missing document; the
                    // caller substitutes its empty default.
                    warn!(%err, "discarding unparseable KV document");
                    Ok(None)
                }
            },
        }
    }

    async fn put(&self, key: &str, value: Value) -> Result<(), IcebreakerError> {
        let key = key.to_string();
        let text = serde_json::to_string(&value).map_err(IcebreakerError::storage)?;
        self.conn
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.execute(
                    "INSERT INTO kv (key, value) VALUES (?1, ?2)
                     ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                    params![key, text],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    async fn delete(&self, key: &str) -> Result<(), IcebreakerError> {
        let key = key.to_string();
        self.conn
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }
}

fn map_tr_err(err: tokio_rusqlite::Error<rusqlite::Error>) -> IcebreakerError {
    IcebreakerError::storage(err)
}
