//! # SQLite
//!
//! Disk database.
//!
//! Core purpose is to hold users, posts and everything hanging off them, and
//! to give the claim path a lock it can rely on.
//!
//! ## Requirements
//!
//! - Small dataset, one neighborhood worth of users and posts
//! - Mostly reads (browsing), short writes
//! - Writers must serialize on claims, even across processes
//!
//! ## Implementation
//!
//! - One file, WAL journal so readers never block on the writer
//! - A fresh connection per operation, run on tokio's blocking pool
//! - `busy_timeout` on every connection, losing writers wait instead of failing
//! - Foreign keys switched on per connection (SQLite defaults them off)
use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use rusqlite::Connection;
use tokio::task::spawn_blocking;
use tracing::info;

use crate::{error::BankError, schema::SCHEMA};

pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, Debug)]
pub struct Database {
    path: Arc<PathBuf>,
    busy_timeout: Duration,
}

impl Database {
    pub async fn open(path: impl Into<PathBuf>, busy_timeout: Duration) -> Result<Self, BankError> {
        let database = Self {
            path: Arc::new(path.into()),
            busy_timeout,
        };

        database
            .call(|conn| {
                conn.execute_batch("PRAGMA journal_mode = WAL;")?;
                conn.execute_batch(SCHEMA)?;
                Ok(())
            })
            .await?;

        info!("Database ready at {}", database.path.display());

        Ok(database)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Runs `f` against a new connection on the blocking pool.
    pub async fn call<F, T>(&self, f: F) -> Result<T, BankError>
    where
        F: FnOnce(&mut Connection) -> Result<T, BankError> + Send + 'static,
        T: Send + 'static,
    {
        let database = self.clone();

        spawn_blocking(move || {
            let mut conn = database.connect()?;
            f(&mut conn)
        })
        .await?
    }

    fn connect(&self) -> Result<Connection, BankError> {
        let conn = Connection::open(self.path.as_path())?;
        conn.busy_timeout(self.busy_timeout)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        Ok(conn)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use tempfile::TempDir;

    use super::*;

    pub(crate) async fn temp_database() -> (TempDir, Database) {
        let dir = tempfile::tempdir().expect("tempdir");
        let database = Database::open(dir.path().join("food.db"), DEFAULT_BUSY_TIMEOUT)
            .await
            .expect("open database");

        (dir, database)
    }

    #[tokio::test]
    async fn open_is_idempotent() {
        let (dir, database) = temp_database().await;

        let reopened = Database::open(database.path().to_path_buf(), DEFAULT_BUSY_TIMEOUT)
            .await
            .expect("reopen database");

        let tables: i64 = reopened
            .call(|conn| {
                Ok(conn.query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
                    [],
                    |row| row.get(0),
                )?)
            })
            .await
            .expect("count tables");

        assert_eq!(tables, 6);
        drop(dir);
    }

    #[tokio::test]
    async fn foreign_keys_are_enforced() {
        let (_dir, database) = temp_database().await;

        let result = database
            .call(|conn| {
                conn.execute(
                    "INSERT INTO food_images (food_post_id, image_path, is_primary, created_at) VALUES (999, 'x.png', 1, '2025-01-01')",
                    [],
                )?;
                Ok(())
            })
            .await;

        assert!(matches!(result, Err(BankError::Sqlite(_))));
    }
}
