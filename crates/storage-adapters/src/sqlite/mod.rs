//! # SQLite backend
//!
//! Maps the relational tables onto the domain models. The pool lives in an
//! explicit [`Database`] handle: opened once at startup, cloned into every
//! repository, closed at shutdown.

mod threads;
mod users;

use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use domains::DomainError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{info, warn};

pub use threads::SqliteThreadRepository;
pub use users::SqliteUserRepository;

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the pool and applies pending migrations.
    ///
    /// In-memory URLs are pinned to a single long-lived connection since
    /// every SQLite connection would otherwise see its own empty database.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, DomainError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(map_sqlx)?
            .create_if_missing(true)
            .foreign_keys(true);

        let in_memory = url.contains(":memory:") || url.contains("mode=memory");
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections.max(1))
        };

        let pool = pool_options.connect_with(options).await.map_err(map_sqlx)?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| DomainError::Internal(format!("migration failed: {e}")))?;

        info!(in_memory, "database ready");
        Ok(Self { pool })
    }

    pub fn users(&self) -> SqliteUserRepository {
        SqliteUserRepository::new(self.pool.clone())
    }

    pub fn threads(&self) -> SqliteThreadRepository {
        SqliteThreadRepository::new(self.pool.clone())
    }

    /// Waits for checked-out connections to return, then closes the pool.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("database closed");
    }
}

/// Upper bound on ids bound into one `IN (...)` list, well below SQLite's
/// host parameter limit.
pub(crate) const IN_LIST_CHUNK: usize = 500;

/// Translates driver failures into domain error kinds.
pub(crate) fn map_sqlx(err: sqlx::Error) -> DomainError {
    match err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            DomainError::ConflictFailed(db.message().to_string())
        }
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            DomainError::ValidationFailed(format!("dangling reference: {}", db.message()))
        }
        e @ (sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed) => DomainError::ConnectivityFailed(e.to_string()),
        other => {
            warn!(error = %other, "unexpected database error");
            DomainError::Internal(other.to_string())
        }
    }
}

pub(crate) fn to_micros(at: DateTime<Utc>) -> i64 {
    at.timestamp_micros()
}

pub(crate) fn from_micros(micros: i64) -> Result<DateTime<Utc>, DomainError> {
    DateTime::from_timestamp_micros(micros)
        .ok_or_else(|| DomainError::Internal(format!("timestamp out of range: {micros}")))
}

pub(crate) fn to_i64(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

#[cfg(test)]
pub(crate) async fn memory_db() -> Database {
    Database::connect("sqlite::memory:", 1)
        .await
        .expect("in-memory database")
}
