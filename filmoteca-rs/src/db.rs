//! SQLite storage: pool construction, schema bootstrap and the shared error type.
//!
//! Both collections keep their historical table and column names (`catalogo`,
//! `usuarios`, `nombre`, ...) so an existing database can be opened as-is.
//! Identifiers are `INTEGER PRIMARY KEY` with a range check, which makes the
//! schema the single authority on id uniqueness.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("record not found")]
    NotFound,
    #[error("password hashing failed: {0}")]
    Credential(String),
    #[error("blocking task failed: {0}")]
    Blocking(#[from] tokio::task::JoinError),
}

const CREATE_CATALOGUE: &str = "CREATE TABLE IF NOT EXISTS catalogo (
    id INTEGER PRIMARY KEY CHECK (id BETWEEN 10000 AND 99999),
    nombre TEXT NOT NULL,
    img TEXT NOT NULL,
    descripcion TEXT NOT NULL,
    aclamado INTEGER NOT NULL DEFAULT 0
)";

const CREATE_ACCOUNTS: &str = "CREATE TABLE IF NOT EXISTS usuarios (
    id INTEGER PRIMARY KEY CHECK (id BETWEEN 10000 AND 99999),
    nombre TEXT NOT NULL,
    apellido TEXT NOT NULL,
    email TEXT NOT NULL,
    password TEXT NOT NULL,
    fechaNacimiento TEXT NOT NULL,
    pais TEXT NOT NULL,
    terminos INTEGER NOT NULL DEFAULT 0,
    role_id INTEGER NOT NULL DEFAULT 1
)";

const CREATE_ACCOUNTS_EMAIL_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS usuarios_email_idx ON usuarios (email)";

/// Open the process-wide pool. The database file is created when missing.
pub async fn connect(config: &DatabaseConfig) -> Result<SqlitePool, StoreError> {
    let options = SqliteConnectOptions::from_str(&config.url)?.create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Create both tables if they do not exist yet. Safe to run on every start.
pub async fn migrate(pool: &SqlitePool) -> Result<(), StoreError> {
    for statement in [CREATE_CATALOGUE, CREATE_ACCOUNTS, CREATE_ACCOUNTS_EMAIL_INDEX] {
        sqlx::query(statement).execute(pool).await?;
    }
    info!("database schema ready");
    Ok(())
}

pub async fn ping(pool: &SqlitePool) -> Result<(), StoreError> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// True when the error is a uniqueness violation, which for both tables can
/// only come from the primary key.
pub fn is_unique_violation(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db_error) => db_error.is_unique_violation(),
        _ => false,
    }
}

#[cfg(test)]
pub(crate) async fn memory_pool() -> anyhow::Result<SqlitePool> {
    // A single never-recycled connection keeps the in-memory database alive.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;
    migrate(&pool).await?;
    Ok(pool)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use anyhow::Result;

    use super::{is_unique_violation, memory_pool, migrate, ping};

    #[tokio::test]
    async fn migrate_is_idempotent() -> Result<()> {
        let pool = memory_pool().await?;
        migrate(&pool).await?;
        ping(&pool).await?;
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_primary_key_is_reported_as_unique_violation() -> Result<()> {
        let pool = memory_pool().await?;
        let insert = "INSERT INTO catalogo (id, nombre, img, descripcion, aclamado) VALUES (?, 'a', 'a.jpg', 'a', 0)";
        sqlx::query(insert).bind(12345_i64).execute(&pool).await?;

        let error = sqlx::query(insert)
            .bind(12345_i64)
            .execute(&pool)
            .await
            .unwrap_err();
        assert!(is_unique_violation(&error));
        Ok(())
    }

    #[tokio::test]
    async fn out_of_range_id_is_not_a_unique_violation() -> Result<()> {
        let pool = memory_pool().await?;
        let error = sqlx::query(
            "INSERT INTO catalogo (id, nombre, img, descripcion, aclamado) VALUES (?, 'a', 'a.jpg', 'a', 0)",
        )
        .bind(100_i64)
        .execute(&pool)
        .await
        .unwrap_err();
        assert!(!is_unique_violation(&error));
        Ok(())
    }
}
