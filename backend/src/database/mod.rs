//! Module for database connection setup and common utilities.
//!
//! This module is responsible for initializing the database connection pool,
//! applying the embedded migrations and providing a central point for
//! database-related configurations and helpers.

use crate::config::Config;
use anyhow::Result;
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::str::FromStr;
use std::time::Duration;

pub mod models;

#[derive(Clone)]
pub struct Database {
    pub pool: SqlitePool,
}

impl Database {
    /// Initializes the database connection pool.
    pub async fn new(config: &Config) -> Result<Self> {
        Self::connect(
            &config.database_url,
            config.max_connections,
            Duration::from_secs(config.acquire_timeout_seconds),
        )
        .await
    }

    /// Opens a pool against `database_url` with foreign keys enforced.
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect_with(options)
            .await?;

        Ok(Database { pool })
    }

    /// Single-connection in-memory database with migrations applied.
    ///
    /// Every connection to `sqlite::memory:` is its own database, so the pool
    /// is pinned to one connection.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        // Closing the only connection would drop the database with it.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let db = Database { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Applies the embedded SQL migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Closes the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Database connection pool closed.");
    }
}
