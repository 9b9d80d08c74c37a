//! `PostgreSQL` storage for Vibe.
//!
//! [`PostgresStore`] implements every repository trait from `vibe-core` on a
//! single `PgPool`. Queries use the runtime `sqlx::query` API with explicit
//! binds, so the crate builds without a live database.
//!
//! The two multi-row writes run inside one transaction each:
//!
//! - booking: conditional `UPDATE events SET spots_left = spots_left - n`
//!   guarded by the capacity policy, then `INSERT … ON CONFLICT DO NOTHING`
//!   on the `(event_id, user_id)` unique constraint
//! - event deletion: reservations first, then the event
//!
//! # Example
//!
//! ```no_run
//! use vibe_postgres::PostgresStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = PostgresStore::connect("postgres://localhost/vibe").await?;
//! store.migrate().await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod events;
mod reservations;
mod rows;
mod users;

use sqlx::PgPool;
use vibe_core::{Result, VibeError};

/// Repository implementations backed by a `PostgreSQL` pool.
#[derive(Clone, Debug)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Connect with default pool settings.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the connection cannot be established.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url).await.map_err(storage)?;
        Ok(Self::from_pool(pool))
    }

    /// Wrap an existing pool.
    #[must_use]
    pub const fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply the bundled migrations.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if a migration fails.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| VibeError::Storage(format!("Migration failed: {e}")))?;
        Ok(())
    }
}

pub(crate) fn storage(err: sqlx::Error) -> VibeError {
    VibeError::Storage(err.to_string())
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}
