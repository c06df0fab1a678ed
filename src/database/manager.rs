use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, Executor, PgPool};
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from the property store
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Corrupt record {id}: {reason}")]
    CorruptRecord { id: String, reason: String },

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Schema for the `properties` table. Idempotent, so `migrate` may run on
/// every start.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS properties (
    id                  TEXT PRIMARY KEY CHECK (char_length(id) = 24),
    owner_id            TEXT NOT NULL,
    availability_status TEXT NOT NULL,
    location_state      TEXT NOT NULL,
    location_area       TEXT NOT NULL,
    property_address    TEXT NOT NULL,
    estate_name         TEXT,
    property_type       TEXT NOT NULL,
    condition           TEXT NOT NULL,
    furnishing          TEXT NOT NULL,
    bedrooms            INTEGER NOT NULL CHECK (bedrooms >= 0),
    bathrooms           INTEGER NOT NULL CHECK (bathrooms >= 0),
    toilets             INTEGER NOT NULL CHECK (toilets >= 0),
    price               NUMERIC(12, 2) NOT NULL CHECK (price > 0),
    caution_fee         NUMERIC(10, 2) CHECK (caution_fee >= 0),
    agency_fee          NUMERIC(10, 2) CHECK (agency_fee >= 0),
    other_fees          NUMERIC(10, 2) CHECK (other_fees >= 0),
    facilities          TEXT[] NOT NULL DEFAULT '{}',
    description         TEXT NOT NULL,
    listing_by          TEXT NOT NULL,
    images              TEXT[] NOT NULL DEFAULT '{}',
    view_count          BIGINT NOT NULL DEFAULT 0,
    bookmarked_by_count BIGINT NOT NULL DEFAULT 0,
    created_at          TIMESTAMPTZ NOT NULL,
    updated_at          TIMESTAMPTZ NOT NULL
);

CREATE INDEX IF NOT EXISTS properties_owner_id_idx ON properties (owner_id);
CREATE INDEX IF NOT EXISTS properties_location_idx ON properties (location_state, location_area);
CREATE INDEX IF NOT EXISTS properties_facilities_idx ON properties USING GIN (facilities);
"#;

/// Owns the Postgres connection pool for the property store.
#[derive(Clone)]
pub struct DatabaseManager {
    pool: PgPool,
}

impl DatabaseManager {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let url = config.url.as_deref().ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;
        Self::validate_url(url)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        info!("Created database pool (max {} connections)", config.max_connections);
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Only postgres URLs are accepted.
    fn validate_url(raw: &str) -> Result<(), DatabaseError> {
        let url = url::Url::parse(raw).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        match url.scheme() {
            "postgres" | "postgresql" => Ok(()),
            _ => Err(DatabaseError::InvalidDatabaseUrl),
        }
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Create the table and indexes if they do not exist yet.
    pub async fn migrate(&self) -> Result<(), DatabaseError> {
        // Simple query protocol, so the multi-statement script runs as one batch.
        self.pool.execute(SCHEMA_SQL).await?;
        info!("Property schema is up to date");
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("Closed database pool");
    }
}
