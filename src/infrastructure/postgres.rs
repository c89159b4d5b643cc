//! `PostgreSQL` repository implementation.
//!
//! Uses `sqlx` with a connection pool. Identifier assignment is delegated to
//! the `SERIAL` column so that concurrent inserts never collide.
//!
//! # Table Schema
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS villas (
//!     id SERIAL PRIMARY KEY,
//!     name VARCHAR(30) NOT NULL,
//!     details TEXT,
//!     rate DOUBLE PRECISION NOT NULL,
//!     sqft INTEGER NOT NULL,
//!     occupancy INTEGER NOT NULL,
//!     image_url TEXT,
//!     amenity TEXT,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```

use chrono::{DateTime, Utc};
use futures::FutureExt;
use futures::future::BoxFuture;
use sqlx::PgPool;

use crate::domain::{NewVilla, Timestamp, Villa, VillaId};
use crate::infrastructure::{RepositoryError, RepositoryResult, VillaRepository};

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS villas (\
     id SERIAL PRIMARY KEY, \
     name VARCHAR(30) NOT NULL, \
     details TEXT, \
     rate DOUBLE PRECISION NOT NULL, \
     sqft INTEGER NOT NULL, \
     occupancy INTEGER NOT NULL, \
     image_url TEXT, \
     amenity TEXT, \
     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(), \
     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW())";

const SELECT_COLUMNS: &str =
    "SELECT id, name, details, rate, sqft, occupancy, image_url, amenity, created_at, updated_at \
     FROM villas";

// =============================================================================
// Row Mapping
// =============================================================================

/// One row of the `villas` table.
#[derive(Debug, sqlx::FromRow)]
struct VillaRow {
    id: i32,
    name: String,
    details: Option<String>,
    rate: f64,
    sqft: i32,
    occupancy: i32,
    image_url: Option<String>,
    amenity: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<VillaRow> for Villa {
    type Error = RepositoryError;

    fn try_from(row: VillaRow) -> Result<Self, Self::Error> {
        if row.id <= 0 {
            return Err(RepositoryError::SerializationError(format!(
                "villa row has non-positive id {}",
                row.id
            )));
        }

        Ok(Self {
            id: VillaId::new(row.id),
            name: row.name,
            details: row.details,
            rate: row.rate,
            sqft: row.sqft,
            occupancy: row.occupancy,
            image_url: row.image_url,
            amenity: row.amenity,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn database_error(error: sqlx::Error) -> RepositoryError {
    RepositoryError::DatabaseError(error.to_string())
}

// =============================================================================
// PostgreSQL Villa Repository
// =============================================================================

/// `PostgreSQL` implementation of `VillaRepository`.
///
/// # Example
///
/// ```ignore
/// let pool = PgPool::connect("postgres://localhost/villas").await?;
/// let repository = PostgresVillaRepository::new(pool);
/// repository.ensure_schema().await?;
/// ```
#[derive(Debug, Clone)]
pub struct PostgresVillaRepository {
    pool: PgPool,
}

impl PostgresVillaRepository {
    /// Creates a new repository over the given connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the `villas` table if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DatabaseError` if the statement fails.
    pub async fn ensure_schema(&self) -> RepositoryResult<()> {
        sqlx::query(CREATE_TABLE)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;
        Ok(())
    }
}

impl VillaRepository for PostgresVillaRepository {
    fn find_all(&self) -> BoxFuture<'static, RepositoryResult<Vec<Villa>>> {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<VillaRow> = sqlx::query_as(&format!("{SELECT_COLUMNS} ORDER BY id"))
                .fetch_all(&pool)
                .await
                .map_err(database_error)?;

            rows.into_iter().map(Villa::try_from).collect()
        }
        .boxed()
    }

    fn find_by_id(&self, id: VillaId) -> BoxFuture<'static, RepositoryResult<Option<Villa>>> {
        let pool = self.pool.clone();
        async move {
            let row: Option<VillaRow> = sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE id = $1"))
                .bind(id.get())
                .fetch_optional(&pool)
                .await
                .map_err(database_error)?;

            row.map(Villa::try_from).transpose()
        }
        .boxed()
    }

    fn find_by_name(&self, name: &str) -> BoxFuture<'static, RepositoryResult<Option<Villa>>> {
        let pool = self.pool.clone();
        let name = name.trim().to_string();
        async move {
            let row: Option<VillaRow> = sqlx::query_as(&format!(
                "{SELECT_COLUMNS} WHERE LOWER(name) = LOWER($1) ORDER BY id LIMIT 1"
            ))
            .bind(&name)
            .fetch_optional(&pool)
            .await
            .map_err(database_error)?;

            row.map(Villa::try_from).transpose()
        }
        .boxed()
    }

    fn insert(
        &self,
        villa: NewVilla,
        timestamp: Timestamp,
    ) -> BoxFuture<'static, RepositoryResult<Villa>> {
        let pool = self.pool.clone();
        async move {
            let (id,): (i32,) = sqlx::query_as(
                "INSERT INTO villas \
                 (name, details, rate, sqft, occupancy, image_url, amenity, created_at, updated_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8) \
                 RETURNING id",
            )
            .bind(&villa.name)
            .bind(&villa.details)
            .bind(villa.rate)
            .bind(villa.sqft)
            .bind(villa.occupancy)
            .bind(&villa.image_url)
            .bind(&villa.amenity)
            .bind(timestamp.as_datetime())
            .fetch_one(&pool)
            .await
            .map_err(database_error)?;

            tracing::debug!(villa_id = id, "Inserted villa row");
            Ok(villa.into_villa(VillaId::new(id), timestamp))
        }
        .boxed()
    }

    fn update(&self, villa: &Villa) -> BoxFuture<'static, RepositoryResult<bool>> {
        let pool = self.pool.clone();
        let villa = villa.clone();
        async move {
            let result = sqlx::query(
                "UPDATE villas SET name = $1, details = $2, rate = $3, sqft = $4, \
                 occupancy = $5, image_url = $6, amenity = $7, updated_at = $8 \
                 WHERE id = $9",
            )
            .bind(&villa.name)
            .bind(&villa.details)
            .bind(villa.rate)
            .bind(villa.sqft)
            .bind(villa.occupancy)
            .bind(&villa.image_url)
            .bind(&villa.amenity)
            .bind(villa.updated_at.as_datetime())
            .bind(villa.id.get())
            .execute(&pool)
            .await
            .map_err(database_error)?;

            Ok(result.rows_affected() > 0)
        }
        .boxed()
    }

    fn delete(&self, id: VillaId) -> BoxFuture<'static, RepositoryResult<bool>> {
        let pool = self.pool.clone();
        async move {
            let result = sqlx::query("DELETE FROM villas WHERE id = $1")
                .bind(id.get())
                .execute(&pool)
                .await
                .map_err(database_error)?;

            Ok(result.rows_affected() > 0)
        }
        .boxed()
    }

    fn count(&self) -> BoxFuture<'static, RepositoryResult<u64>> {
        let pool = self.pool.clone();
        async move {
            let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM villas")
                .fetch_one(&pool)
                .await
                .map_err(database_error)?;

            Ok(u64::try_from(count).unwrap_or_default())
        }
        .boxed()
    }
}

// =============================================================================
// Tests
// =============================================================================
