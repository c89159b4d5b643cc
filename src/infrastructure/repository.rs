//! Repository trait for villa records.
//!
//! Every method returns a boxed, `Send` future so that implementations can be
//! selected at runtime and shared as `Arc<dyn VillaRepository>`. The futures
//! own everything they need and do not borrow from `self`.

use futures::future::BoxFuture;
use thiserror::Error;

use crate::domain::{NewVilla, Timestamp, Villa, VillaId};

// =============================================================================
// Repository Error
// =============================================================================

/// Errors that can occur during repository operations.
#[derive(Debug, Error, Clone)]
pub enum RepositoryError {
    /// Database connection or query error.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// A stored row could not be converted to a domain value.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Result type returned by repository futures.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

// =============================================================================
// Villa Repository
// =============================================================================

/// Record store for villas.
///
/// There are no transactions or concurrency tokens: the last write wins.
///
/// # Example
///
/// ```ignore
/// let villa = repository.insert(new_villa, Timestamp::now()).await?;
/// let found = repository.find_by_id(villa.id).await?;
/// ```
pub trait VillaRepository: Send + Sync {
    /// Returns every villa in ascending identifier order.
    fn find_all(&self) -> BoxFuture<'static, RepositoryResult<Vec<Villa>>>;

    /// Finds a villa by its identifier.
    ///
    /// Returns `Ok(None)` if no record has this identifier.
    fn find_by_id(&self, id: VillaId) -> BoxFuture<'static, RepositoryResult<Option<Villa>>>;

    /// Finds a villa whose name matches case-insensitively.
    fn find_by_name(&self, name: &str) -> BoxFuture<'static, RepositoryResult<Option<Villa>>>;

    /// Assigns the next identifier and stores the villa.
    ///
    /// `created_at` and `updated_at` are both set to `timestamp`.
    fn insert(
        &self,
        villa: NewVilla,
        timestamp: Timestamp,
    ) -> BoxFuture<'static, RepositoryResult<Villa>>;

    /// Replaces the attributes and `updated_at` of the villa with the same
    /// identifier. `created_at` is never overwritten.
    ///
    /// Returns `Ok(false)` if no record has this identifier.
    fn update(&self, villa: &Villa) -> BoxFuture<'static, RepositoryResult<bool>>;

    /// Deletes a villa by its identifier.
    ///
    /// Returns `Ok(true)` if the villa was deleted, `Ok(false)` if it didn't exist.
    fn delete(&self, id: VillaId) -> BoxFuture<'static, RepositoryResult<bool>>;

    /// Counts all villas.
    fn count(&self) -> BoxFuture<'static, RepositoryResult<u64>>;
}

// =============================================================================
// Tests
// =============================================================================
