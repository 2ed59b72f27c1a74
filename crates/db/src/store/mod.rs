use async_trait::async_trait;
use thiserror::Error;

use tastemap_core::domain::filter::RecordFilter;
use tastemap_core::domain::restaurant::{RestaurantId, RestaurantRecord};

pub mod memory;
pub mod sql;

pub use memory::InMemoryRestaurantStore;
pub use sql::SqlRestaurantStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(#[from] sqlx::Error),
    /// Surfaced distinctly from connectivity failures so callers can tell a
    /// slow store from a dead one.
    #[error("store query timed out after {0}s")]
    Timeout(u64),
    #[error("decode error: {0}")]
    Decode(String),
}

/// Read-only query surface over restaurant records.
///
/// Implementations must never mutate records, must return an empty sequence
/// (not an error) when nothing matches, and must hand back a single
/// consistent snapshot per call so concurrent requests never observe
/// partially-updated data.
#[async_trait]
pub trait RestaurantStore: Send + Sync {
    async fn query(&self, filter: &RecordFilter) -> Result<Vec<RestaurantRecord>, StoreError>;

    async fn find_by_id(&self, id: &RestaurantId)
        -> Result<Option<RestaurantRecord>, StoreError>;

    /// Distinct city names, sorted ascending.
    async fn list_cities(&self) -> Result<Vec<String>, StoreError>;
}
