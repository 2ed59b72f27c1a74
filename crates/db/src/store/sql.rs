use std::time::Duration;

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row};

use tastemap_core::domain::filter::RecordFilter;
use tastemap_core::domain::restaurant::{RestaurantId, RestaurantRecord};

use super::{RestaurantStore, StoreError};
use crate::DbPool;

/// SQLite-backed record store. All reads run under a caller-configured
/// timeout; on expiry the query is surfaced as `StoreError::Timeout` rather
/// than being retried here.
pub struct SqlRestaurantStore {
    pool: DbPool,
    query_timeout: Duration,
}

impl SqlRestaurantStore {
    pub fn new(pool: DbPool, query_timeout_secs: u64) -> Self {
        Self { pool, query_timeout: Duration::from_secs(query_timeout_secs.max(1)) }
    }

    async fn with_timeout<T>(
        &self,
        future: impl std::future::Future<Output = Result<T, sqlx::Error>>,
    ) -> Result<T, StoreError> {
        match tokio::time::timeout(self.query_timeout, future).await {
            Ok(result) => result.map_err(StoreError::from),
            Err(_) => Err(StoreError::Timeout(self.query_timeout.as_secs())),
        }
    }
}

fn decode_record(row: &SqliteRow) -> Result<RestaurantRecord, StoreError> {
    let id: String = row.try_get("id").map_err(decode_failure)?;
    let cuisines_raw: String = row.try_get("cuisines").map_err(decode_failure)?;
    let cuisines: Vec<String> = serde_json::from_str(&cuisines_raw)
        .map_err(|error| StoreError::Decode(format!("cuisines for `{id}`: {error}")))?;
    let review_count: i64 = row.try_get("review_count").map_err(decode_failure)?;

    Ok(RestaurantRecord {
        id: RestaurantId(id),
        name: row.try_get("name").map_err(decode_failure)?,
        city: row.try_get("city").map_err(decode_failure)?,
        area: row.try_get("area").map_err(decode_failure)?,
        cuisines,
        avg_price: row.try_get("avg_price").map_err(decode_failure)?,
        rating: row.try_get("rating").map_err(decode_failure)?,
        review_count: u32::try_from(review_count.max(0)).unwrap_or(u32::MAX),
    })
}

fn decode_failure(error: sqlx::Error) -> StoreError {
    StoreError::Decode(error.to_string())
}

const SELECT_COLUMNS: &str =
    "SELECT id, name, city, area, cuisines, avg_price, rating, review_count FROM restaurant";

#[async_trait]
impl RestaurantStore for SqlRestaurantStore {
    async fn query(&self, filter: &RecordFilter) -> Result<Vec<RestaurantRecord>, StoreError> {
        let mut builder = QueryBuilder::new(SELECT_COLUMNS);
        builder.push(" WHERE 1 = 1");

        // Case-insensitive name matching, same as the in-memory store.
        if let Some(city) = filter.city.as_deref() {
            builder.push(" AND city = ").push_bind(city.to_string()).push(" COLLATE NOCASE");
        }
        if let Some(area) = filter.area.as_deref() {
            builder.push(" AND area = ").push_bind(area.to_string()).push(" COLLATE NOCASE");
        }
        if let Some(cuisine) = filter.cuisine.as_deref() {
            builder
                .push(" AND EXISTS (SELECT 1 FROM json_each(restaurant.cuisines) WHERE json_each.value = ")
                .push_bind(cuisine.to_string())
                .push(" COLLATE NOCASE)");
        }
        if let Some((min, max)) = filter.price_range {
            builder.push(" AND avg_price >= ").push_bind(min);
            builder.push(" AND avg_price < ").push_bind(max);
        }
        builder.push(" ORDER BY id");

        let rows = self.with_timeout(builder.build().fetch_all(&self.pool)).await?;
        rows.iter().map(decode_record).collect()
    }

    async fn find_by_id(
        &self,
        id: &RestaurantId,
    ) -> Result<Option<RestaurantRecord>, StoreError> {
        let sql = format!("{SELECT_COLUMNS} WHERE id = ?");
        let query = sqlx::query(&sql).bind(id.0.clone());
        let row = self.with_timeout(query.fetch_optional(&self.pool)).await?;
        row.as_ref().map(decode_record).transpose()
    }

    async fn list_cities(&self) -> Result<Vec<String>, StoreError> {
        let query = sqlx::query("SELECT DISTINCT city FROM restaurant ORDER BY city");
        let rows = self.with_timeout(query.fetch_all(&self.pool)).await?;
        rows.iter().map(|row| row.try_get("city").map_err(decode_failure)).collect()
    }
}
