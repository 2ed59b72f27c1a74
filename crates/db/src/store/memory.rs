use async_trait::async_trait;
use tokio::sync::RwLock;

use tastemap_core::domain::filter::RecordFilter;
use tastemap_core::domain::restaurant::{RestaurantId, RestaurantRecord};

use super::{RestaurantStore, StoreError};

/// In-memory record store used by tests and local development. Filter
/// matching on city, area, and cuisine is case-insensitive, mirroring how
/// the facades normalize request parameters.
#[derive(Default)]
pub struct InMemoryRestaurantStore {
    records: RwLock<Vec<RestaurantRecord>>,
}

impl InMemoryRestaurantStore {
    pub fn with_records(records: Vec<RestaurantRecord>) -> Self {
        Self { records: RwLock::new(records) }
    }

    pub async fn replace_all(&self, records: Vec<RestaurantRecord>) {
        *self.records.write().await = records;
    }
}

fn eq_ignore_case(left: &str, right: &str) -> bool {
    left.trim().eq_ignore_ascii_case(right.trim())
}

fn matches(record: &RestaurantRecord, filter: &RecordFilter) -> bool {
    if let Some(city) = filter.city.as_deref() {
        if !eq_ignore_case(&record.city, city) {
            return false;
        }
    }
    if let Some(area) = filter.area.as_deref() {
        match record.area.as_deref() {
            Some(record_area) if eq_ignore_case(record_area, area) => {}
            _ => return false,
        }
    }
    if let Some(cuisine) = filter.cuisine.as_deref() {
        if !record.cuisines.iter().any(|tag| eq_ignore_case(tag, cuisine)) {
            return false;
        }
    }
    if let Some((min, max)) = filter.price_range {
        if record.avg_price < min || record.avg_price >= max {
            return false;
        }
    }
    true
}

#[async_trait]
impl RestaurantStore for InMemoryRestaurantStore {
    async fn query(&self, filter: &RecordFilter) -> Result<Vec<RestaurantRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(records.iter().filter(|record| matches(record, filter)).cloned().collect())
    }

    async fn find_by_id(
        &self,
        id: &RestaurantId,
    ) -> Result<Option<RestaurantRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(records.iter().find(|record| &record.id == id).cloned())
    }

    async fn list_cities(&self) -> Result<Vec<String>, StoreError> {
        let records = self.records.read().await;
        let mut cities: Vec<String> = records.iter().map(|record| record.city.clone()).collect();
        cities.sort();
        cities.dedup();
        Ok(cities)
    }
}
