use std::sync::Arc;

use tastemap_core::errors::EngineError;
use tastemap_db::RestaurantStore;

use crate::cache::ScoreCache;
use crate::errors::store_failure;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RestaurantStore>,
    pub cache: Arc<ScoreCache>,
}

/// How a raw `city` request parameter resolved against the store.
pub enum CityScope {
    /// No city given: the query spans every city.
    All,
    /// Matched a known city case-insensitively; holds the canonical name.
    Known(String),
    /// No such city. Read endpoints answer with an empty-but-well-formed
    /// body for this case, never an error.
    Unknown(String),
}

impl CityScope {
    /// Label echoed back in response bodies.
    pub fn label(&self) -> String {
        match self {
            Self::All => "All Cities".to_string(),
            Self::Known(city) | Self::Unknown(city) => city.clone(),
        }
    }

    /// City to constrain the store query with, if any.
    pub fn filter_city(&self) -> Option<String> {
        match self {
            Self::All => None,
            Self::Known(city) | Self::Unknown(city) => Some(city.clone()),
        }
    }

    /// Whether the scope names something the store actually knows. Unknown
    /// scopes carry an arbitrary request string and must not be cached:
    /// each distinct spelling would occupy its own cache entry, and the
    /// cached body would echo whichever spelling arrived first.
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

impl AppState {
    /// One consistent store snapshot with out-of-bounds records dropped, so
    /// aggregation never sees a price or rating outside the documented
    /// bounds.
    pub async fn snapshot(
        &self,
        filter: &tastemap_core::RecordFilter,
    ) -> Result<Vec<tastemap_core::RestaurantRecord>, EngineError> {
        let records = self.store.query(filter).await.map_err(store_failure)?;
        Ok(tastemap_core::domain::restaurant::retain_valid(records))
    }

    /// Normalize a raw city parameter: trim, then match case-insensitively
    /// against the store's known cities.
    pub async fn resolve_city(&self, raw: Option<&str>) -> Result<CityScope, EngineError> {
        let Some(requested) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
            return Ok(CityScope::All);
        };

        let cities = self.store.list_cities().await.map_err(store_failure)?;
        match cities.iter().find(|city| city.eq_ignore_ascii_case(requested)) {
            Some(canonical) => Ok(CityScope::Known(canonical.clone())),
            None => Ok(CityScope::Unknown(requested.to_string())),
        }
    }
}
