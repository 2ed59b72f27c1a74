//! Plain read surface over restaurant records, no scoring involved.

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use tastemap_core::errors::EngineError;
use tastemap_core::{RecordFilter, RestaurantId, RestaurantRecord};
use tastemap_db::RestaurantStore;

use crate::errors::{store_failure, ApiError};
use crate::state::AppState;

const SEARCH_MIN_QUERY_LEN: usize = 2;
const SEARCH_MAX_RESULTS: usize = 20;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/restaurants", get(list))
        .route("/api/restaurants/cities/list", get(cities))
        .route("/api/restaurants/cuisines/list", get(cuisines))
        .route("/api/restaurants/search/by-name", get(search_by_name))
        .route("/api/restaurants/{id}", get(by_id))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub city: Option<String>,
    pub area: Option<String>,
    pub cuisine: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub restaurants: Vec<RestaurantRecord>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct CityEntry {
    pub city: String,
    pub restaurant_count: usize,
}

#[derive(Debug, Serialize)]
pub struct CitiesResponse {
    pub cities: Vec<CityEntry>,
    pub total_cities: usize,
}

#[derive(Debug, Serialize)]
pub struct CuisineEntry {
    pub cuisine: String,
    pub restaurant_count: usize,
}

#[derive(Debug, Serialize)]
pub struct CuisinesResponse {
    pub cuisines: Vec<CuisineEntry>,
    pub total_cuisines: usize,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<RestaurantRecord>,
}

impl ListQuery {
    /// Turn raw request parameters into a store filter, rejecting bounds
    /// that cannot match anything.
    fn into_filter(self) -> Result<RecordFilter, EngineError> {
        let price_range = match (self.min_price, self.max_price) {
            (None, None) => None,
            (min, max) => {
                let min = min.unwrap_or(0.0);
                let max = max.unwrap_or(f64::MAX);
                if !min.is_finite() || min < 0.0 {
                    return Err(EngineError::InvalidFilter(format!(
                        "min_price must be non-negative, got {min}"
                    )));
                }
                if max <= min {
                    return Err(EngineError::InvalidFilter(format!(
                        "max_price must exceed min_price, got {min}..{max}"
                    )));
                }
                Some((min, max))
            }
        };

        Ok(RecordFilter {
            city: normalized(self.city),
            area: normalized(self.area),
            cuisine: normalized(self.cuisine),
            price_range,
        })
    }
}

fn normalized(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> Result<Json<ListResponse>, ApiError> {
    let filter = params.into_filter()?;
    let restaurants = state.snapshot(&filter).await?;
    let total = restaurants.len();
    Ok(Json(ListResponse { restaurants, total }))
}

async fn by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RestaurantRecord>, ApiError> {
    let id = RestaurantId(id);
    let record = state
        .store
        .find_by_id(&id)
        .await
        .map_err(store_failure)?
        .ok_or_else(|| EngineError::not_found("restaurant", &id.0))?;
    Ok(Json(record))
}

async fn search_by_name(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, ApiError> {
    let query = params.q.trim().to_string();
    if query.chars().count() < SEARCH_MIN_QUERY_LEN {
        return Err(ApiError(EngineError::InvalidFilter(format!(
            "search query must be at least {SEARCH_MIN_QUERY_LEN} characters"
        ))));
    }

    let needle = query.to_lowercase();
    let mut results: Vec<RestaurantRecord> = state
        .snapshot(&RecordFilter::default())
        .await?
        .into_iter()
        .filter(|record| record.name.to_lowercase().contains(&needle))
        .collect();
    results.truncate(SEARCH_MAX_RESULTS);

    Ok(Json(SearchResponse { query, results }))
}

async fn cuisines(State(state): State<AppState>) -> Result<Json<CuisinesResponse>, ApiError> {
    let records = state.snapshot(&RecordFilter::default()).await?;

    let mut counts: std::collections::BTreeMap<String, usize> = std::collections::BTreeMap::new();
    for record in records {
        for cuisine in record.cuisines {
            *counts.entry(cuisine).or_insert(0) += 1;
        }
    }

    let cuisines: Vec<CuisineEntry> = counts
        .into_iter()
        .map(|(cuisine, restaurant_count)| CuisineEntry { cuisine, restaurant_count })
        .collect();
    let total_cuisines = cuisines.len();

    Ok(Json(CuisinesResponse { cuisines, total_cuisines }))
}

async fn cities(State(state): State<AppState>) -> Result<Json<CitiesResponse>, ApiError> {
    let records = state.snapshot(&RecordFilter::default()).await?;

    let mut counts: std::collections::BTreeMap<String, usize> = std::collections::BTreeMap::new();
    for record in records {
        *counts.entry(record.city).or_insert(0) += 1;
    }

    let cities: Vec<CityEntry> = counts
        .into_iter()
        .map(|(city, restaurant_count)| CityEntry { city, restaurant_count })
        .collect();
    let total_cities = cities.len();

    Ok(Json(CitiesResponse { cities, total_cities }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use tastemap_core::domain::restaurant::{RestaurantId, RestaurantRecord};
    use tastemap_db::InMemoryRestaurantStore;

    use crate::cache::ScoreCache;
    use crate::state::AppState;

    use super::router;

    fn record(id: &str, city: &str, cuisines: &[&str], price: f64) -> RestaurantRecord {
        RestaurantRecord {
            id: RestaurantId(id.to_string()),
            name: format!("Restaurant {id}"),
            city: city.to_string(),
            area: None,
            cuisines: cuisines.iter().map(|c| c.to_string()).collect(),
            avg_price: price,
            rating: Some(4.0),
            review_count: 25,
        }
    }

    fn sample_state() -> AppState {
        let store = InMemoryRestaurantStore::with_records(vec![
            record("r-1", "Chennai", &["South Indian"], 150.0),
            record("r-2", "Chennai", &["North Indian"], 450.0),
            record("r-3", "Madurai", &["Chettinad"], 250.0),
        ]);
        AppState {
            store: Arc::new(store),
            cache: Arc::new(ScoreCache::new(Duration::from_secs(60))),
        }
    }

    async fn get_json(state: AppState, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = router(state)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
            .await
            .expect("response");

        let status = response.status();
        let bytes = response.into_body().collect().await.expect("body").to_bytes();
        let value = serde_json::from_slice(&bytes).expect("json body");
        (status, value)
    }

    #[tokio::test]
    async fn list_filters_combine_conjunctively() {
        let (status, body) =
            get_json(sample_state(), "/api/restaurants?city=Chennai&max_price=300").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 1);
        assert_eq!(body["restaurants"][0]["id"], "r-1");
    }

    #[tokio::test]
    async fn list_price_bounds_are_min_inclusive_max_exclusive() {
        let (_, body) =
            get_json(sample_state(), "/api/restaurants?min_price=150&max_price=450").await;

        let ids: Vec<&str> = body["restaurants"]
            .as_array()
            .expect("array")
            .iter()
            .map(|r| r["id"].as_str().expect("id"))
            .collect();
        assert_eq!(ids, ["r-1", "r-3"]);
    }

    #[tokio::test]
    async fn list_rejects_inverted_price_bounds() {
        let (status, _) =
            get_json(sample_state(), "/api/restaurants?min_price=500&max_price=100").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn by_id_returns_the_record_or_404() {
        let (status, body) = get_json(sample_state(), "/api/restaurants/r-3").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["city"], "Madurai");

        let (status, _) = get_json(sample_state(), "/api/restaurants/r-404").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn search_by_name_matches_case_insensitively() {
        let (status, body) =
            get_json(sample_state(), "/api/restaurants/search/by-name?q=RESTAURANT%20R-3").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["query"], "RESTAURANT R-3");
        let results = body["results"].as_array().expect("results");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["id"], "r-3");
    }

    #[tokio::test]
    async fn search_rejects_a_too_short_query() {
        let (status, _) = get_json(sample_state(), "/api/restaurants/search/by-name?q=x").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn cuisines_list_counts_each_tag() {
        let (status, body) = get_json(sample_state(), "/api/restaurants/cuisines/list").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_cuisines"], 3);
        assert_eq!(body["cuisines"][0]["cuisine"], "Chettinad");
        assert_eq!(body["cuisines"][0]["restaurant_count"], 1);
    }

    #[tokio::test]
    async fn cities_list_carries_per_city_counts() {
        let (status, body) = get_json(sample_state(), "/api/restaurants/cities/list").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_cities"], 2);
        assert_eq!(body["cities"][0]["city"], "Chennai");
        assert_eq!(body["cities"][0]["restaurant_count"], 2);
    }
}
