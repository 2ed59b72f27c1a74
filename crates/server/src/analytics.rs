//! Analytics facade: stateless query handlers over the record store.
//!
//! Endpoints:
//! - `GET /api/analytics/trends`           — top cuisines + city averages
//! - `GET /api/analytics/spending`         — price-bucket distribution
//! - `GET /api/analytics/top-cuisines`     — cuisine ranking with a limit
//! - `GET /api/analytics/top-rated`        — best-rated restaurants
//! - `GET /api/analytics/city-comparison`  — per-city summary table
//! - `GET /api/analytics/area-insights`    — per-area breakdown for a city
//! - `GET /api/analytics/dashboard-stats`  — whole-store overview
//!
//! Unknown cities answer with an empty-but-well-formed body; that default
//! is deliberate, not an accident of missing data.

use std::collections::BTreeMap;

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use tastemap_core::aggregate::{
    area_breakdown, city_stats, cuisine_distribution, price_distribution, AreaStats, CuisineSlice,
    PriceDistribution,
};
use tastemap_core::errors::EngineError;
use tastemap_core::RecordFilter;

use crate::errors::ApiError;
use crate::state::AppState;

const DEFAULT_CUISINE_LIMIT: usize = 10;
const MAX_CUISINE_LIMIT: usize = 50;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/analytics/trends", get(trends))
        .route("/api/analytics/spending", get(spending))
        .route("/api/analytics/top-cuisines", get(top_cuisines))
        .route("/api/analytics/top-rated", get(top_rated))
        .route("/api/analytics/city-comparison", get(city_comparison))
        .route("/api/analytics/area-insights", get(area_insights))
        .route("/api/analytics/dashboard-stats", get(dashboard_stats))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CityQuery {
    pub city: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TopCuisinesQuery {
    pub city: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct TopRatedQuery {
    pub city: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct AreaInsightsQuery {
    pub city: String,
}

#[derive(Debug, Serialize)]
pub struct TrendsResponse {
    pub city: String,
    pub total_restaurants: usize,
    pub top_cuisines: Vec<CuisineSlice>,
    pub avg_price: f64,
    pub avg_rating: f64,
}

#[derive(Debug, Serialize)]
pub struct SpendingResponse {
    pub city: String,
    pub total_restaurants: usize,
    pub price_ranges: PriceDistribution,
}

#[derive(Debug, Serialize)]
pub struct TopCuisinesResponse {
    pub city: String,
    pub top_cuisines: Vec<CuisineSlice>,
}

#[derive(Debug, Serialize)]
pub struct TopRatedEntry {
    pub id: String,
    pub name: String,
    pub city: String,
    pub area: Option<String>,
    pub cuisines: Vec<String>,
    pub rating: f64,
    pub review_count: u32,
    pub avg_price: f64,
}

#[derive(Debug, Serialize)]
pub struct TopRatedResponse {
    pub city: String,
    pub top_rated: Vec<TopRatedEntry>,
}

#[derive(Debug, Serialize)]
pub struct CitySummary {
    pub city: String,
    pub total_restaurants: usize,
    pub avg_rating: f64,
    pub avg_price: f64,
    pub top_cuisine: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CityComparisonResponse {
    pub cities: Vec<CitySummary>,
    pub total_cities: usize,
}

#[derive(Debug, Serialize)]
pub struct AreaInsightsResponse {
    pub city: String,
    pub areas: BTreeMap<String, AreaStats>,
    pub total_areas: usize,
}

#[derive(Debug, Serialize)]
pub struct DashboardOverview {
    pub total_restaurants: usize,
    pub total_reviews: u64,
    pub total_cities: usize,
    pub avg_rating: f64,
    pub avg_price: f64,
}

#[derive(Debug, Serialize)]
pub struct DashboardStatsResponse {
    pub overview: DashboardOverview,
    pub top_cuisine: Option<String>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn trends(
    State(state): State<AppState>,
    Query(params): Query<CityQuery>,
) -> Result<Json<TrendsResponse>, ApiError> {
    let scope = state.resolve_city(params.city.as_deref()).await?;
    let filter = RecordFilter { city: scope.filter_city(), ..RecordFilter::default() };
    let records = state.snapshot(&filter).await?;

    let stats = city_stats(&records);
    let mut top_cuisines = cuisine_distribution(&records);
    top_cuisines.truncate(DEFAULT_CUISINE_LIMIT);

    Ok(Json(TrendsResponse {
        city: scope.label(),
        total_restaurants: stats.total_restaurants,
        top_cuisines,
        avg_price: stats.avg_price,
        avg_rating: stats.avg_rating,
    }))
}

async fn spending(
    State(state): State<AppState>,
    Query(params): Query<CityQuery>,
) -> Result<Json<SpendingResponse>, ApiError> {
    let scope = state.resolve_city(params.city.as_deref()).await?;
    let filter = RecordFilter { city: scope.filter_city(), ..RecordFilter::default() };
    let records = state.snapshot(&filter).await?;

    Ok(Json(SpendingResponse {
        city: scope.label(),
        total_restaurants: records.len(),
        price_ranges: price_distribution(&records),
    }))
}

async fn top_cuisines(
    State(state): State<AppState>,
    Query(params): Query<TopCuisinesQuery>,
) -> Result<Json<TopCuisinesResponse>, ApiError> {
    let limit = validate_limit(params.limit, DEFAULT_CUISINE_LIMIT, MAX_CUISINE_LIMIT)?;

    let scope = state.resolve_city(params.city.as_deref()).await?;
    let filter = RecordFilter { city: scope.filter_city(), ..RecordFilter::default() };
    let records = state.snapshot(&filter).await?;

    let mut top_cuisines = cuisine_distribution(&records);
    top_cuisines.truncate(limit);

    Ok(Json(TopCuisinesResponse { city: scope.label(), top_cuisines }))
}

async fn top_rated(
    State(state): State<AppState>,
    Query(params): Query<TopRatedQuery>,
) -> Result<Json<TopRatedResponse>, ApiError> {
    let limit = validate_limit(params.limit, DEFAULT_CUISINE_LIMIT, MAX_CUISINE_LIMIT)?;

    let scope = state.resolve_city(params.city.as_deref()).await?;
    let filter = RecordFilter { city: scope.filter_city(), ..RecordFilter::default() };
    let records = state.snapshot(&filter).await?;

    // Unreviewed records carry no rating signal and are left out entirely.
    let mut rated: Vec<(f64, tastemap_core::RestaurantRecord)> = records
        .into_iter()
        .filter(|record| record.review_count > 0)
        .filter_map(|record| record.rating.map(|rating| (rating, record)))
        .collect();

    rated.sort_by(|(a_rating, a), (b_rating, b)| {
        b_rating
            .partial_cmp(a_rating)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.review_count.cmp(&a.review_count))
            .then_with(|| a.id.0.cmp(&b.id.0))
    });
    rated.truncate(limit);

    let top_rated = rated
        .into_iter()
        .map(|(rating, record)| TopRatedEntry {
            id: record.id.0,
            name: record.name,
            city: record.city,
            area: record.area,
            cuisines: record.cuisines,
            rating,
            review_count: record.review_count,
            avg_price: record.avg_price,
        })
        .collect();

    Ok(Json(TopRatedResponse { city: scope.label(), top_rated }))
}

async fn city_comparison(
    State(state): State<AppState>,
) -> Result<Json<CityComparisonResponse>, ApiError> {
    let records = state.snapshot(&RecordFilter::default()).await?;

    let mut grouped: BTreeMap<&str, Vec<tastemap_core::RestaurantRecord>> = BTreeMap::new();
    for record in &records {
        grouped.entry(record.city.as_str()).or_default().push(record.clone());
    }

    let mut cities: Vec<CitySummary> = grouped
        .into_iter()
        .map(|(city, members)| {
            let stats = city_stats(&members);
            let top_cuisine =
                cuisine_distribution(&members).first().map(|slice| slice.cuisine.clone());
            CitySummary {
                city: city.to_string(),
                total_restaurants: stats.total_restaurants,
                avg_rating: stats.avg_rating,
                avg_price: stats.avg_price,
                top_cuisine,
            }
        })
        .collect();

    cities.sort_by(|a, b| {
        b.total_restaurants.cmp(&a.total_restaurants).then_with(|| a.city.cmp(&b.city))
    });

    let total_cities = cities.len();
    Ok(Json(CityComparisonResponse { cities, total_cities }))
}

async fn area_insights(
    State(state): State<AppState>,
    Query(params): Query<AreaInsightsQuery>,
) -> Result<Json<AreaInsightsResponse>, ApiError> {
    let scope = state.resolve_city(Some(&params.city)).await?;
    let filter = RecordFilter { city: scope.filter_city(), ..RecordFilter::default() };
    let records = state.snapshot(&filter).await?;

    let areas = area_breakdown(&records);
    let total_areas = areas.len();

    Ok(Json(AreaInsightsResponse { city: scope.label(), areas, total_areas }))
}

async fn dashboard_stats(
    State(state): State<AppState>,
) -> Result<Json<DashboardStatsResponse>, ApiError> {
    let records = state.snapshot(&RecordFilter::default()).await?;

    let stats = city_stats(&records);
    let total_cities = {
        let mut cities: Vec<&str> = records.iter().map(|r| r.city.as_str()).collect();
        cities.sort_unstable();
        cities.dedup();
        cities.len()
    };
    let top_cuisine = cuisine_distribution(&records).first().map(|slice| slice.cuisine.clone());

    Ok(Json(DashboardStatsResponse {
        overview: DashboardOverview {
            total_restaurants: stats.total_restaurants,
            total_reviews: stats.total_reviews,
            total_cities,
            avg_rating: stats.avg_rating,
            avg_price: stats.avg_price,
        },
        top_cuisine,
    }))
}

pub(crate) fn validate_limit(
    raw: Option<i64>,
    default: usize,
    max: usize,
) -> Result<usize, EngineError> {
    match raw {
        None => Ok(default),
        Some(value) if value <= 0 => {
            Err(EngineError::InvalidFilter(format!("limit must be positive, got {value}")))
        }
        Some(value) => Ok(usize::try_from(value).unwrap_or(max).min(max)),
    }
}
