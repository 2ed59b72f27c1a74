//! Recommendation facade: scored, ranked suggestions derived from the same
//! store snapshots the analytics surface reads.
//!
//! Endpoints:
//! - `GET /api/recommendations/best-locations`      — ranked area openings
//! - `GET /api/recommendations/market-gaps`         — cuisine gaps + underserved areas
//! - `GET /api/recommendations/similar-restaurants` — similarity ranking for one record
//! - `GET /api/recommendations/investment-insights` — tier, market, ROI guidance
//!
//! Location and gap scoring is cached per `(endpoint, filter signature)`
//! because the input snapshot changes far less often than it is read.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use tastemap_core::aggregate::{area_breakdown, city_stats, cuisine_distribution};
use tastemap_core::errors::EngineError;
use tastemap_core::scoring::investment::{
    competition_level, investment_tier, RoiProjection,
};
use tastemap_core::scoring::opportunity::{
    area_opportunity, cuisine_opportunity, underserved_areas, OpportunityLabel, UnderservedArea,
};
use tastemap_core::scoring::similarity::rank_similar;
use tastemap_core::{RecordFilter, RestaurantId, RestaurantRecord};
use tastemap_db::RestaurantStore;

use crate::errors::{store_failure, ApiError};
use crate::state::AppState;

const MAX_LOCATIONS: usize = 10;
const MAX_CUISINE_GAPS: usize = 10;
const SIMILAR_DEFAULT_LIMIT: usize = 5;
const SIMILAR_MAX_LIMIT: usize = 20;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/recommendations/best-locations", get(best_locations))
        .route("/api/recommendations/market-gaps", get(market_gaps))
        .route("/api/recommendations/similar-restaurants", get(similar_restaurants))
        .route("/api/recommendations/investment-insights", get(investment_insights))
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
pub struct LocationsQuery {
    pub city: Option<String>,
    pub cuisine: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SimilarQuery {
    pub restaurant_id: String,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct InvestmentQuery {
    pub city: Option<String>,
    pub budget: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LocationPick {
    pub area: String,
    pub current_restaurants: usize,
    pub avg_price: f64,
    pub avg_rating: f64,
    pub cuisine_variety: usize,
    pub opportunity_score: f64,
    pub opportunity_label: OpportunityLabel,
    pub recommendation: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BestLocationsResponse {
    pub city: String,
    pub cuisine: Option<String>,
    pub top_locations: Vec<LocationPick>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Opportunity {
    pub score: f64,
    pub label: OpportunityLabel,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CuisineOpportunity {
    pub cuisine: String,
    pub restaurant_count: usize,
    pub market_share: f64,
    pub review_volume: u64,
    pub opportunity: Opportunity,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MarketGapsResponse {
    pub city: String,
    pub cuisine_opportunities: Vec<CuisineOpportunity>,
    pub underserved_areas: Vec<UnderservedArea>,
}

#[derive(Debug, Serialize)]
pub struct SimilarEntry {
    pub id: String,
    pub name: String,
    pub area: Option<String>,
    pub cuisines: Vec<String>,
    pub avg_price: f64,
    pub rating: Option<f64>,
    pub review_count: u32,
    pub similarity_score: f64,
}

#[derive(Debug, Serialize)]
pub struct SimilarRestaurantsResponse {
    pub restaurant: SimilarEntry,
    pub similar: Vec<SimilarEntry>,
}

#[derive(Debug, Serialize)]
pub struct MarketAnalysis {
    pub total_restaurants: usize,
    pub avg_price: f64,
    pub avg_rating: f64,
    pub competition_level: &'static str,
}

#[derive(Debug, Serialize)]
pub struct InvestmentInsightsResponse {
    pub city: String,
    pub budget: f64,
    pub tier: &'static str,
    pub suggested_business_type: &'static str,
    pub market_analysis: MarketAnalysis,
    pub roi_projection: RoiProjection,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn best_locations(
    State(state): State<AppState>,
    Query(params): Query<LocationsQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let scope = state.resolve_city(params.city.as_deref()).await?;
    let cuisine =
        params.cuisine.map(|value| value.trim().to_string()).filter(|value| !value.is_empty());
    let filter = RecordFilter {
        city: scope.filter_city(),
        cuisine: cuisine.clone(),
        ..RecordFilter::default()
    };
    let label = scope.label();

    if !scope.is_resolved() {
        let body = build_best_locations(&state, &filter, label, cuisine).await?;
        return Ok(Json(cache_payload(&body)?));
    }

    let key = format!("best-locations|{}", filter.signature());
    let inner = state.clone();
    let payload = state
        .cache
        .get_or_compute(&key, || async move {
            let body = build_best_locations(&inner, &filter, label, cuisine).await?;
            cache_payload(&body)
        })
        .await?;

    Ok(Json(payload))
}

async fn build_best_locations(
    state: &AppState,
    filter: &RecordFilter,
    city: String,
    cuisine: Option<String>,
) -> Result<BestLocationsResponse, EngineError> {
    let records = state.snapshot(filter).await?;
    let citywide = city_stats(&records);

    let mut top_locations: Vec<LocationPick> = area_breakdown(&records)
        .into_iter()
        .map(|(area, stats)| {
            let scored = area_opportunity(&stats, citywide.avg_price);
            LocationPick {
                area,
                current_restaurants: stats.restaurant_count,
                avg_price: stats.avg_price,
                avg_rating: stats.avg_rating,
                cuisine_variety: stats.cuisine_variety,
                opportunity_score: scored.score,
                opportunity_label: scored.label,
                recommendation: scored.recommendation.to_string(),
            }
        })
        .collect();

    top_locations.sort_by(|a, b| {
        b.opportunity_score
            .partial_cmp(&a.opportunity_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.area.cmp(&b.area))
    });
    top_locations.truncate(MAX_LOCATIONS);

    Ok(BestLocationsResponse { city, cuisine, top_locations })
}

async fn market_gaps(
    State(state): State<AppState>,
    Query(params): Query<CityQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let scope = state.resolve_city(params.city.as_deref()).await?;
    let filter = RecordFilter { city: scope.filter_city(), ..RecordFilter::default() };
    let label = scope.label();

    if !scope.is_resolved() {
        let body = build_market_gaps(&state, &filter, label).await?;
        return Ok(Json(cache_payload(&body)?));
    }

    let key = format!("market-gaps|{}", filter.signature());
    let inner = state.clone();
    let payload = state
        .cache
        .get_or_compute(&key, || async move {
            let body = build_market_gaps(&inner, &filter, label).await?;
            cache_payload(&body)
        })
        .await?;

    Ok(Json(payload))
}

async fn build_market_gaps(
    state: &AppState,
    filter: &RecordFilter,
    city: String,
) -> Result<MarketGapsResponse, EngineError> {
    let records = state.snapshot(filter).await?;
    let total = records.len();

    let mut cuisine_opportunities: Vec<CuisineOpportunity> = cuisine_distribution(&records)
        .into_iter()
        .map(|slice| {
            let share = if total == 0 { 0.0 } else { slice.count as f64 / total as f64 };
            let volume = review_volume(&records, &slice.cuisine);
            let score = cuisine_opportunity(share, volume);
            CuisineOpportunity {
                cuisine: slice.cuisine,
                restaurant_count: slice.count,
                market_share: slice.percentage,
                review_volume: volume,
                opportunity: Opportunity { score, label: OpportunityLabel::from_score(score) },
            }
        })
        .collect();

    cuisine_opportunities.sort_by(|a, b| {
        b.opportunity
            .score
            .partial_cmp(&a.opportunity.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.cuisine.cmp(&b.cuisine))
    });
    cuisine_opportunities.truncate(MAX_CUISINE_GAPS);

    let underserved = underserved_areas(&area_breakdown(&records));

    Ok(MarketGapsResponse { city, cuisine_opportunities, underserved_areas: underserved })
}

async fn similar_restaurants(
    State(state): State<AppState>,
    Query(params): Query<SimilarQuery>,
) -> Result<Json<SimilarRestaurantsResponse>, ApiError> {
    let limit = validate_similar_limit(params.limit)?;

    let id = RestaurantId(params.restaurant_id.trim().to_string());
    let subject = state
        .store
        .find_by_id(&id)
        .await
        .map_err(store_failure)?
        .ok_or_else(|| EngineError::not_found("restaurant", &id.0))?;

    let candidates = state.snapshot(&RecordFilter::for_city(&subject.city)).await?;
    let similar = rank_similar(&subject, &candidates, limit)
        .into_iter()
        .map(|ranked| entry(&ranked.record, ranked.score))
        .collect();

    Ok(Json(SimilarRestaurantsResponse { restaurant: entry(&subject, 10.0), similar }))
}

async fn investment_insights(
    State(state): State<AppState>,
    Query(params): Query<InvestmentQuery>,
) -> Result<Json<InvestmentInsightsResponse>, ApiError> {
    if !params.budget.is_finite() || params.budget <= 0.0 {
        return Err(ApiError(EngineError::InvalidFilter(format!(
            "budget must be a positive amount, got {}",
            params.budget
        ))));
    }

    let scope = state.resolve_city(params.city.as_deref()).await?;
    let filter = RecordFilter { city: scope.filter_city(), ..RecordFilter::default() };
    let records = state.snapshot(&filter).await?;
    let stats = city_stats(&records);

    let tier = investment_tier(params.budget);

    Ok(Json(InvestmentInsightsResponse {
        city: scope.label(),
        budget: params.budget,
        tier: tier.as_str(),
        suggested_business_type: tier.suggested_business_type(),
        market_analysis: MarketAnalysis {
            total_restaurants: stats.total_restaurants,
            avg_price: stats.avg_price,
            avg_rating: stats.avg_rating,
            competition_level: competition_level(stats.total_restaurants),
        },
        roi_projection: RoiProjection::for_budget(params.budget),
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Total review count across records carrying the given cuisine tag.
fn review_volume(records: &[RestaurantRecord], cuisine: &str) -> u64 {
    records
        .iter()
        .filter(|record| record.cuisines.iter().any(|tag| tag == cuisine))
        .map(|record| u64::from(record.review_count))
        .sum()
}

fn entry(record: &RestaurantRecord, score: f64) -> SimilarEntry {
    SimilarEntry {
        id: record.id.0.clone(),
        name: record.name.clone(),
        area: record.area.clone(),
        cuisines: record.cuisines.clone(),
        avg_price: record.avg_price,
        rating: record.rating,
        review_count: record.review_count,
        similarity_score: score,
    }
}

/// Limits outside 1..=20 are rejected, not clamped, so callers learn about
/// their mistake instead of silently getting a different page size.
fn validate_similar_limit(raw: Option<i64>) -> Result<usize, EngineError> {
    match raw {
        None => Ok(SIMILAR_DEFAULT_LIMIT),
        Some(value) if (1..=SIMILAR_MAX_LIMIT as i64).contains(&value) => Ok(value as usize),
        Some(value) => Err(EngineError::InvalidFilter(format!(
            "limit must be between 1 and {SIMILAR_MAX_LIMIT}, got {value}"
        ))),
    }
}

fn cache_payload<T: Serialize>(payload: &T) -> Result<serde_json::Value, EngineError> {
    serde_json::to_value(payload)
        .map_err(|error| EngineError::StoreUnavailable(format!("payload encoding failed: {error}")))
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

    use super::{router, validate_similar_limit};

    fn record(
        id: &str,
        city: &str,
        area: Option<&str>,
        cuisines: &[&str],
        price: f64,
        rating: Option<f64>,
        reviews: u32,
    ) -> RestaurantRecord {
        RestaurantRecord {
            id: RestaurantId(id.to_string()),
            name: format!("Restaurant {id}"),
            city: city.to_string(),
            area: area.map(str::to_string),
            cuisines: cuisines.iter().map(|c| c.to_string()).collect(),
            avg_price: price,
            rating,
            review_count: reviews,
        }
    }

    fn chennai_records() -> Vec<RestaurantRecord> {
        let mut records = vec![
            // Dense, well-rated center.
            record("r-1", "Chennai", Some("T. Nagar"), &["South Indian"], 150.0, Some(4.2), 320),
            record("r-2", "Chennai", Some("T. Nagar"), &["South Indian"], 180.0, Some(4.4), 280),
            record("r-3", "Chennai", Some("T. Nagar"), &["North Indian"], 350.0, Some(4.1), 150),
            record("r-4", "Chennai", Some("T. Nagar"), &["Chettinad"], 420.0, Some(4.3), 210),
            // Thin, poorly-rated outskirt.
            record("r-5", "Chennai", Some("Velachery"), &["South Indian"], 200.0, Some(3.1), 12),
            // One rare cuisine with real demand.
            record("r-6", "Chennai", Some("Mylapore"), &["Japanese"], 700.0, Some(4.6), 900),
            record("r-7", "Chennai", Some("Mylapore"), &["South Indian"], 160.0, Some(4.0), 90),
        ];
        // Pad the dominant cuisine so its share is clearly saturated.
        for n in 8..=14 {
            records.push(record(
                &format!("r-{n}"),
                "Chennai",
                Some("Mylapore"),
                &["South Indian"],
                190.0,
                Some(3.9),
                40,
            ));
        }
        records
    }

    fn state_with(records: Vec<RestaurantRecord>) -> AppState {
        AppState {
            store: Arc::new(InMemoryRestaurantStore::with_records(records)),
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
    async fn best_locations_ranks_areas_by_descending_score() {
        let (status, body) =
            get_json(state_with(chennai_records()), "/api/recommendations/best-locations?city=Chennai")
                .await;

        assert_eq!(status, StatusCode::OK);
        let locations = body["top_locations"].as_array().expect("top_locations");
        assert_eq!(locations.len(), 3);
        for pair in locations.windows(2) {
            let first = pair[0]["opportunity_score"].as_f64().expect("score");
            let second = pair[1]["opportunity_score"].as_f64().expect("score");
            assert!(first >= second, "ranking out of order: {first} before {second}");
        }
        assert!(locations[0]["recommendation"].is_string());
    }

    #[tokio::test]
    async fn best_locations_serves_repeat_reads_from_cache() {
        let store = Arc::new(InMemoryRestaurantStore::with_records(chennai_records()));
        let state = AppState {
            store: Arc::clone(&store) as Arc<dyn tastemap_db::RestaurantStore>,
            cache: Arc::new(ScoreCache::new(Duration::from_secs(60))),
        };

        let (_, first) =
            get_json(state.clone(), "/api/recommendations/best-locations?city=Chennai").await;

        // The store changes, but within the TTL the answer must not.
        store.replace_all(Vec::new()).await;
        let (_, second) =
            get_json(state, "/api/recommendations/best-locations?city=Chennai").await;

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn best_locations_scopes_to_a_cuisine_when_given() {
        let (status, body) = get_json(
            state_with(chennai_records()),
            "/api/recommendations/best-locations?city=Chennai&cuisine=Japanese",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["cuisine"], "Japanese");
        let locations = body["top_locations"].as_array().expect("top_locations");
        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0]["area"], "Mylapore");
        assert_eq!(locations[0]["current_restaurants"], 1);
    }

    #[tokio::test]
    async fn unknown_city_returns_empty_locations() {
        let (status, body) =
            get_json(state_with(chennai_records()), "/api/recommendations/best-locations?city=Atlantis")
                .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["city"], "Atlantis");
        assert_eq!(body["top_locations"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn unknown_city_requests_never_occupy_cache_entries() {
        let state = state_with(chennai_records());

        for n in 0..20 {
            let uri = format!("/api/recommendations/best-locations?city=nowhere-{n}");
            let (status, _) = get_json(state.clone(), &uri).await;
            assert_eq!(status, StatusCode::OK);
        }

        assert_eq!(state.cache.entry_count().await, 0);
    }

    #[tokio::test]
    async fn unknown_city_echoes_each_requested_spelling() {
        let state = state_with(chennai_records());

        let (_, first) =
            get_json(state.clone(), "/api/recommendations/best-locations?city=Atlantis").await;
        assert_eq!(first["city"], "Atlantis");

        let (_, second) =
            get_json(state, "/api/recommendations/best-locations?city=ATLANTIS").await;
        assert_eq!(second["city"], "ATLANTIS");
    }

    #[tokio::test]
    async fn market_gaps_rank_rare_high_demand_cuisine_first() {
        let (status, body) =
            get_json(state_with(chennai_records()), "/api/recommendations/market-gaps?city=Chennai")
                .await;

        assert_eq!(status, StatusCode::OK);
        let gaps = body["cuisine_opportunities"].as_array().expect("cuisine_opportunities");
        assert_eq!(gaps[0]["cuisine"], "Japanese");
        assert_eq!(gaps[0]["opportunity"]["label"], "High");

        let last = gaps.last().expect("at least one gap");
        assert_eq!(last["cuisine"], "South Indian");
    }

    #[tokio::test]
    async fn market_gaps_flag_thin_low_variety_areas() {
        let (_, body) =
            get_json(state_with(chennai_records()), "/api/recommendations/market-gaps?city=Chennai")
                .await;

        let underserved = body["underserved_areas"].as_array().expect("underserved");
        assert_eq!(underserved.len(), 1);
        assert_eq!(underserved[0]["area"], "Velachery");
        assert_eq!(underserved[0]["restaurant_count"], 1);
    }

    #[tokio::test]
    async fn similar_restaurants_prefers_shared_cuisine_and_bracket() {
        let (status, body) = get_json(
            state_with(chennai_records()),
            "/api/recommendations/similar-restaurants?restaurant_id=r-1&limit=3",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["restaurant"]["id"], "r-1");
        let similar = body["similar"].as_array().expect("similar");
        assert_eq!(similar.len(), 3);
        assert_eq!(similar[0]["cuisines"][0], "South Indian");
        assert!(!similar.iter().any(|entry| entry["id"] == "r-1"));
    }

    #[tokio::test]
    async fn similar_restaurants_unknown_id_is_not_found() {
        let (status, body) = get_json(
            state_with(chennai_records()),
            "/api/recommendations/similar-restaurants?restaurant_id=r-999",
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().expect("error").contains("r-999"));
    }

    #[tokio::test]
    async fn similar_restaurants_rejects_out_of_range_limit() {
        for uri in [
            "/api/recommendations/similar-restaurants?restaurant_id=r-1&limit=0",
            "/api/recommendations/similar-restaurants?restaurant_id=r-1&limit=21",
        ] {
            let (status, _) = get_json(state_with(chennai_records()), uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        }
    }

    #[tokio::test]
    async fn investment_insights_classifies_a_medium_budget() {
        let (status, body) = get_json(
            state_with(chennai_records()),
            "/api/recommendations/investment-insights?city=Chennai&budget=2000000",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tier"], "Medium Scale");
        assert_eq!(body["suggested_business_type"], "Casual Dining / Quick Service");
        assert_eq!(body["market_analysis"]["competition_level"], "Low");
        assert_eq!(body["roi_projection"]["estimated_monthly_revenue"], 100000.0);
        assert_eq!(body["roi_projection"]["breakeven_period_months"], 133);
    }

    #[tokio::test]
    async fn investment_insights_rejects_non_positive_budget() {
        let (status, body) = get_json(
            state_with(chennai_records()),
            "/api/recommendations/investment-insights?budget=-50",
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().expect("error").contains("budget"));
    }

    #[test]
    fn similar_limit_boundaries() {
        assert_eq!(validate_similar_limit(None).expect("default"), 5);
        assert_eq!(validate_similar_limit(Some(1)).expect("lower bound"), 1);
        assert_eq!(validate_similar_limit(Some(20)).expect("upper bound"), 20);
        assert!(validate_similar_limit(Some(0)).is_err());
        assert!(validate_similar_limit(Some(21)).is_err());
    }
}
