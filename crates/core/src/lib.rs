pub mod aggregate;
pub mod config;
pub mod domain;
pub mod errors;
pub mod scoring;

pub use aggregate::{
    area_breakdown, city_stats, cuisine_distribution, price_distribution, round1, AreaStats,
    CityStats, CuisineSlice, PriceBucket, PriceDistribution, BUDGET_CEILING, PREMIUM_FLOOR,
};
pub use domain::filter::RecordFilter;
pub use domain::restaurant::{RestaurantId, RestaurantRecord};
pub use errors::EngineError;
pub use scoring::investment::{investment_tier, InvestmentTier, RoiProjection};
pub use scoring::opportunity::{
    area_opportunity, cuisine_opportunity, underserved_areas, AreaOpportunity, OpportunityLabel,
    UnderservedArea,
};
pub use scoring::similarity::{rank_similar, SimilarityRanked};
