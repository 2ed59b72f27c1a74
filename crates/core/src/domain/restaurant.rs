use serde::{Deserialize, Serialize};

pub const MAX_RATING: f64 = 5.0;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RestaurantId(pub String);

/// A single restaurant listing as owned by the external record store.
///
/// The engine treats records as immutable: every query works on a snapshot
/// and derives statistics without writing anything back. `city` is always
/// present; `area` and `rating` may be absent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RestaurantRecord {
    pub id: RestaurantId,
    pub name: String,
    pub city: String,
    pub area: Option<String>,
    /// One or more cuisine tags, e.g. `["South Indian", "Chettinad"]`.
    pub cuisines: Vec<String>,
    /// Average price for two people, in the store's currency unit.
    pub avg_price: f64,
    /// Average rating on a 0.0-5.0 scale, absent when unreviewed.
    pub rating: Option<f64>,
    pub review_count: u32,
}

impl RestaurantRecord {
    /// Whether the record satisfies the documented bounds: non-negative
    /// price and, if present, a rating within 0.0-5.0.
    pub fn is_within_bounds(&self) -> bool {
        if self.avg_price < 0.0 || !self.avg_price.is_finite() {
            return false;
        }
        match self.rating {
            Some(rating) => rating.is_finite() && (0.0..=MAX_RATING).contains(&rating),
            None => true,
        }
    }
}

/// Drop records that violate the documented bounds. Out-of-bounds records
/// are excluded from aggregation rather than failing the query.
pub fn retain_valid(records: Vec<RestaurantRecord>) -> Vec<RestaurantRecord> {
    records.into_iter().filter(RestaurantRecord::is_within_bounds).collect()
}
