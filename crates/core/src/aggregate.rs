//! Grouped counts, averages, and distributions over a record snapshot.
//!
//! Every function here is pure, deterministic, and total: any input slice,
//! including the empty one, produces a well-formed result. Division by zero
//! is defined to yield 0 so that no NaN ever reaches a caller.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::domain::restaurant::RestaurantRecord;

/// Price-for-two below this is the budget bucket.
pub const BUDGET_CEILING: f64 = 300.0;
/// Price-for-two at or above this is the premium bucket.
pub const PREMIUM_FLOOR: f64 = 600.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CuisineSlice {
    pub cuisine: String,
    pub count: usize,
    /// Share of the record subset, 0.0-100.0, one decimal.
    pub percentage: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PriceBucket {
    /// Human-readable bound description, e.g. `"< 300"`.
    pub range: &'static str,
    pub count: usize,
    pub percentage: f64,
    /// Mean price of records in this bucket; 0 when the bucket is empty.
    pub avg_price: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PriceDistribution {
    pub budget: PriceBucket,
    pub mid_range: PriceBucket,
    pub premium: PriceBucket,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CityStats {
    pub total_restaurants: usize,
    pub total_reviews: u64,
    /// Mean over rated records only; 0 when no record carries a rating.
    pub avg_rating: f64,
    pub avg_price: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AreaStats {
    pub restaurant_count: usize,
    pub avg_price: f64,
    pub avg_rating: f64,
    /// Number of distinct cuisine tags present in the area.
    pub cuisine_variety: usize,
}

pub fn round1(value: f64) -> f64 {
    if value.is_finite() { (value * 10.0).round() / 10.0 } else { 0.0 }
}

pub fn round2(value: f64) -> f64 {
    if value.is_finite() { (value * 100.0).round() / 100.0 } else { 0.0 }
}

fn mean(sum: f64, count: usize) -> f64 {
    if count == 0 { 0.0 } else { sum / count as f64 }
}

/// Per-cuisine counts and shares, sorted by count descending with ties
/// broken by case-insensitive cuisine name so the ordering is reproducible.
/// A record contributes one count per tag it carries.
pub fn cuisine_distribution(records: &[RestaurantRecord]) -> Vec<CuisineSlice> {
    if records.is_empty() {
        return Vec::new();
    }

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for record in records {
        for cuisine in &record.cuisines {
            *counts.entry(cuisine.as_str()).or_insert(0) += 1;
        }
    }

    let total = records.len();
    let mut slices: Vec<CuisineSlice> = counts
        .into_iter()
        .map(|(cuisine, count)| CuisineSlice {
            cuisine: cuisine.to_string(),
            count,
            percentage: round1(count as f64 / total as f64 * 100.0),
        })
        .collect();

    slices.sort_by(|a, b| {
        b.count.cmp(&a.count).then_with(|| a.cuisine.to_lowercase().cmp(&b.cuisine.to_lowercase()))
    });
    slices
}

/// Bucket the subset into budget / mid-range / premium by the fixed price
/// thresholds. Bucket membership is a partition: every record lands in
/// exactly one bucket.
pub fn price_distribution(records: &[RestaurantRecord]) -> PriceDistribution {
    let mut budget = (0usize, 0.0f64);
    let mut mid_range = (0usize, 0.0f64);
    let mut premium = (0usize, 0.0f64);

    for record in records {
        let slot = if record.avg_price < BUDGET_CEILING {
            &mut budget
        } else if record.avg_price < PREMIUM_FLOOR {
            &mut mid_range
        } else {
            &mut premium
        };
        slot.0 += 1;
        slot.1 += record.avg_price;
    }

    let total = records.len();
    let bucket = |range: &'static str, (count, sum): (usize, f64)| PriceBucket {
        range,
        count,
        percentage: if total == 0 { 0.0 } else { round1(count as f64 / total as f64 * 100.0) },
        avg_price: round2(mean(sum, count)),
    };

    PriceDistribution {
        budget: bucket("< 300", budget),
        mid_range: bucket("300 - 600", mid_range),
        premium: bucket("> 600", premium),
    }
}

/// Totals and averages for a record subset. Records without a rating are
/// excluded from both the numerator and denominator of `avg_rating`.
pub fn city_stats(records: &[RestaurantRecord]) -> CityStats {
    let total_restaurants = records.len();
    let total_reviews = records.iter().map(|r| u64::from(r.review_count)).sum();

    let rated: Vec<f64> = records.iter().filter_map(|r| r.rating).collect();
    let avg_rating = round2(mean(rated.iter().sum(), rated.len()));
    let avg_price = round2(mean(records.iter().map(|r| r.avg_price).sum(), total_restaurants));

    CityStats { total_restaurants, total_reviews, avg_rating, avg_price }
}

/// Per-area supply, price, quality, and cuisine variety. Records with no
/// area are skipped; the map is ordered by area name for determinism.
pub fn area_breakdown(records: &[RestaurantRecord]) -> BTreeMap<String, AreaStats> {
    let mut grouped: BTreeMap<&str, Vec<&RestaurantRecord>> = BTreeMap::new();
    for record in records {
        if let Some(area) = record.area.as_deref() {
            grouped.entry(area).or_default().push(record);
        }
    }

    grouped
        .into_iter()
        .map(|(area, members)| {
            let price_sum: f64 = members.iter().map(|r| r.avg_price).sum();
            let rated: Vec<f64> = members.iter().filter_map(|r| r.rating).collect();
            let variety: BTreeSet<&str> = members
                .iter()
                .flat_map(|r| r.cuisines.iter().map(String::as_str))
                .collect();

            let stats = AreaStats {
                restaurant_count: members.len(),
                avg_price: round2(mean(price_sum, members.len())),
                avg_rating: round2(mean(rated.iter().sum(), rated.len())),
                cuisine_variety: variety.len(),
            };
            (area.to_string(), stats)
        })
        .collect()
}
