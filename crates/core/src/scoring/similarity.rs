use serde::{Deserialize, Serialize};

use crate::aggregate::{round1, BUDGET_CEILING, PREMIUM_FLOOR};
use crate::domain::restaurant::RestaurantRecord;

/// Component weights for the similarity rank. Shared cuisine tags dominate,
/// then price-bracket proximity, then rating proximity.
const CUISINE_WEIGHT: f64 = 0.5;
const PRICE_WEIGHT: f64 = 0.3;
const RATING_WEIGHT: f64 = 0.2;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimilarityRanked {
    pub record: RestaurantRecord,
    /// 0-10 scale, one decimal.
    pub score: f64,
}

fn price_bracket(price: f64) -> u8 {
    if price < BUDGET_CEILING {
        0
    } else if price < PREMIUM_FLOOR {
        1
    } else {
        2
    }
}

fn cuisine_overlap(a: &RestaurantRecord, b: &RestaurantRecord) -> f64 {
    let left: Vec<String> = a.cuisines.iter().map(|c| c.trim().to_lowercase()).collect();
    let right: Vec<String> = b.cuisines.iter().map(|c| c.trim().to_lowercase()).collect();
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }

    let shared = left.iter().filter(|tag| right.contains(tag)).count();
    let union = left.len() + right.len() - shared;
    if union == 0 { 0.0 } else { shared as f64 / union as f64 }
}

fn price_proximity(a: f64, b: f64) -> f64 {
    let distance = (i16::from(price_bracket(a)) - i16::from(price_bracket(b))).unsigned_abs();
    1.0 - f64::from(distance) / 2.0
}

fn rating_proximity(a: Option<f64>, b: Option<f64>) -> f64 {
    match (a, b) {
        (Some(left), Some(right)) => 1.0 - (left - right).abs() / 5.0,
        // An unrated side gives no signal either way.
        _ => 0.5,
    }
}

fn similarity(subject: &RestaurantRecord, candidate: &RestaurantRecord) -> f64 {
    let weighted = cuisine_overlap(subject, candidate) * CUISINE_WEIGHT
        + price_proximity(subject.avg_price, candidate.avg_price) * PRICE_WEIGHT
        + rating_proximity(subject.rating, candidate.rating) * RATING_WEIGHT;
    round1((weighted * 10.0).clamp(0.0, 10.0))
}

/// Rank `candidates` by similarity to `subject`: same city only, the
/// subject itself excluded, ties broken by review count descending and then
/// by id so the ordering is fully deterministic. Truncated to `limit`.
pub fn rank_similar(
    subject: &RestaurantRecord,
    candidates: &[RestaurantRecord],
    limit: usize,
) -> Vec<SimilarityRanked> {
    let mut ranked: Vec<SimilarityRanked> = candidates
        .iter()
        .filter(|candidate| candidate.id != subject.id && candidate.city == subject.city)
        .map(|candidate| SimilarityRanked { record: candidate.clone(), score: similarity(subject, candidate) })
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.record.review_count.cmp(&a.record.review_count))
            .then_with(|| a.record.id.0.cmp(&b.record.id.0))
    });
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::restaurant::RestaurantId;

    fn record(
        id: &str,
        city: &str,
        cuisines: &[&str],
        price: f64,
        rating: Option<f64>,
        reviews: u32,
    ) -> RestaurantRecord {
        RestaurantRecord {
            id: RestaurantId(id.to_string()),
            name: format!("Restaurant {id}"),
            city: city.to_string(),
            area: None,
            cuisines: cuisines.iter().map(|c| c.to_string()).collect(),
            avg_price: price,
            rating,
            review_count: reviews,
        }
    }

    #[test]
    fn same_cuisine_and_bracket_outranks_distant_candidate() {
        let subject = record("r-0", "Chennai", &["South Indian"], 180.0, Some(4.2), 100);
        let close = record("r-1", "Chennai", &["South Indian"], 150.0, Some(4.0), 40);
        let distant = record("r-2", "Chennai", &["Continental"], 900.0, Some(2.5), 10);

        let ranked = rank_similar(&subject, &[distant.clone(), close.clone()], 5);
        assert_eq!(ranked[0].record.id, close.id);
        assert!(ranked[0].score > ranked[1].score);
    }

    #[test]
    fn other_cities_and_the_subject_itself_are_excluded() {
        let subject = record("r-0", "Chennai", &["South Indian"], 180.0, None, 0);
        let elsewhere = record("r-1", "Coimbatore", &["South Indian"], 180.0, None, 0);

        let ranked = rank_similar(&subject, &[subject.clone(), elsewhere], 5);
        assert!(ranked.is_empty());
    }

    #[test]
    fn score_ties_break_by_review_count_descending() {
        let subject = record("r-0", "Chennai", &["South Indian"], 180.0, Some(4.0), 0);
        let quiet = record("r-1", "Chennai", &["South Indian"], 180.0, Some(4.0), 10);
        let busy = record("r-2", "Chennai", &["South Indian"], 180.0, Some(4.0), 500);

        let ranked = rank_similar(&subject, &[quiet, busy], 5);
        assert_eq!(ranked[0].record.id.0, "r-2");
        assert_eq!(ranked[0].score, ranked[1].score);
    }

    #[test]
    fn limit_truncates_the_ranking() {
        let subject = record("r-0", "Chennai", &["South Indian"], 180.0, None, 0);
        let candidates: Vec<_> = (1..=6)
            .map(|n| record(&format!("r-{n}"), "Chennai", &["South Indian"], 200.0, None, n))
            .collect();

        assert_eq!(rank_similar(&subject, &candidates, 3).len(), 3);
    }

    #[test]
    fn ranking_is_idempotent() {
        let subject = record("r-0", "Chennai", &["South Indian", "Chettinad"], 320.0, Some(4.1), 75);
        let candidates = vec![
            record("r-1", "Chennai", &["Chettinad"], 280.0, Some(3.9), 60),
            record("r-2", "Chennai", &["North Indian"], 450.0, None, 20),
        ];

        assert_eq!(rank_similar(&subject, &candidates, 5), rank_similar(&subject, &candidates, 5));
    }
}
