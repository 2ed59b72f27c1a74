use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::aggregate::{round1, AreaStats};

/// Review volume at which the demand signal reaches half strength.
const DEMAND_HALF_SATURATION: f64 = 50.0;

/// Label cut points on the 0-10 score range. The three labels partition the
/// range into contiguous, non-overlapping intervals so a classification is
/// reproducible from the score alone.
pub const HIGH_CUTOFF: f64 = 7.0;
pub const MEDIUM_CUTOFF: f64 = 4.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpportunityLabel {
    High,
    Medium,
    Low,
}

impl OpportunityLabel {
    pub fn from_score(score: f64) -> Self {
        if score >= HIGH_CUTOFF {
            Self::High
        } else if score >= MEDIUM_CUTOFF {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

/// Opportunity score for a cuisine within a city.
///
/// `market_share` is the cuisine's fraction of the city's restaurants
/// (0.0-1.0); `review_volume` is the total review count across that
/// cuisine's restaurants, used as the demand signal. The score is
/// non-increasing in market share for fixed demand, saturating in demand,
/// and bounded to 0-10 with one decimal.
pub fn cuisine_opportunity(market_share: f64, review_volume: u64) -> f64 {
    let share = market_share.clamp(0.0, 1.0);
    let volume = review_volume as f64;
    let demand = volume / (volume + DEMAND_HALF_SATURATION);

    let base = (1.0 - share) * 10.0;
    round1((base * (0.4 + 0.6 * demand)).clamp(0.0, 10.0))
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AreaOpportunity {
    pub score: f64,
    pub label: OpportunityLabel,
    /// Fixed template keyed by label tier; never free-form text.
    pub recommendation: &'static str,
}

fn recommendation_for(label: OpportunityLabel) -> &'static str {
    match label {
        OpportunityLabel::High => {
            "Strong opening opportunity: low competition with an unmet quality or price gap."
        }
        OpportunityLabel::Medium => {
            "Moderate opportunity. A differentiated concept could capture demand."
        }
        OpportunityLabel::Low => {
            "Saturated market. Entry requires displacing established competitors."
        }
    }
}

/// Opportunity score for an area, combining competition (existing supply),
/// the quality gap left by current restaurants, and how far the area's
/// price point sits from the citywide average.
pub fn area_opportunity(stats: &AreaStats, city_avg_price: f64) -> AreaOpportunity {
    let competition = (10.0 - stats.restaurant_count as f64).clamp(0.0, 10.0);
    let quality_gap = ((5.0 - stats.avg_rating) * 2.0).clamp(0.0, 10.0);
    let price_alignment = if city_avg_price > 0.0 {
        let deviation = (stats.avg_price - city_avg_price).abs() / city_avg_price;
        (1.0 - deviation.min(1.0)) * 10.0
    } else {
        5.0
    };

    let score = round1(
        (competition * 0.5 + quality_gap * 0.3 + price_alignment * 0.2).clamp(0.0, 10.0),
    );
    let label = OpportunityLabel::from_score(score);

    AreaOpportunity { score, label, recommendation: recommendation_for(label) }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnderservedArea {
    pub area: String,
    pub restaurant_count: usize,
    pub cuisine_variety: usize,
}

/// Areas with both low supply and low cuisine diversity relative to their
/// city. Supply must fall in the bottom quartile of area counts AND variety
/// must sit below the citywide median; requiring both avoids flagging
/// small-but-saturated niche areas.
pub fn underserved_areas(breakdown: &BTreeMap<String, AreaStats>) -> Vec<UnderservedArea> {
    if breakdown.is_empty() {
        return Vec::new();
    }

    let mut counts: Vec<usize> = breakdown.values().map(|s| s.restaurant_count).collect();
    counts.sort_unstable();
    let quartile_count = counts[(counts.len() - 1) / 4];

    let mut varieties: Vec<usize> = breakdown.values().map(|s| s.cuisine_variety).collect();
    varieties.sort_unstable();
    let median_variety = if varieties.len() % 2 == 1 {
        varieties[varieties.len() / 2] as f64
    } else {
        let upper = varieties.len() / 2;
        (varieties[upper - 1] + varieties[upper]) as f64 / 2.0
    };

    let mut flagged: Vec<UnderservedArea> = breakdown
        .iter()
        .filter(|(_, stats)| {
            stats.restaurant_count <= quartile_count
                && (stats.cuisine_variety as f64) < median_variety
        })
        .map(|(area, stats)| UnderservedArea {
            area: area.clone(),
            restaurant_count: stats.restaurant_count,
            cuisine_variety: stats.cuisine_variety,
        })
        .collect();

    flagged.sort_by(|a, b| {
        a.restaurant_count.cmp(&b.restaurant_count).then_with(|| a.area.cmp(&b.area))
    });
    flagged
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn stats(count: usize, price: f64, rating: f64, variety: usize) -> AreaStats {
        AreaStats {
            restaurant_count: count,
            avg_price: price,
            avg_rating: rating,
            cuisine_variety: variety,
        }
    }

    #[test]
    fn label_partition_is_contiguous_and_reproducible() {
        assert_eq!(OpportunityLabel::from_score(10.0), OpportunityLabel::High);
        assert_eq!(OpportunityLabel::from_score(7.0), OpportunityLabel::High);
        assert_eq!(OpportunityLabel::from_score(6.9), OpportunityLabel::Medium);
        assert_eq!(OpportunityLabel::from_score(4.0), OpportunityLabel::Medium);
        assert_eq!(OpportunityLabel::from_score(3.9), OpportunityLabel::Low);
        assert_eq!(OpportunityLabel::from_score(0.0), OpportunityLabel::Low);
    }

    #[test]
    fn cuisine_score_is_non_increasing_in_market_share_for_fixed_demand() {
        let demand = 400;
        let shares = [0.0, 0.05, 0.1, 0.2, 0.35, 0.5, 0.75, 0.9, 1.0];
        for pair in shares.windows(2) {
            let lower = cuisine_opportunity(pair[0], demand);
            let higher = cuisine_opportunity(pair[1], demand);
            assert!(
                higher <= lower,
                "share {} scored {higher}, above {lower} at share {}",
                pair[1],
                pair[0],
            );
        }
    }

    #[test]
    fn cuisine_score_is_bounded_to_zero_ten() {
        for share in [0.0, 0.3, 1.0, 5.0, -1.0] {
            for volume in [0u64, 10, 100, 1_000_000] {
                let score = cuisine_opportunity(share, volume);
                assert!((0.0..=10.0).contains(&score), "score {score} out of range");
            }
        }
    }

    #[test]
    fn rare_cuisine_with_real_demand_scores_high() {
        let score = cuisine_opportunity(0.04, 900);
        assert_eq!(OpportunityLabel::from_score(score), OpportunityLabel::High);
    }

    #[test]
    fn saturated_cuisine_scores_low_regardless_of_demand() {
        let score = cuisine_opportunity(0.8, 10_000);
        assert_eq!(OpportunityLabel::from_score(score), OpportunityLabel::Low);
    }

    #[test]
    fn area_opportunity_uses_fixed_recommendation_templates() {
        let open_field = area_opportunity(&stats(1, 200.0, 3.0, 2), 210.0);
        let crowded = area_opportunity(&stats(40, 800.0, 4.8, 12), 250.0);

        assert!(open_field.score > crowded.score);
        assert_eq!(open_field.recommendation, recommendation_for(open_field.label));
        assert_eq!(crowded.label, OpportunityLabel::Low);
    }

    #[test]
    fn area_opportunity_is_deterministic() {
        let input = stats(3, 420.0, 3.6, 4);
        assert_eq!(area_opportunity(&input, 390.0), area_opportunity(&input, 390.0));
    }

    #[test]
    fn underserved_requires_low_supply_and_low_variety() {
        let mut breakdown = BTreeMap::new();
        // Low supply but high variety: must NOT be flagged.
        breakdown.insert("Niche Bazaar".to_string(), stats(2, 300.0, 4.0, 9));
        // Low supply and low variety: must be flagged.
        breakdown.insert("Outskirts".to_string(), stats(2, 250.0, 3.5, 1));
        breakdown.insert("Center".to_string(), stats(20, 400.0, 4.2, 8));
        breakdown.insert("Old Town".to_string(), stats(15, 350.0, 4.0, 6));

        let flagged = underserved_areas(&breakdown);
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].area, "Outskirts");
        assert_eq!(flagged[0].restaurant_count, 2);
        assert_eq!(flagged[0].cuisine_variety, 1);
    }

    #[test]
    fn underserved_of_empty_breakdown_is_empty() {
        assert!(underserved_areas(&BTreeMap::new()).is_empty());
    }
}
