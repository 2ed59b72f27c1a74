use serde::{Deserialize, Serialize};

use crate::aggregate::round2;

/// Budget ceilings for the investment tiers, in the store's currency unit.
const SMALL_SCALE_CEILING: f64 = 1_000_000.0;
const MEDIUM_SCALE_CEILING: f64 = 5_000_000.0;

/// Assumed monthly revenue as a fraction of the invested budget.
const MONTHLY_REVENUE_RATE: f64 = 0.05;
/// Assumed profit margin on that revenue.
const PROFIT_MARGIN: f64 = 0.15;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvestmentTier {
    SmallScale,
    MediumScale,
    LargeScale,
}

impl InvestmentTier {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SmallScale => "Small Scale",
            Self::MediumScale => "Medium Scale",
            Self::LargeScale => "Large Scale",
        }
    }

    pub fn suggested_business_type(self) -> &'static str {
        match self {
            Self::SmallScale => "Cloud Kitchen / Street Food",
            Self::MediumScale => "Casual Dining / Quick Service",
            Self::LargeScale => "Fine Dining / Multi-Cuisine",
        }
    }
}

/// Classify a positive budget into a tier. Callers validate the budget
/// before reaching this point; a non-positive value still maps to the
/// smallest tier rather than failing.
pub fn investment_tier(budget: f64) -> InvestmentTier {
    if budget < SMALL_SCALE_CEILING {
        InvestmentTier::SmallScale
    } else if budget < MEDIUM_SCALE_CEILING {
        InvestmentTier::MediumScale
    } else {
        InvestmentTier::LargeScale
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoiProjection {
    pub estimated_monthly_revenue: f64,
    pub estimated_profit_margin: &'static str,
    pub estimated_monthly_profit: f64,
    pub breakeven_period_months: u32,
}

impl RoiProjection {
    /// Rough projection from market averages; deliberately coarse and
    /// presented as guidance, not a forecast.
    pub fn for_budget(budget: f64) -> Self {
        let revenue = budget * MONTHLY_REVENUE_RATE;
        let profit = revenue * PROFIT_MARGIN;
        let breakeven = if profit > 0.0 { (budget / profit).round() as u32 } else { 0 };

        Self {
            estimated_monthly_revenue: round2(revenue),
            estimated_profit_margin: "15%",
            estimated_monthly_profit: round2(profit),
            breakeven_period_months: breakeven,
        }
    }
}

/// Coarse competition label from the size of the existing market.
pub fn competition_level(restaurant_count: usize) -> &'static str {
    if restaurant_count > 100 {
        "High"
    } else if restaurant_count > 50 {
        "Medium"
    } else {
        "Low"
    }
}
