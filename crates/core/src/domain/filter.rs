use serde::{Deserialize, Serialize};

/// Conjunctive constraints for a record-store query. An absent field means
/// no restriction on that attribute.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordFilter {
    pub city: Option<String>,
    pub area: Option<String>,
    pub cuisine: Option<String>,
    /// Inclusive lower bound and exclusive upper bound on `avg_price`.
    pub price_range: Option<(f64, f64)>,
}

impl RecordFilter {
    pub fn for_city(city: impl Into<String>) -> Self {
        Self { city: Some(city.into()), ..Self::default() }
    }

    pub fn with_cuisine(mut self, cuisine: impl Into<String>) -> Self {
        self.cuisine = Some(cuisine.into());
        self
    }

    pub fn is_unconstrained(&self) -> bool {
        self.city.is_none()
            && self.area.is_none()
            && self.cuisine.is_none()
            && self.price_range.is_none()
    }

    /// Stable textual form of the filter, used as part of cache keys.
    /// Two filters with identical constraints produce identical signatures.
    pub fn signature(&self) -> String {
        let price = match self.price_range {
            Some((min, max)) => format!("{min:.2}..{max:.2}"),
            None => "*".to_string(),
        };
        format!(
            "city={}|area={}|cuisine={}|price={}",
            normalized(self.city.as_deref()),
            normalized(self.area.as_deref()),
            normalized(self.cuisine.as_deref()),
            price,
        )
    }
}

fn normalized(value: Option<&str>) -> String {
    value.map(|v| v.trim().to_lowercase()).filter(|v| !v.is_empty()).unwrap_or_else(|| "*".to_string())
}
