//! Deterministic demo dataset and its verification contract.
//!
//! The seed spans three cities with deliberately uneven area coverage so
//! the analytics endpoints have something worth looking at: dense, varied
//! areas alongside thin single-cuisine ones, and a spread of price points
//! across all three buckets.

use sqlx::Row;

use crate::connection::DbPool;
use crate::store::StoreError;

#[derive(Debug, Clone, Copy)]
pub struct SeedRestaurant {
    pub id: &'static str,
    pub name: &'static str,
    pub city: &'static str,
    pub area: Option<&'static str>,
    pub cuisines: &'static [&'static str],
    pub avg_price: f64,
    pub rating: Option<f64>,
    pub review_count: i64,
}

pub const SEED_RESTAURANTS: &[SeedRestaurant] = &[
    // Chennai - T. Nagar: dense, competitive, mostly South Indian.
    SeedRestaurant { id: "r-chn-001", name: "Saravana Bhavan", city: "Chennai", area: Some("T. Nagar"), cuisines: &["South Indian"], avg_price: 180.0, rating: Some(4.3), review_count: 2140 },
    SeedRestaurant { id: "r-chn-002", name: "Sangeetha Veg Restaurant", city: "Chennai", area: Some("T. Nagar"), cuisines: &["South Indian", "Tamil Vegetarian"], avg_price: 220.0, rating: Some(4.1), review_count: 1320 },
    SeedRestaurant { id: "r-chn-003", name: "Anjappar Chettinad", city: "Chennai", area: Some("T. Nagar"), cuisines: &["Chettinad"], avg_price: 450.0, rating: Some(4.0), review_count: 980 },
    SeedRestaurant { id: "r-chn-004", name: "Junior Kuppanna", city: "Chennai", area: Some("T. Nagar"), cuisines: &["Chettinad", "Biryani Specialist"], avg_price: 420.0, rating: Some(4.2), review_count: 1105 },
    SeedRestaurant { id: "r-chn-005", name: "Madras Dosa Corner", city: "Chennai", area: Some("T. Nagar"), cuisines: &["South Indian", "Street Food"], avg_price: 120.0, rating: Some(3.9), review_count: 640 },
    // Chennai - Mylapore: mid density, varied.
    SeedRestaurant { id: "r-chn-006", name: "Rayar's Mess", city: "Chennai", area: Some("Mylapore"), cuisines: &["South Indian"], avg_price: 100.0, rating: Some(4.5), review_count: 860 },
    SeedRestaurant { id: "r-chn-007", name: "Mylai Karpagambal Mess", city: "Chennai", area: Some("Mylapore"), cuisines: &["Tamil Vegetarian"], avg_price: 150.0, rating: Some(4.2), review_count: 540 },
    SeedRestaurant { id: "r-chn-008", name: "Luz Avenue Cafe", city: "Chennai", area: Some("Mylapore"), cuisines: &["Cafe", "Continental"], avg_price: 520.0, rating: Some(3.8), review_count: 210 },
    // Chennai - Velachery: thin and narrow, an underserved candidate.
    SeedRestaurant { id: "r-chn-009", name: "Velachery Tiffin House", city: "Chennai", area: Some("Velachery"), cuisines: &["South Indian"], avg_price: 140.0, rating: Some(3.6), review_count: 95 },
    SeedRestaurant { id: "r-chn-010", name: "Grand Biriyani Express", city: "Chennai", area: Some("Velachery"), cuisines: &["South Indian"], avg_price: 260.0, rating: Some(3.4), review_count: 150 },
    // Chennai - Adyar: premium corner.
    SeedRestaurant { id: "r-chn-011", name: "The Coastal Kitchen", city: "Chennai", area: Some("Adyar"), cuisines: &["Seafood", "Kerala"], avg_price: 780.0, rating: Some(4.4), review_count: 430 },
    SeedRestaurant { id: "r-chn-012", name: "Azzurri Trattoria", city: "Chennai", area: Some("Adyar"), cuisines: &["Italian", "Continental"], avg_price: 950.0, rating: Some(4.1), review_count: 260 },
    SeedRestaurant { id: "r-chn-013", name: "Adyar Ananda Bhavan", city: "Chennai", area: Some("Adyar"), cuisines: &["South Indian", "Tamil Vegetarian"], avg_price: 200.0, rating: Some(4.0), review_count: 1510 },
    // Chennai - no area recorded, newly listed and unrated.
    SeedRestaurant { id: "r-chn-014", name: "OMR Food Truck Park", city: "Chennai", area: None, cuisines: &["Street Food", "Fast Food"], avg_price: 160.0, rating: None, review_count: 0 },
    // Coimbatore - RS Puram and Gandhipuram.
    SeedRestaurant { id: "r-cbe-001", name: "Annapoorna Gowrishankar", city: "Coimbatore", area: Some("RS Puram"), cuisines: &["South Indian"], avg_price: 160.0, rating: Some(4.4), review_count: 1870 },
    SeedRestaurant { id: "r-cbe-002", name: "Shree Anandhaas", city: "Coimbatore", area: Some("RS Puram"), cuisines: &["South Indian", "North Indian"], avg_price: 240.0, rating: Some(4.2), review_count: 990 },
    SeedRestaurant { id: "r-cbe-003", name: "Hotel Junior Kuppanna", city: "Coimbatore", area: Some("Gandhipuram"), cuisines: &["Chettinad"], avg_price: 400.0, rating: Some(4.1), review_count: 760 },
    SeedRestaurant { id: "r-cbe-004", name: "That's Y On The Go", city: "Coimbatore", area: Some("Gandhipuram"), cuisines: &["Multi-Cuisine", "Chinese"], avg_price: 550.0, rating: Some(3.9), review_count: 340 },
    SeedRestaurant { id: "r-cbe-005", name: "Peelamedu Mess", city: "Coimbatore", area: Some("Peelamedu"), cuisines: &["Tamil Vegetarian"], avg_price: 110.0, rating: Some(3.7), review_count: 120 },
    // Madurai.
    SeedRestaurant { id: "r-mdu-001", name: "Murugan Idli Shop", city: "Madurai", area: Some("Simmakkal"), cuisines: &["South Indian"], avg_price: 120.0, rating: Some(4.5), review_count: 2380 },
    SeedRestaurant { id: "r-mdu-002", name: "Amma Mess", city: "Madurai", area: Some("Simmakkal"), cuisines: &["Chettinad", "South Indian"], avg_price: 280.0, rating: Some(4.3), review_count: 1450 },
    SeedRestaurant { id: "r-mdu-003", name: "Kumar Mess", city: "Madurai", area: Some("Anna Nagar"), cuisines: &["Chettinad"], avg_price: 320.0, rating: Some(4.0), review_count: 680 },
    SeedRestaurant { id: "r-mdu-004", name: "Temple View Rooftop", city: "Madurai", area: Some("Anna Nagar"), cuisines: &["Multi-Cuisine", "Continental"], avg_price: 650.0, rating: Some(3.8), review_count: 240 },
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedResult {
    pub inserted: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationResult {
    pub total_restaurants: i64,
    pub cities: Vec<(String, i64)>,
    pub passed: bool,
}

/// Load the canonical demo dataset, replacing any previous seed. Insertion
/// is idempotent: seeding twice leaves exactly one copy of the dataset.
pub async fn seed(pool: &DbPool) -> Result<SeedResult, StoreError> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM restaurant").execute(&mut *tx).await?;

    for restaurant in SEED_RESTAURANTS {
        let cuisines = serde_json::to_string(restaurant.cuisines)
            .map_err(|error| StoreError::Decode(format!("encode cuisines: {error}")))?;
        sqlx::query(
            "INSERT INTO restaurant (id, name, city, area, cuisines, avg_price, rating, review_count)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(restaurant.id)
        .bind(restaurant.name)
        .bind(restaurant.city)
        .bind(restaurant.area)
        .bind(cuisines)
        .bind(restaurant.avg_price)
        .bind(restaurant.rating)
        .bind(restaurant.review_count)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(SeedResult { inserted: SEED_RESTAURANTS.len() })
}

/// Check the seeded dataset against the contract: the full row count plus
/// one entry per expected city.
pub async fn verify_seed(pool: &DbPool) -> Result<VerificationResult, StoreError> {
    let total_restaurants =
        sqlx::query("SELECT COUNT(*) AS count FROM restaurant")
            .fetch_one(pool)
            .await?
            .get::<i64, _>("count");

    let city_rows =
        sqlx::query("SELECT city, COUNT(*) AS count FROM restaurant GROUP BY city ORDER BY city")
            .fetch_all(pool)
            .await?;
    let cities: Vec<(String, i64)> = city_rows
        .iter()
        .map(|row| (row.get::<String, _>("city"), row.get::<i64, _>("count")))
        .collect();

    let expected_cities = {
        let mut names: Vec<&str> = SEED_RESTAURANTS.iter().map(|r| r.city).collect();
        names.sort_unstable();
        names.dedup();
        names
    };

    let passed = total_restaurants == SEED_RESTAURANTS.len() as i64
        && cities.len() == expected_cities.len()
        && cities.iter().zip(&expected_cities).all(|((name, _), expected)| name == expected);

    Ok(VerificationResult { total_restaurants, cities, passed })
}
