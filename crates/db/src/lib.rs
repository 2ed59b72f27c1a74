pub mod connection;
pub mod fixtures;
pub mod migrations;
pub mod store;

pub use connection::{connect_with_settings, DbPool};
pub use fixtures::{seed, verify_seed, SeedResult, VerificationResult};
pub use store::{InMemoryRestaurantStore, RestaurantStore, SqlRestaurantStore, StoreError};
