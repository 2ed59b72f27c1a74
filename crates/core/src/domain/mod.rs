pub mod filter;
pub mod restaurant;
