//! Deterministic heuristics that turn aggregated statistics into ranked,
//! labeled outputs. No trained models, no hidden state: identical inputs
//! always produce identical scores.

pub mod investment;
pub mod opportunity;
pub mod similarity;
