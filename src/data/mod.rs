//! Data sources other than the input CSV.
//!
//! - seeded synthetic dataset in the input schema (`sample`)

pub mod sample;

pub use sample::*;
