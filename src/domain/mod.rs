//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the raw, untyped CSV table (`RawTable`)
//! - typed sales rows and the in-memory table (`SalesRecord`, `SalesTable`)
//! - run configuration (`AnalysisConfig`) and resampling frequency

pub mod types;

pub use types::*;
