//! `apparel-sales` library crate.
//!
//! The binary (`sales`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the pipeline stages (ingest, quality, transform, aggregate, charts) can be
//!   reused on their own
//! - code stays easy to navigate as the project grows

pub mod aggregate;
pub mod app;
pub mod charts;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod plot;
pub mod quality;
pub mod report;
pub mod stats;
pub mod transform;
pub mod tui;
