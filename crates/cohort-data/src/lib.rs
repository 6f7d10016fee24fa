//! Data ingestion layer for the cohort heatmap.
//!
//! Responsible for discovering and parsing CSV sales tables into typed
//! transactions and running the cohort analysis pipeline over them.

pub mod analysis;
pub mod reader;

pub use cohort_core as core;
