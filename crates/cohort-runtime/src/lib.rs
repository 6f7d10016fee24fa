//! Runtime layer for the cohort heatmap.
//!
//! Owns the read-only sales table handle and serves heatmap and form
//! requests on top of it.

pub mod dataset;
pub mod service;

pub use cohort_core as core;
pub use cohort_data as data;
