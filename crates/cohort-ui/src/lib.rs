//! Terminal UI layer for the cohort heatmap.
//!
//! Provides themes, the retention heatmap and monthly retention views, and
//! the application event loop built on top of [`ratatui`].

pub mod app;
pub mod heatmap_view;
pub mod retention_view;
pub mod themes;

pub use cohort_core as core;
