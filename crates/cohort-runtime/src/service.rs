//! Request handling on top of a [`DatasetHandle`].
//!
//! The cohort heatmap and the single year + country form are served by the
//! same [`RetentionService`] but stay separate computations.

use serde::{Deserialize, Serialize};

use cohort_core::error::{CohortError, Result};
use cohort_core::single_cohort::{
    compute_single_cohort_retention, parse_cohort_year, MonthlyRetention,
};
use cohort_data::analysis::{analyze_cohorts, CohortAnalysis};

use crate::dataset::DatasetHandle;

// ── Form types ────────────────────────────────────────────────────────────────

/// Raw fields of a retention query, exactly as submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionForm {
    pub cohort_year: String,
    pub country: String,
}

impl RetentionForm {
    pub fn new(cohort_year: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            cohort_year: cohort_year.into(),
            country: country.into(),
        }
    }
}

/// What a form submission produced.
#[derive(Debug, Clone, PartialEq)]
pub enum FormOutcome {
    /// The input was rejected before touching the data; carries the message
    /// to show the user.
    Invalid(String),
    /// Monthly retention for the query, possibly with no months.
    Results(MonthlyRetention),
}

// ── RetentionService ──────────────────────────────────────────────────────────

/// Serves heatmap and form requests from one dataset handle.
#[derive(Debug)]
pub struct RetentionService {
    dataset: DatasetHandle,
}

impl RetentionService {
    pub fn new(dataset: DatasetHandle) -> Self {
        Self { dataset }
    }

    pub fn dataset(&self) -> &DatasetHandle {
        &self.dataset
    }

    /// Run the full cohort pipeline over the current table.
    pub fn heatmap(&mut self) -> Result<CohortAnalysis> {
        let table = self.dataset.transactions()?;
        analyze_cohorts(&table)
    }

    /// Validate and answer a year + country form.
    ///
    /// A non-integer year becomes [`FormOutcome::Invalid`] without loading
    /// the table. Data errors are returned as `Err`.
    pub fn submit(&mut self, form: &RetentionForm) -> Result<FormOutcome> {
        let year = match parse_cohort_year(&form.cohort_year) {
            Ok(year) => year,
            Err(CohortError::InvalidInput(message)) => {
                tracing::info!(input = %form.cohort_year, "rejected cohort year");
                return Ok(FormOutcome::Invalid(message));
            }
            Err(other) => return Err(other),
        };

        let table = self.dataset.transactions()?;
        let retention = compute_single_cohort_retention(table.iter(), year, &form.country)?;
        Ok(FormOutcome::Results(retention))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
