//! Main analysis pipeline.
//!
//! Orchestrates period indexing, cohort assignment and retention
//! aggregation, returning a [`CohortAnalysis`] ready for the UI layer.

use std::collections::HashSet;
use std::path::Path;

use chrono::Utc;
use cohort_core::cohorts::{assign_cohorts, cohort_count};
use cohort_core::error::Result;
use cohort_core::models::Transaction;
use cohort_core::periods::{index_periods, PeriodIndex};
use cohort_core::retention::{compute_retention_matrix, RetentionMatrix};

use crate::reader::load_transactions;

// ── Public types ──────────────────────────────────────────────────────────────

/// Metadata produced alongside the analysis result.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AnalysisMetadata {
    /// RFC 3339 timestamp when this result was generated.
    pub generated_at: String,
    /// Rows handed to the pipeline, anonymous ones included.
    pub rows_in: usize,
    /// Rows dropped because they carry no customer id.
    pub rows_without_customer: usize,
    pub customers: usize,
    pub periods: usize,
    pub cohorts: usize,
    /// Sum of `quantity * unit_price` over customer rows.
    pub total_sales: f64,
    /// Wall-clock seconds spent in the transform.
    pub transform_time_seconds: f64,
}

/// The complete output of [`analyze_cohorts`].
#[derive(Debug, Clone)]
pub struct CohortAnalysis {
    pub matrix: RetentionMatrix,
    /// Time axis the matrix was built on.
    pub periods: PeriodIndex,
    pub metadata: AnalysisMetadata,
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Run the full cohort pipeline over an in-memory table.
///
/// 1. Drop rows without a customer id.
/// 2. Index the observed months of the remaining rows.
/// 3. Assign every customer to the cohort of their first month.
/// 4. Aggregate and normalize into a [`RetentionMatrix`].
pub fn analyze_cohorts(transactions: &[Transaction]) -> Result<CohortAnalysis> {
    let start = std::time::Instant::now();

    // ── Step 1: Customer rows ────────────────────────────────────────────────
    let known: Vec<&Transaction> = transactions
        .iter()
        .filter(|t| t.customer_id.is_some())
        .collect();
    let rows_without_customer = transactions.len() - known.len();

    // ── Step 2: Periods ──────────────────────────────────────────────────────
    let periods = index_periods(known.iter().copied());

    // ── Step 3: Cohorts ──────────────────────────────────────────────────────
    let annotated = assign_cohorts(known.iter().copied(), &periods)?;

    // ── Step 4: Matrix ───────────────────────────────────────────────────────
    let matrix = compute_retention_matrix(&annotated, &periods)?;

    let customers: HashSet<_> = annotated.iter().map(|a| a.customer_id).collect();
    let total_sales: f64 = known.iter().map(|t| t.sales()).sum();

    let metadata = AnalysisMetadata {
        generated_at: Utc::now().to_rfc3339(),
        rows_in: transactions.len(),
        rows_without_customer,
        customers: customers.len(),
        periods: periods.len(),
        cohorts: cohort_count(&annotated),
        total_sales,
        transform_time_seconds: start.elapsed().as_secs_f64(),
    };

    tracing::debug!(
        rows = metadata.rows_in,
        anonymous = metadata.rows_without_customer,
        customers = metadata.customers,
        cohorts = metadata.cohorts,
        "cohort analysis complete"
    );

    Ok(CohortAnalysis {
        matrix,
        periods,
        metadata,
    })
}

/// Load the table at `data_path` and run [`analyze_cohorts`] over it.
pub fn load_and_analyze(data_path: &Path) -> Result<CohortAnalysis> {
    let dataset = load_transactions(data_path)?;
    analyze_cohorts(&dataset.transactions)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
