//! Cohort × offset retention matrix.
//!
//! Counts distinct active customers for every observed `(cohort_id,
//! cohort_index)` pair, lays the counts out on a dense grid, and normalizes
//! each row by the cohort's size at offset zero.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::error::{CohortError, Result};
use crate::models::{AnnotatedTransaction, CustomerId, YearMonth};
use crate::periods::PeriodIndex;

// ── CohortRow ─────────────────────────────────────────────────────────────────

/// One cohort's line in the matrix.
///
/// `counts` and `rates` have one slot per offset; `None` marks an offset at
/// which the cohort has no observation at all, which is distinct from a
/// measured rate of zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CohortRow {
    pub cohort_id: usize,
    pub period: YearMonth,
    pub label: String,
    pub counts: Vec<Option<usize>>,
    pub rates: Vec<Option<f64>>,
}

impl CohortRow {
    /// Customers who made their first purchase in this cohort's month.
    pub fn size(&self) -> usize {
        self.counts.first().copied().flatten().unwrap_or(0)
    }
}

// ── RetentionMatrix ───────────────────────────────────────────────────────────

/// Rows are cohorts in ascending order, columns are offsets `0..=max`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RetentionMatrix {
    rows: Vec<CohortRow>,
    offsets: usize,
}

impl RetentionMatrix {
    pub fn rows(&self) -> &[CohortRow] {
        &self.rows
    }

    /// Number of offset columns.
    pub fn offsets(&self) -> usize {
        self.offsets
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row labels in display order.
    pub fn cohort_labels(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.label.as_str()).collect()
    }

    /// Retention rate at `(row, offset)`; `None` for no data or out of range.
    pub fn value(&self, row: usize, offset: usize) -> Option<f64> {
        self.rows.get(row)?.rates.get(offset).copied().flatten()
    }

    /// Distinct active customers at `(row, offset)`.
    pub fn count(&self, row: usize, offset: usize) -> Option<usize> {
        self.rows.get(row)?.counts.get(offset).copied().flatten()
    }

    /// Row whose label is `label`, e.g. `"2010-01"`.
    pub fn row_by_label(&self, label: &str) -> Option<&CohortRow> {
        self.rows.iter().find(|r| r.label == label)
    }

    /// `(label, size)` for every cohort.
    pub fn cohort_sizes(&self) -> Vec<(&str, usize)> {
        self.rows
            .iter()
            .map(|r| (r.label.as_str(), r.size()))
            .collect()
    }

    /// Largest rate outside column zero, used to scale heatmap shading.
    pub fn max_value(&self) -> Option<f64> {
        self.rows
            .iter()
            .flat_map(|r| r.rates.iter().skip(1).copied().flatten())
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))))
    }
}

// ── Computation ───────────────────────────────────────────────────────────────

/// Build the normalized retention matrix from cohort-annotated transactions.
///
/// Repeat purchases by one customer at the same offset count once. Fails with
/// [`CohortError::ZeroCohortSize`] when a row has no customers at offset zero
/// instead of producing NaN or infinite rates.
pub fn compute_retention_matrix(
    annotated: &[AnnotatedTransaction<'_>],
    periods: &PeriodIndex,
) -> Result<RetentionMatrix> {
    let active = distinct_customers_by_cell(annotated);

    let Some(max_offset) = active.keys().map(|(_, offset)| *offset).max() else {
        return Ok(RetentionMatrix::default());
    };
    let offsets = max_offset + 1;

    // BTreeMap keys iterate cohort-major, so rows come out ascending.
    let mut counts_by_cohort: BTreeMap<usize, Vec<Option<usize>>> = BTreeMap::new();
    for ((cohort_id, offset), customers) in &active {
        counts_by_cohort
            .entry(*cohort_id)
            .or_insert_with(|| vec![None; offsets])[*offset] = Some(customers.len());
    }

    let rows = counts_by_cohort
        .into_iter()
        .map(|(cohort_id, counts)| build_row(cohort_id, counts, periods))
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(cohorts = rows.len(), offsets, "computed retention matrix");

    Ok(RetentionMatrix { rows, offsets })
}

/// Distinct customer sets keyed by `(cohort_id, cohort_index)`.
fn distinct_customers_by_cell<'a>(
    annotated: &[AnnotatedTransaction<'a>],
) -> BTreeMap<(usize, usize), HashSet<&'a CustomerId>> {
    let mut cells: BTreeMap<(usize, usize), HashSet<&'a CustomerId>> = BTreeMap::new();
    for a in annotated {
        cells
            .entry((a.cohort_id, a.cohort_index))
            .or_default()
            .insert(a.customer_id);
    }
    cells
}

/// Normalize one cohort's counts and attach its period label.
fn build_row(
    cohort_id: usize,
    counts: Vec<Option<usize>>,
    periods: &PeriodIndex,
) -> Result<CohortRow> {
    let period = periods.period(cohort_id).ok_or_else(|| {
        CohortError::Other(anyhow::anyhow!(
            "cohort {cohort_id} has no period in an index of {} periods",
            periods.len()
        ))
    })?;
    let label = period.label();

    let size = match counts.first().copied().flatten() {
        Some(n) if n > 0 => n,
        _ => return Err(CohortError::ZeroCohortSize { cohort: label }),
    };

    let rates = counts
        .iter()
        .map(|c| c.map(|n| n as f64 / size as f64))
        .collect();

    Ok(CohortRow {
        cohort_id,
        period,
        label,
        counts,
        rates,
    })
}
