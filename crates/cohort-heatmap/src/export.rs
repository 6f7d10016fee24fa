use cohort_data::analysis::CohortAnalysis;
use serde_json::{json, Value};

/// JSON document written by `--view export`.
///
/// `periods` lists the month labels in index order; `matrix.rows[].rates`
/// holds `null` where a cohort has no observation at that offset.
pub fn export_document(analysis: &CohortAnalysis) -> Value {
    json!({
        "metadata": analysis.metadata,
        "periods": analysis.periods.index_to_period(),
        "matrix": analysis.matrix,
    })
}

// ── Tests ──────────────────────────────────────────────────────────────────────
