//! Single year + country retention query.
//!
//! The filtered rows form one implicit cohort; each calendar month of the
//! year is compared against everyone in that cohort. There is no per-customer
//! first-purchase logic here, which keeps it separate from
//! [`crate::retention`].

use std::collections::{BTreeMap, HashSet};

use chrono::Datelike;
use serde::Serialize;

use crate::error::{CohortError, Result};
use crate::models::{CustomerId, Transaction};

/// Message returned to the user when the year field is not a number.
pub const INVALID_YEAR_MESSAGE: &str = "Invalid input: cohort year must be an integer";

// ── Types ─────────────────────────────────────────────────────────────────────

/// Activity in one calendar month of the queried year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthRetention {
    /// Calendar month, `1..=12`.
    pub month: u32,
    pub active_customers: usize,
    /// `active_customers / cohort_customers`, in `0.0..=1.0`.
    pub ratio: f64,
}

impl MonthRetention {
    pub fn percent(&self) -> f64 {
        self.ratio * 100.0
    }
}

/// Result of [`compute_single_cohort_retention`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MonthlyRetention {
    pub year: i32,
    pub country: String,
    /// Distinct customers anywhere in the filtered rows.
    pub cohort_customers: usize,
    pub months: Vec<MonthRetention>,
}

impl MonthlyRetention {
    /// `true` when no row matched the year and country.
    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    /// `(month, ratio)` pairs in calendar order.
    pub fn pairs(&self) -> Vec<(u32, f64)> {
        self.months.iter().map(|m| (m.month, m.ratio)).collect()
    }
}

// ── Input validation ──────────────────────────────────────────────────────────

/// Parse the cohort year field of a query.
///
/// Any non-integer input yields [`CohortError::InvalidInput`] carrying
/// [`INVALID_YEAR_MESSAGE`].
pub fn parse_cohort_year(raw: &str) -> Result<i32> {
    raw.trim()
        .parse::<i32>()
        .map_err(|_| CohortError::InvalidInput(INVALID_YEAR_MESSAGE.to_string()))
}

// ── Computation ───────────────────────────────────────────────────────────────

/// Monthly retention for customers who bought in `country` during `year`.
///
/// Months run from the first to the last month with a matching row, inclusive;
/// a month in that span with no matching activity gets a ratio of `0.0`.
/// Anonymous rows are ignored. A well-formed query with no matching rows
/// returns an empty result rather than an error.
pub fn compute_single_cohort_retention<'a, I>(
    transactions: I,
    year: i32,
    country: &str,
) -> Result<MonthlyRetention>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut by_month: BTreeMap<u32, HashSet<&'a CustomerId>> = BTreeMap::new();
    let mut cohort: HashSet<&'a CustomerId> = HashSet::new();

    for txn in transactions {
        if txn.timestamp.year() != year || txn.country != country {
            continue;
        }
        let Some(customer) = txn.customer_id.as_ref() else {
            continue;
        };
        cohort.insert(customer);
        by_month
            .entry(txn.timestamp.month())
            .or_default()
            .insert(customer);
    }

    let mut result = MonthlyRetention {
        year,
        country: country.to_string(),
        cohort_customers: cohort.len(),
        months: Vec::new(),
    };

    let (Some(first), Some(last)) = (
        by_month.keys().next().copied(),
        by_month.keys().next_back().copied(),
    ) else {
        tracing::debug!(year, country, "no rows matched single cohort query");
        return Ok(result);
    };

    if cohort.is_empty() {
        return Err(CohortError::ZeroCohortSize {
            cohort: format!("{year} {country}"),
        });
    }
    let size = cohort.len() as f64;

    result.months = (first..=last)
        .map(|month| {
            let active = by_month.get(&month).map_or(0, HashSet::len);
            MonthRetention {
                month,
                active_customers: active,
                ratio: active as f64 / size,
            }
        })
        .collect();

    tracing::debug!(
        year,
        country,
        customers = result.cohort_customers,
        months = result.months.len(),
        "computed single cohort retention"
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn txn(customer: Option<&str>, country: &str, y: i32, m: u32) -> Transaction {
        Transaction {
            invoice_id: "536365".into(),
            item_id: "71053".into(),
            description: "WHITE METAL LANTERN".into(),
            quantity: 6,
            unit_price: 3.39,
            timestamp: NaiveDate::from_ymd_opt(y, m, 1)
                .unwrap()
                .and_hms_opt(8, 26, 0)
                .unwrap(),
            customer_id: customer.map(CustomerId::new),
            country: country.to_string(),
        }
    }

    // ── parse_cohort_year ─────────────────────────────────────────────────────

    #[test]
    fn test_parse_cohort_year_accepts_integer() {
        assert_eq!(parse_cohort_year("2010").unwrap(), 2010);
        assert_eq!(parse_cohort_year(" 2011 ").unwrap(), 2011);
    }

    #[test]
    fn test_parse_cohort_year_rejects_text() {
        for bad in ["abc", "", "2010.5", "20 10"] {
            let err = parse_cohort_year(bad).unwrap_err();
            assert!(matches!(err, CohortError::InvalidInput(ref m) if m == INVALID_YEAR_MESSAGE));
        }
    }

    // ── compute_single_cohort_retention ───────────────────────────────────────

    #[test]
    fn test_no_matching_rows_is_empty_not_error() {
        let txns = vec![txn(Some("1"), "United Kingdom", 2010, 3)];
        let result = compute_single_cohort_retention(&txns, 2010, "France").unwrap();
        assert!(result.is_empty());
        assert_eq!(result.cohort_customers, 0);
        assert!(result.pairs().is_empty());
    }

    #[test]
    fn test_ratio_against_whole_filtered_population() {
        let txns = vec![
            txn(Some("1"), "France", 2010, 1),
            txn(Some("2"), "France", 2010, 1),
            txn(Some("1"), "France", 2010, 2),
            txn(Some("1"), "France", 2010, 2),
            txn(Some("3"), "France", 2010, 3),
            txn(Some("4"), "Germany", 2010, 2),
            txn(Some("5"), "France", 2011, 1),
        ];
        let result = compute_single_cohort_retention(&txns, 2010, "France").unwrap();

        assert_eq!(result.cohort_customers, 3);
        let pairs = result.pairs();
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs[0].0, 1);
        assert!((pairs[0].1 - 2.0 / 3.0).abs() < 1e-12);
        assert!((pairs[1].1 - 1.0 / 3.0).abs() < 1e-12);
        assert!((pairs[2].1 - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_quiet_month_inside_span_is_zero() {
        let txns = vec![
            txn(Some("1"), "Spain", 2010, 2),
            txn(Some("1"), "Spain", 2010, 5),
        ];
        let result = compute_single_cohort_retention(&txns, 2010, "Spain").unwrap();
        let months: Vec<u32> = result.months.iter().map(|m| m.month).collect();
        assert_eq!(months, vec![2, 3, 4, 5]);
        assert_eq!(result.months[1].ratio, 0.0);
        assert_eq!(result.months[1].active_customers, 0);
        assert_eq!(result.months[3].percent(), 100.0);
    }

    #[test]
    fn test_anonymous_rows_ignored() {
        let txns = vec![
            txn(None, "EIRE", 2010, 1),
            txn(Some("1"), "EIRE", 2010, 4),
        ];
        let result = compute_single_cohort_retention(&txns, 2010, "EIRE").unwrap();
        assert_eq!(result.cohort_customers, 1);
        assert_eq!(result.pairs(), vec![(4, 1.0)]);
    }

    #[test]
    fn test_only_anonymous_rows_is_empty() {
        let txns = vec![txn(None, "EIRE", 2010, 1)];
        let result = compute_single_cohort_retention(&txns, 2010, "EIRE").unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_country_match_is_exact() {
        let txns = vec![txn(Some("1"), "France", 2010, 1)];
        let result = compute_single_cohort_retention(&txns, 2010, "france").unwrap();
        assert!(result.is_empty());
    }
}
