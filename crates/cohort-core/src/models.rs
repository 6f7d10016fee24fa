use std::fmt;

use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{CohortError, Result};

// ── YearMonth ─────────────────────────────────────────────────────────────────

/// A calendar month, ordered by year and then month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// Build a period, returning `None` unless `month` is in `1..=12`.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// The month a timestamp falls in.
    pub fn from_datetime(ts: &NaiveDateTime) -> Self {
        Self {
            year: ts.year(),
            month: ts.month(),
        }
    }

    /// Parse a `"YYYY-MM"` label as produced by [`YearMonth::label`].
    pub fn parse_label(s: &str) -> Result<Self> {
        let invalid = || CohortError::InvalidLabel(s.to_string());
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month).ok_or_else(invalid)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Human-readable label, e.g. `"2010-03"`.
    pub fn label(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl TryFrom<String> for YearMonth {
    type Error = CohortError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse_label(&value)
    }
}

impl From<YearMonth> for String {
    fn from(value: YearMonth) -> Self {
        value.label()
    }
}

// ── CustomerId ────────────────────────────────────────────────────────────────

/// Opaque customer identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(String);

impl CustomerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Normalize a raw spreadsheet cell into an identifier.
    ///
    /// Blank cells are null. Integral floats such as `"13085.0"` collapse to
    /// `"13085"` so spreadsheet exports do not split one customer in two.
    pub fn normalize(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
            return None;
        }
        if let Some((int_part, frac)) = trimmed.split_once('.') {
            let integral = !int_part.is_empty()
                && int_part.bytes().all(|b| b.is_ascii_digit())
                && frac.bytes().all(|b| b == b'0');
            if integral {
                return Some(Self(int_part.to_string()));
            }
        }
        Some(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── Transaction ───────────────────────────────────────────────────────────────

/// One invoice line from the sales table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub invoice_id: String,
    pub item_id: String,
    pub description: String,
    /// Units sold; negative for returns.
    pub quantity: i64,
    pub unit_price: f64,
    pub timestamp: NaiveDateTime,
    /// `None` for anonymous sales, which take no part in cohort analysis.
    pub customer_id: Option<CustomerId>,
    pub country: String,
}

impl Transaction {
    /// Line revenue: `quantity * unit_price`.
    pub fn sales(&self) -> f64 {
        self.quantity as f64 * self.unit_price
    }

    /// Calendar month of the transaction.
    pub fn period(&self) -> YearMonth {
        YearMonth::from_datetime(&self.timestamp)
    }
}

// ── AnnotatedTransaction ──────────────────────────────────────────────────────

/// A transaction with a known customer, placed on the cohort time axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnotatedTransaction<'a> {
    pub transaction: &'a Transaction,
    pub customer_id: &'a CustomerId,
    /// Dense index of the transaction's own period.
    pub period_index: usize,
    /// Period index of the customer's first purchase.
    pub cohort_id: usize,
    /// Periods elapsed since the customer's first purchase.
    pub cohort_index: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    // ── YearMonth ─────────────────────────────────────────────────────────────

    #[test]
    fn test_year_month_rejects_bad_month() {
        assert!(YearMonth::new(2010, 0).is_none());
        assert!(YearMonth::new(2010, 13).is_none());
        assert!(YearMonth::new(2010, 12).is_some());
    }

    #[test]
    fn test_year_month_orders_by_calendar() {
        let dec_2009 = YearMonth::new(2009, 12).unwrap();
        let jan_2010 = YearMonth::new(2010, 1).unwrap();
        let feb_2010 = YearMonth::new(2010, 2).unwrap();
        assert!(dec_2009 < jan_2010);
        assert!(jan_2010 < feb_2010);
    }

    #[test]
    fn test_year_month_label_roundtrip() {
        let ym = YearMonth::new(2011, 3).unwrap();
        assert_eq!(ym.label(), "2011-03");
        assert_eq!(ym.to_string(), "2011-03");
        assert_eq!(YearMonth::parse_label("2011-03").unwrap(), ym);
    }

    #[test]
    fn test_year_month_parse_label_errors() {
        for bad in ["", "2011", "2011-13", "abcd-01", "2011-xx"] {
            assert!(
                matches!(YearMonth::parse_label(bad), Err(CohortError::InvalidLabel(_))),
                "expected error for {bad:?}"
            );
        }
    }

    #[test]
    fn test_year_month_serializes_as_label() {
        let ym = YearMonth::new(2010, 7).unwrap();
        let json = serde_json::to_string(&ym).unwrap();
        assert_eq!(json, "\"2010-07\"");
        let back: YearMonth = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ym);
    }

    // ── CustomerId ────────────────────────────────────────────────────────────

    #[test]
    fn test_customer_id_normalizes_float_text() {
        assert_eq!(CustomerId::normalize("13085.0").unwrap().as_str(), "13085");
        assert_eq!(CustomerId::normalize(" 13085 ").unwrap().as_str(), "13085");
        assert_eq!(CustomerId::normalize("13085.5").unwrap().as_str(), "13085.5");
        assert_eq!(CustomerId::normalize("C-42").unwrap().as_str(), "C-42");
    }

    #[test]
    fn test_customer_id_blank_is_null() {
        assert!(CustomerId::normalize("").is_none());
        assert!(CustomerId::normalize("   ").is_none());
        assert!(CustomerId::normalize("NaN").is_none());
    }

    // ── Transaction ───────────────────────────────────────────────────────────

    #[test]
    fn test_transaction_sales_and_period() {
        let txn = Transaction {
            invoice_id: "489434".into(),
            item_id: "85048".into(),
            description: "15CM CHRISTMAS GLASS BALL 20 LIGHTS".into(),
            quantity: 12,
            unit_price: 6.95,
            timestamp: ts(2009, 12, 1),
            customer_id: CustomerId::normalize("13085.0"),
            country: "United Kingdom".into(),
        };
        assert!((txn.sales() - 83.4).abs() < 1e-9);
        assert_eq!(txn.period(), YearMonth::new(2009, 12).unwrap());
    }

    #[test]
    fn test_transaction_return_has_negative_sales() {
        let txn = Transaction {
            invoice_id: "C489449".into(),
            item_id: "22087".into(),
            description: "PAPER BUNTING WHITE LACE".into(),
            quantity: -12,
            unit_price: 2.95,
            timestamp: ts(2009, 12, 1),
            customer_id: None,
            country: "Australia".into(),
        };
        assert!(txn.sales() < 0.0);
    }
}
