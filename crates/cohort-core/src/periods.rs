//! Dense, chronologically ordered index over the calendar months present in
//! a transaction table.

use std::collections::{BTreeMap, BTreeSet};

use crate::models::{Transaction, YearMonth};

// ── PeriodIndex ───────────────────────────────────────────────────────────────

/// Order-preserving bijection between observed months and `0..len`.
///
/// Only months with at least one transaction receive an index, so a calendar
/// gap (e.g. no sales in August) does not leave a hole in the index range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeriodIndex {
    index_to_period: Vec<YearMonth>,
    period_to_index: BTreeMap<YearMonth, usize>,
}

impl PeriodIndex {
    /// Build an index from any collection of months; duplicates collapse and
    /// order of appearance is irrelevant.
    pub fn from_periods(periods: impl IntoIterator<Item = YearMonth>) -> Self {
        let distinct: BTreeSet<YearMonth> = periods.into_iter().collect();
        let index_to_period: Vec<YearMonth> = distinct.into_iter().collect();
        let period_to_index = index_to_period
            .iter()
            .enumerate()
            .map(|(idx, period)| (*period, idx))
            .collect();

        Self {
            index_to_period,
            period_to_index,
        }
    }

    /// Index of `period`, or `None` when the month was never observed.
    pub fn index_of(&self, period: &YearMonth) -> Option<usize> {
        self.period_to_index.get(period).copied()
    }

    /// Month at `index`, the inverse of [`PeriodIndex::index_of`].
    pub fn period(&self, index: usize) -> Option<YearMonth> {
        self.index_to_period.get(index).copied()
    }

    /// `"YYYY-MM"` label for `index`.
    pub fn label(&self, index: usize) -> Option<String> {
        self.period(index).map(|p| p.label())
    }

    /// Forward mapping, iterated in chronological order.
    pub fn period_to_index(&self) -> &BTreeMap<YearMonth, usize> {
        &self.period_to_index
    }

    /// Inverse mapping; position `i` holds the month with index `i`.
    pub fn index_to_period(&self) -> &[YearMonth] {
        &self.index_to_period
    }

    pub fn len(&self) -> usize {
        self.index_to_period.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index_to_period.is_empty()
    }
}

/// Enumerate the distinct months in `transactions` and number them in
/// calendar order starting at zero.
pub fn index_periods<'a, I>(transactions: I) -> PeriodIndex
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let index = PeriodIndex::from_periods(transactions.into_iter().map(Transaction::period));
    tracing::debug!(periods = index.len(), "indexed observed periods");
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn txn_on(y: i32, m: u32, d: u32) -> Transaction {
        Transaction {
            invoice_id: format!("{y}{m:02}{d:02}"),
            item_id: "85123A".into(),
            description: "WHITE HANGING HEART T-LIGHT HOLDER".into(),
            quantity: 6,
            unit_price: 2.55,
            timestamp: NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
            customer_id: None,
            country: "United Kingdom".into(),
        }
    }

    fn ym(y: i32, m: u32) -> YearMonth {
        YearMonth::new(y, m).unwrap()
    }

    #[test]
    fn test_single_period_gets_index_zero() {
        let txns = vec![txn_on(2010, 5, 1), txn_on(2010, 5, 28)];
        let index = index_periods(&txns);
        assert_eq!(index.len(), 1);
        assert_eq!(index.index_of(&ym(2010, 5)), Some(0));
        assert_eq!(index.label(0).as_deref(), Some("2010-05"));
    }

    #[test]
    fn test_order_is_calendar_not_appearance() {
        let txns = vec![
            txn_on(2010, 2, 1),
            txn_on(2009, 12, 15),
            txn_on(2010, 1, 3),
            txn_on(2009, 12, 1),
        ];
        let index = index_periods(&txns);
        assert_eq!(
            index.index_to_period(),
            &[ym(2009, 12), ym(2010, 1), ym(2010, 2)]
        );
        assert_eq!(index.index_of(&ym(2009, 12)), Some(0));
        assert_eq!(index.index_of(&ym(2010, 2)), Some(2));
    }

    #[test]
    fn test_year_boundary_compares_year_first() {
        // Month 11 of 2009 must precede month 1 of 2010.
        let txns = vec![txn_on(2010, 1, 1), txn_on(2009, 11, 1)];
        let index = index_periods(&txns);
        assert_eq!(index.period(0), Some(ym(2009, 11)));
        assert_eq!(index.period(1), Some(ym(2010, 1)));
    }

    #[test]
    fn test_calendar_gaps_stay_dense() {
        let txns = vec![txn_on(2010, 1, 1), txn_on(2010, 4, 1), txn_on(2010, 9, 1)];
        let index = index_periods(&txns);
        assert_eq!(index.len(), 3);
        assert_eq!(index.index_of(&ym(2010, 4)), Some(1));
        assert_eq!(index.index_of(&ym(2010, 9)), Some(2));
        assert_eq!(index.index_of(&ym(2010, 2)), None);
    }

    #[test]
    fn test_mappings_are_inverse() {
        let txns = vec![txn_on(2011, 3, 1), txn_on(2010, 7, 1), txn_on(2011, 1, 1)];
        let index = index_periods(&txns);
        for (period, idx) in index.period_to_index() {
            assert_eq!(index.period(*idx), Some(*period));
        }
        for (idx, period) in index.index_to_period().iter().enumerate() {
            assert_eq!(index.index_of(period), Some(idx));
        }
    }

    #[test]
    fn test_empty_input() {
        let index = index_periods(std::iter::empty::<&Transaction>());
        assert!(index.is_empty());
        assert_eq!(index.period(0), None);
        assert_eq!(index.label(0), None);
    }
}
