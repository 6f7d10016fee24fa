//! First-purchase cohort assignment.

use std::collections::HashMap;

use crate::error::{CohortError, Result};
use crate::models::{AnnotatedTransaction, CustomerId, Transaction};
use crate::periods::PeriodIndex;

/// Annotate every transaction that has a customer with its cohort.
///
/// A customer's `cohort_id` is the smallest period index among all of their
/// transactions, and every one of their transactions carries that same id plus
/// `cohort_index = period_index - cohort_id`. Anonymous rows are dropped.
///
/// The output is sorted by period index, then customer, then invoice, with
/// the remaining fields as tie-breaks. Rows that compare equal are identical,
/// so the result depends only on the multiset of inputs and not on their
/// order, even for repeated invoice lines.
///
/// Fails with [`CohortError::UnknownPeriod`] if a transaction's month is not
/// in `periods`.
pub fn assign_cohorts<'a, I>(
    transactions: I,
    periods: &PeriodIndex,
) -> Result<Vec<AnnotatedTransaction<'a>>>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut located: Vec<(&'a Transaction, &'a CustomerId, usize)> = Vec::new();
    for txn in transactions {
        let Some(customer) = txn.customer_id.as_ref() else {
            continue;
        };
        let period = txn.period();
        let period_index = periods
            .index_of(&period)
            .ok_or(CohortError::UnknownPeriod(period))?;
        located.push((txn, customer, period_index));
    }

    let first_seen = first_period_by_customer(
        located
            .iter()
            .map(|(_, customer, period_index)| (*customer, *period_index)),
    );

    let mut annotated: Vec<AnnotatedTransaction<'a>> = located
        .into_iter()
        .map(|(transaction, customer_id, period_index)| {
            // Every customer in `located` contributed to `first_seen`.
            let cohort_id = first_seen[customer_id];
            AnnotatedTransaction {
                transaction,
                customer_id,
                period_index,
                cohort_id,
                cohort_index: period_index - cohort_id,
            }
        })
        .collect();

    annotated.sort_by(|a, b| {
        a.period_index
            .cmp(&b.period_index)
            .then_with(|| a.customer_id.cmp(b.customer_id))
            .then_with(|| a.transaction.invoice_id.cmp(&b.transaction.invoice_id))
            .then_with(|| a.transaction.item_id.cmp(&b.transaction.item_id))
            .then_with(|| a.transaction.timestamp.cmp(&b.transaction.timestamp))
            .then_with(|| a.transaction.quantity.cmp(&b.transaction.quantity))
            .then_with(|| a.transaction.unit_price.total_cmp(&b.transaction.unit_price))
            .then_with(|| a.transaction.description.cmp(&b.transaction.description))
            .then_with(|| a.transaction.country.cmp(&b.transaction.country))
    });

    tracing::debug!(
        customers = first_seen.len(),
        transactions = annotated.len(),
        "assigned cohorts"
    );

    Ok(annotated)
}

/// Minimum period index per customer.
fn first_period_by_customer<'a>(
    observations: impl Iterator<Item = (&'a CustomerId, usize)>,
) -> HashMap<&'a CustomerId, usize> {
    let mut first: HashMap<&'a CustomerId, usize> = HashMap::new();
    for (customer, period_index) in observations {
        first
            .entry(customer)
            .and_modify(|current| *current = (*current).min(period_index))
            .or_insert(period_index);
    }
    first
}

/// Number of distinct cohorts in an annotated table.
pub fn cohort_count(annotated: &[AnnotatedTransaction<'_>]) -> usize {
    let mut ids: Vec<usize> = annotated.iter().map(|a| a.cohort_id).collect();
    ids.sort_unstable();
    ids.dedup();
    ids.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::YearMonth;
    use crate::periods::index_periods;
    use chrono::NaiveDate;

    fn txn(customer: Option<&str>, y: i32, m: u32, invoice: &str) -> Transaction {
        Transaction {
            invoice_id: invoice.to_string(),
            item_id: "21232".into(),
            description: "STRAWBERRY CERAMIC TRINKET BOX".into(),
            quantity: 1,
            unit_price: 1.25,
            timestamp: NaiveDate::from_ymd_opt(y, m, 10)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
            customer_id: customer.map(CustomerId::new),
            country: "United Kingdom".into(),
        }
    }

    fn months(n: u32) -> PeriodIndex {
        PeriodIndex::from_periods((1..=n).map(|m| YearMonth::new(2010, m).unwrap()))
    }

    #[test]
    fn test_cohort_is_minimum_period() {
        // Periods 2, 5, 7 (March, June, August with January as index 0).
        let txns = vec![
            txn(Some("A"), 2010, 8, "3"),
            txn(Some("A"), 2010, 3, "1"),
            txn(Some("A"), 2010, 6, "2"),
        ];
        let periods = months(8);
        let annotated = assign_cohorts(&txns, &periods).unwrap();

        assert!(annotated.iter().all(|a| a.cohort_id == 2));
        let offsets: Vec<usize> = annotated.iter().map(|a| a.cohort_index).collect();
        assert_eq!(offsets, vec![0, 3, 5]);
    }

    #[test]
    fn test_anonymous_rows_are_dropped() {
        let txns = vec![
            txn(None, 2010, 1, "1"),
            txn(Some("B"), 2010, 2, "2"),
            txn(None, 2010, 3, "3"),
        ];
        let periods = index_periods(&txns);
        let annotated = assign_cohorts(&txns, &periods).unwrap();
        assert_eq!(annotated.len(), 1);
        assert_eq!(annotated[0].customer_id.as_str(), "B");
        assert_eq!(annotated[0].cohort_index, 0);
    }

    #[test]
    fn test_each_customer_gets_own_cohort() {
        let txns = vec![
            txn(Some("A"), 2010, 1, "1"),
            txn(Some("B"), 2010, 2, "2"),
            txn(Some("A"), 2010, 2, "3"),
        ];
        let periods = index_periods(&txns);
        let annotated = assign_cohorts(&txns, &periods).unwrap();

        for a in &annotated {
            match a.customer_id.as_str() {
                "A" => assert_eq!(a.cohort_id, 0),
                "B" => assert_eq!(a.cohort_id, 1),
                other => panic!("unexpected customer {other}"),
            }
        }
        assert_eq!(cohort_count(&annotated), 2);
    }

    #[test]
    fn test_reordering_input_gives_same_output() {
        let txns = vec![
            txn(Some("A"), 2010, 3, "1"),
            txn(Some("B"), 2010, 1, "2"),
            txn(Some("A"), 2010, 1, "3"),
            txn(Some("C"), 2010, 2, "4"),
        ];
        let mut reversed = txns.clone();
        reversed.reverse();

        let periods = index_periods(&txns);
        let forward = assign_cohorts(&txns, &periods).unwrap();
        let backward = assign_cohorts(&reversed, &periods).unwrap();

        let key = |a: &AnnotatedTransaction<'_>| {
            (
                a.transaction.invoice_id.clone(),
                a.cohort_id,
                a.cohort_index,
                a.period_index,
            )
        };
        let f: Vec<_> = forward.iter().map(key).collect();
        let b: Vec<_> = backward.iter().map(key).collect();
        assert_eq!(f, b);
    }

    #[test]
    fn test_repeated_invoice_lines_sort_identically() {
        // Same invoice and item, differing only in quantity and price.
        let mut small = txn(Some("A"), 2010, 2, "536365");
        small.quantity = 2;
        let mut large = txn(Some("A"), 2010, 2, "536365");
        large.quantity = 12;
        let mut cheap = txn(Some("A"), 2010, 2, "536365");
        cheap.unit_price = 0.85;

        let forward = vec![small.clone(), large.clone(), cheap.clone()];
        let backward = vec![cheap, large, small];

        let periods = index_periods(&forward);
        let a = assign_cohorts(&forward, &periods).unwrap();
        let b = assign_cohorts(&backward, &periods).unwrap();
        assert_eq!(a, b);
        assert_eq!(a[0].transaction.unit_price, 0.85);
        assert_eq!(a[2].transaction.quantity, 12);
    }

    #[test]
    fn test_unknown_period_is_an_error() {
        let txns = vec![txn(Some("A"), 2012, 1, "1")];
        let periods = months(3);
        let err = assign_cohorts(&txns, &periods).unwrap_err();
        assert!(matches!(err, CohortError::UnknownPeriod(p) if p.label() == "2012-01"));
    }

    #[test]
    fn test_empty_input() {
        let periods = PeriodIndex::default();
        let annotated = assign_cohorts(std::iter::empty::<&Transaction>(), &periods).unwrap();
        assert!(annotated.is_empty());
        assert_eq!(cohort_count(&annotated), 0);
    }
}
