//! Core model and computations for customer-retention cohorts.
//!
//! Transactions are placed on a dense monthly time axis ([`periods`]), each
//! customer is assigned to the month of their first purchase ([`cohorts`]),
//! and the share of every cohort still buying at each later offset is laid
//! out as a matrix ([`retention`]). [`single_cohort`] answers the narrower
//! year + country question used by the query view.

pub mod cohorts;
pub mod error;
pub mod formatting;
pub mod models;
pub mod periods;
pub mod retention;
pub mod settings;
pub mod single_cohort;
pub mod timestamps;

pub use cohorts::assign_cohorts;
pub use error::{CohortError, Result};
pub use models::{AnnotatedTransaction, CustomerId, Transaction, YearMonth};
pub use periods::{index_periods, PeriodIndex};
pub use retention::{compute_retention_matrix, CohortRow, RetentionMatrix};
pub use single_cohort::{compute_single_cohort_retention, parse_cohort_year, MonthlyRetention};
