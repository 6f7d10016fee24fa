//! Read-only handle on the sales table.
//!
//! Replaces an implicit global table with an explicit value that owns its
//! load lifecycle. Callers use [`DatasetHandle::transactions`] to obtain a
//! shared [`Arc`] slice; depending on the [`LoadPolicy`] the table is read
//! from disk once and reused, or re-read on every request.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use cohort_core::error::Result;
use cohort_core::models::Transaction;
use cohort_data::reader::load_transactions;

// ── LoadPolicy ────────────────────────────────────────────────────────────────

/// When the table is (re)read from disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPolicy {
    /// Read on first access, share the same table afterwards.
    Once,
    /// Read again for every request; nothing is kept between calls.
    PerRequest,
}

// ── DatasetHandle ─────────────────────────────────────────────────────────────

/// Lazily loaded, never mutated transaction table.
///
/// # Example
/// ```no_run
/// use cohort_runtime::dataset::{DatasetHandle, LoadPolicy};
///
/// let mut data = DatasetHandle::new("online_retail_II.csv", LoadPolicy::Once);
/// let rows = data.transactions()?;
/// println!("{} rows", rows.len());
/// # Ok::<(), cohort_core::CohortError>(())
/// ```
#[derive(Debug)]
pub struct DatasetHandle {
    /// File or directory the table is read from; `None` for in-memory tables.
    data_path: Option<PathBuf>,
    policy: LoadPolicy,
    /// Table kept under [`LoadPolicy::Once`].
    cache: Option<Arc<[Transaction]>>,
    /// When the cache was populated.
    loaded_at: Option<Instant>,
    /// Number of reads from disk performed so far.
    loads: u32,
}

impl DatasetHandle {
    pub fn new(data_path: impl Into<PathBuf>, policy: LoadPolicy) -> Self {
        Self {
            data_path: Some(data_path.into()),
            policy,
            cache: None,
            loaded_at: None,
            loads: 0,
        }
    }

    /// Wrap a table that is already in memory. It is never re-read.
    pub fn from_transactions(transactions: Vec<Transaction>) -> Self {
        Self {
            data_path: None,
            policy: LoadPolicy::Once,
            cache: Some(transactions.into()),
            loaded_at: Some(Instant::now()),
            loads: 0,
        }
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Return the table, reading it from disk when the policy requires.
    ///
    /// Load failures propagate unchanged; a failed load leaves any previous
    /// cache untouched.
    pub fn transactions(&mut self) -> Result<Arc<[Transaction]>> {
        if let Some(cached) = self.cache.as_ref() {
            if self.policy == LoadPolicy::Once || self.data_path.is_none() {
                tracing::debug!("returning cached sales table");
                return Ok(Arc::clone(cached));
            }
        }

        let Some(path) = self.data_path.clone() else {
            return Ok(Arc::from(Vec::new()));
        };
        let table = self.load_from(&path)?;

        if self.policy == LoadPolicy::Once {
            self.cache = Some(Arc::clone(&table));
            self.loaded_at = Some(Instant::now());
        }
        Ok(table)
    }

    /// Drop the cached table so the next access reads from disk again.
    pub fn invalidate(&mut self) {
        if self.data_path.is_some() {
            self.cache = None;
            self.loaded_at = None;
            tracing::debug!("sales table cache invalidated");
        }
    }

    pub fn policy(&self) -> LoadPolicy {
        self.policy
    }

    pub fn data_path(&self) -> Option<&Path> {
        self.data_path.as_deref()
    }

    /// Number of times the table has been read from disk.
    pub fn load_count(&self) -> u32 {
        self.loads
    }

    /// Age of the cached table, or `None` when nothing is cached.
    pub fn cache_age(&self) -> Option<Duration> {
        self.loaded_at.map(|ts| ts.elapsed())
    }

    // ── Private helpers ───────────────────────────────────────────────────

    fn load_from(&mut self, path: &Path) -> Result<Arc<[Transaction]>> {
        let started = Instant::now();
        let dataset = load_transactions(path)?;
        self.loads += 1;
        tracing::debug!(
            rows = dataset.rows_read(),
            anonymous = dataset.anonymous_rows,
            files = dataset.files.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "sales table loaded"
        );
        Ok(dataset.transactions.into())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
