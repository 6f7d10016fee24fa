//! CSV discovery and loading for the sales table.
//!
//! Rows are parsed into typed [`Transaction`]s at load time. A row with fewer
//! fields than the header, or a single malformed field, aborts the whole load
//! so the analysis never runs over a partially-read table.

use std::io::Read;
use std::path::{Path, PathBuf};

use cohort_core::error::{CohortError, Result};
use cohort_core::models::{CustomerId, Transaction};
use cohort_core::timestamps::TimestampParser;
use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, warn};

// ── Column layout ─────────────────────────────────────────────────────────────

/// Canonical column names with the header spellings accepted for each.
///
/// The second and later spellings are the Online Retail II export headers.
const COLUMNS: [(&str, &[&str]); 8] = [
    ("invoice_id", &["invoice_id", "invoice", "invoiceno"]),
    ("item_id", &["item_id", "stockcode"]),
    ("description", &["description"]),
    ("quantity", &["quantity"]),
    ("date", &["date", "invoicedate"]),
    ("price", &["price", "unitprice", "unit_price"]),
    ("customer_id", &["customer_id", "customer id", "customerid"]),
    ("country", &["country"]),
];

/// Position of every required column in the header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnMap {
    /// Number of header fields; shorter rows are rejected.
    width: usize,
    invoice_id: usize,
    item_id: usize,
    description: usize,
    quantity: usize,
    date: usize,
    price: usize,
    customer_id: usize,
    country: usize,
}

impl ColumnMap {
    /// Resolve header positions, case-insensitively.
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let normalized: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();

        let mut positions = [0usize; 8];
        for (slot, (canonical, aliases)) in positions.iter_mut().zip(COLUMNS.iter()) {
            *slot = normalized
                .iter()
                .position(|h| aliases.contains(&h.as_str()))
                .ok_or_else(|| CohortError::MissingColumn((*canonical).to_string()))?;
        }

        let [invoice_id, item_id, description, quantity, date, price, customer_id, country] =
            positions;
        Ok(Self {
            width: headers.len(),
            invoice_id,
            item_id,
            description,
            quantity,
            date,
            price,
            customer_id,
            country,
        })
    }
}

// ── Public types ──────────────────────────────────────────────────────────────

/// Everything read from one or more CSV files.
#[derive(Debug, Clone, Default)]
pub struct LoadedDataset {
    pub transactions: Vec<Transaction>,
    /// Files read, in load order.
    pub files: Vec<PathBuf>,
    /// Rows without a customer id; kept in `transactions` but never cohorted.
    pub anonymous_rows: usize,
}

impl LoadedDataset {
    pub fn rows_read(&self) -> usize {
        self.transactions.len()
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Find all `.csv` files recursively under `data_path`, sorted by path.
pub fn find_csv_files(data_path: &Path) -> Vec<PathBuf> {
    if !data_path.exists() {
        warn!("Data path does not exist: {}", data_path.display());
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(data_path)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .map(|ext| ext.eq_ignore_ascii_case("csv"))
                    .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// Resolve `data_path` into the list of files to load.
///
/// A file path is used as-is whatever its extension; a directory is scanned
/// for CSV files.
pub fn resolve_input_files(data_path: &Path) -> Result<Vec<PathBuf>> {
    if !data_path.exists() {
        return Err(CohortError::DataPathNotFound(data_path.to_path_buf()));
    }
    if data_path.is_file() {
        return Ok(vec![data_path.to_path_buf()]);
    }

    let files = find_csv_files(data_path);
    if files.is_empty() {
        return Err(CohortError::NoDataFiles(data_path.to_path_buf()));
    }
    Ok(files)
}

/// Load every transaction under `data_path`.
pub fn load_transactions(data_path: &Path) -> Result<LoadedDataset> {
    let files = resolve_input_files(data_path)?;
    let mut dataset = LoadedDataset::default();

    for file_path in &files {
        let file = std::fs::File::open(file_path).map_err(|source| CohortError::FileRead {
            path: file_path.clone(),
            source,
        })?;
        let name = file_path.display().to_string();
        let (transactions, anonymous) = read_transactions(file, &name)?;

        debug!(
            "File {}: {} rows, {} without customer",
            name,
            transactions.len(),
            anonymous
        );

        dataset.anonymous_rows += anonymous;
        dataset.transactions.extend(transactions);
    }

    dataset.files = files;
    debug!(
        "Loaded {} rows from {} files",
        dataset.rows_read(),
        dataset.files.len()
    );

    Ok(dataset)
}

/// Parse CSV from any reader. `source` names the input in error messages.
///
/// Returns the transactions and the number of rows with no customer id.
pub fn read_transactions<R: Read>(input: R, source: &str) -> Result<(Vec<Transaction>, usize)> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let columns = ColumnMap::from_headers(rdr.headers()?)?;

    let mut transactions = Vec::new();
    let mut anonymous = 0usize;
    for result in rdr.records() {
        let record = result?;
        let txn = parse_record(&record, &columns, source)?;
        if txn.customer_id.is_none() {
            anonymous += 1;
        }
        transactions.push(txn);
    }

    Ok((transactions, anonymous))
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Convert one CSV record into a typed transaction.
fn parse_record(record: &StringRecord, columns: &ColumnMap, source: &str) -> Result<Transaction> {
    let line = record.position().map_or(0, |p| p.line());
    let field = |idx: usize| record.get(idx).unwrap_or("");
    let parse_error = |name: &'static str, value: &str| CohortError::Parse {
        file: source.to_string(),
        line,
        field: name,
        value: value.to_string(),
    };

    if record.len() < columns.width {
        return Err(parse_error(
            "row",
            &format!("{} of {} fields", record.len(), columns.width),
        ));
    }

    let raw_quantity = field(columns.quantity);
    let quantity = parse_quantity(raw_quantity).ok_or_else(|| parse_error("quantity", raw_quantity))?;

    let raw_price = field(columns.price);
    let unit_price = raw_price
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite())
        .ok_or_else(|| parse_error("price", raw_price))?;

    let raw_date = field(columns.date);
    let timestamp = TimestampParser::parse(raw_date).ok_or_else(|| parse_error("date", raw_date))?;

    Ok(Transaction {
        invoice_id: field(columns.invoice_id).to_string(),
        item_id: field(columns.item_id).to_string(),
        description: field(columns.description).to_string(),
        quantity,
        unit_price,
        timestamp,
        customer_id: CustomerId::normalize(field(columns.customer_id)),
        country: field(columns.country).to_string(),
    })
}

/// Quantities are integers, but spreadsheet exports may write `"6.0"`.
fn parse_quantity(raw: &str) -> Option<i64> {
    if let Ok(q) = raw.parse::<i64>() {
        return Some(q);
    }
    let f = raw.parse::<f64>().ok()?;
    (f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64).then_some(f as i64)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
