use clap::Parser;
use std::path::PathBuf;

use crate::error::{CohortError, Result};

/// Default sales table, matching the Online Retail II export name.
pub const DEFAULT_DATA_FILE: &str = "online_retail_II.csv";

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Customer retention cohorts from a transactional sales table
#[derive(Parser, Debug, Clone)]
#[command(
    name = "cohort-heatmap",
    about = "Customer retention cohorts from a transactional sales table",
    version
)]
pub struct Settings {
    /// CSV file or directory of CSV files holding the sales table
    #[arg(long, env = "COHORT_DATA", default_value = DEFAULT_DATA_FILE)]
    pub data: PathBuf,

    /// View mode
    #[arg(long, default_value = "heatmap", value_parser = ["heatmap", "query", "export"])]
    pub view: String,

    /// Cohort year for the single-cohort query (validated as an integer)
    #[arg(long)]
    pub cohort_year: Option<String>,

    /// Country for the single-cohort query
    #[arg(long, default_value = "United Kingdom")]
    pub country: String,

    /// Display theme
    #[arg(long, default_value = "auto", value_parser = ["light", "dark", "auto"])]
    pub theme: String,

    /// Re-read the sales table on every query instead of once at startup
    #[arg(long)]
    pub reload_per_request: bool,

    /// Logging level
    #[arg(long, default_value = "WARNING", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Settings {
    /// Parse the process arguments and validate cross-field constraints.
    ///
    /// Argument errors, `--help` and `--version` are handled by clap, which
    /// prints and exits.
    pub fn load() -> Result<Self> {
        let settings = Settings::parse();
        settings.validate()?;
        Ok(settings)
    }

    /// Same as [`Settings::load`] with an explicit argument list.
    pub fn load_from<I, T>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let settings =
            Settings::try_parse_from(args).map_err(|e| CohortError::Config(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject combinations clap cannot express on its own.
    pub fn validate(&self) -> Result<()> {
        if self.view == "query" && self.cohort_year.is_none() {
            return Err(CohortError::Config(
                "--cohort-year is required for the query view".to_string(),
            ));
        }
        if self.country.trim().is_empty() {
            return Err(CohortError::Config("--country must not be empty".to_string()));
        }
        Ok(())
    }

    /// Log level after applying `--debug`.
    pub fn effective_log_level(&self) -> &str {
        if self.debug {
            "DEBUG"
        } else {
            &self.log_level
        }
    }
}
