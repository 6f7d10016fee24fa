use chrono::{NaiveDate, NaiveDateTime};

// ── TimestampParser ───────────────────────────────────────────────────────────

/// Date-time patterns seen in spreadsheet exports of the sales table.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Parses invoice timestamps from the formats found in exported sales tables.
pub struct TimestampParser;

impl TimestampParser {
    /// Parse `s` as a naive (zone-less) date-time.
    ///
    /// Date-only values are placed at midnight. Returns `None` when no known
    /// pattern matches; callers decide whether that is fatal.
    pub fn parse(s: &str) -> Option<NaiveDateTime> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }

        for fmt in DATETIME_FORMATS {
            if let Ok(ts) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(ts);
            }
        }

        DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
            .and_then(|date| date.and_hms_opt(0, 0, 0))
    }
}
