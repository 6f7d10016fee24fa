/// Format a floating-point number with thousands separators and a fixed number
/// of decimal places.
///
/// # Examples
///
/// ```
/// use cohort_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5, 1), "1,234.5");
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// assert_eq!(format_number(-9876.5, 1), "-9,876.5");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    let negative = value < 0.0;
    let factor = 10_f64.powi(decimals as i32);
    let rounded = (value.abs() * factor).round() / factor;

    let grouped = group_thousands(&(rounded.trunc() as u64).to_string());

    let body = if decimals == 0 {
        grouped
    } else {
        let frac = format!("{:.prec$}", rounded.fract(), prec = decimals as usize);
        // `frac` is "0.xx"; keep ".xx".
        format!("{}{}", grouped, &frac[1..])
    };

    if negative && rounded != 0.0 {
        format!("-{}", body)
    } else {
        body
    }
}

/// Format sales revenue with two decimals and a currency sign.
///
/// ```
/// use cohort_core::formatting::format_currency;
///
/// assert_eq!(format_currency(1234.56), "£1,234.56");
/// assert_eq!(format_currency(-9.99), "-£9.99");
/// ```
pub fn format_currency(amount: f64) -> String {
    if amount < 0.0 {
        format!("-£{}", format_number(amount.abs(), 2))
    } else {
        format!("£{}", format_number(amount, 2))
    }
}

/// Render a ratio as a whole-number percentage, e.g. `0.375` → `"38%"`.
///
/// ```
/// use cohort_core::formatting::format_percent;
///
/// assert_eq!(format_percent(1.0, 0), "100%");
/// assert_eq!(format_percent(0.375, 1), "37.5%");
/// ```
pub fn format_percent(ratio: f64, decimals: u32) -> String {
    format!("{}%", format_number(ratio * 100.0, decimals))
}

/// Optional cell variant: `None` renders as an empty string.
pub fn format_rate_cell(ratio: Option<f64>) -> String {
    ratio.map(|r| format_percent(r, 0)).unwrap_or_default()
}

/// Full English month name for `1..=12`.
pub fn month_name(month: u32) -> &'static str {
    const NAMES: [&str; 12] = [
        "January",
        "February",
        "March",
        "April",
        "May",
        "June",
        "July",
        "August",
        "September",
        "October",
        "November",
        "December",
    ];
    month
        .checked_sub(1)
        .and_then(|i| NAMES.get(i as usize))
        .copied()
        .unwrap_or("?")
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    if s.len() <= 3 {
        return s.to_string();
    }
    let remainder = s.len() % 3;
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().enumerate() {
        if i != 0 && i % 3 == remainder {
            result.push(',');
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number_zero() {
        assert_eq!(format_number(0.0, 2), "0.00");
    }

    #[test]
    fn test_format_number_with_thousands() {
        assert_eq!(format_number(8_832_003.3, 1), "8,832,003.3");
    }

    #[test]
    fn test_format_number_rounds() {
        assert_eq!(format_number(2.675, 0), "3");
        assert_eq!(format_number(999.96, 1), "1,000.0");
    }

    #[test]
    fn test_format_number_tiny_negative_has_no_sign() {
        assert_eq!(format_number(-0.001, 2), "0.00");
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "£0.00");
        assert_eq!(format_currency(1_000_000.0), "£1,000,000.00");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(0.5, 0), "50%");
        assert_eq!(format_percent(0.0, 0), "0%");
        assert_eq!(format_percent(1.0 / 3.0, 1), "33.3%");
    }

    #[test]
    fn test_format_rate_cell() {
        assert_eq!(format_rate_cell(Some(0.25)), "25%");
        assert_eq!(format_rate_cell(None), "");
    }

    #[test]
    fn test_month_name() {
        assert_eq!(month_name(1), "January");
        assert_eq!(month_name(12), "December");
        assert_eq!(month_name(0), "?");
        assert_eq!(month_name(13), "?");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands("7"), "7");
        assert_eq!(group_thousands("1234"), "1,234");
        assert_eq!(group_thousands("1234567"), "1,234,567");
    }
}
