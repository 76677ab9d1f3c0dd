use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Cell tokens read as the missing marker.
pub const MISSING_TOKENS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "NULL", "null", "None", "<NA>",
    "#N/A", "#NA", "#N/A N/A", "1.#IND", "-1.#IND", "1.#QNAN", "-1.#QNAN",
];

pub const TRUE_TOKENS: &[&str] = &["true", "True", "TRUE"];
pub const FALSE_TOKENS: &[&str] = &["false", "False", "FALSE"];

/// Date-time layouts tried after RFC 3339, most specific first.
pub const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Date-only layouts; parsed values land on midnight.
pub const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

pub const DATE_DISPLAY_FORMAT: &str = "%Y-%m-%d";
pub const DATETIME_DISPLAY_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

pub const FILTERED_SUFFIX: &str = "_filtered";

pub const REPORT_SUMMARY: &str = "summary";
pub const REPORT_CORRELATION: &str = "correlation";
pub const REPORT_MISSING: &str = "missing";
pub const REPORT_DISTRIBUTION: &str = "distribution";

#[must_use]
pub fn is_missing_token(raw: &str) -> bool {
    MISSING_TOKENS.contains(&raw.trim())
}

#[must_use]
pub fn parse_bool_token(raw: &str) -> Option<bool> {
    let raw = raw.trim();
    if TRUE_TOKENS.contains(&raw) {
        Some(true)
    } else if FALSE_TOKENS.contains(&raw) {
        Some(false)
    } else {
        None
    }
}

/// Parses a finite number. Negative zero is folded into zero so equal keys group together.
#[must_use]
pub fn parse_number(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .map(|value| value + 0.0)
}

#[must_use]
pub fn parse_temporal(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.naive_utc());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

pub fn make_aggregate_column(value_column: &str, function: &str) -> String {
    format!("{value_column}_{function}")
}
