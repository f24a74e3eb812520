//! Date parsing and detection for US-format invoices.

use chrono::NaiveDate;

use crate::error::ExtractionError;

use super::patterns::{DATE_DAY_MONTH, DATE_ISO, DATE_MONTH_NAME, DATE_NUMERIC};

/// Output format for all dates the engine emits.
pub const OUTPUT_FORMAT: &str = "%m/%d/%y";

/// Accepted whole-string date formats, tried in order.
///
/// Two-digit-year forms come before four-digit ones: `%y` rejects a
/// four-digit year, while `%Y` would accept `24` as the year 24. Year-first
/// forms come last so `12-01-05` reads as December 1st.
const ACCEPTED_FORMATS: &[&str] = &[
    "%m/%d/%y",
    "%m/%d/%Y",
    "%m-%d-%y",
    "%m-%d-%Y",
    "%m.%d.%y",
    "%m.%d.%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%d-%b-%y",
    "%d-%b-%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%Y-%m-%d",
    "%Y/%m/%d",
];

/// Parse a date string in any accepted format.
pub fn parse_date(text: &str) -> Result<NaiveDate, ExtractionError> {
    let text = text.trim();
    ACCEPTED_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .ok_or_else(|| ExtractionError::InvalidDate(text.to_string()))
}

/// Format a date as `MM/DD/YY`.
pub fn format_date(date: NaiveDate) -> String {
    date.format(OUTPUT_FORMAT).to_string()
}

fn year_from(s: &str) -> Option<i32> {
    let year: i32 = s.parse().ok()?;
    Some(if year < 100 { 2000 + year } else { year })
}

fn month_from_name(name: &str) -> Option<u32> {
    let month = match name.to_lowercase().get(..3)? {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

/// Find the first date inside free text (month-first for numeric dates).
pub fn find_date(text: &str) -> Option<NaiveDate> {
    if let Some(caps) = DATE_ISO.captures(text) {
        let date = NaiveDate::from_ymd_opt(
            caps[1].parse().ok()?,
            caps[2].parse().ok()?,
            caps[3].parse().ok()?,
        );
        if date.is_some() {
            return date;
        }
    }

    for caps in DATE_NUMERIC.captures_iter(text) {
        let month: u32 = caps[1].parse().unwrap_or(0);
        let day: u32 = caps[2].parse().unwrap_or(0);
        if let Some(date) = year_from(&caps[3]).and_then(|y| NaiveDate::from_ymd_opt(y, month, day))
        {
            return Some(date);
        }
    }

    if let Some(caps) = DATE_MONTH_NAME.captures(text) {
        let date = month_from_name(&caps[1]).and_then(|m| {
            NaiveDate::from_ymd_opt(caps[3].parse().ok()?, m, caps[2].parse().ok()?)
        });
        if date.is_some() {
            return date;
        }
    }

    if let Some(caps) = DATE_DAY_MONTH.captures(text) {
        return month_from_name(&caps[2]).and_then(|m| {
            NaiveDate::from_ymd_opt(year_from(&caps[3])?, m, caps[1].parse().ok()?)
        });
    }

    None
}

/// Find a date inside text and return it formatted as `MM/DD/YY`.
pub fn normalize_date(text: &str) -> Option<String> {
    find_date(text).map(format_date)
}
