use chrono::{DateTime, Datelike, FixedOffset, NaiveDate};

pub fn month_key(timestamp: &DateTime<FixedOffset>) -> String {
    format!("{:04}-{:02}", timestamp.year(), timestamp.month())
}

/// Parses `YYYY-MM` (first day of that month) or a full `YYYY-MM-DD` date.
pub fn parse_month(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Some(date);
    }
    let (year, month) = input.split_once('-')?;
    if year.len() != 4 || month.is_empty() || month.len() > 2 {
        return None;
    }
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 1)
}

/// Months since year 0, used as the x coordinate of time charts.
pub fn month_ordinal(date: &NaiveDate) -> i32 {
    date.year() * 12 + date.month0() as i32
}

pub fn ordinal_label(ordinal: f64) -> String {
    let ordinal = ordinal.round() as i32;
    format!("{:04}-{:02}", ordinal.div_euclid(12), ordinal.rem_euclid(12) + 1)
}
