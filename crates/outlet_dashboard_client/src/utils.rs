//! Date normalization shared by the client and the aggregation code.

use chrono::NaiveDate;

/// Parse the date portion of a backend date field.
///
/// Accepts:
/// - YYYY-MM-DD
/// - RFC3339 datetime (`2024-03-01T00:00:00.000000Z`); the calendar date is
///   taken as written, without shifting to another offset
/// - Naive datetime `YYYY-MM-DDTHH:MM:SS` or `YYYY-MM-DD HH:MM:SS`
pub fn parse_report_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ndt.date());
        }
    }
    None
}

/// Normalize a date string to YYYY-MM-DD format.
pub fn normalize_date_str(s: &str) -> Option<String> {
    parse_report_date(s).map(|d| d.format("%Y-%m-%d").to_string())
}

/// Number of days in the given month, `None` for an invalid month.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    u32::try_from((next - first).num_days()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_report_date_accepts_date_only() {
        assert_eq!(
            parse_report_date("2025-12-15"),
            NaiveDate::from_ymd_opt(2025, 12, 15)
        );
    }

    #[test]
    fn parse_report_date_keeps_rfc3339_calendar_day() {
        assert_eq!(
            parse_report_date("2024-03-01T00:00:00.000000Z"),
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );
        assert_eq!(
            parse_report_date("2024-03-01T23:30:00+07:00"),
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );
    }

    #[test]
    fn parse_report_date_accepts_sql_timestamp() {
        assert_eq!(
            normalize_date_str("2024-03-09 10:30:00").as_deref(),
            Some("2024-03-09")
        );
    }

    #[test]
    fn parse_report_date_rejects_invalid() {
        assert!(parse_report_date("09/03/2024").is_none());
        assert!(parse_report_date("").is_none());
    }

    #[test]
    fn days_in_month_handles_leap_years() {
        assert_eq!(days_in_month(2024, 2), Some(29));
        assert_eq!(days_in_month(2023, 2), Some(28));
        assert_eq!(days_in_month(2024, 12), Some(31));
        assert_eq!(days_in_month(2024, 4), Some(30));
        assert_eq!(days_in_month(2024, 13), None);
        assert_eq!(days_in_month(2024, 0), None);
    }
}
