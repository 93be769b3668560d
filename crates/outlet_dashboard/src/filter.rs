//! Filter state driving which report rows are requested.

use chrono::{Datelike, NaiveDate};
use outlet_dashboard_client::ReportQuery;
use outlet_dashboard_client::utils::days_in_month;

use crate::error::{DashboardError, DashboardResult};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum OutletSelection {
    #[default]
    All,
    Outlet(String),
}

impl OutletSelection {
    /// `"all"` (any case) or empty means every outlet.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case("all") {
            OutletSelection::All
        } else {
            OutletSelection::Outlet(raw.to_string())
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterState {
    pub outlet: OutletSelection,
    pub month: u32,
    pub year: i32,
    pub range: Option<DateRange>,
}

impl FilterState {
    pub fn new(month: u32, year: i32) -> DashboardResult<Self> {
        let filter = Self {
            outlet: OutletSelection::All,
            month,
            year,
            range: None,
        };
        filter.validate()?;
        Ok(filter)
    }

    /// Month containing `today`, all outlets.
    pub fn for_date(today: NaiveDate) -> Self {
        Self {
            outlet: OutletSelection::All,
            month: today.month(),
            year: today.year(),
            range: None,
        }
    }

    pub fn with_outlet(mut self, outlet: OutletSelection) -> Self {
        self.outlet = outlet;
        self
    }

    pub fn with_range(mut self, start: NaiveDate, end: NaiveDate) -> DashboardResult<Self> {
        self.range = Some(DateRange { start, end });
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> DashboardResult<()> {
        if !(1..=12).contains(&self.month) {
            return Err(DashboardError::InvalidFilter(format!(
                "month must be between 1 and 12, got {}",
                self.month
            )));
        }
        if !(1900..=9999).contains(&self.year) {
            return Err(DashboardError::InvalidFilter(format!(
                "year out of range: {}",
                self.year
            )));
        }
        if let Some(range) = self.range.filter(|r| r.start > r.end) {
            return Err(DashboardError::InvalidFilter(format!(
                "start date {} is after end date {}",
                range.start, range.end
            )));
        }
        Ok(())
    }

    pub fn days_in_month(&self) -> u32 {
        days_in_month(self.year, self.month).unwrap_or(0)
    }

    pub fn to_query(&self) -> ReportQuery {
        ReportQuery {
            month: self.month,
            year: self.year,
            outlet_id: match &self.outlet {
                OutletSelection::All => None,
                OutletSelection::Outlet(id) => Some(id.clone()),
            },
            start_date: self.range.map(|r| r.start),
            end_date: self.range.map(|r| r.end),
        }
    }

    /// Human-readable period, e.g. "March 2024".
    pub fn period_label(&self) -> String {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .map(|d| d.format("%B %Y").to_string())
            .unwrap_or_else(|| format!("{:04}-{:02}", self.year, self.month))
    }

    /// Sortable period key, e.g. "2024-03".
    pub fn period_key(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_month_and_reversed_range() {
        assert!(FilterState::new(0, 2024).is_err());
        assert!(FilterState::new(13, 2024).is_err());
        let f = FilterState::new(3, 2024).expect("filter");
        let start = NaiveDate::from_ymd_opt(2024, 3, 10).expect("date");
        let end = NaiveDate::from_ymd_opt(2024, 3, 5).expect("date");
        assert!(f.clone().with_range(start, end).is_err());
        assert!(f.with_range(end, start).is_ok());
    }

    #[test]
    fn query_reflects_selection() {
        let f = FilterState::new(2, 2024)
            .expect("filter")
            .with_outlet(OutletSelection::parse("12"));
        let q = f.to_query();
        assert_eq!(q.outlet_id.as_deref(), Some("12"));
        assert_eq!(f.days_in_month(), 29);
        assert_eq!(f.period_label(), "February 2024");
        assert_eq!(f.period_key(), "2024-02");

        let all = f.with_outlet(OutletSelection::parse("ALL"));
        assert_eq!(all.to_query().outlet_id, None);
    }
}
