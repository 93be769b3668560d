//! Per-day series for one month.
//!
//! The series always has one entry per calendar day. Days without any
//! report row are emitted as zero rows with `has_data = false`, which keeps
//! "no activity" distinguishable from "activity summing to zero".

use std::collections::{BTreeMap, HashSet};

use chrono::{Datelike, NaiveDate};
use outlet_dashboard_client::ReportRow;
use outlet_dashboard_client::utils::{days_in_month, parse_report_date};
use serde::Serialize;

use super::{mean, outlet_key, row_metrics};
use crate::error::{DashboardError, DashboardResult};
use crate::kpi::{KpiConfig, per_head};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DailyAggregate {
    pub day: u32,
    pub date: NaiveDate,
    pub fnb: f64,
    pub cinema: f64,
    pub total_sales: f64,
    pub audience: f64,
    pub target_head: f64,
    pub per_head_fnb: f64,
    pub avg_ds: f64,
    pub avg_achievement: f64,
    pub outlet_count: usize,
    pub has_data: bool,
}

impl DailyAggregate {
    fn empty(date: NaiveDate) -> Self {
        Self {
            day: date.day(),
            date,
            fnb: 0.0,
            cinema: 0.0,
            total_sales: 0.0,
            audience: 0.0,
            target_head: 0.0,
            per_head_fnb: 0.0,
            avg_ds: 0.0,
            avg_achievement: 0.0,
            outlet_count: 0,
            has_data: false,
        }
    }
}

/// Day-of-month of `row` when its date falls inside `year`/`month`.
///
/// Rows carry either a plain ISO date or a full timestamp; both resolve to
/// the same calendar day, never to a locale-formatted string.
fn day_in_month(row: &ReportRow, year: i32, month: u32) -> Option<u32> {
    let date = parse_report_date(&row.date)?;
    (date.year() == year && date.month() == month).then(|| date.day())
}

/// Build the zero-filled per-day series for `month`/`year`.
pub fn aggregate_daily(
    rows: &[ReportRow],
    month: u32,
    year: i32,
    cfg: &KpiConfig,
) -> DashboardResult<Vec<DailyAggregate>> {
    let days = days_in_month(year, month).ok_or_else(|| {
        DashboardError::InvalidFilter(format!("no such month: {year}-{month:02}"))
    })?;

    let mut by_day: BTreeMap<u32, Vec<&ReportRow>> = BTreeMap::new();
    let mut undated = 0usize;
    for row in rows {
        match day_in_month(row, year, month) {
            Some(day) => by_day.entry(day).or_default().push(row),
            None if parse_report_date(&row.date).is_none() => undated += 1,
            None => {}
        }
    }
    if undated > 0 {
        tracing::debug!(undated, "skipped report rows without a usable date");
    }

    let mut series = Vec::with_capacity(days as usize);
    for day in 1..=days {
        let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else {
            continue;
        };
        let Some(matches) = by_day.get(&day) else {
            series.push(DailyAggregate::empty(date));
            continue;
        };

        let fnb: f64 = matches.iter().map(|r| r.omzet_fnb).sum();
        let cinema: f64 = matches.iter().map(|r| r.omzet_cinema).sum();
        let audience: f64 = matches.iter().map(|r| r.total_audience).sum();
        let target_head: f64 = matches.iter().map(|r| r.target_head).sum();
        let metrics: Vec<_> = matches.iter().map(|r| row_metrics(cfg, r)).collect();
        let outlets: HashSet<&str> = matches.iter().map(|r| outlet_key(r)).collect();

        series.push(DailyAggregate {
            day,
            date,
            fnb,
            cinema,
            total_sales: fnb + cinema,
            audience,
            target_head,
            per_head_fnb: per_head(fnb, audience),
            avg_ds: mean(metrics.iter().map(|m| m.ds)),
            avg_achievement: mean(metrics.iter().map(|m| m.achievement)),
            outlet_count: outlets.len(),
            has_data: true,
        });
    }
    Ok(series)
}
