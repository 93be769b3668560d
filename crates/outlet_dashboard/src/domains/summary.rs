//! Headline statistics for the selected period.

use serde::Serialize;

use super::daily::DailyAggregate;
use super::mean;
use super::outlets::{OutletAggregate, status_counts};
use crate::kpi::{DsStatus, per_head};

/// Headline numbers shown above the charts and in the PDF summary block.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SummaryStats {
    pub outlet_count: usize,
    pub total_fnb: f64,
    pub total_cinema: f64,
    pub total_sales: f64,
    pub total_audience: f64,
    pub per_head_fnb: f64,
    pub avg_ds: f64,
    pub avg_achievement: f64,
    pub above_count: usize,
    pub near_count: usize,
    pub below_count: usize,
    pub best_outlet: Option<String>,
    pub worst_outlet: Option<String>,
    pub active_days: usize,
    pub days_in_period: usize,
}

pub fn summarize(outlets: &[OutletAggregate], daily: &[DailyAggregate]) -> SummaryStats {
    let counts = status_counts(outlets);
    let total_fnb: f64 = outlets.iter().map(|o| o.total_fnb).sum();
    let total_cinema: f64 = outlets.iter().map(|o| o.total_cinema).sum();
    let total_audience: f64 = outlets.iter().map(|o| o.total_audience).sum();

    SummaryStats {
        outlet_count: outlets.len(),
        total_fnb,
        total_cinema,
        total_sales: total_fnb + total_cinema,
        total_audience,
        per_head_fnb: per_head(total_fnb, total_audience),
        avg_ds: mean(outlets.iter().map(|o| o.avg_ds)),
        avg_achievement: mean(outlets.iter().map(|o| o.avg_achievement)),
        above_count: counts.get(&DsStatus::Above).copied().unwrap_or(0),
        near_count: counts.get(&DsStatus::Near).copied().unwrap_or(0),
        below_count: counts.get(&DsStatus::Below).copied().unwrap_or(0),
        // `outlets` is ranked by DS descending.
        best_outlet: outlets.first().map(|o| o.outlet_name.clone()),
        worst_outlet: outlets.last().map(|o| o.outlet_name.clone()),
        active_days: daily.iter().filter(|d| d.has_data).count(),
        days_in_period: daily.len(),
    }
}
