//! Domain modules for business logic encapsulation.
//!
//! Everything here is a pure function of its inputs: report rows come in,
//! chart- and table-ready series come out. Nothing in this module performs
//! I/O.
//!
//! # Modules
//!
//! - [`daily`]: zero-filled per-day series for one month
//! - [`outlets`]: per-outlet ranking with DS status classification
//! - [`summary`]: headline statistics for the dashboard and PDF export
//! - [`employees`]: employee listing search and contract tracking

use outlet_dashboard_client::ReportRow;

use crate::kpi::{KpiConfig, per_head};

pub mod daily;
pub mod employees;
pub mod outlets;
pub mod summary;

/// KPIs derived from a single report row.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct RowMetrics {
    pub per_head: f64,
    pub ds: f64,
    pub achievement: f64,
}

pub(crate) fn row_metrics(cfg: &KpiConfig, row: &ReportRow) -> RowMetrics {
    let per_head = per_head(row.omzet_fnb, row.total_audience);
    RowMetrics {
        per_head,
        ds: cfg.ds_percentage(per_head, row.target_head, row.total_audience),
        achievement: cfg.achievement_percentage(row.omzet_fnb, row.target_percentage),
    }
}

/// Stable grouping key for a row's outlet: the id, or the name for rows
/// exported without one.
pub(crate) fn outlet_key(row: &ReportRow) -> &str {
    let id = row.outlet_id.trim();
    if id.is_empty() {
        row.outlet_name.trim()
    } else {
        id
    }
}

pub(crate) fn mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 { 0.0 } else { sum / count as f64 }
}

#[cfg(test)]
pub(crate) fn row(
    outlet: &str,
    date: &str,
    fnb: f64,
    audience: f64,
    target_head: f64,
) -> ReportRow {
    ReportRow {
        outlet_id: outlet.to_string(),
        outlet_name: format!("Outlet {outlet}"),
        lob: Some("cinema".into()),
        date: date.to_string(),
        omzet_fnb: fnb,
        omzet_cinema: 0.0,
        total_audience: audience,
        target_head,
        target_percentage: None,
    }
}
