//! Per-outlet ranking.

use std::collections::BTreeMap;

use outlet_dashboard_client::ReportRow;
use serde::Serialize;

use super::{mean, outlet_key, row_metrics};
use crate::kpi::{DsStatus, KpiConfig};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OutletAggregate {
    pub outlet_id: String,
    pub outlet_name: String,
    pub lob: Option<String>,
    pub row_count: usize,
    pub total_fnb: f64,
    pub total_cinema: f64,
    pub total_sales: f64,
    pub total_audience: f64,
    pub avg_target_head: f64,
    pub avg_per_head: f64,
    pub avg_ds: f64,
    pub avg_achievement: f64,
    pub status: DsStatus,
}

/// Group rows by outlet, average the per-row KPIs and rank by DS%
/// (descending; ties by outlet name).
pub fn aggregate_outlets(rows: &[ReportRow], cfg: &KpiConfig) -> Vec<OutletAggregate> {
    let mut groups: BTreeMap<&str, Vec<&ReportRow>> = BTreeMap::new();
    for row in rows {
        groups.entry(outlet_key(row)).or_default().push(row);
    }

    let mut out: Vec<OutletAggregate> = groups
        .into_iter()
        .map(|(key, group)| {
            let metrics: Vec<_> = group.iter().map(|r| row_metrics(cfg, r)).collect();
            let total_fnb: f64 = group.iter().map(|r| r.omzet_fnb).sum();
            let total_cinema: f64 = group.iter().map(|r| r.omzet_cinema).sum();
            let avg_ds = mean(metrics.iter().map(|m| m.ds));
            let outlet_name = group
                .iter()
                .map(|r| r.outlet_name.trim())
                .find(|n| !n.is_empty())
                .unwrap_or(key)
                .to_string();
            OutletAggregate {
                outlet_id: key.to_string(),
                outlet_name,
                lob: group.iter().find_map(|r| r.lob.clone()),
                row_count: group.len(),
                total_fnb,
                total_cinema,
                total_sales: total_fnb + total_cinema,
                total_audience: group.iter().map(|r| r.total_audience).sum(),
                avg_target_head: mean(group.iter().map(|r| r.target_head)),
                avg_per_head: mean(metrics.iter().map(|m| m.per_head)),
                avg_ds,
                avg_achievement: mean(metrics.iter().map(|m| m.achievement)),
                status: cfg.classify(avg_ds),
            }
        })
        .collect();

    out.sort_by(|a, b| {
        b.avg_ds
            .total_cmp(&a.avg_ds)
            .then_with(|| a.outlet_name.cmp(&b.outlet_name))
    });
    out
}

/// Rows belonging to one line of business (case-insensitive).
pub fn filter_by_lob<'a>(rows: &'a [ReportRow], lob: &str) -> Vec<&'a ReportRow> {
    rows.iter()
        .filter(|r| r.lob.as_deref().is_some_and(|l| l.eq_ignore_ascii_case(lob)))
        .collect()
}

/// Number of outlets per DS status.
pub fn status_counts(outlets: &[OutletAggregate]) -> BTreeMap<DsStatus, usize> {
    let mut counts = BTreeMap::new();
    for status in DsStatus::ALL {
        counts.insert(status, 0);
    }
    for o in outlets {
        *counts.entry(o.status).or_insert(0) += 1;
    }
    counts
}
