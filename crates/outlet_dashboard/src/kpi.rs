//! KPI formulas: per-head revenue, DS percentage, achievement percentage and
//! the DS status classification.
//!
//! The DS conversion factor and the achievement baseline are business
//! constants owned by the reporting team; they live in [`KpiConfig`] and can
//! be overridden from the environment.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{DashboardError, DashboardResult};

/// Upper bound of every derived percentage.
pub const MAX_PERCENTAGE: f64 = 200.0;

#[derive(Clone, Debug, PartialEq)]
pub struct KpiConfig {
    /// Fraction of the per-head target counted as "DS" (0.335 = 33.5%).
    pub ds_factor: f64,
    /// Revenue that corresponds to a 100% target.
    pub achievement_baseline: f64,
    /// DS% at or above which an outlet is above target.
    pub above_threshold: f64,
    /// DS% at or above which an outlet is near target.
    pub near_threshold: f64,
}

impl Default for KpiConfig {
    fn default() -> Self {
        Self {
            ds_factor: 0.335,
            achievement_baseline: 10_000_000.0,
            above_threshold: 33.5,
            near_threshold: 33.0,
        }
    }
}

impl KpiConfig {
    pub fn from_env() -> DashboardResult<Self> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    pub fn from_env_with<F>(mut get: F) -> DashboardResult<Self>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(v) = get("OUTLET_DASHBOARD_DS_FACTOR") {
            cfg.ds_factor = parse_positive("OUTLET_DASHBOARD_DS_FACTOR", &v)?;
        }
        if let Some(v) = get("OUTLET_DASHBOARD_ACHIEVEMENT_BASELINE") {
            cfg.achievement_baseline = parse_positive("OUTLET_DASHBOARD_ACHIEVEMENT_BASELINE", &v)?;
        }
        Ok(cfg)
    }

    /// DS% for one outlet-day: how far the actual per-head revenue gets
    /// toward the per-head target, scaled by the DS factor.
    pub fn ds_percentage(&self, per_head_actual: f64, target_head: f64, audience: f64) -> f64 {
        if target_head > 0.0 && audience > 0.0 && per_head_actual > 0.0 {
            clamp_percentage(per_head_actual / target_head * self.ds_factor * 100.0)
        } else {
            0.0
        }
    }

    /// Achievement% of F&B revenue against the baseline scaled by the target
    /// percentage (100 when absent).
    pub fn achievement_percentage(&self, fnb_revenue: f64, target_percentage: Option<f64>) -> f64 {
        let target = target_percentage.unwrap_or(100.0) / 100.0 * self.achievement_baseline;
        if target > 0.0 {
            clamp_percentage(fnb_revenue / target * 100.0)
        } else {
            0.0
        }
    }

    pub fn classify(&self, ds: f64) -> DsStatus {
        if ds >= self.above_threshold {
            DsStatus::Above
        } else if ds >= self.near_threshold {
            DsStatus::Near
        } else {
            DsStatus::Below
        }
    }
}

fn parse_positive(key: &str, raw: &str) -> DashboardResult<f64> {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => Ok(v),
        _ => Err(DashboardError::Config(format!(
            "{key} must be a positive number, got {raw:?}"
        ))),
    }
}

/// `round(revenue / audience)`, or 0 when there is no audience.
pub fn per_head(revenue: f64, audience: f64) -> f64 {
    if audience > 0.0 && revenue.is_finite() {
        (revenue / audience).round()
    } else {
        0.0
    }
}

/// Clamp into `[0, 200]`; NaN and infinities count as 0.
pub fn clamp_percentage(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, MAX_PERCENTAGE)
    } else {
        0.0
    }
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum DsStatus {
    Above,
    Near,
    Below,
}

impl DsStatus {
    pub const ALL: [DsStatus; 3] = [DsStatus::Above, DsStatus::Near, DsStatus::Below];

    pub fn label(self) -> &'static str {
        match self {
            DsStatus::Above => "Above DS Target",
            DsStatus::Near => "Near DS Target",
            DsStatus::Below => "Below DS Target",
        }
    }

    /// RGB color used for this status in charts and the PDF legend.
    pub fn color(self) -> [u8; 3] {
        match self {
            DsStatus::Above => [34, 197, 94],
            DsStatus::Near => [234, 179, 8],
            DsStatus::Below => [239, 68, 68],
        }
    }
}
