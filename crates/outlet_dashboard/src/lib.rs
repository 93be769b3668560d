//! Outlet sales dashboard: KPI formulas, report aggregation, screen state,
//! form validation and PDF export on top of [`outlet_dashboard_client`].

pub mod domains;
pub mod error;
pub mod export;
pub mod filter;
pub mod format;
pub mod forms;
pub mod kpi;
pub mod pagination;
pub mod services;
pub mod state;

#[cfg(test)]
mod test_utils;

pub use domains::daily::{DailyAggregate, aggregate_daily};
pub use domains::outlets::{OutletAggregate, aggregate_outlets};
pub use domains::summary::{SummaryStats, summarize};
pub use error::{DashboardError, DashboardResult};
pub use export::{ExportError, ExportOptions, ReportKind, report_filename};
pub use filter::{DateRange, FilterState, OutletSelection};
pub use kpi::{DsStatus, KpiConfig};
pub use services::{DashboardService, DashboardState, EmployeeService, SubmitError, UserService};
pub use state::{AccessError, AppContext, Route, Theme};
