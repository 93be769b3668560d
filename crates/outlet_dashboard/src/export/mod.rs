//! PDF report export.
//!
//! A report is a list of [`Section`](sections::Section) writers run in order
//! over a shared [`Canvas`](canvas::Canvas). A section that fails or has
//! nothing to draw is rolled back and logged; the remaining sections still
//! render, so a document is produced whenever the canvas itself can be
//! serialized.

pub mod canvas;
pub mod chart;
pub mod sections;

use std::path::Path;

use chrono::NaiveDate;
use thiserror::Error;

use crate::domains::daily::DailyAggregate;
use crate::domains::outlets::OutletAggregate;
use crate::domains::summary::SummaryStats;
use crate::format::{currency, grouped, percent};
use crate::kpi::KpiConfig;
use canvas::Canvas;
use chart::{Bar, RasterImage, render_bar_chart};
use sections::{
    Align, ChartImage, Column, HeaderBanner, Legend, ListingTable, Section, SummaryBlock,
};

const CHART_WIDTH: u32 = 1030;
const CHART_HEIGHT: u32 = 420;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("PDF serialization failed: {0}")]
    Pdf(String),

    #[error("layout error: {0}")]
    Layout(String),

    #[error("chart image has {actual} bytes, expected {expected}")]
    InvalidImage { expected: usize, actual: usize },

    #[error("section skipped: {0}")]
    Skipped(String),

    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportKind {
    OutletPerformance,
    DailySales,
}

impl ReportKind {
    pub fn slug(self) -> &'static str {
        match self {
            ReportKind::OutletPerformance => "outlet-performance",
            ReportKind::DailySales => "daily-sales",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ReportKind::OutletPerformance => "Outlet Performance Report",
            ReportKind::DailySales => "Daily Sales Report",
        }
    }
}

/// File name encoding the report type, the reporting period and the export date,
/// e.g. `outlet-performance_2024-03_20240415.pdf`.
pub fn report_filename(kind: ReportKind, period: &str, today: NaiveDate) -> String {
    let period: String = period
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '-' })
        .collect();
    format!("{}_{}_{}.pdf", kind.slug(), period, today.format("%Y%m%d"))
}

#[derive(Clone, Debug)]
pub struct ExportOptions {
    pub rows_per_page: usize,
    /// Snapshot supplied by the caller. When absent the built-in rasterizer
    /// draws one from the series, unless `render_chart` is false.
    pub chart: Option<RasterImage>,
    pub render_chart: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            rows_per_page: 25,
            chart: None,
            render_chart: true,
        }
    }
}

/// Ordered set of sections rendered into one document.
pub struct Report<'a> {
    title: String,
    sections: Vec<Box<dyn Section + 'a>>,
}

impl<'a> Report<'a> {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            sections: Vec::new(),
        }
    }

    pub fn section(mut self, section: impl Section + 'a) -> Self {
        self.sections.push(Box::new(section));
        self
    }

    pub fn render(&self) -> Result<Vec<u8>, ExportError> {
        let mut canvas = Canvas::new();
        let mut cursor = canvas.start();
        for section in &self.sections {
            let checkpoint = canvas.checkpoint();
            match section.write(&mut canvas, cursor) {
                Ok(next) => cursor = next,
                Err(ExportError::Skipped(reason)) => {
                    canvas.rollback(checkpoint);
                    tracing::debug!(section = section.name(), "section skipped: {reason}");
                }
                Err(e) => {
                    canvas.rollback(checkpoint);
                    metrics::counter!(
                        "outlet_dashboard_export_section_failures_total",
                        "section" => section.name()
                    )
                    .increment(1);
                    tracing::warn!(section = section.name(), "section omitted from report: {e}");
                }
            }
        }
        let bytes = canvas.finish(&self.title)?;
        tracing::info!(title = %self.title, bytes = bytes.len(), "report rendered");
        Ok(bytes)
    }
}

fn chart_or_render(
    options: &ExportOptions,
    bars: impl FnOnce() -> Vec<Bar>,
) -> Option<RasterImage> {
    if let Some(chart) = &options.chart {
        return Some(chart.clone());
    }
    if !options.render_chart {
        return None;
    }
    match render_bar_chart(&bars(), CHART_WIDTH, CHART_HEIGHT) {
        Ok(img) => Some(img),
        Err(e) => {
            tracing::debug!("chart not rendered: {e}");
            None
        }
    }
}

/// Outlet ranking report for one period.
pub fn outlet_report(
    outlets: &[OutletAggregate],
    summary: &SummaryStats,
    period: &str,
    today: NaiveDate,
    kpi: &KpiConfig,
    options: &ExportOptions,
) -> Result<Vec<u8>, ExportError> {
    let kind = ReportKind::OutletPerformance;
    let chart = chart_or_render(options, || {
        outlets
            .iter()
            .map(|o| Bar::new(o.avg_ds, kpi.classify(o.avg_ds).color()))
            .collect()
    });
    let rows = outlets
        .iter()
        .enumerate()
        .map(|(i, o)| {
            vec![
                (i + 1).to_string(),
                o.outlet_name.clone(),
                o.lob.clone().unwrap_or_else(|| "-".into()),
                currency(o.total_fnb),
                grouped(o.total_audience),
                currency(o.avg_per_head),
                percent(o.avg_ds),
                percent(o.avg_achievement),
            ]
        })
        .collect();

    Report::new(format!("{} - {}", kind.title(), period))
        .section(HeaderBanner {
            title: kind.title().into(),
            period: period.into(),
            generated_on: today,
        })
        .section(SummaryBlock { summary })
        .section(ChartImage {
            title: "DS % by Outlet".into(),
            image: chart,
        })
        .section(Legend::ds_status())
        .section(ListingTable {
            title: "Outlet Ranking".into(),
            columns: vec![
                Column::new("#", 0.4, Align::Right),
                Column::new("Outlet", 2.4, Align::Left),
                Column::new("LOB", 1.0, Align::Left),
                Column::new("F&B", 1.6, Align::Right),
                Column::new("Audience", 1.0, Align::Right),
                Column::new("Per Head", 1.2, Align::Right),
                Column::new("DS", 0.9, Align::Right),
                Column::new("Achv.", 0.9, Align::Right),
            ],
            rows,
            rows_per_page: options.rows_per_page,
        })
        .render()
}

/// Day-by-day report for one month.
pub fn daily_report(
    daily: &[DailyAggregate],
    summary: &SummaryStats,
    period: &str,
    today: NaiveDate,
    kpi: &KpiConfig,
    options: &ExportOptions,
) -> Result<Vec<u8>, ExportError> {
    let kind = ReportKind::DailySales;
    let chart = chart_or_render(options, || {
        daily
            .iter()
            .map(|d| {
                if d.has_data {
                    Bar::new(d.total_sales, kpi.classify(d.avg_ds).color())
                } else {
                    Bar::empty()
                }
            })
            .collect()
    });
    let rows = daily
        .iter()
        .map(|d| {
            vec![
                d.date.format("%d %b").to_string(),
                currency(d.fnb),
                currency(d.cinema),
                currency(d.total_sales),
                grouped(d.audience),
                currency(d.per_head_fnb),
                percent(d.avg_ds),
                percent(d.avg_achievement),
            ]
        })
        .collect();

    Report::new(format!("{} - {}", kind.title(), period))
        .section(HeaderBanner {
            title: kind.title().into(),
            period: period.into(),
            generated_on: today,
        })
        .section(SummaryBlock { summary })
        .section(ChartImage {
            title: "Total Sales by Day".into(),
            image: chart,
        })
        .section(Legend::ds_status())
        .section(ListingTable {
            title: "Daily Breakdown".into(),
            columns: vec![
                Column::new("Date", 0.9, Align::Left),
                Column::new("F&B", 1.5, Align::Right),
                Column::new("Cinema", 1.5, Align::Right),
                Column::new("Total", 1.6, Align::Right),
                Column::new("Audience", 1.0, Align::Right),
                Column::new("Per Head", 1.2, Align::Right),
                Column::new("DS", 0.9, Align::Right),
                Column::new("Achv.", 0.9, Align::Right),
            ],
            rows,
            rows_per_page: options.rows_per_page,
        })
        .render()
}

/// Write `bytes` to `path`, creating parent directories as needed.
pub async fn save_report(path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, bytes).await?;
    tracing::info!(path = %path.display(), "report saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use canvas::{BLACK, Cursor};

    struct Failing;

    impl Section for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn write(&self, canvas: &mut Canvas, cursor: Cursor) -> Result<Cursor, ExportError> {
            canvas.new_page();
            canvas.fill_rect(cursor, 0.0, 10.0, 10.0, BLACK)?;
            Err(ExportError::Layout("boom".into()))
        }
    }

    #[test]
    fn filename_encodes_kind_period_and_date() {
        let today = NaiveDate::from_ymd_opt(2024, 4, 15).expect("date");
        assert_eq!(
            report_filename(ReportKind::OutletPerformance, "2024-03", today),
            "outlet-performance_2024-03_20240415.pdf"
        );
        assert_eq!(
            report_filename(ReportKind::DailySales, "March 2024", today),
            "daily-sales_March-2024_20240415.pdf"
        );
    }

    #[test]
    fn failing_section_does_not_abort_the_document() {
        let bytes = Report::new("Test")
            .section(Failing)
            .section(Legend::ds_status())
            .render()
            .expect("pdf");
        let doc = lopdf::Document::load_mem(&bytes).expect("parse");
        // The page added by the failing section was rolled back.
        assert_eq!(doc.get_pages().len(), 1);
    }
}
