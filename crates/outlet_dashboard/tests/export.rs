//! PDF export: pagination, chart fallbacks and section isolation.

use chrono::NaiveDate;
use lopdf::{Document, Object};
use outlet_dashboard::export::chart::RasterImage;
use outlet_dashboard::export::{ExportOptions, daily_report, outlet_report};
use outlet_dashboard::{KpiConfig, aggregate_daily, aggregate_outlets, summarize};
use outlet_dashboard_client::ReportRow;

fn rows(outlets: usize) -> Vec<ReportRow> {
    (0..outlets)
        .map(|i| ReportRow {
            outlet_id: format!("{i}"),
            outlet_name: format!("Outlet {i:03}"),
            lob: Some("cinema".into()),
            date: format!("2024-03-{:02}", i % 28 + 1),
            omzet_fnb: 1_000_000.0 + i as f64 * 10_000.0,
            omzet_cinema: 2_000_000.0,
            total_audience: 50.0,
            target_head: 60_000.0,
            target_percentage: Some(100.0),
        })
        .collect()
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 4, 1).expect("date")
}

fn page_count(bytes: &[u8]) -> usize {
    Document::load_mem(bytes).expect("parse pdf").get_pages().len()
}

fn image_count(bytes: &[u8]) -> usize {
    let doc = Document::load_mem(bytes).expect("parse pdf");
    doc.objects
        .values()
        .filter(|obj| match obj {
            Object::Stream(stream) => stream
                .dict
                .get(b"Subtype")
                .and_then(|s| s.as_name())
                .is_ok_and(|name| name == b"Image"),
            _ => false,
        })
        .count()
}

#[test]
fn long_rankings_span_several_pages() {
    let cfg = KpiConfig::default();
    let data = rows(60);
    let outlets = aggregate_outlets(&data, &cfg);
    let daily = aggregate_daily(&data, 3, 2024, &cfg).expect("series");
    let summary = summarize(&outlets, &daily);

    let options = ExportOptions {
        rows_per_page: 20,
        ..ExportOptions::default()
    };
    let bytes =
        outlet_report(&outlets, &summary, "March 2024", today(), &cfg, &options).expect("pdf");
    assert!(bytes.starts_with(b"%PDF"));
    // Banner, summary, chart and the first 20 rows, then two pages of 20.
    assert!(page_count(&bytes) >= 3);
}

#[test]
fn empty_period_still_produces_a_document() {
    let cfg = KpiConfig::default();
    let daily = aggregate_daily(&[], 2, 2024, &cfg).expect("series");
    let summary = summarize(&[], &daily);

    let options = ExportOptions::default();
    let bytes =
        daily_report(&daily, &summary, "February 2024", today(), &cfg, &options).expect("pdf");
    assert!(page_count(&bytes) >= 1);
    let outlets =
        outlet_report(&[], &summary, "February 2024", today(), &cfg, &options).expect("pdf");
    assert_eq!(page_count(&outlets), 1);
}

#[test]
fn supplied_snapshot_replaces_the_built_in_chart() {
    let cfg = KpiConfig::default();
    let data = rows(5);
    let outlets = aggregate_outlets(&data, &cfg);
    let daily = aggregate_daily(&data, 3, 2024, &cfg).expect("series");
    let summary = summarize(&outlets, &daily);
    let snapshot = RasterImage::from_rgb(2, 1, vec![255, 0, 0, 0, 0, 255]).expect("image");

    let with_snapshot = ExportOptions {
        chart: Some(snapshot),
        ..ExportOptions::default()
    };
    let without_chart = ExportOptions {
        render_chart: false,
        ..ExportOptions::default()
    };
    let a =
        daily_report(&daily, &summary, "March 2024", today(), &cfg, &with_snapshot).expect("pdf");
    let b =
        daily_report(&daily, &summary, "March 2024", today(), &cfg, &without_chart).expect("pdf");
    assert!(page_count(&a) >= 1);
    assert!(page_count(&b) >= 1);
    assert_ne!(a, b);
}

#[test]
fn malformed_snapshot_is_left_out_of_the_document() {
    let cfg = KpiConfig::default();
    let data = rows(5);
    let outlets = aggregate_outlets(&data, &cfg);
    let daily = aggregate_daily(&data, 3, 2024, &cfg).expect("series");
    let summary = summarize(&outlets, &daily);
    let options = ExportOptions {
        chart: Some(RasterImage {
            width: 100,
            height: 100,
            rgb: vec![0; 5],
        }),
        ..ExportOptions::default()
    };

    let bytes =
        outlet_report(&outlets, &summary, "March 2024", today(), &cfg, &options).expect("pdf");
    assert_eq!(image_count(&bytes), 0);

    let rendered = outlet_report(
        &outlets,
        &summary,
        "March 2024",
        today(),
        &cfg,
        &ExportOptions::default(),
    )
    .expect("pdf");
    assert_eq!(image_count(&rendered), 1);
}
