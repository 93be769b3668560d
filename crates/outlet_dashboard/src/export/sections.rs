//! Independent report sections. Each writer receives the cursor left by the
//! previous section and returns where the next one should start.

use chrono::NaiveDate;

use super::ExportError;
use super::canvas::{BLACK, Canvas, Cursor, Font, GREY, MARGIN, WHITE};
use super::chart::RasterImage;
use crate::domains::summary::SummaryStats;
use crate::format::{currency, grouped, percent};
use crate::kpi::DsStatus;

const BANNER_COLOR: [u8; 3] = [31, 58, 96];
const HEADER_FILL: [u8; 3] = [232, 236, 242];
const SECTION_GAP: f32 = 16.0;

pub trait Section {
    fn name(&self) -> &'static str;
    fn write(&self, canvas: &mut Canvas, cursor: Cursor) -> Result<Cursor, ExportError>;
}

pub struct HeaderBanner {
    pub title: String,
    pub period: String,
    pub generated_on: NaiveDate,
}

impl Section for HeaderBanner {
    fn name(&self) -> &'static str {
        "header"
    }

    fn write(&self, canvas: &mut Canvas, cursor: Cursor) -> Result<Cursor, ExportError> {
        let height = 64.0;
        let width = canvas.content_width();
        let cursor = canvas.ensure_space(cursor, height);
        canvas.fill_rect(cursor, MARGIN, width, height, BANNER_COLOR)?;
        canvas.text(
            Cursor { y: cursor.y + 12.0, ..cursor },
            MARGIN + 14.0,
            18.0,
            Font::Bold,
            WHITE,
            &self.title,
        )?;
        canvas.text(
            Cursor { y: cursor.y + 38.0, ..cursor },
            MARGIN + 14.0,
            10.0,
            Font::Regular,
            WHITE,
            &format!(
                "Period: {}    Generated: {}",
                self.period,
                self.generated_on.format("%d %b %Y")
            ),
        )?;
        Ok(Cursor {
            y: cursor.y + height + SECTION_GAP,
            ..cursor
        })
    }
}

pub struct SummaryBlock<'a> {
    pub summary: &'a SummaryStats,
}

impl SummaryBlock<'_> {
    fn entries(&self) -> Vec<(&'static str, String)> {
        let s = self.summary;
        vec![
            ("Total F&B", currency(s.total_fnb)),
            ("Total Cinema", currency(s.total_cinema)),
            ("Total Sales", currency(s.total_sales)),
            ("Audience", grouped(s.total_audience)),
            ("F&B per Head", currency(s.per_head_fnb)),
            ("Average DS", percent(s.avg_ds)),
            ("Average Achievement", percent(s.avg_achievement)),
            (
                "Outlets Above / Near / Below",
                format!("{} / {} / {}", s.above_count, s.near_count, s.below_count),
            ),
            ("Best Outlet", s.best_outlet.clone().unwrap_or_else(|| "-".into())),
            ("Worst Outlet", s.worst_outlet.clone().unwrap_or_else(|| "-".into())),
            (
                "Days with Data",
                format!("{} of {}", s.active_days, s.days_in_period),
            ),
        ]
    }
}

impl Section for SummaryBlock<'_> {
    fn name(&self) -> &'static str {
        "summary"
    }

    fn write(&self, canvas: &mut Canvas, cursor: Cursor) -> Result<Cursor, ExportError> {
        let entries = self.entries();
        let line = 15.0;
        let rows = entries.len().div_ceil(2);
        let height = 20.0 + rows as f32 * line;
        let mut cursor = canvas.ensure_space(cursor, height);

        canvas.text(cursor, MARGIN, 12.0, Font::Bold, BLACK, "Summary")?;
        cursor.y += 20.0;
        let column_width = canvas.content_width() / 2.0;
        for (i, (label, value)) in entries.iter().enumerate() {
            let row = Cursor {
                y: cursor.y + (i / 2) as f32 * line,
                ..cursor
            };
            let x = MARGIN + (i % 2) as f32 * column_width;
            canvas.text(row, x, 9.0, Font::Regular, GREY, label)?;
            canvas.text_right(row, x + column_width - 12.0, 9.0, Font::Bold, BLACK, value)?;
        }
        Ok(Cursor {
            y: cursor.y + rows as f32 * line + SECTION_GAP,
            ..cursor
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Align {
    Left,
    Right,
}

#[derive(Clone, Debug)]
pub struct Column {
    pub header: &'static str,
    /// Share of the content width.
    pub weight: f32,
    pub align: Align,
}

impl Column {
    pub fn new(header: &'static str, weight: f32, align: Align) -> Self {
        Self {
            header,
            weight,
            align,
        }
    }
}

/// Listing table. Starts a new page every `rows_per_page` rows and repeats
/// the column headers at the top of each page it spans.
pub struct ListingTable {
    pub title: String,
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<String>>,
    pub rows_per_page: usize,
}

const ROW_HEIGHT: f32 = 16.0;
const TABLE_FONT: f32 = 8.5;

impl ListingTable {
    fn column_edges(&self, canvas: &Canvas) -> Vec<(f32, f32)> {
        let total: f32 = self.columns.iter().map(|c| c.weight).sum::<f32>().max(f32::EPSILON);
        let width = canvas.content_width();
        let mut x = MARGIN;
        self.columns
            .iter()
            .map(|c| {
                let w = width * c.weight / total;
                let edges = (x, x + w);
                x += w;
                edges
            })
            .collect()
    }

    fn write_header(
        &self,
        canvas: &mut Canvas,
        cursor: Cursor,
        edges: &[(f32, f32)],
    ) -> Result<Cursor, ExportError> {
        canvas.fill_rect(cursor, MARGIN, canvas.content_width(), ROW_HEIGHT, HEADER_FILL)?;
        let text_cursor = Cursor {
            y: cursor.y + 4.0,
            ..cursor
        };
        for (column, &(left, right)) in self.columns.iter().zip(edges) {
            self.cell(canvas, text_cursor, column.align, left, right, Font::Bold, column.header)?;
        }
        Ok(Cursor {
            y: cursor.y + ROW_HEIGHT,
            ..cursor
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn cell(
        &self,
        canvas: &mut Canvas,
        cursor: Cursor,
        align: Align,
        left: f32,
        right: f32,
        font: Font,
        text: &str,
    ) -> Result<(), ExportError> {
        match align {
            Align::Left => canvas.text(cursor, left + 3.0, TABLE_FONT, font, BLACK, text),
            Align::Right => canvas.text_right(cursor, right - 3.0, TABLE_FONT, font, BLACK, text),
        }
    }
}

impl Section for ListingTable {
    fn name(&self) -> &'static str {
        "table"
    }

    fn write(&self, canvas: &mut Canvas, cursor: Cursor) -> Result<Cursor, ExportError> {
        if self.columns.is_empty() {
            return Err(ExportError::Layout("table has no columns".into()));
        }
        if let Some(bad) = self.rows.iter().find(|r| r.len() != self.columns.len()) {
            return Err(ExportError::Layout(format!(
                "row has {} cells, expected {}",
                bad.len(),
                self.columns.len()
            )));
        }

        let edges = self.column_edges(canvas);
        let rows_per_page = self.rows_per_page.max(1);

        let mut cursor = canvas.ensure_space(cursor, 20.0 + ROW_HEIGHT * 2.0);
        canvas.text(cursor, MARGIN, 12.0, Font::Bold, BLACK, &self.title)?;
        cursor.y += 20.0;
        cursor = self.write_header(canvas, cursor, &edges)?;

        if self.rows.is_empty() {
            canvas.text(
                Cursor { y: cursor.y + 4.0, ..cursor },
                MARGIN + 3.0,
                TABLE_FONT,
                Font::Regular,
                GREY,
                "No data for this period.",
            )?;
            return Ok(Cursor {
                y: cursor.y + ROW_HEIGHT + SECTION_GAP,
                ..cursor
            });
        }

        let mut on_page = 0;
        for row in &self.rows {
            if on_page == rows_per_page || cursor.y + ROW_HEIGHT > canvas.bottom() {
                cursor = canvas.new_page();
                cursor = self.write_header(canvas, cursor, &edges)?;
                on_page = 0;
            }
            let text_cursor = Cursor {
                y: cursor.y + 4.0,
                ..cursor
            };
            for ((column, &(left, right)), value) in self.columns.iter().zip(&edges).zip(row) {
                self.cell(canvas, text_cursor, column.align, left, right, Font::Regular, value)?;
            }
            cursor.y += ROW_HEIGHT;
            canvas.rule(cursor, MARGIN, canvas.content_width(), HEADER_FILL)?;
            on_page += 1;
        }

        Ok(Cursor {
            y: cursor.y + SECTION_GAP,
            ..cursor
        })
    }
}

/// Embedded raster chart. Skipped when no snapshot is available.
pub struct ChartImage {
    pub title: String,
    pub image: Option<RasterImage>,
}

impl Section for ChartImage {
    fn name(&self) -> &'static str {
        "chart"
    }

    fn write(&self, canvas: &mut Canvas, cursor: Cursor) -> Result<Cursor, ExportError> {
        let Some(image) = &self.image else {
            return Err(ExportError::Skipped("no chart snapshot".into()));
        };
        image.validate()?;
        let width = canvas.content_width();
        let height = width * image.height as f32 / image.width.max(1) as f32;
        let mut cursor = canvas.ensure_space(cursor, 20.0 + height);
        canvas.text(cursor, MARGIN, 12.0, Font::Bold, BLACK, &self.title)?;
        cursor.y += 20.0;
        canvas.image(cursor, MARGIN, width, height, image.clone())?;
        Ok(Cursor {
            y: cursor.y + height + SECTION_GAP,
            ..cursor
        })
    }
}

/// Color key for the DS status classes.
pub struct Legend {
    pub entries: Vec<(String, [u8; 3])>,
}

impl Legend {
    pub fn ds_status() -> Self {
        Self {
            entries: DsStatus::ALL
                .iter()
                .map(|s| (s.label().to_string(), s.color()))
                .collect(),
        }
    }
}

impl Section for Legend {
    fn name(&self) -> &'static str {
        "legend"
    }

    fn write(&self, canvas: &mut Canvas, cursor: Cursor) -> Result<Cursor, ExportError> {
        if self.entries.is_empty() {
            return Err(ExportError::Skipped("empty legend".into()));
        }
        let cursor = canvas.ensure_space(cursor, 14.0);
        let mut x = MARGIN;
        for (label, color) in &self.entries {
            canvas.fill_rect(Cursor { y: cursor.y + 1.0, ..cursor }, x, 9.0, 9.0, *color)?;
            canvas.text(cursor, x + 13.0, 9.0, Font::Regular, BLACK, label)?;
            x += 13.0 + super::canvas::text_width(label, 9.0) + 18.0;
        }
        Ok(Cursor {
            y: cursor.y + 14.0 + SECTION_GAP,
            ..cursor
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: usize, rows_per_page: usize) -> ListingTable {
        ListingTable {
            title: "Outlets".into(),
            columns: vec![
                Column::new("Outlet", 2.0, Align::Left),
                Column::new("DS", 1.0, Align::Right),
            ],
            rows: (0..rows).map(|i| vec![format!("Outlet {i}"), "35.00%".into()]).collect(),
            rows_per_page,
        }
    }

    #[test]
    fn table_breaks_every_n_rows() {
        let mut canvas = Canvas::new();
        let start = canvas.start();
        table(25, 10).write(&mut canvas, start).expect("table");
        assert_eq!(canvas.page_count(), 3);
    }

    #[test]
    fn table_breaks_when_the_page_is_full() {
        let mut canvas = Canvas::new();
        let start = canvas.start();
        table(60, 1000).write(&mut canvas, start).expect("table");
        assert!(canvas.page_count() >= 2);
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let mut t = table(2, 10);
        t.rows[1].pop();
        let mut canvas = Canvas::new();
        let start = canvas.start();
        assert!(matches!(
            t.write(&mut canvas, start),
            Err(ExportError::Layout(_))
        ));
    }

    #[test]
    fn missing_chart_is_skipped() {
        let mut canvas = Canvas::new();
        let start = canvas.start();
        let chart = ChartImage {
            title: "Chart".into(),
            image: None,
        };
        assert!(matches!(
            chart.write(&mut canvas, start),
            Err(ExportError::Skipped(_))
        ));
    }

    #[test]
    fn mismatched_snapshot_is_rejected_before_drawing() {
        let mut canvas = Canvas::new();
        let start = canvas.start();
        let chart = ChartImage {
            title: "Chart".into(),
            image: Some(RasterImage {
                width: 100,
                height: 100,
                rgb: vec![0; 5],
            }),
        };
        assert!(matches!(
            chart.write(&mut canvas, start),
            Err(ExportError::InvalidImage {
                expected: 30_000,
                actual: 5
            })
        ));
    }

    #[test]
    fn sections_advance_the_cursor() {
        let mut canvas = Canvas::new();
        let start = canvas.start();
        let banner = HeaderBanner {
            title: "Report".into(),
            period: "March 2024".into(),
            generated_on: NaiveDate::from_ymd_opt(2024, 4, 1).expect("date"),
        };
        let next = banner.write(&mut canvas, start).expect("banner");
        assert!(next.y > start.y);
        let summary = SummaryStats::default();
        let after = SummaryBlock { summary: &summary }
            .write(&mut canvas, next)
            .expect("summary");
        assert!(after.y > next.y);
        assert_eq!(after.page, 0);
    }
}
