//! Minimal bar-chart rasterizer producing an RGB snapshot for the report.

use super::ExportError;

const BACKGROUND: [u8; 3] = [255, 255, 255];
const AXIS: [u8; 3] = [90, 90, 90];
const GRID: [u8; 3] = [225, 225, 225];
const EMPTY_BAR: [u8; 3] = [200, 200, 200];

/// Packed 8-bit RGB pixels, row-major, top row first.
#[derive(Clone, Debug, PartialEq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

impl RasterImage {
    pub fn filled(width: u32, height: u32, color: [u8; 3]) -> Self {
        let pixels = width as usize * height as usize;
        let mut rgb = Vec::with_capacity(pixels * 3);
        for _ in 0..pixels {
            rgb.extend_from_slice(&color);
        }
        Self { width, height, rgb }
    }

    /// Wrap an externally produced snapshot, checking the buffer size.
    pub fn from_rgb(width: u32, height: u32, rgb: Vec<u8>) -> Result<Self, ExportError> {
        let image = Self { width, height, rgb };
        image.validate()?;
        Ok(image)
    }

    /// Both dimensions non-zero and exactly `width * height * 3` bytes.
    pub fn validate(&self) -> Result<(), ExportError> {
        let expected = self.width as usize * self.height as usize * 3;
        if self.width == 0 || self.height == 0 || self.rgb.len() != expected {
            return Err(ExportError::InvalidImage {
                expected,
                actual: self.rgb.len(),
            });
        }
        Ok(())
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 3;
        let px = self.rgb.get(i..i + 3)?;
        Some([px[0], px[1], px[2]])
    }

    /// Fill the rectangle, clipped to the image bounds. A buffer whose size
    /// disagrees with its dimensions is left untouched.
    pub fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, color: [u8; 3]) {
        if self.validate().is_err() {
            return;
        }
        let x_end = x.saturating_add(w).min(self.width);
        let y_end = y.saturating_add(h).min(self.height);
        for py in y.min(self.height)..y_end {
            for px in x.min(self.width)..x_end {
                let i = (py as usize * self.width as usize + px as usize) * 3;
                self.rgb[i..i + 3].copy_from_slice(&color);
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bar {
    pub value: f64,
    pub color: [u8; 3],
}

impl Bar {
    pub fn new(value: f64, color: [u8; 3]) -> Self {
        Self { value, color }
    }

    /// Placeholder slot for a period without data.
    pub fn empty() -> Self {
        Self {
            value: 0.0,
            color: EMPTY_BAR,
        }
    }
}

/// Render `bars` left to right, scaled so the tallest bar fills the plot.
pub fn render_bar_chart(bars: &[Bar], width: u32, height: u32) -> Result<RasterImage, ExportError> {
    let max = bars
        .iter()
        .map(|b| b.value)
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);
    if bars.is_empty() || max <= 0.0 {
        return Err(ExportError::Skipped("no chart data".into()));
    }

    let margin = 8_u32;
    if width <= margin * 2 + bars.len() as u32 || height <= margin * 2 {
        return Err(ExportError::Skipped("chart area too small".into()));
    }

    let mut img = RasterImage::filled(width, height, BACKGROUND);
    let plot_w = width - margin * 2;
    let plot_h = height - margin * 2;
    let baseline = margin + plot_h;

    for quarter in 1..=4 {
        let y = baseline - plot_h * quarter / 4;
        img.fill_rect(margin, y, plot_w, 1, GRID);
    }

    let slot = plot_w as f64 / bars.len() as f64;
    let bar_w = ((slot * 0.7).floor() as u32).max(1);
    for (i, bar) in bars.iter().enumerate() {
        let value = if bar.value.is_finite() { bar.value.max(0.0) } else { 0.0 };
        let bar_h = ((value / max) * plot_h as f64).round() as u32;
        if bar_h == 0 {
            continue;
        }
        let x = margin + (slot * i as f64 + (slot - bar_w as f64) / 2.0) as u32;
        img.fill_rect(x, baseline - bar_h, bar_w, bar_h, bar.color);
    }

    img.fill_rect(margin, margin, 1, plot_h + 1, AXIS);
    img.fill_rect(margin, baseline, plot_w, 1, AXIS);
    Ok(img)
}
