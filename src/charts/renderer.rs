//! Static Chart Renderer
//! Draws the three linked charts into a PNG for export.
//!
//! Layout:
//! 1. Votes per day across the full width, brushed range shaded
//! 2. Votes by age (left) and votes by priority (right)

use crate::charts::plotter::{ChartPlotter, AGE_COLOR, AREA_COLOR, BRUSH_COLOR};
use crate::data::{format_day, TimeRange};
use anyhow::{anyhow, bail, Context, Result};
use egui::Color32;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::Path;

const TITLE_FONT: (&str, u32) = ("sans-serif", 22);
const LABEL_FONT: (&str, u32) = ("sans-serif", 14);

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// Everything needed to redraw the charts outside of egui.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// Step path of the count chart
    pub count_area: Vec<[f64; 2]>,
    /// Visible time window
    pub window: (f64, f64),
    pub selection: Option<TimeRange>,
    pub ages: Vec<f64>,
    pub priorities: Vec<f64>,
    pub priority_titles: Vec<String>,
}

fn rgb(color: Color32) -> RGBColor {
    RGBColor(color.r(), color.g(), color.b())
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render `snapshot` into a packed RGB buffer of `width * height * 3` bytes.
    pub fn render_snapshot(snapshot: &Snapshot, width: u32, height: u32) -> Result<Vec<u8>> {
        if width == 0 || height == 0 {
            bail!("Invalid image size {}x{}", width, height);
        }
        let mut buffer = vec![0u8; width as usize * height as usize * 3];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            root.fill(&WHITE)?;

            let (top, bottom) = root.split_vertically((height * 2 / 5) as i32);
            let (left, right) = bottom.split_horizontally((width / 2) as i32);

            Self::draw_counts(&top, snapshot)?;
            Self::draw_ages(&left, &snapshot.ages)?;
            Self::draw_priorities(&right, &snapshot.priorities, &snapshot.priority_titles)?;

            root.present()?;
        }
        Ok(buffer)
    }

    /// Encode a buffer from [`render_snapshot`](Self::render_snapshot) as PNG.
    pub fn save_png(buffer: Vec<u8>, width: u32, height: u32, path: &Path) -> Result<()> {
        let img = image::RgbImage::from_raw(width, height, buffer)
            .ok_or_else(|| anyhow!("Image buffer does not match {}x{}", width, height))?;
        img.save(path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        log::info!("Exported charts to {}", path.display());
        Ok(())
    }

    fn draw_counts(area: &Area, snapshot: &Snapshot) -> Result<()> {
        let (mut x_lo, mut x_hi) = snapshot.window;
        if x_hi - x_lo < 1.0 {
            x_lo -= 0.5;
            x_hi += 0.5;
        }
        let values: Vec<f64> = snapshot.count_area.iter().map(|p| p[1]).collect();
        let y_top = ChartPlotter::y_max(&values) * 1.05;

        let mut chart = ChartBuilder::on(area)
            .caption("Votes per day", TITLE_FONT)
            .margin(15)
            .x_label_area_size(35)
            .y_label_area_size(70)
            .build_cartesian_2d(x_lo..x_hi, 0f64..y_top)?;
        chart
            .configure_mesh()
            .x_labels(8)
            .x_label_formatter(&|x: &f64| format_day(*x))
            .y_desc("Votes")
            .label_style(LABEL_FONT)
            .draw()?;

        if let Some(sel) = snapshot.selection {
            let lo = sel.start.max(x_lo);
            let hi = sel.end.min(x_hi);
            if hi >= lo {
                chart.draw_series(std::iter::once(Rectangle::new(
                    [(lo, 0.0), (hi, y_top)],
                    rgb(BRUSH_COLOR).mix(0.3).filled(),
                )))?;
            }
        }

        let points = ChartPlotter::clip_x(&snapshot.count_area, x_lo, x_hi)
            .into_iter()
            .map(|p| (p[0], p[1]));
        chart.draw_series(
            AreaSeries::new(points, 0.0, rgb(AREA_COLOR).mix(0.6)).border_style(rgb(AREA_COLOR)),
        )?;
        Ok(())
    }

    fn draw_ages(area: &Area, ages: &[f64]) -> Result<()> {
        let y_top = ChartPlotter::y_max(ages) * 1.05;
        let mut chart = ChartBuilder::on(area)
            .caption("Votes by Age", TITLE_FONT)
            .margin(15)
            .x_label_area_size(35)
            .y_label_area_size(70)
            .build_cartesian_2d(-1f64..ages.len() as f64, 0f64..y_top)?;
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_desc("Age")
            .y_desc("Votes")
            .label_style(LABEL_FONT)
            .draw()?;

        chart.draw_series(ages.iter().enumerate().map(|(age, &votes)| {
            let x = age as f64;
            Rectangle::new([(x - 0.45, 0.0), (x + 0.45, votes)], rgb(AGE_COLOR).filled())
        }))?;
        Ok(())
    }

    fn draw_priorities(
        area: &Area,
        priorities: &[f64],
        titles: &[String],
    ) -> Result<()> {
        let y_top = ChartPlotter::y_max(priorities) * 1.05;
        let labels: Vec<String> = titles
            .iter()
            .map(|t| ChartPlotter::short_label(t, 10))
            .collect();
        let label_for = |x: &f64| {
            let idx = x.round();
            if (x - idx).abs() < 1e-6 && idx >= 0.0 {
                labels.get(idx as usize).cloned().unwrap_or_default()
            } else {
                String::new()
            }
        };

        let mut chart = ChartBuilder::on(area)
            .caption("Votes by Priority", TITLE_FONT)
            .margin(15)
            .x_label_area_size(60)
            .y_label_area_size(70)
            .build_cartesian_2d(-0.6f64..priorities.len() as f64 - 0.4, 0f64..y_top)?;
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(priorities.len().max(1))
            .x_label_formatter(&label_for)
            .label_style(LABEL_FONT)
            .x_label_style(("sans-serif", 11).into_font().transform(FontTransform::Rotate90))
            .y_desc("Votes")
            .draw()?;

        chart.draw_series(priorities.iter().enumerate().map(|(i, &votes)| {
            let x = i as f64;
            Rectangle::new(
                [(x - 0.4, 0.0), (x + 0.4, votes)],
                rgb(ChartPlotter::priority_color(i)).filled(),
            )
        }))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_size() {
        let snapshot = Snapshot::default();
        assert!(StaticChartRenderer::render_snapshot(&snapshot, 0, 100).is_err());
        assert!(StaticChartRenderer::render_snapshot(&snapshot, 100, 0).is_err());
    }

    #[test]
    fn test_save_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("charts.png");
        let buffer = vec![255u8; 4 * 3 * 3];
        StaticChartRenderer::save_png(buffer, 4, 3, &path).unwrap();

        let img = image::open(&path).unwrap();
        assert_eq!((img.width(), img.height()), (4, 3));
    }

    #[test]
    fn test_save_png_size_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("charts.png");
        assert!(StaticChartRenderer::save_png(vec![0u8; 10], 4, 3, &path).is_err());
        assert!(!path.exists());
    }
}
