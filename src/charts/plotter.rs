//! Chart Plotter Module
//! Colors, axis formatting and path helpers shared by the interactive views
//! and the static renderer.

use crate::data::format_day;
use egui::Color32;
use egui_plot::GridMark;
use std::ops::RangeInclusive;

/// Area fill of the vote count chart
pub const AREA_COLOR: Color32 = Color32::from_rgb(70, 130, 180); // Steel blue

/// Brush overlay
pub const BRUSH_COLOR: Color32 = Color32::from_rgb(120, 120, 120);

/// Age histogram bars
pub const AGE_COLOR: Color32 = Color32::from_rgb(46, 204, 113); // Green

pub const PALETTE: [Color32; 10] = [
    Color32::from_rgb(231, 76, 60),  // Red
    Color32::from_rgb(52, 152, 219), // Blue
    Color32::from_rgb(155, 89, 182), // Purple
    Color32::from_rgb(243, 156, 18), // Orange
    Color32::from_rgb(26, 188, 156), // Teal
    Color32::from_rgb(233, 30, 99),  // Pink
    Color32::from_rgb(0, 188, 212),  // Cyan
    Color32::from_rgb(255, 87, 34),  // Deep Orange
    Color32::from_rgb(121, 85, 72),  // Brown
    Color32::from_rgb(96, 125, 139), // Blue Grey
];

/// Helpers for drawing the linked charts.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Get color for a priority bar.
    pub fn priority_color(index: usize) -> Color32 {
        PALETTE[index % PALETTE.len()]
    }

    /// X-axis formatter for day coordinates.
    pub fn date_axis_label(mark: GridMark, _range: &RangeInclusive<f64>) -> String {
        format_day(mark.value)
    }

    /// Shorten a label to `max_chars`, ending with an ellipsis when cut.
    pub fn short_label(label: &str, max_chars: usize) -> String {
        if label.chars().count() <= max_chars {
            return label.to_string();
        }
        let cut: String = label.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{}…", cut.trim_end())
    }

    /// Upper bound for a y axis starting at zero. Never below 1 so an
    /// all-zero selection still gets a usable axis.
    pub fn y_max(values: &[f64]) -> f64 {
        values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(0.0_f64, f64::max)
            .max(1.0)
    }

    /// Step interpolation: the value changes halfway between samples.
    pub fn step_points(points: &[[f64; 2]]) -> Vec<[f64; 2]> {
        let mut out = Vec::with_capacity(points.len() * 2);
        let mut iter = points.iter();
        let Some(&first) = iter.next() else {
            return out;
        };

        out.push(first);
        let mut prev = first;
        for &p in iter {
            let mid = (prev[0] + p[0]) / 2.0;
            out.push([mid, prev[1]]);
            out.push([mid, p[1]]);
            prev = p;
        }
        if points.len() > 1 {
            out.push(prev);
        }
        out
    }

    /// Clip a polyline to `lo..=hi` on x. Segments that cross an edge are
    /// cut at the edge instead of dropping their outer vertex.
    pub fn clip_x(points: &[[f64; 2]], lo: f64, hi: f64) -> Vec<[f64; 2]> {
        let inside = |x: f64| x >= lo && x <= hi;
        let mut out = Vec::with_capacity(points.len() + 2);

        for (i, &p) in points.iter().enumerate() {
            if inside(p[0]) {
                out.push(p);
            }
            let Some(&q) = points.get(i + 1) else {
                break;
            };
            let dx = q[0] - p[0];
            if dx == 0.0 {
                continue;
            }
            let edges = if dx > 0.0 { [lo, hi] } else { [hi, lo] };
            for edge in edges {
                if edge > p[0].min(q[0]) && edge < p[0].max(q[0]) {
                    let t = (edge - p[0]) / dx;
                    out.push([edge, p[1] + t * (q[1] - p[1])]);
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_points() {
        let steps = ChartPlotter::step_points(&[[0.0, 1.0], [2.0, 3.0], [4.0, 2.0]]);
        assert_eq!(
            steps,
            vec![
                [0.0, 1.0],
                [1.0, 1.0],
                [1.0, 3.0],
                [3.0, 3.0],
                [3.0, 2.0],
                [4.0, 2.0],
            ]
        );
    }

    #[test]
    fn test_step_points_short_input() {
        assert!(ChartPlotter::step_points(&[]).is_empty());
        assert_eq!(ChartPlotter::step_points(&[[5.0, 1.0]]), vec![[5.0, 1.0]]);
    }

    #[test]
    fn test_clip_x_cuts_steps_at_window_edges() {
        let steps = ChartPlotter::step_points(&[[0.0, 1.0], [2.0, 3.0]]);
        assert_eq!(
            ChartPlotter::clip_x(&steps, 0.5, 1.5),
            vec![[0.5, 1.0], [1.0, 1.0], [1.0, 3.0], [1.5, 3.0]]
        );
        assert_eq!(ChartPlotter::clip_x(&steps, -1.0, 5.0), steps);
    }

    #[test]
    fn test_clip_x_inside_one_segment() {
        let clipped = ChartPlotter::clip_x(&[[0.0, 0.0], [4.0, 8.0]], 1.0, 2.0);
        assert_eq!(clipped, vec![[1.0, 2.0], [2.0, 4.0]]);
        assert!(ChartPlotter::clip_x(&[[0.0, 0.0], [1.0, 1.0]], 3.0, 4.0).is_empty());
    }

    #[test]
    fn test_short_label() {
        assert_eq!(ChartPlotter::short_label("Jobs", 10), "Jobs");
        assert_eq!(
            ChartPlotter::short_label("A good education", 8),
            "A good…"
        );
    }

    #[test]
    fn test_y_max() {
        assert_eq!(ChartPlotter::y_max(&[]), 1.0);
        assert_eq!(ChartPlotter::y_max(&[0.0, 0.0]), 1.0);
        assert_eq!(ChartPlotter::y_max(&[3.0, 12.0, f64::NAN]), 12.0);
    }

    #[test]
    fn test_priority_colors_cycle() {
        assert_eq!(ChartPlotter::priority_color(0), ChartPlotter::priority_color(10));
    }
}
