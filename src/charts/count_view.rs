//! Count View
//! Context chart: votes per day as a step area, with an x brush and wheel zoom.
//! Brushing emits selection events for the focus charts.

use crate::charts::interaction::{Brush, ZoomState};
use crate::charts::plotter::{ChartPlotter, AREA_COLOR, BRUSH_COLOR};
use crate::data::{format_day, ProcessorError, TimeRange, VoteTable};
use crate::events::{LinkedView, SelectionSender};
use egui::{Color32, RichText, Stroke};
use egui_plot::{Line, Plot, PlotBounds, PlotPoints, Polygon};

/// Pixels around a brush edge that grab the edge instead of the body.
const EDGE_GRAB_PX: f32 = 6.0;
/// Wheel sensitivity, scale doubles every 500 points of scroll.
const WHEEL_ZOOM_RATE: f64 = 0.002;

pub struct CountView {
    /// Step path of `(day, count)`
    area: Vec<[f64; 2]>,
    y_max: f64,
    zoom: ZoomState,
    brush: Brush,
    events: SelectionSender,
    /// Timeline labels under the chart
    pub time_label_min: String,
    pub time_label_max: String,
}

impl CountView {
    pub fn new(
        table: &VoteTable,
        events: SelectionSender,
        scale_extent: (f64, f64),
    ) -> Result<Self, ProcessorError> {
        let counts = table.daily_counts()?;
        let y_max = ChartPlotter::y_max(&counts.iter().map(|p| p[1]).collect::<Vec<_>>());
        let full = table
            .day_extent()
            .map(|(lo, hi)| (lo as f64, hi as f64))
            .unwrap_or((0.0, 1.0));

        let mut view = Self {
            area: ChartPlotter::step_points(&counts),
            y_max,
            zoom: ZoomState::new(full, scale_extent),
            brush: Brush::new(),
            events,
            time_label_min: String::new(),
            time_label_max: String::new(),
        };
        view.reset_labels();
        Ok(view)
    }

    fn reset_labels(&mut self) {
        let (lo, hi) = self.zoom.full();
        self.time_label_min = format_day(lo);
        self.time_label_max = format_day(hi);
    }

    pub fn selection(&self) -> Option<TimeRange> {
        self.brush.selection()
    }

    /// Currently visible time window.
    pub fn visible(&self) -> (f64, f64) {
        self.zoom.visible()
    }

    pub fn area(&self) -> &[[f64; 2]] {
        &self.area
    }

    pub fn zoom_scale(&self) -> f64 {
        self.zoom.scale()
    }

    pub fn reset_zoom(&mut self) {
        self.zoom.reset();
        log::debug!("Zoom reset");
    }

    /// Drop the brush and tell the other views.
    pub fn clear_selection(&mut self) {
        if let Some(event) = self.brush.clear() {
            self.events.emit(event);
        }
    }

    /// Visible window padded so a single-day dataset still has width.
    fn plot_window(&self) -> (f64, f64) {
        let (lo, hi) = self.zoom.visible();
        if hi - lo < 1.0 {
            (lo - 0.5, hi + 0.5)
        } else {
            (lo, hi)
        }
    }

    /// Draw the chart and handle brush and zoom input.
    pub fn show(&mut self, ui: &mut egui::Ui, height: f32) {
        ui.horizontal(|ui| {
            ui.label(RichText::new("Votes").size(14.0).strong());
            ui.add_space(10.0);
            ui.label(
                RichText::new("Drag to select a time range, scroll to zoom")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });

        let (x_lo, x_hi) = self.plot_window();
        let y_max = self.y_max;
        let selection = self.brush.selection();
        let area = self.area.clone();

        let plot_response = Plot::new("count_view")
            .height(height)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .allow_boxed_zoom(false)
            .allow_double_click_reset(false)
            .show_x(true)
            .show_y(true)
            .y_axis_label("Votes")
            .x_axis_formatter(ChartPlotter::date_axis_label)
            .show(ui, |plot_ui| {
                plot_ui.set_plot_bounds(PlotBounds::from_min_max(
                    [x_lo, 0.0],
                    [x_hi, y_max * 1.05],
                ));

                plot_ui.line(
                    Line::new(PlotPoints::from(area))
                        .color(AREA_COLOR)
                        .fill(0.0)
                        .width(1.0)
                        .name("Votes per day"),
                );

                if let Some(sel) = selection {
                    let lo = sel.start.max(x_lo);
                    let hi = sel.end.min(x_hi);
                    if hi >= lo {
                        let top = y_max * 1.05;
                        plot_ui.polygon(
                            Polygon::new(PlotPoints::from(vec![
                                [lo, 0.0],
                                [hi, 0.0],
                                [hi, top],
                                [lo, top],
                            ]))
                            .fill_color(BRUSH_COLOR.gamma_multiply(0.3))
                            .stroke(Stroke::new(1.0, BRUSH_COLOR)),
                        );
                    }
                }
            });

        self.handle_input(ui, &plot_response);

        ui.horizontal(|ui| {
            ui.label(RichText::new(&self.time_label_min).size(12.0));
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(RichText::new(&self.time_label_max).size(12.0));
            });
        });
    }

    /// Zoom factor from wheel and pinch. A wheel used for zooming is
    /// consumed so enclosing scroll areas stay put.
    fn take_zoom_input(input: &mut egui::InputState) -> f64 {
        let scroll = input.smooth_scroll_delta.y;
        let factor = 2f64.powf(scroll as f64 * WHEEL_ZOOM_RATE) * input.zoom_delta() as f64;
        if (factor - 1.0).abs() > f64::EPSILON {
            input.smooth_scroll_delta = egui::Vec2::ZERO;
        }
        factor
    }

    fn handle_input(&mut self, ui: &egui::Ui, plot_response: &egui_plot::PlotResponse<()>) {
        let response = &plot_response.response;
        let transform = &plot_response.transform;
        let extent = self.zoom.visible();

        if response.drag_started() {
            let origin = ui
                .input(|i| i.pointer.press_origin())
                .or_else(|| response.interact_pointer_pos());
            if let Some(pos) = origin {
                let x = transform.value_from_position(pos).x;
                let tolerance =
                    transform.value_from_position(pos + egui::vec2(EDGE_GRAB_PX, 0.0)).x - x;
                self.brush.begin(x, extent, tolerance.abs());
            }
        }

        if response.dragged() && self.brush.is_active() {
            if let Some(pos) = response.interact_pointer_pos() {
                let x = transform.value_from_position(pos).x;
                if let Some(event) = self.brush.update(x, extent) {
                    self.events.emit(event);
                }
            }
        }

        if response.drag_stopped() {
            if let Some(event) = self.brush.end() {
                self.events.emit(event);
            }
        } else if response.clicked() {
            self.clear_selection();
        }

        if response.hovered() {
            let factor = ui.ctx().input_mut(Self::take_zoom_input);
            if (factor - 1.0).abs() > f64::EPSILON {
                let anchor = response
                    .hover_pos()
                    .map(|pos| transform.value_from_position(pos).x)
                    .unwrap_or_else(|| (extent.0 + extent.1) / 2.0);
                if self.zoom.zoom_at(anchor, factor) {
                    let (lo, hi) = self.zoom.visible();
                    log::debug!(
                        "Updated domain: {} - {} (k = {:.2})",
                        format_day(lo),
                        format_day(hi),
                        self.zoom.scale()
                    );
                }
            }
        }
    }
}

impl LinkedView for CountView {
    fn view_name(&self) -> &'static str {
        "count"
    }

    /// Timeline labels follow the brushed range.
    fn on_selection_change(&mut self, selection: Option<&TimeRange>) -> Result<(), ProcessorError> {
        match selection {
            Some(range) => {
                self.time_label_min = range.start_label();
                self.time_label_max = range.end_label();
            }
            None => self.reset_labels(),
        }
        Ok(())
    }
}
