//! Age View
//! Focus chart: histogram of votes per age for the brushed range.

use crate::charts::plotter::{ChartPlotter, AGE_COLOR};
use crate::data::{ProcessorError, TimeRange, VoteTable};
use crate::events::LinkedView;
use egui::RichText;
use egui_plot::{Bar, BarChart, Plot, PlotBounds};
use std::sync::Arc;

pub struct AgeView {
    data: Arc<VoteTable>,
    selection: Option<TimeRange>,
    display_data: Vec<f64>,
}

impl AgeView {
    pub fn new(data: Arc<VoteTable>) -> Result<Self, ProcessorError> {
        let mut view = Self {
            data,
            selection: None,
            display_data: Vec::new(),
        };
        view.wrangle_data()?;
        Ok(view)
    }

    /// Re-aggregate the full table over the current selection.
    pub fn wrangle_data(&mut self) -> Result<(), ProcessorError> {
        self.display_data = self.data.votes_per_age(self.selection.as_ref())?;
        Ok(())
    }

    pub fn display_data(&self) -> &[f64] {
        &self.display_data
    }

    pub fn show(&self, ui: &mut egui::Ui, height: f32) {
        ui.label(RichText::new("Votes by Age").size(14.0).strong());

        let y_max = ChartPlotter::y_max(&self.display_data);
        let bars: Vec<Bar> = self
            .display_data
            .iter()
            .enumerate()
            .map(|(age, &votes)| {
                Bar::new(age as f64, votes)
                    .width(0.9)
                    .name(format!("Age {age}"))
            })
            .collect();

        Plot::new("age_view")
            .height(height)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .allow_boxed_zoom(false)
            .x_axis_label("Age")
            .y_axis_label("Votes")
            .show(ui, |plot_ui| {
                plot_ui.set_plot_bounds(PlotBounds::from_min_max(
                    [-1.0, 0.0],
                    [self.display_data.len() as f64, y_max * 1.05],
                ));
                plot_ui.bar_chart(BarChart::new(bars).color(AGE_COLOR).name("Votes"));
            });
    }
}

impl LinkedView for AgeView {
    fn view_name(&self) -> &'static str {
        "age"
    }

    fn on_selection_change(&mut self, selection: Option<&TimeRange>) -> Result<(), ProcessorError> {
        self.selection = selection.copied();
        self.wrangle_data()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{day_number, DayRecord, AGE_BUCKETS, PRIORITY_COUNT};
    use chrono::NaiveDate;

    fn table() -> Arc<VoteTable> {
        let records: Vec<DayRecord> = (1..=3)
            .map(|d| {
                let mut ages = vec![0; AGE_BUCKETS];
                ages[20 + d as usize] = d as i64;
                DayRecord {
                    date: NaiveDate::from_ymd_opt(2015, 6, d).unwrap(),
                    count: 1,
                    priorities: vec![0; PRIORITY_COUNT],
                    ages,
                }
            })
            .collect();
        Arc::new(VoteTable::from_records(&records).unwrap())
    }

    fn day(d: u32) -> f64 {
        day_number(NaiveDate::from_ymd_opt(2015, 6, d).unwrap()) as f64
    }

    #[test]
    fn test_starts_with_all_days() {
        let view = AgeView::new(table()).unwrap();
        let data = view.display_data();
        assert_eq!(data.len(), AGE_BUCKETS);
        assert_eq!(data[21], 1.0);
        assert_eq!(data[22], 2.0);
        assert_eq!(data[23], 3.0);
    }

    #[test]
    fn test_selection_filters_and_clear_restores() {
        let mut view = AgeView::new(table()).unwrap();

        view.on_selection_change(Some(&TimeRange::new(day(2), day(3))))
            .unwrap();
        assert_eq!(view.display_data()[21], 0.0);
        assert_eq!(view.display_data()[22], 2.0);

        view.on_selection_change(None).unwrap();
        assert_eq!(view.display_data()[21], 1.0);
    }
}
