//! Priority View
//! Focus chart: total votes for each of the 15 priorities in the brushed range.
//! Bar heights ease towards new totals after every selection change.

use crate::charts::plotter::ChartPlotter;
use crate::data::{MetaData, ProcessorError, TimeRange, VoteTable};
use crate::events::LinkedView;
use egui::RichText;
use egui_plot::{Bar, BarChart, Plot, PlotBounds};
use std::sync::Arc;

/// Characters kept in an axis label; the full title shows on hover.
const AXIS_LABEL_CHARS: usize = 14;

pub struct PriorityView {
    data: Arc<VoteTable>,
    titles: Vec<String>,
    selection: Option<TimeRange>,
    display_data: Vec<f64>,
    transition_secs: f32,
}

impl PriorityView {
    pub fn new(
        data: Arc<VoteTable>,
        meta: &MetaData,
        transition_secs: f32,
    ) -> Result<Self, ProcessorError> {
        let mut view = Self {
            data,
            titles: meta.priority_titles(),
            selection: None,
            display_data: Vec::new(),
            transition_secs,
        };
        view.wrangle_data()?;
        Ok(view)
    }

    /// Re-aggregate the full table over the current selection.
    pub fn wrangle_data(&mut self) -> Result<(), ProcessorError> {
        self.display_data = self.data.votes_per_priority(self.selection.as_ref())?;
        Ok(())
    }

    pub fn display_data(&self) -> &[f64] {
        &self.display_data
    }

    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    pub fn show(&self, ui: &mut egui::Ui, height: f32) {
        ui.label(RichText::new("Votes by Priority").size(14.0).strong());

        let ctx = ui.ctx().clone();
        let animated: Vec<f64> = self
            .display_data
            .iter()
            .enumerate()
            .map(|(i, &votes)| {
                ctx.animate_value_with_time(
                    egui::Id::new(("priority_bar", i)),
                    votes as f32,
                    self.transition_secs,
                ) as f64
            })
            .collect();
        let y_max = ChartPlotter::y_max(&self.display_data);

        let bars: Vec<Bar> = animated
            .iter()
            .enumerate()
            .map(|(i, &votes)| {
                let title = self.titles.get(i).cloned().unwrap_or_default();
                Bar::new(i as f64, votes)
                    .width(0.8)
                    .fill(ChartPlotter::priority_color(i))
                    .name(title)
            })
            .collect();

        let labels: Vec<String> = self
            .titles
            .iter()
            .map(|t| ChartPlotter::short_label(t, AXIS_LABEL_CHARS))
            .collect();
        let count = self.display_data.len();

        Plot::new("priority_view")
            .height(height)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .allow_boxed_zoom(false)
            .y_axis_label("Votes")
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if (mark.value - idx).abs() < 1e-6 && idx >= 0.0 {
                    labels.get(idx as usize).cloned().unwrap_or_default()
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                plot_ui.set_plot_bounds(PlotBounds::from_min_max(
                    [-0.6, 0.0],
                    [count as f64 - 0.4, y_max * 1.05],
                ));
                plot_ui.bar_chart(BarChart::new(bars).name("Votes"));
            });
    }
}

impl LinkedView for PriorityView {
    fn view_name(&self) -> &'static str {
        "priority"
    }

    fn on_selection_change(&mut self, selection: Option<&TimeRange>) -> Result<(), ProcessorError> {
        self.selection = selection.copied();
        self.wrangle_data()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{day_number, DataLoader, DayRecord, AGE_BUCKETS, PRIORITY_COUNT};
    use chrono::NaiveDate;

    fn table() -> Arc<VoteTable> {
        let records: Vec<DayRecord> = (1..=4)
            .map(|d| {
                let mut priorities = vec![0; PRIORITY_COUNT];
                priorities[0] = 1;
                priorities[(d as usize) % PRIORITY_COUNT] += 10;
                DayRecord {
                    date: NaiveDate::from_ymd_opt(2015, 6, d).unwrap(),
                    count: 1,
                    priorities,
                    ages: vec![0; AGE_BUCKETS],
                }
            })
            .collect();
        Arc::new(VoteTable::from_records(&records).unwrap())
    }

    fn day(d: u32) -> f64 {
        day_number(NaiveDate::from_ymd_opt(2015, 6, d).unwrap()) as f64
    }

    #[test]
    fn test_titles_from_metadata() {
        let meta =
            DataLoader::parse_metadata(r#"{"priorities": [{"item-title": "Jobs"}]}"#).unwrap();
        let view = PriorityView::new(table(), &meta, 0.25).unwrap();
        assert_eq!(view.titles().len(), PRIORITY_COUNT);
        assert_eq!(view.titles()[0], "Jobs");
        assert_eq!(view.titles()[1], "Priority 2");
    }

    #[test]
    fn test_wrangle_over_selection() {
        let mut view = PriorityView::new(table(), &MetaData::default(), 0.25).unwrap();
        assert_eq!(view.display_data()[0], 4.0);
        assert_eq!(view.display_data()[1], 10.0);

        view.on_selection_change(Some(&TimeRange::new(day(3), day(4))))
            .unwrap();
        assert_eq!(view.display_data()[0], 2.0);
        assert_eq!(view.display_data()[1], 0.0);
        assert_eq!(view.display_data()[3], 10.0);
        assert_eq!(view.display_data()[4], 10.0);

        view.on_selection_change(None).unwrap();
        assert_eq!(view.display_data()[1], 10.0);
    }
}
