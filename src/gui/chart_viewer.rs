//! Chart Viewer Widget
//! Central panel: the count chart on top, age and priority charts side by side below.

use crate::charts::{AgeView, CountView, PriorityView, Snapshot};
use crate::config::AppConfig;
use crate::data::{Dataset, MetaData, ProcessorError, TimeRange, VoteTable};
use crate::events::{EventBus, LinkedView, SelectionEvent, SelectionSender};
use crate::stats::SelectionSummary;
use egui::{RichText, ScrollArea};
use std::sync::Arc;

const CHART_SPACING: f32 = 15.0;

/// The three linked views built from one dataset.
struct LinkedCharts {
    table: Arc<VoteTable>,
    meta: MetaData,
    count: CountView,
    age: AgeView,
    priority: PriorityView,
}

impl LinkedCharts {
    /// Focus views first, then the context chart.
    fn views_mut(&mut self) -> [&mut dyn LinkedView; 3] {
        [&mut self.age, &mut self.priority, &mut self.count]
    }
}

/// Holds the linked charts once data is loaded.
pub struct ChartViewer {
    charts: Option<LinkedCharts>,
    count_height: f32,
    focus_height: f32,
}

impl ChartViewer {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            charts: None,
            count_height: config.count_chart_height,
            focus_height: config.focus_chart_height,
        }
    }

    pub fn has_data(&self) -> bool {
        self.charts.as_ref().is_some_and(|c| !c.table.is_empty())
    }

    pub fn clear(&mut self) {
        self.charts = None;
    }

    /// Build fresh views for `dataset`. All views start unfiltered.
    pub fn set_dataset(
        &mut self,
        dataset: Dataset,
        events: SelectionSender,
        config: &AppConfig,
    ) -> Result<(), ProcessorError> {
        let table = Arc::new(dataset.table);
        let count = CountView::new(&table, events, config.zoom_extent())?;
        let age = AgeView::new(Arc::clone(&table))?;
        let priority = PriorityView::new(Arc::clone(&table), &dataset.meta, config.transition_secs)?;

        self.charts = Some(LinkedCharts {
            table,
            meta: dataset.meta,
            count,
            age,
            priority,
        });
        Ok(())
    }

    /// Forward a selection event to the views: age, priority, then count.
    pub fn dispatch(&mut self, event: &SelectionEvent) -> Result<(), ProcessorError> {
        let Some(charts) = self.charts.as_mut() else {
            return Ok(());
        };
        EventBus::dispatch(event, &mut charts.views_mut())
    }

    pub fn selection(&self) -> Option<TimeRange> {
        self.charts.as_ref().and_then(|c| c.count.selection())
    }

    /// Current timeline labels of the count chart.
    pub fn time_labels(&self) -> Option<(String, String)> {
        self.charts.as_ref().map(|c| {
            (
                c.count.time_label_min.clone(),
                c.count.time_label_max.clone(),
            )
        })
    }

    /// Zoom scale of the count chart, 1 when unzoomed.
    pub fn zoom_scale(&self) -> Option<f64> {
        self.charts.as_ref().map(|c| c.count.zoom_scale())
    }

    pub fn reset_zoom(&mut self) {
        if let Some(charts) = self.charts.as_mut() {
            charts.count.reset_zoom();
        }
    }

    pub fn clear_selection(&mut self) {
        if let Some(charts) = self.charts.as_mut() {
            charts.count.clear_selection();
        }
    }

    /// Statistics of the current selection, or of everything when unbrushed.
    pub fn summary(&self) -> Result<Option<SelectionSummary>, ProcessorError> {
        let Some(charts) = self.charts.as_ref() else {
            return Ok(None);
        };
        let selection = charts.count.selection();
        let daily = charts.table.daily_counts_in(selection.as_ref())?;
        Ok(Some(SelectionSummary::from_parts(
            &daily,
            charts.age.display_data(),
            charts.priority.display_data(),
        )))
    }

    /// Title of the priority at `index`.
    pub fn priority_title(&self, index: usize) -> Option<String> {
        self.charts
            .as_ref()
            .map(|c| c.meta.priority_title(index))
    }

    /// Data for the static renderer.
    pub fn snapshot(&self) -> Option<Snapshot> {
        self.charts.as_ref().map(|c| Snapshot {
            count_area: c.count.area().to_vec(),
            window: c.count.visible(),
            selection: c.count.selection(),
            ages: c.age.display_data().to_vec(),
            priorities: c.priority.display_data().to_vec(),
            priority_titles: c.priority.titles().to_vec(),
        })
    }

    pub fn show(&mut self, ui: &mut egui::Ui) {
        let Some(charts) = self.charts.as_mut() else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
            return;
        };
        let count_height = self.count_height;
        let focus_height = self.focus_height;

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                charts.count.show(ui, count_height);
                ui.add_space(CHART_SPACING);

                let column_width = (ui.available_width() - CHART_SPACING) / 2.0;
                ui.horizontal(|ui| {
                    ui.vertical(|ui| {
                        ui.set_width(column_width);
                        charts.age.show(ui, focus_height);
                    });
                    ui.add_space(CHART_SPACING);
                    ui.vertical(|ui| {
                        ui.set_width(column_width);
                        charts.priority.show(ui, focus_height);
                    });
                });
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{day_number, DayRecord, AGE_BUCKETS, PRIORITY_COUNT};
    use chrono::NaiveDate;
    use std::path::PathBuf;

    fn dataset() -> Dataset {
        let records: Vec<DayRecord> = (1..=4)
            .map(|d| {
                let mut ages = vec![0; AGE_BUCKETS];
                ages[30] = d as i64;
                let mut priorities = vec![0; PRIORITY_COUNT];
                priorities[2] = d as i64 * 2;
                DayRecord {
                    date: NaiveDate::from_ymd_opt(2015, 6, d).unwrap(),
                    count: d as i64 * 10,
                    priorities,
                    ages,
                }
            })
            .collect();
        Dataset {
            table: VoteTable::from_records(&records).unwrap(),
            meta: MetaData::default(),
            source_dir: PathBuf::from("."),
        }
    }

    fn day(d: u32) -> f64 {
        day_number(NaiveDate::from_ymd_opt(2015, 6, d).unwrap()) as f64
    }

    #[test]
    fn test_empty_viewer() {
        let mut viewer = ChartViewer::new(&AppConfig::default());
        assert!(!viewer.has_data());
        assert!(viewer.snapshot().is_none());
        assert_eq!(viewer.summary().unwrap(), None);
        viewer.dispatch(&SelectionEvent::Cleared).unwrap();
    }

    #[test]
    fn test_dispatch_updates_every_view() {
        let bus = EventBus::new();
        let config = AppConfig::default();
        let mut viewer = ChartViewer::new(&config);
        viewer.set_dataset(dataset(), bus.sender(), &config).unwrap();

        let range = TimeRange::new(day(3), day(4));
        viewer.dispatch(&SelectionEvent::Changed(range)).unwrap();

        let snapshot = viewer.snapshot().unwrap();
        assert_eq!(snapshot.ages[30], 7.0);
        assert_eq!(snapshot.priorities[2], 14.0);
        assert_eq!(
            viewer.time_labels(),
            Some(("2015-06-03".to_string(), "2015-06-04".to_string()))
        );

        viewer.dispatch(&SelectionEvent::Cleared).unwrap();
        let snapshot = viewer.snapshot().unwrap();
        assert_eq!(snapshot.ages[30], 10.0);
        assert_eq!(
            viewer.time_labels(),
            Some(("2015-06-01".to_string(), "2015-06-04".to_string()))
        );
    }

    #[test]
    fn test_dispatch_order_is_age_priority_count() {
        let bus = EventBus::new();
        let config = AppConfig::default();
        let mut viewer = ChartViewer::new(&config);
        viewer.set_dataset(dataset(), bus.sender(), &config).unwrap();

        let charts = viewer.charts.as_mut().unwrap();
        let names: Vec<&str> = charts.views_mut().iter().map(|v| v.view_name()).collect();
        assert_eq!(names, vec!["age", "priority", "count"]);
    }

    #[test]
    fn test_summary_without_selection_covers_all_days() {
        let bus = EventBus::new();
        let config = AppConfig::default();
        let mut viewer = ChartViewer::new(&config);
        viewer.set_dataset(dataset(), bus.sender(), &config).unwrap();

        let summary = viewer.summary().unwrap().unwrap();
        assert_eq!(summary.days, 4);
        assert_eq!(summary.total_votes, 100.0);
        assert_eq!(summary.top_priority, Some(2));
        assert_eq!(viewer.priority_title(2), Some("Priority 3".to_string()));
    }
}
