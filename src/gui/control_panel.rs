//! Control Panel Widget
//! Left side panel: data source, selection, summary, export and status.

use crate::stats::SelectionSummary;
use egui::{Color32, Grid, RichText};
use std::path::PathBuf;

/// Left side control panel.
pub struct ControlPanel {
    pub data_dir: PathBuf,
    /// Timeline labels of the count chart.
    pub time_labels: Option<(String, String)>,
    pub has_selection: bool,
    pub zoom_scale: Option<f64>,
    pub summary: Option<SelectionSummary>,
    /// Title of the summary's top priority.
    pub top_priority_title: Option<String>,
    pub is_loading: bool,
    pub has_data: bool,
    pub status: String,
}

impl ControlPanel {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            time_labels: None,
            has_selection: false,
            zoom_scale: None,
            summary: None,
            top_priority_title: None,
            is_loading: false,
            has_data: false,
            status: "Ready".to_string(),
        }
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🌍 MY World Explorer")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("Votes over time")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Data Source Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.label(
                    RichText::new(self.data_dir.display().to_string())
                        .size(12.0)
                        .color(if self.has_data {
                            Color32::WHITE
                        } else {
                            Color32::GRAY
                        }),
                );
                ui.add_enabled_ui(!self.is_loading, |ui| {
                    ui.horizontal(|ui| {
                        if ui.button("📂 Browse").clicked() {
                            action = ControlPanelAction::BrowseDataDir;
                        }
                        if ui.button("🔄 Reload").clicked() {
                            action = ControlPanelAction::Reload;
                        }
                    });
                });
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Selection Section =====
        ui.label(RichText::new("📅 Time Range").size(14.0).strong());
        ui.add_space(5.0);

        match &self.time_labels {
            Some((from, to)) => {
                Grid::new("time_range").num_columns(2).show(ui, |ui| {
                    ui.label("From:");
                    ui.label(RichText::new(from).monospace());
                    ui.end_row();
                    ui.label("To:");
                    ui.label(RichText::new(to).monospace());
                    ui.end_row();
                });
                ui.horizontal(|ui| {
                    if !self.has_selection {
                        ui.label(RichText::new("All days").size(11.0).color(Color32::GRAY));
                    }
                    if let Some(k) = self.zoom_scale.filter(|k| *k > 1.0) {
                        ui.label(
                            RichText::new(format!("Zoom {:.1}x", k))
                                .size(11.0)
                                .color(Color32::GRAY),
                        );
                    }
                });
            }
            None => {
                ui.label(RichText::new("No data loaded").color(Color32::GRAY));
            }
        }

        ui.add_space(8.0);
        ui.add_enabled_ui(self.has_data, |ui| {
            ui.horizontal(|ui| {
                if ui
                    .add_enabled(self.has_selection, egui::Button::new("✖ Clear selection"))
                    .clicked()
                {
                    action = ControlPanelAction::ClearSelection;
                }
                if ui.button("🔍 Reset zoom").clicked() {
                    action = ControlPanelAction::ResetZoom;
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Summary Section =====
        ui.label(RichText::new("📈 Summary").size(14.0).strong());
        ui.add_space(5.0);

        if let Some(summary) = &self.summary {
            Self::draw_summary(ui, summary, self.top_priority_title.as_deref());
        } else {
            ui.label(RichText::new("-").color(Color32::GRAY));
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Action Buttons =====
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(self.has_data, |ui| {
                let button = egui::Button::new(RichText::new("🖼 Export PNG").size(14.0))
                    .min_size(egui::vec2(150.0, 30.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::ExportPng;
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Status Section =====
        if self.is_loading {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(RichText::new(&self.status).size(11.0));
            });
        } else {
            let status_color = if self.status.contains("Error") {
                Color32::from_rgb(220, 53, 69)
            } else if self.status.starts_with("Loaded") || self.status.starts_with("Exported") {
                Color32::from_rgb(40, 167, 69)
            } else {
                Color32::GRAY
            };
            ui.label(RichText::new(&self.status).size(11.0).color(status_color));
        }

        action
    }

    fn draw_summary(ui: &mut egui::Ui, summary: &SelectionSummary, top_priority: Option<&str>) {
        let fmt = |v: Option<f64>| v.map(|v| format!("{:.1}", v)).unwrap_or_else(|| "-".to_string());

        Grid::new("selection_summary")
            .num_columns(2)
            .striped(true)
            .show(ui, |ui| {
                ui.label("Days");
                ui.label(summary.days.to_string());
                ui.end_row();

                ui.label("Total votes");
                ui.label(format!("{:.0}", summary.total_votes));
                ui.end_row();

                ui.label("Mean / day");
                ui.label(fmt(summary.mean_per_day));
                ui.end_row();

                ui.label("Median / day");
                ui.label(fmt(summary.median_per_day));
                ui.end_row();

                ui.label("Std dev / day");
                ui.label(fmt(summary.std_per_day));
                ui.end_row();

                ui.label("5% - 95%");
                ui.label(format!(
                    "{} - {}",
                    fmt(summary.p05_per_day),
                    fmt(summary.p95_per_day)
                ));
                ui.end_row();

                ui.label("Mean age");
                ui.label(fmt(summary.mean_age));
                ui.end_row();

                ui.label("Median age");
                ui.label(
                    summary
                        .median_age
                        .map(|a| a.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                );
                ui.end_row();

                ui.label("Top priority");
                ui.label(top_priority.unwrap_or("-"));
                ui.end_row();
            });
    }

    /// Set status line
    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseDataDir,
    Reload,
    ClearSelection,
    ResetZoom,
    ExportPng,
}
