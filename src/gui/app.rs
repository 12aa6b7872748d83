//! MY World Explorer Main Application
//! Main window with control panel and linked chart viewer.

use crate::charts::StaticChartRenderer;
use crate::config::AppConfig;
use crate::data::{DataLoader, Dataset};
use crate::events::EventBus;
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use anyhow::Context;
use egui::SidePanel;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::thread;

/// Data loading result from background thread
enum LoadResult {
    Progress(String),
    Complete(Dataset),
    Error(String),
}

impl LoadResult {
    fn is_final(&self) -> bool {
        matches!(self, LoadResult::Complete(_) | LoadResult::Error(_))
    }
}

/// Collect everything the loader has sent so far. A loader that hung up
/// without a final result is reported as an error.
fn drain_load_results(rx: &Receiver<LoadResult>) -> Vec<LoadResult> {
    let mut results = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(result) => results.push(result),
            Err(TryRecvError::Empty) => break,
            Err(TryRecvError::Disconnected) => {
                if !results.iter().any(LoadResult::is_final) {
                    results.push(LoadResult::Error(
                        "Loader thread stopped without a result".to_string(),
                    ));
                }
                break;
            }
        }
    }
    results
}

/// Main application window.
pub struct ExplorerApp {
    config: AppConfig,
    bus: EventBus,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,

    // Async data loading
    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,
}

impl ExplorerApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        let mut app = Self {
            bus: EventBus::new(),
            control_panel: ControlPanel::new(config.data_dir.clone()),
            chart_viewer: ChartViewer::new(&config),
            config,
            load_rx: None,
            is_loading: false,
        };
        let dir = app.config.data_dir.clone();
        app.start_loading(dir);
        app
    }

    /// Load both JSON documents in a background thread.
    fn start_loading(&mut self, dir: PathBuf) {
        if self.is_loading {
            return;
        }

        self.chart_viewer.clear();
        // Events from the old charts no longer apply
        let _ = self.bus.drain_latest();
        self.control_panel.data_dir = dir.clone();
        self.control_panel.set_status("Loading data...");
        self.is_loading = true;
        self.sync_panel();

        let (tx, rx) = channel();
        self.load_rx = Some(rx);
        let loader = DataLoader::from_config(&self.config);

        thread::spawn(move || {
            let _ = tx.send(LoadResult::Progress(format!(
                "Reading {}...",
                dir.display()
            )));
            let result = loader
                .load_dir(&dir)
                .with_context(|| format!("Failed to load data from {}", dir.display()));
            let message = match result {
                Ok(dataset) => LoadResult::Complete(dataset),
                Err(e) => LoadResult::Error(format!("{:#}", e)),
            };
            let _ = tx.send(message);
        });
    }

    fn handle_browse_data_dir(&mut self) {
        if let Some(dir) = rfd::FileDialog::new()
            .set_directory(&self.control_panel.data_dir)
            .pick_folder()
        {
            self.start_loading(dir);
        }
    }

    /// Check for data loading results
    fn check_load_results(&mut self) {
        let rx = self.load_rx.take();
        if let Some(rx) = rx {
            let mut should_keep_receiver = true;

            for result in drain_load_results(&rx) {
                match result {
                    LoadResult::Progress(status) => {
                        self.control_panel.set_status(&status);
                    }
                    LoadResult::Complete(dataset) => {
                        let days = dataset.table.len();
                        let source = dataset.source_dir.display().to_string();
                        match self
                            .chart_viewer
                            .set_dataset(dataset, self.bus.sender(), &self.config)
                        {
                            Ok(()) => self
                                .control_panel
                                .set_status(&format!("Loaded {} days from {}", days, source)),
                            Err(e) => {
                                log::error!("Failed to build charts: {}", e);
                                self.control_panel.set_status(&format!("Error: {}", e));
                            }
                        }
                        self.is_loading = false;
                        should_keep_receiver = false;
                    }
                    LoadResult::Error(error) => {
                        log::error!("{}", error);
                        self.control_panel.set_status(&format!("Error: {}", error));
                        self.is_loading = false;
                        should_keep_receiver = false;
                    }
                }
            }

            if should_keep_receiver {
                self.load_rx = Some(rx);
            }
            self.sync_panel();
        }
    }

    /// Deliver the latest brush event to the views. Returns `true` if one was handled.
    fn process_selection(&mut self) -> bool {
        let Some(event) = self.bus.drain_latest() else {
            return false;
        };
        if let Err(e) = self.chart_viewer.dispatch(&event) {
            log::error!("Failed to update charts: {}", e);
            self.control_panel.set_status(&format!("Error: {}", e));
        }
        self.sync_panel();
        true
    }

    /// Copy selection and summary state into the control panel.
    fn sync_panel(&mut self) {
        let panel = &mut self.control_panel;
        panel.is_loading = self.is_loading;
        panel.has_data = self.chart_viewer.has_data();
        panel.has_selection = self.chart_viewer.selection().is_some();
        panel.time_labels = self.chart_viewer.time_labels();
        panel.zoom_scale = self.chart_viewer.zoom_scale();

        match self.chart_viewer.summary() {
            Ok(summary) => {
                panel.top_priority_title = summary
                    .as_ref()
                    .and_then(|s| s.top_priority)
                    .and_then(|i| self.chart_viewer.priority_title(i));
                panel.summary = summary;
            }
            Err(e) => {
                log::error!("Failed to summarise selection: {}", e);
                panel.summary = None;
                panel.top_priority_title = None;
            }
        }
    }

    fn handle_export_png(&mut self) {
        let Some(snapshot) = self.chart_viewer.snapshot() else {
            self.control_panel.set_status("No charts to export");
            return;
        };

        let output_path = match rfd::FileDialog::new()
            .add_filter("PNG Image", &["png"])
            .set_file_name("myworld_explorer.png")
            .save_file()
        {
            Some(path) => path,
            None => return,
        };

        let (width, height) = (self.config.export_width, self.config.export_height);
        let result = StaticChartRenderer::render_snapshot(&snapshot, width, height)
            .and_then(|buffer| StaticChartRenderer::save_png(buffer, width, height, &output_path));

        match result {
            Ok(()) => {
                self.control_panel
                    .set_status(&format!("Exported {}", output_path.display()));
                if self.config.open_after_export {
                    Self::open_export(&output_path);
                }
            }
            Err(e) => {
                log::error!("Export failed: {:#}", e);
                self.control_panel.set_status(&format!("Error exporting: {:#}", e));
            }
        }
    }

    fn open_export(path: &Path) {
        if let Err(e) = open::that(path) {
            log::warn!("Could not open {}: {}", path.display(), e);
        }
    }
}

impl eframe::App for ExplorerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_load_results();
        self.process_selection();
        // Wheel zoom emits no event
        self.control_panel.zoom_scale = self.chart_viewer.zoom_scale();

        if self.is_loading {
            ctx.request_repaint();
        }

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(280.0)
            .max_width(330.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(ui);

                    match action {
                        ControlPanelAction::BrowseDataDir => self.handle_browse_data_dir(),
                        ControlPanelAction::Reload => {
                            let dir = self.control_panel.data_dir.clone();
                            self.start_loading(dir);
                        }
                        ControlPanelAction::ClearSelection => self.chart_viewer.clear_selection(),
                        ControlPanelAction::ResetZoom => self.chart_viewer.reset_zoom(),
                        ControlPanelAction::ExportPng => self.handle_export_png(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Chart Viewer
        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart_viewer.show(ui);
        });

        // Events emitted while drawing reach the views before the next frame
        if self.process_selection() {
            ctx.request_repaint();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_reports_dead_loader() {
        let (tx, rx) = channel::<LoadResult>();
        drop(tx);

        let results = drain_load_results(&rx);
        assert_eq!(results.len(), 1);
        assert!(matches!(&results[0], LoadResult::Error(e) if e.contains("without a result")));
    }

    #[test]
    fn test_drain_reports_loader_dying_after_progress() {
        let (tx, rx) = channel();
        tx.send(LoadResult::Progress("Reading...".to_string())).unwrap();
        drop(tx);

        let results = drain_load_results(&rx);
        assert_eq!(results.len(), 2);
        assert!(matches!(results[0], LoadResult::Progress(_)));
        assert!(matches!(results[1], LoadResult::Error(_)));
    }

    #[test]
    fn test_drain_keeps_single_final_result() {
        let (tx, rx) = channel();
        tx.send(LoadResult::Error("bad file".to_string())).unwrap();
        drop(tx);

        let results = drain_load_results(&rx);
        assert_eq!(results.len(), 1);
        assert!(matches!(&results[0], LoadResult::Error(e) if e == "bad file"));
    }

    #[test]
    fn test_drain_waits_on_live_loader() {
        let (tx, rx) = channel::<LoadResult>();
        assert!(drain_load_results(&rx).is_empty());

        tx.send(LoadResult::Progress("Reading...".to_string())).unwrap();
        let results = drain_load_results(&rx);
        assert_eq!(results.len(), 1);
        assert!(matches!(results[0], LoadResult::Progress(_)));
    }
}
