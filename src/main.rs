//! MY World Explorer - Linked time-range views of MY World vote data
//!
//! Brush a range on the votes-per-day chart to filter the age and priority charts.

mod charts;
mod config;
mod data;
mod events;
mod gui;
mod stats;

use config::AppConfig;
use eframe::egui;
use gui::ExplorerApp;

fn main() -> eframe::Result<()> {
    env_logger::init();

    let config = AppConfig::load();
    log::info!("Starting MY World Explorer with data dir {}", config.data_dir.display());

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([1000.0, 700.0])
            .with_title("MY World Explorer"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "MY World Explorer",
        options,
        Box::new(|cc| Ok(Box::new(ExplorerApp::new(cc, config)))),
    )
}
