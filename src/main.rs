//! Air Quality Dashboard - CSV pollutant analysis & interactive charts
//!
//! Loads a city air-quality CSV, classifies PM2.5 into AQI levels and shows
//! per-city trends, averages and pollutant correlations.

mod charts;
mod data;
mod gui;
mod pipeline;
mod settings;
mod stats;

use eframe::egui;
use gui::DashboardApp;

fn main() -> eframe::Result<()> {
    env_logger::init();

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([1000.0, 700.0])
            .with_title("Air Quality Dashboard"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Air Quality Dashboard",
        options,
        Box::new(|cc| Ok(Box::new(DashboardApp::new(cc)))),
    )
}
