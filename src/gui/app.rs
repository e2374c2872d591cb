//! Air Quality Dashboard Main Application
//! Main window with control panel and chart viewer.

use crate::charts::ChartData;
use crate::data::{DataLoader, DataProcessor};
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use crate::pipeline::build_view;
use crate::settings::{DashboardSettings, SETTINGS_FILE};
use anyhow::Context;
use egui::SidePanel;
use log::{error, info};
use std::path::{Path, PathBuf};

/// Main application window.
pub struct DashboardApp {
    settings: DashboardSettings,
    loader: DataLoader,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,
    source: PathBuf,
}

impl DashboardApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let settings = DashboardSettings::load_or_default(Path::new(SETTINGS_FILE));
        let source = settings.source_path.clone();
        let chart_viewer = ChartViewer::new(settings.preview_rows);

        let mut app = Self {
            settings,
            loader: DataLoader::new(),
            control_panel: ControlPanel::new(),
            chart_viewer,
            source,
        };
        app.rerun();
        app
    }

    /// Handle CSV file selection
    fn handle_browse_csv(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        {
            info!("Selected source {}", path.display());
            self.source = path;
            self.rerun();
        }
    }

    /// Load (memoized) and rebuild every chart for the current selection.
    fn rerun(&mut self) {
        let source = self.source.clone();
        let default_count = self.settings.default_city_count;

        let (cities, default) = match self.loader.load(&source) {
            Ok(df) => (
                DataProcessor::distinct_cities(df),
                DataProcessor::default_selection(df, default_count),
            ),
            Err(e) => {
                error!("Failed to load {}: {}", source.display(), e);
                self.control_panel.clear_cities(&source);
                self.control_panel.set_status(&format!("Error: {}", e), true);
                self.chart_viewer.set_error(e.to_string());
                return;
            }
        };
        self.control_panel.update_cities(&source, cities, &default);

        self.refresh_view();
    }

    /// Filter, classify and aggregate the cached table.
    fn refresh_view(&mut self) {
        let Some(df) = self.loader.get_dataframe() else {
            self.chart_viewer.clear();
            return;
        };
        let selected = self.control_panel.get_selected_cities();
        let total_rows = df.height();

        let result = build_view(df, &selected, self.settings.preview_rows).and_then(|view| {
            if view.is_empty() {
                info!("No rows for the current selection");
            }
            let rows = view.filtered.height();
            ChartData::from_view(&view)
                .context("Failed to prepare chart data")
                .map(|data| (data, rows))
        });

        match result {
            Ok((data, rows)) => {
                self.chart_viewer.set_chart_data(data);
                self.control_panel.set_status(
                    &format!(
                        "{} of {} rows, {} cities selected",
                        rows,
                        total_rows,
                        selected.len()
                    ),
                    false,
                );
            }
            Err(e) => {
                error!("Failed to build dashboard: {:#}", e);
                self.control_panel.set_status(&format!("Error: {:#}", e), true);
                self.chart_viewer.set_error(format!("{:#}", e));
            }
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(260.0)
            .max_width(320.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    match self.control_panel.show(ui) {
                        ControlPanelAction::BrowseCsv => self.handle_browse_csv(),
                        ControlPanelAction::SelectionChanged => self.rerun(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Chart Viewer
        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart_viewer.show(ui);
        });
    }
}
