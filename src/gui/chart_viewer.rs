//! Chart Viewer Widget
//! Central scrollable panel with the four dashboard sections.

use crate::charts::{ChartData, ChartPlotter};
use egui::{Color32, RichText, ScrollArea};

const SECTION_SPACING: f32 = 18.0;

/// Scrollable chart display area.
pub struct ChartViewer {
    pub chart_data: Option<ChartData>,
    pub error: Option<String>,
    preview_rows: usize,
}

impl ChartViewer {
    pub fn new(preview_rows: usize) -> Self {
        Self {
            chart_data: None,
            error: None,
            preview_rows,
        }
    }

    /// Clear all charts
    pub fn clear(&mut self) {
        self.chart_data = None;
    }

    pub fn set_chart_data(&mut self, chart_data: ChartData) {
        self.chart_data = Some(chart_data);
        self.error = None;
    }

    /// Replace the charts with an error message.
    pub fn set_error(&mut self, error: String) {
        self.chart_data = None;
        self.error = Some(error);
    }

    pub fn show(&mut self, ui: &mut egui::Ui) {
        ui.heading("Cloud-Powered Real-Time Air Quality Monitoring");
        ui.add_space(8.0);

        if let Some(error) = &self.error {
            ui.label(
                RichText::new(format!("❌ {}", error))
                    .size(16.0)
                    .color(Color32::from_rgb(220, 53, 69)),
            );
            return;
        }

        let Some(data) = &self.chart_data else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
            return;
        };

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                Self::section(ui, "PM2.5 Levels Over Time");
                ChartPlotter::draw_pm25_timeseries(ui, data);
                ui.add_space(SECTION_SPACING);

                Self::section(ui, "Average Pollutant Levels by City");
                ChartPlotter::draw_mean_bars(ui, data);
                ui.add_space(SECTION_SPACING);

                Self::section(ui, "Pollutant Correlation Heatmap");
                ChartPlotter::draw_correlation_heatmap(ui, &data.correlation);
                ui.add_space(SECTION_SPACING);

                Self::section(
                    ui,
                    &format!("AQI Category Table (Last {} Entries)", self.preview_rows),
                );
                ChartPlotter::draw_aqi_table(ui, &data.recent_rows);
            });
    }

    fn section(ui: &mut egui::Ui, title: &str) {
        ui.label(RichText::new(title).size(18.0).strong());
        ui.add_space(6.0);
    }
}
