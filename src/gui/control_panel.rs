//! Control Panel Widget
//! Left side panel with the data source and city selection.

use egui::{Color32, RichText, ScrollArea};
use std::path::{Path, PathBuf};

/// Left side control panel with file selection and the city multi-select.
pub struct ControlPanel {
    pub csv_path: Option<PathBuf>,
    pub cities: Vec<String>,
    pub selected_cities: Vec<bool>,
    pub status: String,
    pub is_error: bool,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            csv_path: None,
            cities: Vec::new(),
            selected_cities: Vec::new(),
            status: "Ready".to_string(),
            is_error: false,
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the available cities after a load.
    ///
    /// The current selection survives when the city list is unchanged;
    /// otherwise it is reset to `default`.
    pub fn update_cities(&mut self, path: &Path, cities: Vec<String>, default: &[String]) {
        let same_source = self.csv_path.as_deref() == Some(path) && self.cities == cities;
        self.csv_path = Some(path.to_path_buf());
        if same_source {
            return;
        }

        self.selected_cities = cities.iter().map(|c| default.contains(c)).collect();
        self.cities = cities;
    }

    /// Forget the cities of a source that failed to load.
    pub fn clear_cities(&mut self, path: &Path) {
        self.csv_path = Some(path.to_path_buf());
        self.cities.clear();
        self.selected_cities.clear();
    }

    /// Selected cities in table order.
    pub fn get_selected_cities(&self) -> Vec<String> {
        self.cities
            .iter()
            .zip(self.selected_cities.iter())
            .filter(|(_, &selected)| selected)
            .map(|(city, _)| city.clone())
            .collect()
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🌏 Air Quality Monitoring")
                    .size(20.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("Sustainable Development Goal 13: Climate Action")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== CSV File Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let path_text = self
                        .csv_path
                        .as_ref()
                        .and_then(|p| p.file_name())
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| "No file selected".to_string());

                    ui.label(RichText::new(&path_text).size(12.0).color(
                        if self.csv_path.is_some() {
                            Color32::WHITE
                        } else {
                            Color32::GRAY
                        },
                    ));

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("📂 Browse").clicked() {
                            action = ControlPanelAction::BrowseCsv;
                        }
                    });
                });
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== City Selection Section =====
        ui.label(RichText::new("🏙 Select Cities").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(5.0)
            .show(ui, |ui| {
                ScrollArea::vertical().max_height(260.0).show(ui, |ui| {
                    if self.cities.is_empty() {
                        ui.label(RichText::new("No cities loaded").color(Color32::GRAY));
                    }
                    for (i, city) in self.cities.iter().enumerate() {
                        if i < self.selected_cities.len()
                            && ui.checkbox(&mut self.selected_cities[i], city).changed()
                        {
                            action = ControlPanelAction::SelectionChanged;
                        }
                    }
                });
            });

        ui.add_space(5.0);
        ui.horizontal(|ui| {
            if ui.small_button("Select All").clicked() {
                self.selected_cities.iter_mut().for_each(|v| *v = true);
                action = ControlPanelAction::SelectionChanged;
            }
            if ui.small_button("Clear All").clicked() {
                self.selected_cities.iter_mut().for_each(|v| *v = false);
                action = ControlPanelAction::SelectionChanged;
            }
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Status Section =====
        let status_color = if self.is_error {
            Color32::from_rgb(220, 53, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    /// Set the status line
    pub fn set_status(&mut self, status: &str, is_error: bool) {
        self.status = status.to_string();
        self.is_error = is_error;
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseCsv,
    SelectionChanged,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_update_cities_applies_default() {
        let mut panel = ControlPanel::new();
        panel.update_cities(
            Path::new("a.csv"),
            names(&["Delhi", "Mumbai", "Pune", "Chennai"]),
            &names(&["Delhi", "Mumbai", "Pune"]),
        );
        assert_eq!(panel.get_selected_cities(), names(&["Delhi", "Mumbai", "Pune"]));
    }

    #[test]
    fn test_selection_kept_for_same_source() {
        let mut panel = ControlPanel::new();
        let cities = names(&["Delhi", "Mumbai", "Pune", "Chennai"]);
        let default = names(&["Delhi", "Mumbai", "Pune"]);
        panel.update_cities(Path::new("a.csv"), cities.clone(), &default);

        panel.selected_cities = vec![false, false, false, true];
        panel.update_cities(Path::new("a.csv"), cities, &default);
        assert_eq!(panel.get_selected_cities(), names(&["Chennai"]));
    }

    #[test]
    fn test_selection_reset_for_new_cities() {
        let mut panel = ControlPanel::new();
        panel.update_cities(Path::new("a.csv"), names(&["Delhi"]), &names(&["Delhi"]));
        panel.selected_cities = vec![false];

        panel.update_cities(Path::new("b.csv"), names(&["Oslo", "Bergen"]), &names(&["Oslo"]));
        assert_eq!(panel.get_selected_cities(), names(&["Oslo"]));
    }
}
