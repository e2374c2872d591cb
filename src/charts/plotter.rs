//! Chart Plotter Module
//! Creates the dashboard visualizations using egui_plot.

use crate::data::{AqiLevel, AQI_LEVEL_COL, CITY_COL, DATE_COL, PM25_COL};
use crate::pipeline::DashboardView;
use crate::stats::CorrelationMatrix;
use chrono::DateTime;
use egui::{Align2, Color32, FontId, RichText, Sense, Stroke};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Points};
use polars::prelude::*;
use std::collections::HashMap;

const MS_PER_DAY: f64 = 86_400_000.0;

pub const PALETTE: [Color32; 10] = [
    Color32::from_rgb(52, 152, 219),  // Blue
    Color32::from_rgb(231, 76, 60),   // Red
    Color32::from_rgb(46, 204, 113),  // Green
    Color32::from_rgb(155, 89, 182),  // Purple
    Color32::from_rgb(243, 156, 18),  // Orange
    Color32::from_rgb(26, 188, 156),  // Teal
    Color32::from_rgb(233, 30, 99),   // Pink
    Color32::from_rgb(0, 188, 212),   // Cyan
    Color32::from_rgb(121, 85, 72),   // Brown
    Color32::from_rgb(96, 125, 139),  // Blue Grey
];

const UNDEFINED_CELL: Color32 = Color32::from_rgb(120, 120, 120);

/// One row of the AQI table.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewRow {
    pub date: Option<String>,
    pub city: String,
    pub pm25: f64,
    pub level: Option<AqiLevel>,
}

/// Plot-ready data for one dashboard view.
#[derive(Debug, Clone)]
pub struct ChartData {
    /// PM2.5 points `[day, value]` per city, sorted by day. Rows without a date are skipped.
    pub series_by_city: Vec<(String, Vec<[f64; 2]>)>,
    pub pollutants: Vec<String>,
    pub means_by_city: Vec<(String, Vec<Option<f64>>)>,
    pub correlation: CorrelationMatrix,
    pub recent_rows: Vec<PreviewRow>,
}

impl ChartData {
    /// Extract plot-ready data from a pipeline view.
    pub fn from_view(view: &DashboardView) -> PolarsResult<Self> {
        Ok(Self {
            series_by_city: Self::pm25_series(&view.filtered)?,
            pollutants: view.pollutants.clone(),
            means_by_city: Self::means_rows(&view.city_means, &view.pollutants)?,
            correlation: view.correlation.clone(),
            recent_rows: Self::preview_rows(&view.recent)?,
        })
    }

    fn pm25_series(df: &DataFrame) -> PolarsResult<Vec<(String, Vec<[f64; 2]>)>> {
        let dates = df.column(DATE_COL)?.cast(&DataType::Int64)?;
        let cities = df.column(CITY_COL)?;
        let values = df.column(PM25_COL)?;

        let mut order: Vec<String> = Vec::new();
        let mut points: HashMap<String, Vec<[f64; 2]>> = HashMap::new();

        for ((date, city), value) in dates
            .i64()?
            .into_iter()
            .zip(cities.str()?.into_iter())
            .zip(values.f64()?.into_iter())
        {
            let (Some(ms), Some(city), Some(value)) = (date, city, value) else {
                continue;
            };
            if !points.contains_key(city) {
                order.push(city.to_string());
            }
            points
                .entry(city.to_string())
                .or_default()
                .push([ms as f64 / MS_PER_DAY, value]);
        }

        Ok(order
            .into_iter()
            .map(|city| {
                let mut series = points.remove(&city).unwrap_or_default();
                series.sort_by(|a, b| a[0].partial_cmp(&b[0]).unwrap_or(std::cmp::Ordering::Equal));
                (city, series)
            })
            .collect())
    }

    fn means_rows(
        means: &DataFrame,
        pollutants: &[String],
    ) -> PolarsResult<Vec<(String, Vec<Option<f64>>)>> {
        let cities: Vec<String> = means
            .column(CITY_COL)?
            .str()?
            .into_iter()
            .map(|c| c.unwrap_or_default().to_string())
            .collect();

        let mut rows: Vec<(String, Vec<Option<f64>>)> = cities
            .into_iter()
            .map(|city| (city, Vec::with_capacity(pollutants.len())))
            .collect();

        for pollutant in pollutants {
            let column = means.column(pollutant)?;
            for (row, value) in rows.iter_mut().zip(column.f64()?.into_iter()) {
                row.1.push(value);
            }
        }

        Ok(rows)
    }

    fn preview_rows(recent: &DataFrame) -> PolarsResult<Vec<PreviewRow>> {
        let dates = recent.column(DATE_COL)?.cast(&DataType::Int64)?;
        let cities = recent.column(CITY_COL)?;
        let values = recent.column(PM25_COL)?;
        let levels = recent.column(AQI_LEVEL_COL)?;

        let rows = dates
            .i64()?
            .into_iter()
            .zip(cities.str()?.into_iter())
            .zip(values.f64()?.into_iter())
            .zip(levels.str()?.into_iter())
            .map(|(((date, city), value), level)| PreviewRow {
                date: date.and_then(format_timestamp),
                city: city.unwrap_or_default().to_string(),
                pm25: value.unwrap_or(f64::NAN),
                level: level.and_then(AqiLevel::from_label),
            })
            .collect();

        Ok(rows)
    }
}

/// Format epoch milliseconds as a date, adding the time when it is not midnight.
pub fn format_timestamp(ms: i64) -> Option<String> {
    let dt = DateTime::from_timestamp_millis(ms)?;
    if ms.rem_euclid(MS_PER_DAY as i64) == 0 {
        Some(dt.format("%Y-%m-%d").to_string())
    } else {
        Some(dt.format("%Y-%m-%d %H:%M").to_string())
    }
}

/// Diverging blue-white-red scale for coefficients in [-1, 1].
pub fn correlation_color(value: Option<f64>) -> Color32 {
    let Some(r) = value else {
        return UNDEFINED_CELL;
    };
    let t = r.clamp(-1.0, 1.0) as f32;
    let lerp = |from: u8, to: u8, t: f32| (from as f32 + (to as f32 - from as f32) * t).round() as u8;
    if t >= 0.0 {
        Color32::from_rgb(lerp(255, 214, t), lerp(255, 39, t), lerp(255, 40, t))
    } else {
        let t = -t;
        Color32::from_rgb(lerp(255, 31, t), lerp(255, 119, t), lerp(255, 180, t))
    }
}

/// Severity color for an AQI level.
pub fn level_color(level: AqiLevel) -> Color32 {
    match level {
        AqiLevel::Good => Color32::from_rgb(40, 167, 69),
        AqiLevel::Moderate => Color32::from_rgb(230, 190, 30),
        AqiLevel::Poor => Color32::from_rgb(243, 120, 18),
        AqiLevel::VeryPoor => Color32::from_rgb(220, 53, 69),
        AqiLevel::Severe => Color32::from_rgb(128, 0, 64),
    }
}

/// Draws the dashboard charts.
pub struct ChartPlotter;

impl ChartPlotter {
    pub fn get_color(index: usize) -> Color32 {
        PALETTE[index % PALETTE.len()]
    }

    /// PM2.5 concentration over time, one line per city.
    pub fn draw_pm25_timeseries(ui: &mut egui::Ui, data: &ChartData) {
        Plot::new("pm25_timeseries")
            .height(300.0)
            .legend(Legend::default())
            .x_axis_label("date")
            .y_axis_label("pm2_5")
            .x_axis_formatter(|mark, _range| {
                format_timestamp((mark.value * MS_PER_DAY).round() as i64).unwrap_or_default()
            })
            .show(ui, |plot_ui| {
                for (i, (city, series)) in data.series_by_city.iter().enumerate() {
                    let color = Self::get_color(i);
                    plot_ui.line(
                        Line::new(PlotPoints::from(series.clone()))
                            .color(color)
                            .width(1.5)
                            .name(city),
                    );
                    plot_ui.points(
                        Points::new(PlotPoints::from(series.clone()))
                            .radius(2.5)
                            .color(color)
                            .name(city),
                    );
                }
            });
    }

    /// Average pollutant concentrations, one bar group per city.
    pub fn draw_mean_bars(ui: &mut egui::Ui, data: &ChartData) {
        let x_labels: Vec<String> = data.means_by_city.iter().map(|(c, _)| c.clone()).collect();
        let n_series = data.pollutants.len().max(1);
        let bar_width = 0.8 / n_series as f64;

        Plot::new("pollutant_means")
            .height(300.0)
            .legend(Legend::default())
            .allow_scroll(false)
            .x_axis_label("city")
            .y_axis_label("mean concentration")
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if (mark.value - idx).abs() < 1e-6 && idx >= 0.0 && (idx as usize) < x_labels.len() {
                    x_labels[idx as usize].clone()
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                for (p, pollutant) in data.pollutants.iter().enumerate() {
                    let offset = (p as f64 - (n_series as f64 - 1.0) / 2.0) * bar_width;
                    let bars: Vec<Bar> = data
                        .means_by_city
                        .iter()
                        .enumerate()
                        .filter_map(|(c, (city, means))| {
                            means[p].map(|mean| {
                                Bar::new(c as f64 + offset, mean)
                                    .width(bar_width * 0.95)
                                    .name(format!("{} {}", city, pollutant))
                            })
                        })
                        .collect();

                    plot_ui.bar_chart(
                        BarChart::new(bars)
                            .color(Self::get_color(p))
                            .name(pollutant),
                    );
                }
            });
    }

    /// Annotated correlation heatmap.
    pub fn draw_correlation_heatmap(ui: &mut egui::Ui, matrix: &CorrelationMatrix) {
        const CELL: f32 = 64.0;

        if matrix.is_empty() {
            ui.label(RichText::new("No pollutant columns available").color(Color32::GRAY));
            return;
        }

        egui::Grid::new("correlation_heatmap")
            .spacing([2.0, 2.0])
            .show(ui, |ui| {
                ui.label("");
                for name in &matrix.pollutants {
                    ui.label(RichText::new(name).strong());
                }
                ui.end_row();

                for (i, row_name) in matrix.pollutants.iter().enumerate() {
                    ui.label(RichText::new(row_name).strong());
                    for value in &matrix.values[i] {
                        let (rect, response) =
                            ui.allocate_exact_size(egui::vec2(CELL, CELL * 0.6), Sense::hover());
                        let fill = correlation_color(*value);
                        ui.painter().rect_filled(rect, 2.0, fill);

                        let text = value.map(|r| format!("{:.2}", r)).unwrap_or_else(|| "—".to_string());
                        let text_color = if value.is_some_and(|r| r.abs() > 0.6) {
                            Color32::WHITE
                        } else {
                            Color32::BLACK
                        };
                        ui.painter().text(
                            rect.center(),
                            Align2::CENTER_CENTER,
                            text,
                            FontId::proportional(13.0),
                            text_color,
                        );
                        if value.is_none() {
                            response.on_hover_text("Undefined: too few paired values or constant column");
                        }
                    }
                    ui.end_row();
                }
            });
    }

    /// Table of the most recent rows with their AQI level.
    pub fn draw_aqi_table(ui: &mut egui::Ui, rows: &[PreviewRow]) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .stroke(Stroke::new(1.0, ui.visuals().widgets.noninteractive.bg_stroke.color))
            .show(ui, |ui| {
                egui::Grid::new("aqi_table")
                    .striped(true)
                    .min_col_width(80.0)
                    .spacing([12.0, 4.0])
                    .show(ui, |ui| {
                        for header in ["date", "city", "pm2_5", "AQI_Level"] {
                            ui.label(RichText::new(header).strong().size(12.0));
                        }
                        ui.end_row();

                        for row in rows {
                            ui.label(row.date.as_deref().unwrap_or("NaT"));
                            ui.label(&row.city);
                            ui.label(format!("{:.1}", row.pm25));
                            match row.level {
                                Some(level) => {
                                    ui.label(RichText::new(level.label()).color(level_color(level)).strong())
                                }
                                None => ui.label("-"),
                            };
                            ui.end_row();
                        }
                    });
            });
    }
}
