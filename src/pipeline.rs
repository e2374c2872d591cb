//! Dashboard pipeline: filter, classify and aggregate one selection.

use crate::data::{classify_table, DataProcessor, PM25_COL};
use crate::stats::{CorrelationMatrix, StatsCalculator};
use anyhow::{Context, Result};
use log::debug;
use polars::prelude::*;

/// Everything the charts need for one selection.
#[derive(Debug, Clone)]
pub struct DashboardView {
    /// Filtered table with the `AQI_Level` column.
    pub filtered: DataFrame,
    pub pollutants: Vec<String>,
    pub city_means: DataFrame,
    pub correlation: CorrelationMatrix,
    /// Last rows of date, city, pm2_5, AQI_Level.
    pub recent: DataFrame,
}

impl DashboardView {
    pub fn is_empty(&self) -> bool {
        self.filtered.height() == 0
    }
}

/// Run filter → classify → aggregate over the cleaned table.
pub fn build_view(table: &DataFrame, cities: &[String], preview_rows: usize) -> Result<DashboardView> {
    let filtered =
        DataProcessor::filter_by_cities(table, cities).context("Failed to filter by city")?;
    let filtered = classify_table(&filtered, PM25_COL).context("Failed to classify AQI levels")?;

    let pollutants = StatsCalculator::available_pollutants(&filtered);
    let city_means = StatsCalculator::city_means(&filtered, &pollutants)
        .context("Failed to compute city means")?;
    let correlation = StatsCalculator::correlation_matrix(&filtered, &pollutants)
        .context("Failed to compute correlation matrix")?;
    let recent = DataProcessor::tail_preview(&filtered, preview_rows)
        .context("Failed to build preview table")?;

    debug!(
        "View for {} cities: {} rows, {} pollutants",
        cities.len(),
        filtered.height(),
        pollutants.len()
    );

    Ok(DashboardView {
        filtered,
        pollutants,
        city_means,
        correlation,
        recent,
    })
}
