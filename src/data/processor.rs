//! Data Processor Module
//! Handles city selection and the tail preview of the classified table.

use super::aqi::AQI_LEVEL_COL;
use super::loader::{CITY_COL, DATE_COL, PM25_COL};
use polars::prelude::*;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// Columns shown in the AQI table.
pub const PREVIEW_COLS: [&str; 4] = [DATE_COL, CITY_COL, PM25_COL, AQI_LEVEL_COL];

/// Handles row selection over the cleaned table.
pub struct DataProcessor;

impl DataProcessor {
    /// Distinct non-null cities in first-seen row order.
    pub fn distinct_cities(df: &DataFrame) -> Vec<String> {
        let Ok(column) = df.column(CITY_COL) else {
            return Vec::new();
        };
        let Ok(cities) = column.str() else {
            return Vec::new();
        };

        let mut seen = HashSet::new();
        cities
            .into_iter()
            .flatten()
            .filter(|city| seen.insert(*city))
            .map(str::to_string)
            .collect()
    }

    /// The first `count` distinct cities, used when the caller selects none.
    pub fn default_selection(df: &DataFrame, count: usize) -> Vec<String> {
        Self::distinct_cities(df).into_iter().take(count).collect()
    }

    /// Keep rows whose city is in `cities`, preserving row order.
    ///
    /// An empty selection yields an empty table.
    pub fn filter_by_cities(df: &DataFrame, cities: &[String]) -> Result<DataFrame, ProcessorError> {
        let predicate = cities.iter().fold(lit(false), |acc, city| {
            acc.or(col(CITY_COL).eq(lit(city.as_str())))
        });

        let filtered = df.clone().lazy().filter(predicate).collect()?;
        Ok(filtered)
    }

    /// Last `rows` rows of the classified table, restricted to the preview columns.
    pub fn tail_preview(df: &DataFrame, rows: usize) -> Result<DataFrame, ProcessorError> {
        let preview = df.select(PREVIEW_COLS)?.tail(Some(rows));
        Ok(preview)
    }
}
