//! Data module - CSV loading, cleaning, selection and AQI classification

mod aqi;
mod fingerprint;
mod loader;
mod processor;

pub use aqi::{classify_table, AqiLevel, AQI_LEVEL_COL};
pub use loader::{DataLoader, CITY_COL, DATE_COL, PM25_COL, POLLUTANT_COLS};
pub use processor::DataProcessor;
