//! Charts module - Chart data extraction and rendering

mod plotter;

pub use plotter::{ChartData, ChartPlotter};
