//! Stats module - Pollutant aggregation

mod calculator;

pub use calculator::{CorrelationMatrix, StatsCalculator};
