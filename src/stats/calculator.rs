//! Statistics Calculator Module
//! Handles per-city pollutant means and the pollutant correlation matrix.

use crate::data::{CITY_COL, POLLUTANT_COLS};
use polars::prelude::*;
use statrs::statistics::Statistics;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StatsError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// Square matrix of pairwise Pearson coefficients.
///
/// `None` marks an undefined coefficient: fewer than two complete pairs, or a
/// zero-variance column. A constant column therefore has an undefined diagonal
/// rather than 1.0.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub pollutants: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    /// Coefficient between two pollutants, if both are present and it is defined.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.pollutants.iter().position(|p| p == a)?;
        let j = self.pollutants.iter().position(|p| p == b)?;
        self.values[i][j]
    }

    pub fn is_empty(&self) -> bool {
        self.pollutants.is_empty()
    }
}

/// Handles statistical calculations over the filtered table.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Recognized pollutant columns present in the table, in canonical order.
    pub fn available_pollutants(df: &DataFrame) -> Vec<String> {
        POLLUTANT_COLS
            .iter()
            .filter(|p| df.column(p).is_ok())
            .map(|p| p.to_string())
            .collect()
    }

    /// Per-city mean of each pollutant, ignoring null and non-finite cells.
    /// One row per city, sorted by name; an all-missing group gives a null mean.
    ///
    /// Output columns: ["city", pollutants...]
    pub fn city_means(df: &DataFrame, pollutants: &[String]) -> Result<DataFrame, StatsError> {
        let means: Vec<Expr> = pollutants
            .iter()
            .map(|p| {
                let values = col(p.as_str()).cast(DataType::Float64);
                values
                    .clone()
                    .filter(values.is_finite())
                    .mean()
                    .alias(p.as_str())
            })
            .collect();

        let out = df
            .clone()
            .lazy()
            .filter(col(CITY_COL).is_not_null())
            .group_by([col(CITY_COL)])
            .agg(means)
            .sort([CITY_COL], SortMultipleOptions::default())
            .collect()?;
        Ok(out)
    }

    /// Rows where both columns are present (pairwise-complete).
    fn paired_values(df: &DataFrame, a: &str, b: &str) -> Result<(Vec<f64>, Vec<f64>), StatsError> {
        let col_a = df.column(a)?.cast(&DataType::Float64)?;
        let col_b = df.column(b)?.cast(&DataType::Float64)?;

        let (xs, ys) = col_a
            .f64()?
            .into_iter()
            .zip(col_b.f64()?.into_iter())
            .filter_map(|pair| match pair {
                (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Some((x, y)),
                _ => None,
            })
            .unzip();
        Ok((xs, ys))
    }

    /// Pearson coefficient of two equally long samples.
    pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
        if xs.len() < 2 || xs.len() != ys.len() {
            return None;
        }

        let sx = xs.std_dev();
        let sy = ys.std_dev();
        if !(sx > 0.0 && sy > 0.0) {
            return None;
        }

        let r = xs.covariance(ys) / (sx * sy);
        r.is_finite().then(|| r.clamp(-1.0, 1.0))
    }

    /// Pairwise correlation matrix over the given pollutant columns.
    pub fn correlation_matrix(
        df: &DataFrame,
        pollutants: &[String],
    ) -> Result<CorrelationMatrix, StatsError> {
        let n = pollutants.len();
        let mut values = vec![vec![None; n]; n];

        for i in 0..n {
            for j in i..n {
                let (xs, ys) = Self::paired_values(df, &pollutants[i], &pollutants[j])?;
                let r = if i == j {
                    // Self-correlation is exact whenever it is defined at all.
                    Self::pearson(&xs, &ys).map(|_| 1.0)
                } else {
                    Self::pearson(&xs, &ys)
                };
                values[i][j] = r;
                values[j][i] = r;
            }
        }

        Ok(CorrelationMatrix {
            pollutants: pollutants.to_vec(),
            values,
        })
    }
}
