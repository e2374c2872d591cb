//! AQI Level Module
//! Maps PM2.5 readings to ordinal air-quality categories.

use polars::prelude::*;
use std::fmt;

/// Name of the derived category column.
pub const AQI_LEVEL_COL: &str = "AQI_Level";

/// Ordinal air-quality category, least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AqiLevel {
    Good,
    Moderate,
    Poor,
    VeryPoor,
    Severe,
}

/// Inclusive upper bounds, scanned in order. Anything above the last bound is Severe.
const PM25_BANDS: [(f64, AqiLevel); 4] = [
    (30.0, AqiLevel::Good),
    (60.0, AqiLevel::Moderate),
    (90.0, AqiLevel::Poor),
    (120.0, AqiLevel::VeryPoor),
];

impl AqiLevel {
    /// All levels in severity order.
    pub const ALL: [AqiLevel; 5] = [
        AqiLevel::Good,
        AqiLevel::Moderate,
        AqiLevel::Poor,
        AqiLevel::VeryPoor,
        AqiLevel::Severe,
    ];

    /// Classify a PM2.5 concentration.
    pub fn from_pm25(pm25: f64) -> Self {
        PM25_BANDS
            .iter()
            .find(|(upper, _)| pm25 <= *upper)
            .map(|(_, level)| *level)
            .unwrap_or(AqiLevel::Severe)
    }

    /// Display label, as stored in the `AQI_Level` column.
    pub fn label(&self) -> &'static str {
        match self {
            AqiLevel::Good => "Good",
            AqiLevel::Moderate => "Moderate",
            AqiLevel::Poor => "Poor",
            AqiLevel::VeryPoor => "Very Poor",
            AqiLevel::Severe => "Severe",
        }
    }

    /// Parse a label back into a level.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.label() == label)
    }
}

impl fmt::Display for AqiLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Add the `AQI_Level` column to a table that carries `pm2_5`.
///
/// Recomputes every row; an existing `AQI_Level` column is replaced.
pub fn classify_table(df: &DataFrame, pm25_col: &str) -> PolarsResult<DataFrame> {
    let pm25 = df.column(pm25_col)?.cast(&DataType::Float64)?;
    let labels: Vec<Option<&'static str>> = pm25
        .f64()?
        .into_iter()
        .map(|v| v.map(|x| AqiLevel::from_pm25(x).label()))
        .collect();

    let mut out = df.clone();
    out.with_column(Column::new(AQI_LEVEL_COL.into(), labels))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_boundaries_belong_to_lower_bucket() {
        assert_eq!(AqiLevel::from_pm25(30.0), AqiLevel::Good);
        assert_eq!(AqiLevel::from_pm25(60.0), AqiLevel::Moderate);
        assert_eq!(AqiLevel::from_pm25(90.0), AqiLevel::Poor);
        assert_eq!(AqiLevel::from_pm25(120.0), AqiLevel::VeryPoor);
        assert_eq!(AqiLevel::from_pm25(120.0001), AqiLevel::Severe);
    }

    #[test]
    fn test_interior_values() {
        assert_eq!(AqiLevel::from_pm25(0.0), AqiLevel::Good);
        assert_eq!(AqiLevel::from_pm25(-5.0), AqiLevel::Good);
        assert_eq!(AqiLevel::from_pm25(30.5), AqiLevel::Moderate);
        assert_eq!(AqiLevel::from_pm25(75.0), AqiLevel::Poor);
        assert_eq!(AqiLevel::from_pm25(100.0), AqiLevel::VeryPoor);
        assert_eq!(AqiLevel::from_pm25(500.0), AqiLevel::Severe);
    }

    #[test]
    fn test_labels_round_trip() {
        for level in AqiLevel::ALL {
            assert_eq!(AqiLevel::from_label(level.label()), Some(level));
        }
        assert_eq!(AqiLevel::VeryPoor.to_string(), "Very Poor");
        assert_eq!(AqiLevel::from_label("Hazardous"), None);
    }

    #[test]
    fn test_classify_table_adds_column() {
        let df = DataFrame::new(vec![
            Column::new("city".into(), ["A", "B", "C"]),
            Column::new("pm2_5".into(), [12.0, 61.0, 130.0]),
        ])
        .unwrap();

        let out = classify_table(&df, "pm2_5").unwrap();
        let levels: Vec<Option<&str>> = out.column(AQI_LEVEL_COL).unwrap().str().unwrap().into_iter().collect();
        assert_eq!(levels, vec![Some("Good"), Some("Poor"), Some("Severe")]);
        assert_eq!(df.width(), 2);
    }

    proptest! {
        #[test]
        fn prop_classification_is_monotonic(a in -50.0..500.0f64, b in -50.0..500.0f64) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(AqiLevel::from_pm25(lo) <= AqiLevel::from_pm25(hi));
        }

        #[test]
        fn prop_every_reading_maps_to_a_level(x in proptest::num::f64::NORMAL) {
            let level = AqiLevel::from_pm25(x);
            prop_assert!(AqiLevel::ALL.contains(&level));
        }
    }
}
