//! CSV Data Loader Module
//! Handles CSV loading, header normalization and cleaning using Polars.
//! The cleaned table is memoized by the SHA-256 fingerprint of the file content.

use super::fingerprint::fingerprint;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use log::{debug, info, warn};
use polars::prelude::*;
use std::collections::HashSet;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DATE_COL: &str = "date";
pub const CITY_COL: &str = "city";
pub const PM25_COL: &str = "pm2_5";

/// Recognized pollutant columns in canonical order.
pub const POLLUTANT_COLS: [&str; 6] = ["pm2_5", "pm10", "no2", "so2", "co", "o3"];

const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

// Month-first before day-first for ambiguous slashed dates.
const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d/%m/%Y", "%d-%m-%Y"];

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("The dataset does not contain a PM2.5 column.")]
    MissingPm25,
    #[error("The dataset does not contain a '{0}' column.")]
    MissingColumn(&'static str),
    #[error("No data loaded")]
    NoData,
}

struct CachedTable {
    fingerprint: String,
    path: PathBuf,
    df: DataFrame,
}

/// Loads and cleans the measurement table, reusing the last result while the
/// source content is unchanged.
#[derive(Default)]
pub struct DataLoader {
    cache: Option<CachedTable>,
    parse_count: usize,
}

impl DataLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a CSV file, returning the cached table when the content fingerprint matches.
    pub fn load(&mut self, path: &Path) -> Result<&DataFrame, LoaderError> {
        let bytes = std::fs::read(path).map_err(|source| LoaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let fp = fingerprint(&bytes);

        let hit = self
            .cache
            .as_ref()
            .is_some_and(|cached| cached.fingerprint == fp);
        if hit {
            debug!("Cache hit for {} ({})", path.display(), &fp[..12]);
            if let Some(cached) = self.cache.as_mut() {
                if cached.path != path {
                    debug!("Same content as {}", cached.path.display());
                    cached.path = path.to_path_buf();
                }
            }
        } else {
            self.cache = None;
            let df = clean_table(read_csv_bytes(bytes)?)?;
            self.parse_count += 1;
            info!(
                "Loaded {} ({}): {} rows, {} columns (parse #{})",
                path.display(),
                &fp[..12],
                df.height(),
                df.width(),
                self.parse_count
            );
            self.cache = Some(CachedTable {
                fingerprint: fp,
                path: path.to_path_buf(),
                df,
            });
        }

        self.cache
            .as_ref()
            .map(|cached| &cached.df)
            .ok_or(LoaderError::NoData)
    }

    /// Get a reference to the cached table.
    pub fn get_dataframe(&self) -> Option<&DataFrame> {
        self.cache.as_ref().map(|c| &c.df)
    }

    /// Path of the most recent successful load.
    #[cfg(test)]
    pub fn get_file_path(&self) -> Option<&Path> {
        self.cache.as_ref().map(|c| c.path.as_path())
    }

    /// Fingerprint of the cached content.
    #[cfg(test)]
    pub fn get_fingerprint(&self) -> Option<&str> {
        self.cache.as_ref().map(|c| c.fingerprint.as_str())
    }

    /// Number of times a source was actually parsed (cache misses).
    #[cfg(test)]
    pub fn parse_count(&self) -> usize {
        self.parse_count
    }
}

/// Parse raw CSV bytes into an uncleaned DataFrame.
pub fn read_csv_bytes(bytes: Vec<u8>) -> Result<DataFrame, LoaderError> {
    let df = CsvReadOptions::default()
        .with_infer_schema_length(Some(10000))
        .with_ignore_errors(true)
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()?;
    Ok(df)
}

/// Normalize a header: trim, lowercase, replace `.` with `_`.
pub fn normalize_column_name(name: &str) -> String {
    name.trim().to_lowercase().replace('.', "_")
}

/// Rename every column to its normalized form. Later duplicates are dropped.
fn normalize_columns(df: &DataFrame) -> PolarsResult<DataFrame> {
    let mut seen = HashSet::new();
    let mut columns = Vec::with_capacity(df.width());

    for column in df.get_columns() {
        let name = normalize_column_name(column.name().as_str());
        if !seen.insert(name.clone()) {
            warn!(
                "Dropping column '{}': normalizes to duplicate '{}'",
                column.name(),
                name
            );
            continue;
        }
        columns.push(column.clone().with_name(name.into()));
    }

    DataFrame::new(columns)
}

/// Parse a single date value, trying the accepted formats in order.
pub fn parse_timestamp_millis(raw: &str) -> Option<i64> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.timestamp_millis());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt.and_utc().timestamp_millis());
        }
    }
    DATE_FORMATS.iter().find_map(|fmt| {
        NaiveDate::parse_from_str(value, fmt)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc().timestamp_millis())
    })
}

/// Convert any date column into `Datetime(ms)`; unparseable values become null.
fn parse_date_column(column: &Column) -> PolarsResult<Column> {
    let text = column.cast(&DataType::String)?;
    let millis: Vec<Option<i64>> = text
        .str()?
        .into_iter()
        .map(|v| v.and_then(parse_timestamp_millis))
        .collect();

    Column::new(DATE_COL.into(), millis).cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
}

/// Cast a pollutant column to floats. Non-numeric and non-finite cells (`NaN`, `inf`) become null.
fn finite_readings(column: &Column) -> PolarsResult<Vec<Option<f64>>> {
    let numeric = column.cast(&DataType::Float64)?;
    Ok(numeric
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| x.is_finite()))
        .collect())
}

/// Normalize headers, type the known columns and drop rows without PM2.5.
pub fn clean_table(raw: DataFrame) -> Result<DataFrame, LoaderError> {
    let mut df = normalize_columns(&raw)?;

    if df.column(PM25_COL).is_err() {
        return Err(LoaderError::MissingPm25);
    }
    for required in [CITY_COL, DATE_COL] {
        if df.column(required).is_err() {
            return Err(LoaderError::MissingColumn(required));
        }
    }

    let date = parse_date_column(df.column(DATE_COL)?)?;
    let unparsed = date.null_count();
    if unparsed > 0 {
        debug!("{} date values could not be parsed", unparsed);
    }
    df.with_column(date)?;

    let city = df.column(CITY_COL)?.cast(&DataType::String)?;
    df.with_column(city)?;

    for pollutant in POLLUTANT_COLS {
        let Ok(column) = df.column(pollutant) else {
            continue;
        };
        let readings = finite_readings(column)?;
        df.with_column(Column::new(pollutant.into(), readings))?;
    }

    let before = df.height();
    let cleaned = df.lazy().filter(col(PM25_COL).is_not_null()).collect()?;
    let dropped = before - cleaned.height();
    if dropped > 0 {
        info!("Dropped {} rows without a PM2.5 reading", dropped);
    }

    Ok(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_normalize_column_name() {
        assert_eq!(normalize_column_name("PM2.5"), "pm2_5");
        assert_eq!(normalize_column_name(" pm2.5 "), "pm2_5");
        assert_eq!(normalize_column_name("pm2_5"), "pm2_5");
        assert_eq!(normalize_column_name("  City"), "city");
    }

    #[test]
    fn test_headers_normalized_on_load() {
        let file = write_csv("Date , CITY,PM2.5,NO2\n2024-01-01,Delhi,80,20\n");
        let mut loader = DataLoader::new();
        let df = loader.load(file.path()).unwrap();

        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(names, vec!["date", "city", "pm2_5", "no2"]);
    }

    #[test]
    fn test_missing_pm25_is_fatal() {
        let file = write_csv("date,city,pm10\n2024-01-01,Delhi,80\n");
        let mut loader = DataLoader::new();
        let err = loader.load(file.path()).unwrap_err();
        assert!(matches!(err, LoaderError::MissingPm25));
        assert!(loader.get_dataframe().is_none());
    }

    #[test]
    fn test_missing_city_is_fatal() {
        let file = write_csv("date,pm2_5\n2024-01-01,80\n");
        let err = DataLoader::new().load(file.path()).unwrap_err();
        assert!(matches!(err, LoaderError::MissingColumn("city")));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = DataLoader::new()
            .load(Path::new("/nonexistent/air_quality_data.csv"))
            .unwrap_err();
        assert!(matches!(err, LoaderError::Io { .. }));
    }

    #[test]
    fn test_rows_without_pm25_dropped() {
        let mut csv = String::from("date,city,pm2_5\n");
        for i in 0..10 {
            let value = if i % 3 == 0 && i < 9 {
                String::new()
            } else {
                format!("{}", 10 + i)
            };
            csv.push_str(&format!("2024-01-{:02},Delhi,{}\n", i + 1, value));
        }
        let file = write_csv(&csv);
        let mut loader = DataLoader::new();
        let df = loader.load(file.path()).unwrap();

        assert_eq!(df.height(), 7);
        assert_eq!(df.column(PM25_COL).unwrap().null_count(), 0);
    }

    #[test]
    fn test_unparseable_dates_become_null() {
        let file = write_csv(
            "date,city,pm2_5\n2024-01-01,Delhi,10\nnot a date,Delhi,20\n2024-01-03 06:30:00,Delhi,30\n",
        );
        let mut loader = DataLoader::new();
        let df = loader.load(file.path()).unwrap();

        assert_eq!(df.height(), 3);
        let date = df.column(DATE_COL).unwrap();
        assert!(matches!(date.dtype(), DataType::Datetime(TimeUnit::Milliseconds, _)));
        assert_eq!(date.null_count(), 1);
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let day = parse_timestamp_millis("2024-01-02").unwrap();
        assert_eq!(day, 1_704_153_600_000);
        assert_eq!(parse_timestamp_millis("2024/01/02"), Some(day));
        assert_eq!(parse_timestamp_millis("01/02/2024"), Some(day));
        assert_eq!(parse_timestamp_millis("2024-01-02T00:00:00"), Some(day));
        assert_eq!(parse_timestamp_millis("2024-01-02T00:00:00Z"), Some(day));
        assert_eq!(parse_timestamp_millis("25/12/2024"), parse_timestamp_millis("2024-12-25"));
        assert_eq!(parse_timestamp_millis(""), None);
        assert_eq!(parse_timestamp_millis("yesterday"), None);
    }

    #[test]
    fn test_non_numeric_pollutant_cells_become_null() {
        let file = write_csv("date,city,pm2_5,so2\n2024-01-01,Delhi,10,n/a\n2024-01-02,Delhi,12,4.5\n");
        let mut loader = DataLoader::new();
        let df = loader.load(file.path()).unwrap();

        let so2 = df.column("so2").unwrap();
        assert_eq!(so2.dtype(), &DataType::Float64);
        assert_eq!(so2.null_count(), 1);
    }

    #[test]
    fn test_nan_readings_treated_as_missing() {
        let file = write_csv(
            "date,city,pm2_5,no2\n\
             2024-01-01,A,10,1\n\
             2024-01-02,A,NaN,2\n\
             2024-01-03,A,20,NaN\n\
             2024-01-04,A,NA,3\n",
        );
        let mut loader = DataLoader::new();
        let df = loader.load(file.path()).unwrap();

        assert_eq!(df.height(), 2);
        let pm25: Vec<Option<f64>> = df.column(PM25_COL).unwrap().f64().unwrap().into_iter().collect();
        assert_eq!(pm25, vec![Some(10.0), Some(20.0)]);
        let no2: Vec<Option<f64>> = df.column("no2").unwrap().f64().unwrap().into_iter().collect();
        assert_eq!(no2, vec![Some(1.0), None]);
    }

    #[test]
    fn test_infinite_readings_become_null() {
        let file = write_csv(
            "date,city,pm2_5,co\n\
             2024-01-01,A,12,inf\n\
             2024-01-02,A,inf,2\n\
             2024-01-03,A,14,-inf\n\
             2024-01-04,A,16,3\n",
        );
        let mut loader = DataLoader::new();
        let df = loader.load(file.path()).unwrap();

        assert_eq!(df.height(), 3);
        let co = df.column("co").unwrap();
        assert_eq!(co.dtype(), &DataType::Float64);
        assert_eq!(co.null_count(), 2);
        assert!(df
            .column(PM25_COL)
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .all(|v| v.is_some_and(f64::is_finite)));
    }

    #[test]
    fn test_cache_reused_for_same_content() {
        let content = "date,city,pm2_5\n2024-01-01,Delhi,10\n";
        let first = write_csv(content);
        let second = write_csv(content);
        let mut loader = DataLoader::new();

        loader.load(first.path()).unwrap();
        loader.load(first.path()).unwrap();
        loader.load(second.path()).unwrap();

        assert_eq!(loader.parse_count(), 1);
        assert_eq!(loader.get_file_path(), Some(second.path()));
    }

    #[test]
    fn test_cache_invalidated_on_content_change() {
        let mut file = write_csv("date,city,pm2_5\n2024-01-01,Delhi,10\n");
        let mut loader = DataLoader::new();
        assert_eq!(loader.load(file.path()).unwrap().height(), 1);
        let before = loader.get_fingerprint().map(str::to_string);

        file.write_all(b"2024-01-02,Delhi,20\n").unwrap();
        file.flush().unwrap();

        assert_eq!(loader.load(file.path()).unwrap().height(), 2);
        assert_eq!(loader.parse_count(), 2);
        assert_ne!(loader.get_fingerprint().map(str::to_string), before);
    }
}
