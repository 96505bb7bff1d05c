//! CSV ingest and validation.
//!
//! Turns a delimited `x,y` file into a clean list of observations that are safe
//! to fit.
//!
//! - **Strict schema**: `x` and `y` columns are required, extra columns ignored
//! - **Strict rows**: the first empty, non-numeric or non-finite value aborts the
//!   load with its line number (a partially read curve would bias the fit)
//! - **Order preserving**: observations keep file order, which index pairing relies on

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use csv::StringRecord;

use crate::domain::Observation;
use crate::error::AppError;
use crate::math::min_max;

/// Default minimum number of rows a fit needs.
pub const DEFAULT_MIN_ROWS: usize = 10;

/// Options controlling how the input file is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestOptions {
    pub delimiter: u8,
    pub min_rows: usize,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            min_rows: DEFAULT_MIN_ROWS,
        }
    }
}

/// Summary stats about the loaded points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatasetStats {
    pub n_points: usize,
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

/// Ingest output: validated observations + stats.
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub observations: Vec<Observation>,
    pub stats: DatasetStats,
    pub rows_read: usize,
}

/// Load and validate observations from a delimited file.
pub fn load_observations(path: &Path, opts: &IngestOptions) -> Result<LoadedData, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::input(format!("Failed to open data file '{}': {e}", path.display())))?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(opts.delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::input(format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let x_idx = require_column(&header_map, "x")?;
    let y_idx = require_column(&header_map, "y")?;

    let mut observations = Vec::new();
    for result in reader.records() {
        // Blank lines are skipped and quoted fields may span lines, so ask the
        // reader where the record started instead of counting records.
        let record = result.map_err(|e| match e.position() {
            Some(pos) => AppError::input(format!("Line {}: CSV parse error: {e}", pos.line())),
            None => AppError::input(format!("CSV parse error: {e}")),
        })?;
        let line = record.position().map_or(0, |pos| pos.line());
        let x = parse_value(&record, x_idx, "x", line)?;
        let y = parse_value(&record, y_idx, "y", line)?;
        observations.push(Observation::new(x, y));
    }

    let rows_read = observations.len();
    if rows_read < opts.min_rows {
        return Err(AppError::data(format!(
            "Insufficient data: {rows_read} rows (minimum {} required).",
            opts.min_rows
        )));
    }

    let stats = compute_stats(&observations)
        .ok_or_else(|| AppError::data("No valid observations in data file."))?;

    Ok(LoadedData {
        observations,
        stats,
        rows_read,
    })
}

/// Summary stats over the observations, `None` if empty.
pub fn compute_stats(observations: &[Observation]) -> Option<DatasetStats> {
    let (x_min, x_max) = min_max(observations.iter().map(|o| o.x))?;
    let (y_min, y_max) = min_max(observations.iter().map(|o| o.y))?;
    Some(DatasetStats {
        n_points: observations.len(),
        x_min,
        x_max,
        y_min,
        y_max,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    name.trim().trim_start_matches('\u{feff}').to_ascii_lowercase()
}

fn require_column(header_map: &HashMap<String, usize>, name: &str) -> Result<usize, AppError> {
    header_map
        .get(name)
        .copied()
        .ok_or_else(|| AppError::input(format!("CSV must contain 'x' and 'y' columns (missing `{name}`).")))
}

fn parse_value(record: &StringRecord, idx: usize, name: &str, line: u64) -> Result<f64, AppError> {
    let raw = record
        .get(idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::input(format!("Line {line}: missing value for `{name}`.")))?;
    let v: f64 = raw
        .parse()
        .map_err(|_| AppError::input(format!("Line {line}: invalid number '{raw}' for `{name}`.")))?;
    if !v.is_finite() {
        return Err(AppError::input(format!("Line {line}: non-finite value '{raw}' for `{name}`.")));
    }
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("pcfit-ingest-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn rows(n: usize) -> String {
        (0..n).map(|i| format!("{},{}\n", 60.0 + i as f64, 45.0 + i as f64 * 0.5)).collect()
    }

    #[test]
    fn loads_valid_file_in_order() {
        let path = write_temp("valid.csv", &format!("x,y\n{}", rows(12)));
        let data = load_observations(&path, &IngestOptions::default()).unwrap();
        assert_eq!(data.rows_read, 12);
        assert_eq!(data.observations[0], Observation::new(60.0, 45.0));
        assert_eq!(data.observations[11], Observation::new(71.0, 50.5));
        assert_eq!(data.stats.x_min, 60.0);
        assert_eq!(data.stats.y_max, 50.5);
    }

    #[test]
    fn accepts_bom_extra_columns_and_custom_delimiter() {
        let body: String = (0..10).map(|i| format!("{i};{}.5;note\n", i * 2)).collect();
        let path = write_temp("semi.csv", &format!("\u{feff}X;Y;comment\n{body}"));
        let opts = IngestOptions {
            delimiter: b';',
            ..IngestOptions::default()
        };
        let data = load_observations(&path, &opts).unwrap();
        assert_eq!(data.observations.len(), 10);
        assert_eq!(data.observations[3], Observation::new(3.0, 6.5));
    }

    #[test]
    fn missing_column_is_an_input_error() {
        let path = write_temp("nocol.csv", "x,z\n1,2\n");
        let err = load_observations(&path, &IngestOptions::default()).unwrap_err();
        assert_eq!(err.exit_code(), AppError::INPUT);
        assert!(err.message().contains("`y`"));
    }

    #[test]
    fn empty_and_nan_values_report_the_line() {
        let path = write_temp("empty.csv", &format!("x,y\n{}1.0,\n", rows(10)));
        let err = load_observations(&path, &IngestOptions::default()).unwrap_err();
        assert!(err.message().starts_with("Line 12:"), "{}", err.message());

        let path = write_temp("nan.csv", &format!("x,y\nNaN,1.0\n{}", rows(10)));
        let err = load_observations(&path, &IngestOptions::default()).unwrap_err();
        assert_eq!(err.exit_code(), AppError::INPUT);
        assert!(err.message().starts_with("Line 2:"), "{}", err.message());
    }

    #[test]
    fn line_numbers_count_blank_lines() {
        let path = write_temp("blank.csv", &format!("x,y\n\n{}abc,1\n", rows(10)));
        let err = load_observations(&path, &IngestOptions::default()).unwrap_err();
        assert!(err.message().starts_with("Line 13:"), "{}", err.message());
        assert!(err.message().contains("'abc'"));
    }

    #[test]
    fn multi_line_quoted_fields_shift_later_lines() {
        let path = write_temp(
            "quoted.csv",
            &format!("x,y,note\n1,2,\"two\nlines\"\n{}NaN,1\n", rows(10)),
        );
        let err = load_observations(&path, &IngestOptions::default()).unwrap_err();
        assert!(err.message().starts_with("Line 14:"), "{}", err.message());
    }

    #[test]
    fn too_few_rows_is_a_data_error() {
        let path = write_temp("short.csv", &format!("x,y\n{}", rows(5)));
        let err = load_observations(&path, &IngestOptions::default()).unwrap_err();
        assert_eq!(err.exit_code(), AppError::DATA);
    }

    #[test]
    fn missing_file_is_an_input_error() {
        let err = load_observations(Path::new("/definitely/not/here.csv"), &IngestOptions::default())
            .unwrap_err();
        assert_eq!(err.exit_code(), AppError::INPUT);
        assert!(err.message().contains("/definitely/not/here.csv"));
    }
}
