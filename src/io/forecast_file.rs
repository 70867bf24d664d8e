//! Read/write forecast JSON files.
//!
//! A forecast file is the "portable" representation of a run:
//! - the config it was produced with
//! - fitted parameters (trend, changepoints, Fourier coefficients)
//! - the history it was fitted on and the predicted frame
//!
//! The schema is defined by `domain::ForecastFile`.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use tracing::info;

use crate::app::pipeline::ForecastRun;
use crate::domain::ForecastFile;
use crate::error::AppError;

/// Write a forecast JSON file.
pub fn write_forecast_json(path: &Path, run: &ForecastRun, source: &Path) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create forecast JSON '{}': {e}", path.display())))?;

    let out = ForecastFile {
        tool: "salesdash".to_string(),
        source: source.to_path_buf(),
        config: run.config.clone(),
        model: run.model.clone(),
        history: run.history.clone(),
        forecast: run.forecast.clone(),
    };

    serde_json::to_writer_pretty(BufWriter::new(file), &out)
        .map_err(|e| AppError::new(4, format!("Failed to write forecast JSON: {e}")))?;

    info!(path = %path.display(), "exported forecast JSON");
    Ok(())
}

/// Read a forecast JSON file.
pub fn read_forecast_json(path: &Path) -> Result<ForecastFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open forecast JSON '{}': {e}", path.display())))?;
    let parsed: ForecastFile = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| AppError::new(2, format!("Invalid forecast JSON: {e}")))?;
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::run_forecast;
    use crate::domain::ForecastConfig;
    use crate::query::testing::table;

    #[test]
    fn written_file_reads_back() {
        let t = table(&[
            ("Furniture", "Chairs", "2016-01-01", 10.0, 1.0),
            ("Furniture", "Chairs", "2016-01-02", 12.0, 1.0),
            ("Furniture", "Chairs", "2016-01-03", 11.0, 1.0),
            ("Furniture", "Chairs", "2016-01-04", 15.0, 1.0),
        ]);
        let config = ForecastConfig {
            uncertainty_samples: 10,
            ..ForecastConfig::default()
        };
        let run = run_forecast(&t, &config).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forecast.json");
        write_forecast_json(&path, &run, &t.source).unwrap();

        let back = read_forecast_json(&path).unwrap();
        assert_eq!(back.tool, "salesdash");
        assert_eq!(back.history.len(), 4);
        assert_eq!(back.forecast.len(), 4 + 365);
        assert_eq!(back.config.years, 1);
        assert_eq!(back.model.changepoints.len(), run.model.changepoints.len());
    }

    #[test]
    fn garbage_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{not json").unwrap();
        assert_eq!(read_forecast_json(&path).unwrap_err().exit_code(), 2);
    }
}
