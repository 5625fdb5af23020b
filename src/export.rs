//! CSV export of generated forecast sets

use crate::engine::DailyForecast;
use crate::error::Result;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Write a forecast set as CSV with the columns
/// `date,location,new_cases_pred,new_deaths_pred,countries_reporting_pred`
pub fn write_csv<W: Write>(writer: W, forecasts: &[DailyForecast]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);

    for forecast in forecasts {
        writer.serialize(forecast)?;
    }
    writer.flush()?;

    Ok(())
}

/// Write one year's forecast set to `<dir>/prediction_<year>.csv`,
/// creating the directory if needed, and return the file path
pub fn export_year<P: AsRef<Path>>(
    dir: P,
    year: i32,
    forecasts: &[DailyForecast],
) -> Result<PathBuf> {
    std::fs::create_dir_all(&dir)?;
    let path = dir.as_ref().join(format!("prediction_{}.csv", year));

    let file = File::create(&path)?;
    write_csv(file, forecasts)?;

    Ok(path)
}
