use std::path::Path;

use csv::WriterBuilder;

use crate::{error::ModelError, simulation::SimulationResult};

const HEADER: [&str; 5] = ["time", "susceptible", "infected", "recovered", "phase"];

/// Write the time series as tab-separated text, one decimal place per value,
/// for pasting into a spreadsheet.
/// # Errors
/// - If the file cannot be created or written.
pub fn write(result: &SimulationResult, path: &Path) -> Result<(), ModelError> {
    let mut writer = WriterBuilder::new().delimiter(b'\t').from_path(path)?;
    writer.write_record(HEADER)?;
    for row in result.series.rows() {
        writer.write_record([
            format!("{:.1}", row.time),
            format!("{:.1}", row.susceptible),
            format!("{:.1}", row.infected),
            format!("{:.1}", row.recovered),
            row.phase.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
