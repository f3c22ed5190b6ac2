use ixa::{
    create_report_trait,
    report::{ContextReportExt, Report},
    Context, IxaError,
};
use serde::{Deserialize, Serialize};

use crate::{phase_controller::Phase, simulation::TimeSeriesRow};

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct TimeSeriesReport {
    pub t: f64,
    pub susceptible: f64,
    pub infected: f64,
    pub recovered: f64,
    pub phase: Phase,
    pub s_ratio: f64,
    pub i_ratio: f64,
    pub r_ratio: f64,
}

create_report_trait!(TimeSeriesReport);

impl TimeSeriesReport {
    #[must_use]
    pub fn from_row(row: &TimeSeriesRow, population: f64) -> Self {
        TimeSeriesReport {
            t: row.time,
            susceptible: row.susceptible,
            infected: row.infected,
            recovered: row.recovered,
            phase: row.phase,
            s_ratio: row.susceptible / population,
            i_ratio: row.infected / population,
            r_ratio: row.recovered / population,
        }
    }
}

pub fn send_row(context: &mut Context, row: &TimeSeriesRow, population: f64) {
    context.send_report(TimeSeriesReport::from_row(row, population));
}

/// # Errors
///
/// Will return `IxaError` if the report cannot be added
pub fn init(context: &mut Context, file_name: &str) -> Result<(), IxaError> {
    context.add_report::<TimeSeriesReport>(file_name)?;
    Ok(())
}
