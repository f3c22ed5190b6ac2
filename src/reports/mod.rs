use ixa::{info, Context, IxaError};
use serde::{Deserialize, Serialize};

use crate::parameters::{ContextParametersExt, Params};

pub mod time_series_report;
pub mod transition_report;

/// Switch and file name for one streamed report.
#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct ReportParams {
    pub write: bool,
    pub name: Option<String>,
}

impl ReportParams {
    /// The report name to register, if this report should be written.
    #[must_use]
    pub fn enabled_name(&self) -> Option<&str> {
        if self.write {
            self.name.as_deref()
        } else {
            None
        }
    }
}

/// Register the reports requested in the parameters. Must run before the
/// first step plan executes.
/// # Errors
/// - If a report cannot be added to the context (e.g. its file exists and
///   overwriting is disabled).
pub fn init(context: &mut Context) -> Result<(), IxaError> {
    let Params {
        time_series_report,
        transition_report,
        ..
    } = context.get_params().clone();

    match time_series_report.enabled_name() {
        Some(name) => time_series_report::init(context, name)?,
        None => info!("No time series report requested. Skipping time series report creation"),
    }
    match transition_report.enabled_name() {
        Some(name) => transition_report::init(context, name)?,
        None => info!("No transition report requested. Skipping transition report creation"),
    }
    Ok(())
}
