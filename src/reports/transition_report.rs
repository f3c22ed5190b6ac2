use ixa::{
    create_report_trait,
    report::{ContextReportExt, Report},
    Context, IxaError,
};
use serde::{Deserialize, Serialize};

use crate::phase_controller::{TransitionEvent, TransitionKind};

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct TransitionReport {
    pub t: f64,
    pub kind: TransitionKind,
    pub infected: f64,
}

create_report_trait!(TransitionReport);

pub fn send_transition(context: &mut Context, event: &TransitionEvent) {
    context.send_report(TransitionReport {
        t: event.time,
        kind: event.kind,
        infected: event.infected,
    });
}

/// # Errors
///
/// Will return `IxaError` if the report cannot be added
pub fn init(context: &mut Context, file_name: &str) -> Result<(), IxaError> {
    context.add_report::<TransitionReport>(file_name)?;
    Ok(())
}
