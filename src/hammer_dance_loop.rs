//! Drives a [`Simulation`] through an `ixa` [`Context`]: one plan per step at
//! `t = k * dt`, each plan advancing exactly one step, streaming its report
//! rows, and scheduling its successor. When the run terminates the finished
//! result is handed to the caller's hook and the context shuts down.

use std::path::PathBuf;

use ixa::{debug, Context, IxaError};

use crate::{
    exports,
    parameters::{ContextParametersExt, Params},
    phase_controller::LoggingObserver,
    reports::{self, time_series_report, transition_report},
    simulation::{Simulation, SimulationResult},
    summary::SimulationSummary,
};

type FinishHook = Box<dyn FnOnce(SimulationResult)>;

struct RunningSimulation {
    simulation: Simulation,
    population: f64,
    send_time_series: bool,
    send_transitions: bool,
    on_finish: FinishHook,
}

fn schedule_step(context: &mut Context, run: RunningSimulation) {
    let next_time = run.simulation.time();
    context.add_plan(next_time, move |context| {
        execute_step(context, run);
    });
}

fn execute_step(context: &mut Context, mut run: RunningSimulation) {
    if let Some(record) = run.simulation.advance() {
        if run.send_time_series {
            time_series_report::send_row(context, &record.row, run.population);
        }
        if let (true, Some(event)) = (run.send_transitions, record.transition) {
            transition_report::send_transition(context, &event);
        }
    }

    if run.simulation.is_finished() {
        let RunningSimulation {
            simulation,
            on_finish,
            ..
        } = run;
        debug!(
            "Simulation finished after {} of {} steps",
            simulation.steps_taken(),
            simulation.step_budget()
        );
        on_finish(simulation.into_result());
        context.shutdown();
    } else {
        schedule_step(context, run);
    }
}

/// Schedule the run described by the context's `GlobalParams`. Reports named
/// in the parameters are registered here, so report options (output
/// directory, overwrite) must already be set.
/// # Errors
/// - If the parameters fail validation.
/// - If a report cannot be added.
pub fn init(
    context: &mut Context,
    on_finish: impl FnOnce(SimulationResult) + 'static,
) -> Result<(), IxaError> {
    let params: Params = context.get_params().clone();
    let simulation = Simulation::new(&params)?.with_observer(LoggingObserver);

    reports::init(context)?;

    schedule_step(
        context,
        RunningSimulation {
            simulation,
            population: params.population,
            send_time_series: params.time_series_report.enabled_name().is_some(),
            send_transitions: params.transition_report.enabled_name().is_some(),
            on_finish: Box::new(on_finish),
        },
    );
    Ok(())
}

/// End-of-run hook used by the binary: log the summary, then write the
/// whole-run exports into `output_dir`. Export failures are logged only.
pub fn summarize_and_export(output_dir: PathBuf) -> impl FnOnce(SimulationResult) + 'static {
    move |result| {
        SimulationSummary::from_result(&result).log();
        let failures = exports::export_all(&result, &output_dir);
        if !failures.is_empty() {
            debug!("{} export(s) failed; simulation results are unaffected", failures.len());
        }
    }
}
