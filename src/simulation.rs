//! The fixed-step driver. Each step asks the phase controller which regime
//! applies, integrates one Euler step under that regime's transmission rate,
//! and appends a row to the time series. The run ends when the infected count
//! falls below [`EXTINCTION_THRESHOLD`] or the step budget runs out.

use ixa::{info, trace};
use serde::Serialize;

use crate::{
    error::ModelError,
    parameters::Params,
    phase_controller::{Phase, PhaseController, TransitionEvent, TransitionObserver},
    sir_model::{SirModel, SirState},
};

/// Infected count, in people, below which the epidemic counts as eradicated.
pub const EXTINCTION_THRESHOLD: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeSeriesRow {
    pub time: f64,
    pub susceptible: f64,
    pub infected: f64,
    pub recovered: f64,
    pub phase: Phase,
}

/// Parallel, append-only columns, one entry per executed step. Entry `k`
/// holds the state carried into step `k` and the phase in force when that
/// step began, before its own decision. A switch made at step `k` therefore
/// first shows up in entry `k + 1`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimeSeries {
    pub time: Vec<f64>,
    pub susceptible: Vec<f64>,
    pub infected: Vec<f64>,
    pub recovered: Vec<f64>,
    pub phase: Vec<Phase>,
}

impl TimeSeries {
    fn push(&mut self, row: TimeSeriesRow) {
        self.time.push(row.time);
        self.susceptible.push(row.susceptible);
        self.infected.push(row.infected);
        self.recovered.push(row.recovered);
        self.phase.push(row.phase);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.time.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    #[must_use]
    pub fn row(&self, index: usize) -> Option<TimeSeriesRow> {
        Some(TimeSeriesRow {
            time: *self.time.get(index)?,
            susceptible: *self.susceptible.get(index)?,
            infected: *self.infected.get(index)?,
            recovered: *self.recovered.get(index)?,
            phase: *self.phase.get(index)?,
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = TimeSeriesRow> + '_ {
        (0..self.len()).filter_map(|index| self.row(index))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// The infected count fell below the extinction threshold at `time`.
    Extinction { time: f64 },
    /// All `floor(max_days / dt)` steps ran.
    StepBudgetExhausted,
}

/// What a single call to [`Simulation::advance`] produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepRecord {
    pub row: TimeSeriesRow,
    /// Phase the step was integrated under.
    pub phase: Phase,
    pub transition: Option<TransitionEvent>,
    pub next_state: SirState,
}

/// Everything a finished run hands to its consumers. Nothing downstream
/// mutates it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationResult {
    pub params: Params,
    pub series: TimeSeries,
    pub transitions: Vec<TransitionEvent>,
    /// State after the last executed step; not itself a row of `series`.
    pub final_state: SirState,
    pub final_time: f64,
    pub termination: Termination,
}

pub struct Simulation {
    params: Params,
    model: SirModel,
    controller: PhaseController,
    state: SirState,
    steps_taken: usize,
    step_budget: usize,
    series: TimeSeries,
    termination: Option<Termination>,
}

impl Simulation {
    /// # Errors
    /// `ModelError::InvalidParameters` if `params` fails validation.
    pub fn new(params: &Params) -> Result<Self, ModelError> {
        params.validate()?;
        let step_budget = params.step_budget();
        let termination = (step_budget == 0).then_some(Termination::StepBudgetExhausted);
        Ok(Simulation {
            params: params.clone(),
            model: SirModel::new(params.population, params.gamma, params.rates()),
            controller: PhaseController::new(params.thresholds(), params.timeouts()),
            state: params.initial_state(),
            steps_taken: 0,
            step_budget,
            series: TimeSeries::default(),
            termination,
        })
    }

    #[must_use]
    pub fn with_observer(mut self, observer: impl TransitionObserver + 'static) -> Self {
        self.controller.add_observer(observer);
        self
    }

    pub fn add_observer(&mut self, observer: impl TransitionObserver + 'static) {
        self.controller.add_observer(observer);
    }

    #[must_use]
    pub fn params(&self) -> &Params {
        &self.params
    }

    #[must_use]
    pub fn model(&self) -> &SirModel {
        &self.model
    }

    #[must_use]
    pub fn state(&self) -> SirState {
        self.state
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.controller.phase()
    }

    /// Time at the start of the next step.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn time(&self) -> f64 {
        self.steps_taken as f64 * self.params.dt
    }

    #[must_use]
    pub fn steps_taken(&self) -> usize {
        self.steps_taken
    }

    #[must_use]
    pub fn step_budget(&self) -> usize {
        self.step_budget
    }

    #[must_use]
    pub fn series(&self) -> &TimeSeries {
        &self.series
    }

    #[must_use]
    pub fn transitions(&self) -> &[TransitionEvent] {
        self.controller.transitions()
    }

    #[must_use]
    pub fn termination(&self) -> Option<Termination> {
        self.termination
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.termination.is_some()
    }

    /// Run one step: record the row, decide the phase from the infected count
    /// carried into the step, integrate under the decided phase, then check
    /// the stopping conditions. Returns `None` once the run has terminated.
    pub fn advance(&mut self) -> Option<StepRecord> {
        if self.is_finished() {
            return None;
        }

        let time = self.time();
        let row = TimeSeriesRow {
            time,
            susceptible: self.state.susceptible,
            infected: self.state.infected,
            recovered: self.state.recovered,
            phase: self.controller.phase(),
        };
        self.series.push(row);

        let recorded = self.controller.transitions().len();
        let phase = self.controller.decide(time, self.state.infected);
        let transition = self.controller.transitions().get(recorded).copied();

        self.state = self.model.step_in_phase(&self.state, phase, self.params.dt);
        self.steps_taken += 1;
        trace!(
            "Step {}: t = {:.2}, S = {:.3}, I = {:.3}, R = {:.3}, phase = {}",
            self.steps_taken,
            self.time(),
            self.state.susceptible,
            self.state.infected,
            self.state.recovered,
            phase
        );

        if self.state.infected < EXTINCTION_THRESHOLD {
            let time = self.time();
            info!(
                "Day {:.1}: epidemic extinguished ({:.1} infected)",
                time, self.state.infected
            );
            self.termination = Some(Termination::Extinction { time });
        } else if self.steps_taken >= self.step_budget {
            info!(
                "Day {:.1}: step budget of {} exhausted ({:.1} infected)",
                self.time(),
                self.step_budget,
                self.state.infected
            );
            self.termination = Some(Termination::StepBudgetExhausted);
        }

        Some(StepRecord {
            row,
            phase,
            transition,
            next_state: self.state,
        })
    }

    /// Advance until a stopping condition holds and hand over the results.
    #[must_use]
    pub fn run(mut self) -> SimulationResult {
        while self.advance().is_some() {}
        self.into_result()
    }

    /// Consume the simulation, keeping whatever has been computed so far.
    #[must_use]
    pub fn into_result(self) -> SimulationResult {
        let final_time = self.time();
        SimulationResult {
            termination: self
                .termination
                .unwrap_or(Termination::StepBudgetExhausted),
            final_state: self.state,
            final_time,
            transitions: self.controller.into_transitions(),
            series: self.series,
            params: self.params,
        }
    }
}
