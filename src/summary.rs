use ixa::info;
use serde::Serialize;

use crate::{
    phase_controller::{Phase, TransitionKind},
    simulation::{SimulationResult, Termination},
    sir_model::SirState,
};

/// Headline numbers for one finished run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationSummary {
    pub population: f64,
    pub peak_infected: f64,
    pub peak_time: f64,
    pub final_state: SirState,
    pub final_time: f64,
    pub termination: Termination,
    /// Share of the population that left the susceptible compartment.
    pub attack_rate: f64,
    /// Share of the population recovered by the end of the run.
    pub recovered_share: f64,
    pub dance_to_hammer: usize,
    pub hammer_to_dance_threshold: usize,
    pub hammer_to_dance_timeout: usize,
    pub days_in_hammer: f64,
    pub days_in_dance: f64,
}

impl SimulationSummary {
    #[must_use]
    pub fn from_result(result: &SimulationResult) -> Self {
        let population = result.params.population;
        let dt = result.params.dt;

        // The post-run state competes for the peak too, so a run that is
        // still growing at the horizon reports its true maximum.
        let (peak_time, peak_infected) = result
            .series
            .time
            .iter()
            .copied()
            .zip(result.series.infected.iter().copied())
            .chain(std::iter::once((
                result.final_time,
                result.final_state.infected,
            )))
            .fold((0.0, f64::NEG_INFINITY), |best, candidate| {
                if candidate.1 > best.1 {
                    candidate
                } else {
                    best
                }
            });

        let count = |kind: TransitionKind| {
            result
                .transitions
                .iter()
                .filter(|event| event.kind == kind)
                .count()
        };

        #[allow(clippy::cast_precision_loss)]
        // Each row counts toward the phase it is labelled with.
        let days_in = |phase: Phase| {
            result.series.phase.iter().filter(|&&p| p == phase).count() as f64 * dt
        };

        SimulationSummary {
            population,
            peak_infected,
            peak_time,
            final_state: result.final_state,
            final_time: result.final_time,
            termination: result.termination,
            attack_rate: (population - result.final_state.susceptible) / population,
            recovered_share: result.final_state.recovered / population,
            dance_to_hammer: count(TransitionKind::DanceToHammer),
            hammer_to_dance_threshold: count(TransitionKind::HammerToDanceThreshold),
            hammer_to_dance_timeout: count(TransitionKind::HammerToDanceTimeout),
            days_in_hammer: days_in(Phase::Hammer),
            days_in_dance: days_in(Phase::Dance),
        }
    }

    #[must_use]
    pub fn ratio(&self, count: f64) -> f64 {
        count / self.population
    }

    pub fn log(&self) {
        let SirState {
            susceptible,
            infected,
            recovered,
        } = self.final_state;
        info!("=== Hammer & Dance simulation summary ===");
        info!(
            "Peak infected: {:.1} ({:.4}) on day {:.1}",
            self.peak_infected,
            self.ratio(self.peak_infected),
            self.peak_time
        );
        info!(
            "Final state at day {:.1}: S = {:.1} ({:.4}), I = {:.1} ({:.6}), R = {:.1} ({:.4})",
            self.final_time,
            susceptible,
            self.ratio(susceptible),
            infected,
            self.ratio(infected),
            recovered,
            self.ratio(recovered)
        );
        info!(
            "Attack rate: {:.2}%, recovered share: {:.2}%",
            self.attack_rate * 100.0,
            self.recovered_share * 100.0
        );
        info!(
            "Transitions: {} dance->hammer, {} hammer->dance (threshold), {} hammer->dance (timeout)",
            self.dance_to_hammer, self.hammer_to_dance_threshold, self.hammer_to_dance_timeout
        );
        info!(
            "Days in hammer: {:.1}, days in dance: {:.1}",
            self.days_in_hammer, self.days_in_dance
        );
        match self.termination {
            Termination::Extinction { time } => info!("Epidemic extinguished on day {time:.1}"),
            Termination::StepBudgetExhausted => info!("Simulation horizon reached"),
        }
    }
}
