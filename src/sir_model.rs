use serde::{Deserialize, Serialize};

use crate::phase_controller::Phase;

/// Absolute compartment counts at one instant. `S + I + R` stays equal to the
/// population up to the rounding error of the Euler steps that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SirState {
    pub susceptible: f64,
    pub infected: f64,
    pub recovered: f64,
}

impl SirState {
    #[must_use]
    pub fn new(susceptible: f64, infected: f64, recovered: f64) -> Self {
        SirState {
            susceptible,
            infected,
            recovered,
        }
    }

    #[must_use]
    pub fn total(&self) -> f64 {
        self.susceptible + self.infected + self.recovered
    }
}

/// Time derivatives of each compartment, in people per day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Derivatives {
    pub d_susceptible: f64,
    pub d_infected: f64,
    pub d_recovered: f64,
}

/// The two transmission regimes the controller switches between.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransmissionRates {
    pub hammer: f64,
    pub dance: f64,
}

impl TransmissionRates {
    #[must_use]
    pub fn for_phase(&self, phase: Phase) -> f64 {
        match phase {
            Phase::Hammer => self.hammer,
            Phase::Dance => self.dance,
        }
    }
}

/// Deterministic SIR dynamics for a closed population of size `population`,
/// advanced with explicit forward Euler.
///
/// The model does not clamp compartments: near extinction an Euler step can
/// overshoot zero slightly, which is accepted as approximation error.
#[derive(Debug, Clone, PartialEq)]
pub struct SirModel {
    population: f64,
    gamma: f64,
    rates: TransmissionRates,
}

impl SirModel {
    /// Parameters are checked by `Params::validate` before a model is built;
    /// the model itself assumes `population > 0`.
    #[must_use]
    pub fn new(population: f64, gamma: f64, rates: TransmissionRates) -> Self {
        SirModel {
            population,
            gamma,
            rates,
        }
    }

    #[must_use]
    pub fn population(&self) -> f64 {
        self.population
    }

    #[must_use]
    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    #[must_use]
    pub fn rates(&self) -> TransmissionRates {
        self.rates
    }

    /// Mass-action rate law evaluated on the normalized fractions `s = S/N`
    /// and `i = I/N`, then rescaled to absolute counts.
    #[must_use]
    pub fn derivatives(&self, state: &SirState, beta: f64) -> Derivatives {
        let n = self.population;
        let s = state.susceptible / n;
        let i = state.infected / n;

        let new_infections = beta * s * i;
        let recoveries = self.gamma * i;

        Derivatives {
            d_susceptible: -new_infections * n,
            d_infected: (new_infections - recoveries) * n,
            d_recovered: recoveries * n,
        }
    }

    /// One explicit Euler step of size `dt` under transmission rate `beta`.
    #[must_use]
    pub fn step(&self, state: &SirState, beta: f64, dt: f64) -> SirState {
        let Derivatives {
            d_susceptible,
            d_infected,
            d_recovered,
        } = self.derivatives(state, beta);
        SirState {
            susceptible: state.susceptible + d_susceptible * dt,
            infected: state.infected + d_infected * dt,
            recovered: state.recovered + d_recovered * dt,
        }
    }

    /// Euler step using the rate that belongs to `phase`.
    #[must_use]
    pub fn step_in_phase(&self, state: &SirState, phase: Phase, dt: f64) -> SirState {
        self.step(state, self.rates.for_phase(phase), dt)
    }
}

#[cfg(test)]
mod test {
    use statrs::assert_almost_eq;

    use super::{SirModel, SirState, TransmissionRates};
    use crate::phase_controller::Phase;

    fn model(population: f64, gamma: f64) -> SirModel {
        SirModel::new(
            population,
            gamma,
            TransmissionRates {
                hammer: 0.1,
                dance: 0.5,
            },
        )
    }

    #[test]
    fn test_derivatives_by_substitution() {
        // s = 0.9, i = 0.09: beta * s * i = 0.0405, gamma * i = 0.009
        let model = model(10_000.0, 0.1);
        let state = SirState::new(9000.0, 900.0, 100.0);
        let d = model.derivatives(&state, 0.5);
        assert_almost_eq!(d.d_susceptible, -405.0, 1e-9);
        assert_almost_eq!(d.d_infected, 315.0, 1e-9);
        assert_almost_eq!(d.d_recovered, 90.0, 1e-9);
    }

    #[test]
    fn test_derivatives_match_simplified_rate_law() {
        let model = model(1000.0, 0.2);
        let state = SirState::new(700.0, 250.0, 50.0);
        let beta = 0.37;
        let d = model.derivatives(&state, beta);
        let expected = beta * 700.0 * 250.0 / 1000.0;
        assert_almost_eq!(d.d_susceptible, -expected, 1e-9);
        assert_almost_eq!(d.d_infected, expected - 0.2 * 250.0, 1e-9);
        assert_almost_eq!(d.d_recovered, 0.2 * 250.0, 1e-9);
    }

    #[test]
    fn test_derivatives_sum_to_zero() {
        let model = model(5000.0, 0.25);
        let state = SirState::new(4000.0, 600.0, 400.0);
        let d = model.derivatives(&state, 1.3);
        assert_almost_eq!(d.d_susceptible + d.d_infected + d.d_recovered, 0.0, 1e-9);
    }

    #[test]
    fn test_no_infected_means_no_change() {
        let model = model(1000.0, 0.1);
        let state = SirState::new(990.0, 0.0, 10.0);
        let next = model.step(&state, 0.5, 1.0);
        assert_eq!(next, state);
    }

    #[test]
    fn test_euler_step() {
        let model = model(1000.0, 0.1);
        let state = SirState::new(990.0, 10.0, 0.0);
        // dS = -0.5 * 990 * 10 / 1000 = -4.95, dI = 4.95 - 1.0, dR = 1.0
        let next = model.step(&state, 0.5, 1.0);
        assert_almost_eq!(next.susceptible, 985.05, 1e-9);
        assert_almost_eq!(next.infected, 13.95, 1e-9);
        assert_almost_eq!(next.recovered, 1.0, 1e-9);

        let half = model.step(&state, 0.5, 0.5);
        assert_almost_eq!(half.susceptible, 987.525, 1e-9);
        assert_almost_eq!(half.infected, 11.975, 1e-9);
        assert_almost_eq!(half.recovered, 0.5, 1e-9);
    }

    #[test]
    fn test_step_in_phase_selects_rate() {
        let model = model(1000.0, 0.1);
        let state = SirState::new(990.0, 10.0, 0.0);
        assert_eq!(
            model.step_in_phase(&state, Phase::Hammer, 1.0),
            model.step(&state, 0.1, 1.0)
        );
        assert_eq!(
            model.step_in_phase(&state, Phase::Dance, 1.0),
            model.step(&state, 0.5, 1.0)
        );
    }

    #[test]
    fn test_overshoot_is_not_clamped() {
        // gamma * dt > 1 drives I below zero in one step.
        let model = model(1000.0, 2.0);
        let state = SirState::new(999.0, 1.0, 0.0);
        let next = model.step(&state, 0.0001, 1.0);
        assert!(next.infected < 0.0);
    }
}
