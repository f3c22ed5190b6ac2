use ixa::{define_global_property, ContextGlobalPropertiesExt, IxaError};
use serde::{Deserialize, Serialize};

use crate::{
    error::ModelError,
    phase_controller::{PhaseTimeouts, Thresholds},
    reports::ReportParams,
    sir_model::{SirState, TransmissionRates},
};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Params {
    /// Total population `N`; constant for the whole run.
    pub population: f64,
    /// Infected count at time zero.
    pub initial_infected: f64,
    /// Recovered count at time zero. The remainder of the population starts susceptible.
    pub initial_recovered: f64,
    /// Transmission rate while the hammer (suppression) phase is in force.
    pub beta_hammer: f64,
    /// Transmission rate while the dance (mitigation) phase is in force.
    pub beta_dance: f64,
    /// Recovery rate, one over the mean infectious period in days.
    pub gamma: f64,
    /// Simulation horizon in days. The run takes at most `floor(max_days / dt)` steps.
    pub max_days: f64,
    /// Infected count above which a dance period switches to hammer.
    pub hammer_threshold: f64,
    /// Infected count below which a hammer period switches back to dance.
    pub dance_threshold: f64,
    /// Euler step size in days.
    pub dt: f64,
    /// Maximum length of a hammer period, only applied with `enforce_phase_timeouts`.
    pub hammer_duration: Option<f64>,
    /// Nominal length of a dance period. Reported, never enforced.
    pub dance_duration: Option<f64>,
    pub enforce_phase_timeouts: bool,
    pub time_series_report: ReportParams,
    pub transition_report: ReportParams,
    /// File name of the tab-delimited export, relative to the output directory.
    pub tab_delimited_export: Option<String>,
    /// File name of the HTML report, relative to the output directory.
    pub html_export: Option<String>,
}

impl Default for Params {
    fn default() -> Self {
        Params {
            population: 125_000_000.0,
            initial_infected: 194_323.0,
            initial_recovered: 20_000_000.0,
            beta_hammer: 0.142_857,
            beta_dance: 1.428_571,
            gamma: 0.142_857,
            max_days: 1095.0,
            hammer_threshold: 194_323.0,
            dance_threshold: 10_000.0,
            dt: 0.1,
            hammer_duration: None,
            dance_duration: None,
            enforce_phase_timeouts: false,
            time_series_report: ReportParams {
                write: true,
                name: Some("time_series".to_string()),
            },
            transition_report: ReportParams {
                write: true,
                name: Some("transitions".to_string()),
            },
            tab_delimited_export: Some("hammer_dance_data.txt".to_string()),
            html_export: Some("hammer_dance_graph.html".to_string()),
        }
    }
}

fn require(condition: bool, msg: &str) -> Result<(), ModelError> {
    if condition {
        Ok(())
    } else {
        Err(ModelError::invalid(msg))
    }
}

impl Params {
    /// Reject parameter sets that would run but produce meaningless output:
    /// negative or diverging compartments, or a controller that flips phase
    /// every step.
    ///
    /// # Errors
    /// `ModelError::InvalidParameters` naming the first violated constraint.
    pub fn validate(&self) -> Result<(), ModelError> {
        let scalars = [
            self.population,
            self.initial_infected,
            self.initial_recovered,
            self.beta_hammer,
            self.beta_dance,
            self.gamma,
            self.max_days,
            self.hammer_threshold,
            self.dance_threshold,
            self.dt,
        ];
        require(
            scalars.iter().all(|x| x.is_finite()),
            "All parameters must be finite numbers.",
        )?;
        require(self.population > 0.0, "The population must be positive.")?;
        require(
            self.initial_infected >= 0.0,
            "The initial infected count must be non-negative.",
        )?;
        require(
            self.initial_recovered >= 0.0,
            "The initial recovered count must be non-negative.",
        )?;
        require(
            self.initial_infected + self.initial_recovered <= self.population,
            "The initial infected and recovered counts must not exceed the population.",
        )?;
        require(
            self.beta_hammer > 0.0,
            "The hammer transmission rate must be positive.",
        )?;
        require(
            self.beta_dance > 0.0,
            "The dance transmission rate must be positive.",
        )?;
        require(self.gamma > 0.0, "The recovery rate must be positive.")?;
        require(
            self.max_days > 0.0,
            "The simulation horizon must be positive.",
        )?;
        require(self.dt > 0.0, "The time step must be positive.")?;
        require(
            self.dance_threshold >= 0.0,
            "The dance threshold must be non-negative.",
        )?;
        require(
            self.dance_threshold < self.hammer_threshold,
            "The dance threshold must be strictly below the hammer threshold.",
        )?;
        for duration in [self.hammer_duration, self.dance_duration]
            .into_iter()
            .flatten()
        {
            require(
                duration.is_finite() && duration > 0.0,
                "Phase durations must be positive when given.",
            )?;
        }
        Ok(())
    }

    #[must_use]
    pub fn initial_state(&self) -> SirState {
        SirState::new(
            self.population - self.initial_infected - self.initial_recovered,
            self.initial_infected,
            self.initial_recovered,
        )
    }

    #[must_use]
    pub fn rates(&self) -> TransmissionRates {
        TransmissionRates {
            hammer: self.beta_hammer,
            dance: self.beta_dance,
        }
    }

    #[must_use]
    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            hammer: self.hammer_threshold,
            dance: self.dance_threshold,
        }
    }

    #[must_use]
    pub fn timeouts(&self) -> PhaseTimeouts {
        PhaseTimeouts {
            hammer_duration: self.hammer_duration,
            dance_duration: self.dance_duration,
            enforce: self.enforce_phase_timeouts,
        }
    }

    /// Number of Euler steps that fit in the horizon, truncated.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn step_budget(&self) -> usize {
        (self.max_days / self.dt).floor() as usize
    }
}

fn validate_inputs(parameters: &Params) -> Result<(), IxaError> {
    parameters.validate().map_err(IxaError::from)
}

define_global_property!(GlobalParams, Params, validate_inputs);

pub trait ContextParametersExt {
    fn get_params(&self) -> &Params;
}

impl ContextParametersExt for ixa::Context {
    fn get_params(&self) -> &Params {
        self.get_global_property_value(GlobalParams)
            .expect("Expected GlobalParams to be set")
    }
}
