// Re-export commonly used types at the crate root
pub use error::ModelError;
pub use parameters::{ContextParametersExt, GlobalParams, Params};
pub use phase_controller::{
    LoggingObserver, Phase, PhaseController, PhaseTimeouts, Thresholds, TransitionEvent,
    TransitionKind, TransitionObserver,
};
pub use simulation::{
    Simulation, SimulationResult, Termination, TimeSeries, TimeSeriesRow, EXTINCTION_THRESHOLD,
};
pub use sir_model::{SirModel, SirState, TransmissionRates};
pub use summary::SimulationSummary;

pub mod error;
pub mod exports;
pub mod hammer_dance_loop;
pub mod parameters;
pub mod phase_controller;
pub mod reports;
pub mod simulation;
pub mod sir_model;
pub mod summary;
