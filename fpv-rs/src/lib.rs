//! Stochastic spread of feline panleukopenia through a closed population.
//!
//! A run steps susceptible, exposed, incubating, infected and recovered cats
//! through one day at a time, drawing each transition from a binomial, while an
//! environmental virus reservoir decays and is replenished by shedding.
//! Ensembles of independent runs are summarized per day with [`aggregate`].

pub mod aggregate;
pub mod cancel;
pub mod ensemble;
pub mod error;
pub mod output;
pub mod parameters;
pub mod random;
pub mod sampling;
pub mod simulation;

pub use aggregate::{AggregatedDayStats, SummaryStats, aggregate};
pub use cancel::CancellationToken;
pub use ensemble::{run_ensemble, run_ensemble_cancellable};
pub use error::{EngineError, Result};
pub use output::{CompartmentSnapshot, SimulationRun};
pub use parameters::SimulationParameters;
pub use random::RandomStream;
pub use simulation::SpreadSimulator;

/// One stochastic run drawing from `rng`.
pub fn simulate(
    parameters: &SimulationParameters,
    rng: &mut RandomStream,
) -> Result<SimulationRun> {
    SpreadSimulator::simulate(parameters, rng)
}
