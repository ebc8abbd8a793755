use rayon::prelude::*;
use tracing::{info, warn};

use crate::{
    cancel::CancellationToken,
    error::{EngineError, Result},
    output::SimulationRun,
    parameters::SimulationParameters,
    random::RandomStream,
    simulation::SpreadSimulator,
};

/// Runs the model `num_simulations` times in parallel. Replicate `i` draws from
/// `RandomStream::for_replicate(seed, i)`, so the result does not depend on the
/// thread count and is returned in replicate order.
pub fn run_ensemble(
    parameters: &SimulationParameters,
    num_simulations: usize,
    seed: u64,
) -> Result<Vec<SimulationRun>> {
    run_ensemble_cancellable(parameters, num_simulations, seed, &CancellationToken::new())
}

/// Like [`run_ensemble`], but runs not yet started when `token` is cancelled are
/// skipped and the call fails with [`EngineError::Cancelled`].
pub fn run_ensemble_cancellable(
    parameters: &SimulationParameters,
    num_simulations: usize,
    seed: u64,
    token: &CancellationToken,
) -> Result<Vec<SimulationRun>> {
    parameters.validate()?;
    info!(
        runs = num_simulations,
        days = parameters.simulation_days,
        seed,
        "starting ensemble"
    );

    let results: Vec<Option<Result<SimulationRun>>> = (0..num_simulations)
        .into_par_iter()
        .map(|replicate| {
            if token.is_cancelled() {
                return None;
            }
            let mut rng = RandomStream::for_replicate(seed, replicate as u64);
            Some(SpreadSimulator::simulate(parameters, &mut rng))
        })
        .collect();

    let completed = results.iter().filter(|r| r.is_some()).count();
    if completed < num_simulations {
        warn!(completed, requested = num_simulations, "ensemble cancelled");
        return Err(EngineError::Cancelled {
            completed,
            requested: num_simulations,
        });
    }

    let runs = results.into_iter().flatten().collect::<Result<Vec<_>>>()?;
    let extinct = runs.iter().filter(|run| run.extinction_day().is_some()).count();
    info!(runs = runs.len(), extinct, "ensemble finished");
    Ok(runs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensemble_size_and_independence() {
        let parameters = SimulationParameters {
            population: 200,
            initial_infected: 10,
            simulation_days: 40,
            ..Default::default()
        };
        let runs = run_ensemble(&parameters, 20, 8675309).unwrap();
        assert_eq!(runs.len(), 20);
        assert!(runs.iter().all(|run| run.get(0) == runs[0].get(0)));
        let distinct = runs.iter().filter(|run| *run != &runs[0]).count();
        assert!(distinct > 0);
    }

    #[test]
    fn test_ensemble_reproducible_and_ordered() {
        let parameters = SimulationParameters::default();
        let a = run_ensemble(&parameters, 8, 42).unwrap();
        let b = run_ensemble(&parameters, 8, 42).unwrap();
        assert_eq!(a, b);
        for (replicate, run) in a.iter().enumerate() {
            let mut rng = RandomStream::for_replicate(42, replicate as u64);
            assert_eq!(run, &SpreadSimulator::simulate(&parameters, &mut rng).unwrap());
        }
    }

    #[test]
    fn test_early_terminated_runs_kept_unmodified() {
        // All infected kittens, nothing else happening: each run ends once they die.
        let parameters = SimulationParameters {
            population: 3,
            initial_infected: 3,
            transmission_rate: 0.0,
            recovery_rate: 0.0,
            reinfection_rate: 0.0,
            kitten_percentage: 1.0,
            vaccinated_percentage: 0.0,
            treatment_percentage: 0.0,
            shedding_rate: 0.0,
            environmental_transmission_rate: 0.0,
            virus_decay_rate: 0.0,
            simulation_days: 30,
            num_simulations: 50,
        };
        let runs = run_ensemble(&parameters, 50, 2024).unwrap();
        assert_eq!(runs.len(), 50);

        let mut lengths: Vec<usize> = runs.iter().map(SimulationRun::len).collect();
        lengths.sort_unstable();
        lengths.dedup();
        assert!(lengths.len() > 1);
        assert!(lengths[0] < 31);

        for (replicate, run) in runs.iter().enumerate() {
            let mut rng = RandomStream::for_replicate(2024, replicate as u64);
            assert_eq!(run, &SpreadSimulator::simulate(&parameters, &mut rng).unwrap());
            if run.len() < 31 {
                assert!(run.extinction_day().is_some());
            }
        }
    }

    #[test]
    fn test_empty_ensemble() {
        let runs = run_ensemble(&SimulationParameters::default(), 0, 1).unwrap();
        assert!(runs.is_empty());
    }

    #[test]
    fn test_cancelled_before_start() {
        let token = CancellationToken::new();
        token.cancel();
        let result = run_ensemble_cancellable(&SimulationParameters::default(), 5, 1, &token);
        assert_eq!(
            result,
            Err(EngineError::Cancelled {
                completed: 0,
                requested: 5
            })
        );
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        let parameters = SimulationParameters {
            population: 0,
            initial_infected: 0,
            ..Default::default()
        };
        assert!(run_ensemble(&parameters, 3, 0).is_err());
    }
}
