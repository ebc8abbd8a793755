use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

fn default_num_simulations() -> usize {
    100
}

/// Inputs shared by every run of a simulation. Rates are nominally in `[0, 1]`
/// but are not checked; out-of-range derived probabilities simply sample zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationParameters {
    pub population: u64,
    #[serde(alias = "initialInfected")]
    pub initial_infected: u64,
    #[serde(alias = "transmissionRate")]
    pub transmission_rate: f64,
    #[serde(alias = "recoveryRate")]
    pub recovery_rate: f64,
    #[serde(alias = "reinfectionRate")]
    pub reinfection_rate: f64,
    #[serde(alias = "kittenPercentage")]
    pub kitten_percentage: f64,
    #[serde(alias = "vaccinatedPercentage")]
    pub vaccinated_percentage: f64,
    #[serde(alias = "treatmentPercentage")]
    pub treatment_percentage: f64,
    #[serde(alias = "sheddingRate")]
    pub shedding_rate: f64,
    #[serde(alias = "environmentalTransmissionRate")]
    pub environmental_transmission_rate: f64,
    #[serde(alias = "virusDecayRate")]
    pub virus_decay_rate: f64,
    #[serde(alias = "simulationDays")]
    pub simulation_days: u32,
    #[serde(alias = "numSimulations", default = "default_num_simulations")]
    pub num_simulations: usize,
}

impl SimulationParameters {
    /// Treatment is an on/off switch: any non-zero value enables it.
    pub fn treatment_enabled(&self) -> bool {
        self.treatment_percentage != 0.0 && !self.treatment_percentage.is_nan()
    }

    pub fn initial_susceptible(&self) -> u64 {
        self.population.saturating_sub(self.initial_infected)
    }

    pub fn validate(&self) -> Result<()> {
        if self.population == 0 {
            return Err(EngineError::invalid("population", "must be greater than zero"));
        }
        if i64::try_from(self.population).is_err() {
            return Err(EngineError::invalid(
                "population",
                format!("{} does not fit a signed 64-bit count", self.population),
            ));
        }
        if self.initial_infected > self.population {
            return Err(EngineError::invalid(
                "initial_infected",
                format!(
                    "{} exceeds population {}",
                    self.initial_infected, self.population
                ),
            ));
        }
        Ok(())
    }
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            population: 100,
            initial_infected: 5,
            transmission_rate: 0.3,
            recovery_rate: 0.1,
            reinfection_rate: 0.01,
            kitten_percentage: 0.2,
            vaccinated_percentage: 0.5,
            treatment_percentage: 0.0,
            shedding_rate: 0.5,
            environmental_transmission_rate: 0.1,
            virus_decay_rate: 0.2,
            simulation_days: 60,
            num_simulations: default_num_simulations(),
        }
    }
}
