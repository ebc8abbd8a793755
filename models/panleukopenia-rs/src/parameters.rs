use fpv_sim::SimulationParameters;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// One stochastic run.
    #[default]
    Single,
    /// `num_simulations` stochastic runs, summarized per day.
    Ensemble,
    /// Expected-value trajectory without sampling.
    Deterministic,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelInput {
    #[serde(flatten)]
    pub parameters: SimulationParameters,
    #[serde(default)]
    pub mode: Mode,
}
