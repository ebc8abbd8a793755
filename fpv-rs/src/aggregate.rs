//! Cross-run statistics for Monte Carlo ensembles.

use serde::Serialize;

use crate::output::{CompartmentSnapshot, SimulationRun};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SummaryStats {
    pub min: f64,
    pub max: f64,
    /// Element at `len / 2` of the sorted values: the upper median for even counts.
    pub median: f64,
    pub mean: f64,
}

impl SummaryStats {
    /// Summarizes `values`, sorting them in place. Empty input gives all zeros.
    pub fn from_values(values: &mut [f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        values.sort_by(f64::total_cmp);
        Self {
            min: values[0],
            max: values[values.len() - 1],
            median: values[values.len() / 2],
            mean,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedDayStats {
    pub day: u32,
    pub susceptible: SummaryStats,
    pub exposed: SummaryStats,
    pub incubating: SummaryStats,
    pub infected: SummaryStats,
    pub recovered: SummaryStats,
    pub deaths: SummaryStats,
    pub environmental_virus: SummaryStats,
}

fn field_stats(
    values: &mut [f64],
    snapshots: &[CompartmentSnapshot],
    field: fn(&CompartmentSnapshot) -> f64,
) -> SummaryStats {
    for (value, snapshot) in values.iter_mut().zip(snapshots) {
        *value = field(snapshot);
    }
    SummaryStats::from_values(values)
}

/// Per-day statistics over `runs`. Days past the end of a shorter run count
/// that run as all zeros.
pub fn aggregate(runs: &[SimulationRun]) -> Vec<AggregatedDayStats> {
    let max_len = runs.iter().map(SimulationRun::len).max().unwrap_or(0);
    let mut values = vec![0.0; runs.len()];

    (0..max_len)
        .map(|day| {
            let snapshots: Vec<CompartmentSnapshot> = runs
                .iter()
                .map(|run| {
                    run.get(day)
                        .copied()
                        .unwrap_or_else(|| CompartmentSnapshot::extinct(day as u32))
                })
                .collect();

            let mut summarize = |field: fn(&CompartmentSnapshot) -> f64| {
                field_stats(&mut values, &snapshots, field)
            };

            AggregatedDayStats {
                day: day as u32,
                susceptible: summarize(|s| s.susceptible as f64),
                exposed: summarize(|s| s.exposed as f64),
                incubating: summarize(|s| s.incubating as f64),
                infected: summarize(|s| s.infected as f64),
                recovered: summarize(|s| s.recovered as f64),
                deaths: summarize(|s| s.deaths as f64),
                environmental_virus: summarize(|s| s.environmental_virus),
            }
        })
        .collect()
}
