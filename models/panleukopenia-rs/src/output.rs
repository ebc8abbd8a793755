use fpv_sim::{AggregatedDayStats, SimulationParameters, SimulationRun, SummaryStats};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::parameters::Mode;

pub const RUN_HEADERS: [&str; 8] = [
    "day",
    "susceptible",
    "exposed",
    "incubating",
    "infected",
    "recovered",
    "deaths",
    "environmental_virus",
];

const STATS: [&str; 4] = ["min", "max", "median", "mean"];

pub fn run_rows(run: &SimulationRun) -> Vec<Vec<String>> {
    run.iter()
        .map(|s| {
            vec![
                s.day.to_string(),
                s.susceptible.to_string(),
                s.exposed.to_string(),
                s.incubating.to_string(),
                s.infected.to_string(),
                s.recovered.to_string(),
                s.deaths.to_string(),
                format!("{:.2}", s.environmental_virus),
            ]
        })
        .collect()
}

pub fn summary_headers() -> Vec<String> {
    let mut headers = vec!["day".to_string()];
    for field in &RUN_HEADERS[1..] {
        for stat in STATS {
            headers.push(format!("{field}_{stat}"));
        }
    }
    headers
}

pub fn summary_rows(stats: &[AggregatedDayStats]) -> Vec<Vec<String>> {
    stats
        .iter()
        .map(|day| {
            let mut row = vec![day.day.to_string()];
            for field in [
                &day.susceptible,
                &day.exposed,
                &day.incubating,
                &day.infected,
                &day.recovered,
                &day.deaths,
                &day.environmental_virus,
            ] {
                row.extend(format_stats(field));
            }
            row
        })
        .collect()
}

fn format_stats(stats: &SummaryStats) -> [String; 4] {
    [stats.min, stats.max, stats.median, stats.mean].map(|v| format!("{v:.2}"))
}

/// Hex SHA-256 of the serialized parameters followed by the little-endian seed.
pub fn fingerprint(parameters: &SimulationParameters, seed: u64) -> String {
    let mut hasher = Sha256::new();
    // Serializing plain numeric fields cannot fail
    if let Ok(bytes) = serde_json::to_vec(parameters) {
        hasher.update(&bytes);
    }
    hasher.update(seed.to_le_bytes());
    hex::encode(hasher.finalize())
}

#[derive(Debug, Serialize)]
pub struct RunManifest {
    pub mode: Mode,
    pub seed: u64,
    pub replicate: u64,
    pub runs: usize,
    pub extinct_runs: usize,
    pub fingerprint: String,
}

impl RunManifest {
    pub fn new(
        mode: Mode,
        parameters: &SimulationParameters,
        seed: u64,
        replicate: u64,
        runs: &[SimulationRun],
    ) -> Self {
        Self {
            mode,
            seed,
            replicate,
            runs: runs.len(),
            extinct_runs: runs
                .iter()
                .filter(|run| run.extinction_day().is_some())
                .count(),
            fingerprint: fingerprint(parameters, seed),
        }
    }
}
