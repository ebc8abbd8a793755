use tracing::debug;

use crate::{
    error::Result,
    output::{CompartmentSnapshot, SimulationRun},
    parameters::SimulationParameters,
    random::RandomStream,
    sampling::{binomial, progression_probability},
};

const KITTEN_MORTALITY: f64 = 0.9;
const UNVACCINATED_MORTALITY: f64 = 0.85;
const UNVACCINATED_TREATED_MORTALITY: f64 = 0.5;
const VACCINATED_MORTALITY: f64 = 0.15;
const VACCINATED_TREATED_MORTALITY: f64 = 0.1;

const DECAY_JITTER: f64 = 0.1;
const SHEDDING_JITTER: f64 = 0.2;

// Expected-value model only.
const EXPOSED_DAYS: f64 = 2.0;
const INCUBATING_DAYS: f64 = 4.0;

/// Compartment counts carried between days. Signed so an update can overshoot
/// below zero before the floor is applied.
#[derive(Debug, Clone, Copy)]
struct SpreadState {
    susceptible: i64,
    exposed: i64,
    incubating: i64,
    infected: i64,
    recovered: i64,
    deaths: i64,
    environmental_virus: f64,
}

/// Transitions drawn for a single day.
#[derive(Debug, Default, Clone, Copy)]
struct DailyTransitions {
    new_exposures: i64,
    newly_incubating: i64,
    newly_infected: i64,
    new_deaths: i64,
    new_recoveries: i64,
    reinfections: i64,
}

impl SpreadState {
    /// Expects validated parameters, so both counts fit in `i64`.
    fn initial(parameters: &SimulationParameters) -> Self {
        Self {
            susceptible: parameters.population as i64 - parameters.initial_infected as i64,
            exposed: 0,
            incubating: 0,
            infected: parameters.initial_infected as i64,
            recovered: 0,
            deaths: 0,
            environmental_virus: 0.0,
        }
    }

    fn living(&self) -> i64 {
        self.susceptible + self.exposed + self.incubating + self.infected + self.recovered
    }

    fn snapshot(&self, day: u32) -> CompartmentSnapshot {
        CompartmentSnapshot {
            day,
            susceptible: self.susceptible.max(0) as u64,
            exposed: self.exposed.max(0) as u64,
            incubating: self.incubating.max(0) as u64,
            infected: self.infected.max(0) as u64,
            recovered: self.recovered.max(0) as u64,
            deaths: self.deaths.max(0) as u64,
            environmental_virus: self.environmental_virus.max(0.0),
        }
    }

    fn apply(&mut self, t: &DailyTransitions) {
        self.susceptible -= t.new_exposures;
        self.exposed += t.new_exposures - t.newly_incubating;
        self.incubating += t.newly_incubating - t.newly_infected;
        self.infected += t.newly_infected + t.reinfections - t.new_recoveries - t.new_deaths;
        self.recovered += t.new_recoveries - t.reinfections;
        self.deaths += t.new_deaths;
    }

    /// Floors each compartment independently. Totals are not renormalized, so
    /// the population is only approximately conserved.
    fn floor(&mut self) {
        self.susceptible = self.susceptible.max(0);
        self.exposed = self.exposed.max(0);
        self.incubating = self.incubating.max(0);
        self.infected = self.infected.max(0);
        self.recovered = self.recovered.max(0);
        self.deaths = self.deaths.max(0);
        self.environmental_virus = self.environmental_virus.max(0.0);
    }

    fn sample_transitions(
        &self,
        parameters: &SimulationParameters,
        rng: &mut RandomStream,
    ) -> DailyTransitions {
        let population = parameters.population as f64;
        let susceptible = self.susceptible as f64;
        let infected = self.infected as f64;

        let direct = binomial(
            rng,
            susceptible,
            parameters.transmission_rate * infected / population,
        );
        let environmental = binomial(
            rng,
            susceptible,
            parameters.environmental_transmission_rate * self.environmental_virus / population,
        );
        let new_exposures = self.susceptible.min((direct + environmental) as i64);

        let p_incubate = progression_probability(rng);
        let newly_incubating = binomial(rng, self.exposed as f64, p_incubate) as i64;
        let p_infect = progression_probability(rng);
        let newly_infected = binomial(rng, self.incubating as f64, p_infect) as i64;

        let (unvaccinated_rate, vaccinated_rate) = mortality_rates(parameters);
        let adults = infected * (1.0 - parameters.kitten_percentage);
        let kitten_deaths =
            binomial(rng, infected * parameters.kitten_percentage, KITTEN_MORTALITY);
        let unvaccinated_deaths = binomial(
            rng,
            adults * (1.0 - parameters.vaccinated_percentage),
            unvaccinated_rate,
        );
        let vaccinated_deaths = binomial(
            rng,
            adults * parameters.vaccinated_percentage,
            vaccinated_rate,
        );

        let new_recoveries = binomial(rng, infected, parameters.recovery_rate) as i64;
        let reinfections = binomial(rng, self.recovered as f64, parameters.reinfection_rate) as i64;

        DailyTransitions {
            new_exposures,
            newly_incubating,
            newly_infected,
            new_deaths: (kitten_deaths + unvaccinated_deaths + vaccinated_deaths) as i64,
            new_recoveries,
            reinfections,
        }
    }

    fn expected_transitions(&self, parameters: &SimulationParameters) -> DailyTransitions {
        let population = parameters.population as f64;
        let susceptible = self.susceptible as f64;
        let infected = self.infected as f64;

        let direct =
            round_half_up(infected * susceptible * parameters.transmission_rate / population);
        let environmental = round_half_up(
            susceptible
                * self.environmental_virus
                * parameters.environmental_transmission_rate
                / population,
        );

        let (unvaccinated_rate, vaccinated_rate) = mortality_rates(parameters);
        let adults = infected * (1.0 - parameters.kitten_percentage);
        let new_deaths = round_half_up(infected * parameters.kitten_percentage * KITTEN_MORTALITY)
            + round_half_up(adults * (1.0 - parameters.vaccinated_percentage) * unvaccinated_rate)
            + round_half_up(adults * parameters.vaccinated_percentage * vaccinated_rate);

        DailyTransitions {
            new_exposures: self.susceptible.min(direct + environmental),
            newly_incubating: round_half_up(self.exposed as f64 / EXPOSED_DAYS),
            newly_infected: round_half_up(self.incubating as f64 / INCUBATING_DAYS),
            new_deaths,
            new_recoveries: round_half_up(infected * parameters.recovery_rate),
            reinfections: round_half_up(self.recovered as f64 * parameters.reinfection_rate),
        }
    }
}

fn mortality_rates(parameters: &SimulationParameters) -> (f64, f64) {
    if parameters.treatment_enabled() {
        (UNVACCINATED_TREATED_MORTALITY, VACCINATED_TREATED_MORTALITY)
    } else {
        (UNVACCINATED_MORTALITY, VACCINATED_MORTALITY)
    }
}

fn round_half_up(x: f64) -> i64 {
    (x + 0.5).floor() as i64
}

/// Multiplies `rate` by a uniform factor in `[1 - spread/2, 1 + spread/2)`.
fn jitter(rng: &mut RandomStream, rate: f64, spread: f64) -> f64 {
    rate * (1.0 + (rng.uniform() - 0.5) * spread)
}

pub struct SpreadSimulator {}

impl SpreadSimulator {
    /// Runs the stochastic model for up to `simulation_days` days.
    pub fn simulate(
        parameters: &SimulationParameters,
        rng: &mut RandomStream,
    ) -> Result<SimulationRun> {
        parameters.validate()?;
        let days = parameters.simulation_days;
        let mut state = SpreadState::initial(parameters);
        let mut run = SimulationRun::with_capacity(days as usize + 1);
        run.push(state.snapshot(0));

        for day in 1..=days {
            if state.living() == 0 {
                debug!(day, "all cats died, stopping run");
                break;
            }
            let transitions = state.sample_transitions(parameters, rng);
            state.apply(&transitions);
            state.floor();

            let decay = jitter(rng, parameters.virus_decay_rate, DECAY_JITTER);
            let shedding = jitter(rng, parameters.shedding_rate, SHEDDING_JITTER);
            state.environmental_virus =
                (state.environmental_virus * (1.0 - decay) + state.infected as f64 * shedding)
                    .max(0.0);

            run.push(state.snapshot(day));
        }
        Ok(run)
    }

    /// Expected-value trajectory with every transition rounded and no sampling.
    /// The virus load is updated from the unfloored infected count.
    pub fn simulate_deterministic(parameters: &SimulationParameters) -> Result<SimulationRun> {
        parameters.validate()?;
        let days = parameters.simulation_days;
        let mut state = SpreadState::initial(parameters);
        let mut run = SimulationRun::with_capacity(days as usize + 1);
        run.push(state.snapshot(0));

        for day in 1..=days {
            if state.living() == 0 {
                debug!(day, "all cats died, stopping run");
                break;
            }
            let transitions = state.expected_transitions(parameters);
            state.apply(&transitions);
            state.environmental_virus = state.environmental_virus
                * (1.0 - parameters.virus_decay_rate)
                + state.infected as f64 * parameters.shedding_rate;
            state.floor();

            run.push(state.snapshot(day));
        }
        Ok(run)
    }
}
