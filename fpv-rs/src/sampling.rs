//! Count samplers built on [`RandomStream`].

use crate::random::RandomStream;

/// Above this many trials the binomial is drawn from its normal approximation.
pub const EXACT_TRIAL_LIMIT: f64 = 1_000_000.0;

const INCUBATION_MEAN_DAYS: f64 = 3.0;
const INCUBATION_STD_DEV_DAYS: f64 = 1.0;

/// Rounds an expected sub-population size to a whole number of trials.
pub fn trial_count(n: f64) -> u64 {
    n.round() as u64
}

/// Draws the number of successes in `n` trials at probability `p`.
///
/// `n` may be fractional (an expected group size) and is rounded to the nearest
/// whole trial count. Negative `n`, `p` outside `[0, 1]`, or non-finite inputs
/// return 0 rather than an error; callers rely on this to zero out degenerate
/// derived probabilities.
pub fn binomial(rng: &mut RandomStream, n: f64, p: f64) -> u64 {
    if !(n.is_finite() && p.is_finite()) || n < 0.0 || p < 0.0 || p > 1.0 {
        return 0;
    }
    if n > EXACT_TRIAL_LIMIT {
        let mean = n * p;
        let std_dev = (n * p * (1.0 - p)).sqrt();
        return rng.normal(mean, std_dev).round().max(0.0) as u64;
    }
    match trial_count(n) {
        0 => 0,
        trials => rng.binomial_successes(trials, p),
    }
}

/// Length of an incubation period in whole days, at least one.
pub fn incubation_period_days(rng: &mut RandomStream) -> u32 {
    rng.normal(INCUBATION_MEAN_DAYS, INCUBATION_STD_DEV_DAYS)
        .round()
        .max(1.0) as u32
}

/// Per-day probability of leaving an incubation stage, from a fresh period draw.
pub fn progression_probability(rng: &mut RandomStream) -> f64 {
    1.0 / f64::from(incubation_period_days(rng))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degenerate_inputs_return_zero() {
        let mut rng = RandomStream::new(11);
        for p in [0.0, 0.3, 1.0] {
            assert_eq!(binomial(&mut rng, -1.0, p), 0);
            assert_eq!(binomial(&mut rng, -5_000_000.0, p), 0);
        }
        for n in [0.0, 10.0, 2_000_000.0] {
            assert_eq!(binomial(&mut rng, n, -0.1), 0);
            assert_eq!(binomial(&mut rng, n, 1.1), 0);
            assert_eq!(binomial(&mut rng, n, f64::NAN), 0);
        }
        assert_eq!(binomial(&mut rng, f64::INFINITY, 0.5), 0);
    }

    #[test]
    fn test_zero_trials() {
        let mut rng = RandomStream::new(12);
        for p in [0.0, 0.5, 1.0] {
            assert_eq!(binomial(&mut rng, 0.0, p), 0);
        }
        // rounds down to zero trials
        assert_eq!(binomial(&mut rng, 0.4, 1.0), 0);
    }

    #[test]
    fn test_fractional_trials_round_to_nearest() {
        let mut rng = RandomStream::new(13);
        assert_eq!(binomial(&mut rng, 4.6, 1.0), 5);
        assert_eq!(binomial(&mut rng, 4.4, 1.0), 4);
        assert_eq!(binomial(&mut rng, 2.5, 1.0), 3);
    }

    #[test]
    fn test_exact_path_mean() {
        let n_samples = 2000;
        let mut total = 0;
        for seed in 0..n_samples {
            let mut rng = RandomStream::new(seed);
            let k = binomial(&mut rng, 100.0, 0.3);
            assert!(k <= 100);
            total += k;
        }
        let mean = total as f64 / n_samples as f64;
        assert!(f64::abs(mean - 30.0) < 0.5);
    }

    #[test]
    fn test_normal_approximation_path() {
        let mut rng = RandomStream::new(14);
        let n = 4_000_000.0;
        let k = binomial(&mut rng, n, 0.5) as f64;
        // sd = 1000
        assert!(f64::abs(k - 2_000_000.0) < 6000.0);
        assert_eq!(binomial(&mut rng, n, 0.0), 0);
        assert_eq!(binomial(&mut rng, n, 1.0), 4_000_000);
    }

    #[test]
    fn test_exact_trial_limit_boundary() {
        let (p, limit) = (0.3, EXACT_TRIAL_LIMIT);
        for seed in 0..20 {
            // exactly at the limit: one exact binomial draw
            let exact = binomial(&mut RandomStream::new(seed), limit, p);
            let expected = RandomStream::new(seed).binomial_successes(1_000_000, p);
            assert_eq!(exact, expected);

            // just above it: rounded normal draw
            let n = limit + 0.5;
            let approx = binomial(&mut RandomStream::new(seed), n, p);
            let expected = RandomStream::new(seed)
                .normal(n * p, (n * p * (1.0 - p)).sqrt())
                .round()
                .max(0.0) as u64;
            assert_eq!(approx, expected);
        }

        let mut rng = RandomStream::new(20);
        assert_eq!(binomial(&mut rng, limit, 1.0), 1_000_000);
        assert_eq!(binomial(&mut rng, limit + 0.5, 1.0), 1_000_001);
    }

    #[test]
    fn test_incubation_period_at_least_one_day() {
        let mut rng = RandomStream::new(15);
        let draws: Vec<u32> = (0..10_000).map(|_| incubation_period_days(&mut rng)).collect();
        assert!(draws.iter().all(|&d| d >= 1));
        let mean = draws.iter().map(|&d| f64::from(d)).sum::<f64>() / draws.len() as f64;
        assert!(f64::abs(mean - 3.0) < 0.1);
    }

    #[test]
    fn test_progression_probability_range() {
        let mut rng = RandomStream::new(16);
        for _ in 0..1000 {
            let p = progression_probability(&mut rng);
            assert!(p > 0.0 && p <= 1.0);
        }
    }
}
