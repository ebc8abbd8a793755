use rand::{Rng, SeedableRng, rngs::StdRng};
use rand_distr::{Binomial, Distribution};

const STREAM_SPACING: u64 = 0x9E37_79B9_7F4A_7C15;

/// A seeded source of randomness. Every sampling call takes one explicitly, so
/// each Monte Carlo replicate can own an independent stream.
#[derive(Debug, Clone)]
pub struct RandomStream {
    rng: StdRng,
}

impl RandomStream {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Independent stream for replicate `replicate` of an ensemble seeded with `seed`.
    pub fn for_replicate(seed: u64, replicate: u64) -> Self {
        Self::new(seed.wrapping_add(replicate.wrapping_mul(STREAM_SPACING)))
    }

    /// Uniform draw in `[0, 1)`.
    pub fn uniform(&mut self) -> f64 {
        self.rng.random::<f64>()
    }

    /// Box-Muller normal draw.
    pub fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        if !(std_dev.is_finite() && std_dev >= 0.0) {
            return mean;
        }
        // 1 - [0, 1) lies in (0, 1], keeping ln(u) finite
        let u = 1.0 - self.uniform();
        let v = self.uniform();
        let z = (-2.0 * u.ln()).sqrt() * (2.0 * std::f64::consts::PI * v).cos();
        z * std_dev + mean
    }

    /// Number of successes in `trials` independent Bernoulli(`p`) draws, sampled
    /// exactly from the binomial distribution. `p` outside `[0, 1]` yields zero.
    pub fn binomial_successes(&mut self, trials: u64, p: f64) -> u64 {
        Binomial::new(trials, p)
            .map(|binomial| binomial.sample(&mut self.rng))
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_range() {
        let mut rng = RandomStream::new(7);
        for _ in 0..10_000 {
            let u = rng.uniform();
            assert!((0.0..1.0).contains(&u));
        }
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = RandomStream::new(8675309);
        let mut b = RandomStream::new(8675309);
        for _ in 0..100 {
            assert_eq!(a.uniform(), b.uniform());
        }
    }

    #[test]
    fn test_replicate_streams_differ() {
        let mut a = RandomStream::for_replicate(42, 0);
        let mut b = RandomStream::for_replicate(42, 1);
        let xs: Vec<f64> = (0..8).map(|_| a.uniform()).collect();
        let ys: Vec<f64> = (0..8).map(|_| b.uniform()).collect();
        assert_ne!(xs, ys);
    }

    #[test]
    fn test_normal_moments() {
        let mut rng = RandomStream::new(1);
        let n = 100_000;
        let samples: Vec<f64> = (0..n).map(|_| rng.normal(3.0, 2.0)).collect();
        let mean = samples.iter().sum::<f64>() / n as f64;
        let var = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n as f64;
        assert!(samples.iter().all(|x| x.is_finite()));
        assert!(f64::abs(mean - 3.0) < 0.05);
        assert!(f64::abs(var.sqrt() - 2.0) < 0.05);
    }

    #[test]
    fn test_normal_degenerate_std_dev() {
        let mut rng = RandomStream::new(2);
        assert_eq!(rng.normal(5.0, 0.0), 5.0);
        assert_eq!(rng.normal(5.0, -1.0), 5.0);
        assert_eq!(rng.normal(5.0, f64::NAN), 5.0);
    }

    #[test]
    fn test_binomial_successes_bounds() {
        let mut rng = RandomStream::new(3);
        assert_eq!(rng.binomial_successes(1000, 0.0), 0);
        assert_eq!(rng.binomial_successes(1000, 1.0), 1000);
        assert_eq!(rng.binomial_successes(1000, 1.5), 0);
        assert_eq!(rng.binomial_successes(1000, -0.5), 0);
        assert_eq!(rng.binomial_successes(0, 0.5), 0);
        let k = rng.binomial_successes(10_000, 0.25);
        assert!((2300..2700).contains(&k));
    }

    #[test]
    fn test_binomial_successes_large_trial_count() {
        // sd = 500
        let mut rng = RandomStream::new(4);
        for _ in 0..100 {
            let k = rng.binomial_successes(1_000_000, 0.5);
            assert!((497_000..=503_000).contains(&k));
        }
    }
}
