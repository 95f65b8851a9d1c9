use std::f64::consts::PI;

use rand::Rng;
use tracing::debug;

use super::types::{MonteCarloSummary, SamplingMethod};

/// Paths simulated per estimate.
pub const SIMULATIONS: u32 = 1_000;

/// Draws one year's market return around `mean` with spread `volatility`.
pub trait ReturnSampler {
    fn sample_annual_return<R: Rng + ?Sized>(
        &self,
        mean: f64,
        volatility: f64,
        rng: &mut R,
    ) -> f64;
}

/// `mean + (U - 0.5) * 2 * volatility` with `U ~ Uniform[0, 1)`. This is a
/// flat stand-in for a normal draw, bounded to `mean ± volatility`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformPerturbation;

impl ReturnSampler for UniformPerturbation {
    fn sample_annual_return<R: Rng + ?Sized>(
        &self,
        mean: f64,
        volatility: f64,
        rng: &mut R,
    ) -> f64 {
        let u: f64 = rng.r#gen();
        mean + (u - 0.5) * 2.0 * volatility
    }
}

/// Box-Muller normal draw with standard deviation `volatility`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Gaussian;

impl ReturnSampler for Gaussian {
    fn sample_annual_return<R: Rng + ?Sized>(
        &self,
        mean: f64,
        volatility: f64,
        rng: &mut R,
    ) -> f64 {
        let u1 = rng.r#gen::<f64>().max(1e-12);
        let u2: f64 = rng.r#gen();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
        mean + volatility * z
    }
}

impl ReturnSampler for SamplingMethod {
    fn sample_annual_return<R: Rng + ?Sized>(
        &self,
        mean: f64,
        volatility: f64,
        rng: &mut R,
    ) -> f64 {
        match self {
            SamplingMethod::UniformPerturbation => {
                UniformPerturbation.sample_annual_return(mean, volatility, rng)
            }
            SamplingMethod::Gaussian => Gaussian.sample_annual_return(mean, volatility, rng),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MonteCarloConfig {
    pub initial_amount: f64,
    pub monthly_contribution: f64,
    pub years: u32,
    pub mean_return: f64,
    pub volatility: f64,
    /// Every path succeeds when no target is set.
    pub target_amount: Option<f64>,
    pub simulations: u32,
}

/// Runs the paths with annual steps: grow by the sampled return, then add a
/// year of contributions.
pub fn estimate_success<S, R>(
    config: MonteCarloConfig,
    sampler: &S,
    rng: &mut R,
) -> MonteCarloSummary
where
    S: ReturnSampler,
    R: Rng + ?Sized,
{
    let simulations = config.simulations.max(1);
    let annual_contribution = config.monthly_contribution * 12.0;
    let mut successes = 0_u32;
    let mut terminal = Vec::with_capacity(simulations as usize);

    for _ in 0..simulations {
        let mut balance = config.initial_amount;
        for _ in 0..config.years {
            let sampled_return =
                sampler.sample_annual_return(config.mean_return, config.volatility, rng);
            balance = balance * (1.0 + sampled_return) + annual_contribution;
        }

        let success = match config.target_amount {
            Some(target) => balance >= target,
            None => true,
        };
        if success {
            successes += 1;
        }
        terminal.push(balance);
    }

    let success_probability = 100.0 * successes as f64 / simulations as f64;
    debug!(
        simulations,
        successes,
        success_probability,
        years = config.years,
        "monte carlo estimate complete"
    );

    terminal.sort_by(|a, b| a.total_cmp(b));
    MonteCarloSummary {
        simulations,
        success_probability,
        median_terminal_balance: percentile(&terminal, 50.0),
        p10_terminal_balance: percentile(&terminal, 10.0),
        p90_terminal_balance: percentile(&terminal, 90.0),
    }
}

/// Linear interpolation between closest ranks. `sorted` must be ascending.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }

    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }

    let rank = (p / 100.0) * (n as f64 - 1.0);
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;

    if lower == upper {
        sorted[lower]
    } else {
        let w = rank - lower as f64;
        sorted[lower] * (1.0 - w) + sorted[upper] * w
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{any, prop_assert, proptest};
    use rand::rngs::StdRng;
    use rand::rngs::mock::StepRng;
    use rand::{RngCore, SeedableRng};

    /// Replays a fixed list of raw words.
    struct CyclingRng {
        words: Vec<u64>,
        next: usize,
    }

    impl CyclingRng {
        fn new(words: Vec<u64>) -> Self {
            Self { words, next: 0 }
        }
    }

    impl RngCore for CyclingRng {
        fn next_u32(&mut self) -> u32 {
            (self.next_u64() >> 32) as u32
        }

        fn next_u64(&mut self) -> u64 {
            let word = self.words[self.next % self.words.len()];
            self.next += 1;
            word
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            for chunk in dest.chunks_mut(8) {
                let bytes = self.next_u64().to_le_bytes();
                chunk.copy_from_slice(&bytes[..chunk.len()]);
            }
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    fn conservative_config(target_amount: Option<f64>) -> MonteCarloConfig {
        MonteCarloConfig {
            initial_amount: 10_000.0,
            monthly_contribution: 100.0,
            years: 10,
            mean_return: 0.04,
            volatility: 0.05,
            target_amount,
            simulations: SIMULATIONS,
        }
    }

    fn deterministic_terminal(config: MonteCarloConfig, annual_return: f64) -> f64 {
        let mut balance = config.initial_amount;
        for _ in 0..config.years {
            balance = balance * (1.0 + annual_return) + config.monthly_contribution * 12.0;
        }
        balance
    }

    #[test]
    fn uniform_sampler_stays_within_one_volatility_of_mean() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..10_000 {
            let r = UniformPerturbation.sample_annual_return(0.07, 0.12, &mut rng);
            assert!((0.07 - 0.12..0.07 + 0.12).contains(&r), "out of range: {r}");
        }
    }

    #[test]
    fn uniform_sampler_at_zero_draw_returns_lower_bound() {
        let mut rng = StepRng::new(0, 0);
        let r = UniformPerturbation.sample_annual_return(0.04, 0.05, &mut rng);
        assert!((r - (-0.01)).abs() < 1e-15);
    }

    #[test]
    fn gaussian_sampler_centres_on_mean() {
        let mut rng = StdRng::seed_from_u64(99);
        let n = 20_000;
        let draws: Vec<f64> = (0..n)
            .map(|_| Gaussian.sample_annual_return(0.07, 0.10, &mut rng))
            .collect();
        let mean = draws.iter().sum::<f64>() / n as f64;
        let var = draws.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / n as f64;
        assert!((mean - 0.07).abs() < 0.005, "mean {mean}");
        assert!((var.sqrt() - 0.10).abs() < 0.005, "sd {}", var.sqrt());
    }

    #[test]
    fn no_target_counts_every_path_as_success() {
        let mut rng = StdRng::seed_from_u64(1);
        let summary = estimate_success(conservative_config(None), &UniformPerturbation, &mut rng);
        assert_eq!(summary.success_probability, 100.0);
        assert_eq!(summary.simulations, SIMULATIONS);
    }

    #[test]
    fn zero_volatility_hits_deterministic_target_exactly() {
        let mut config = conservative_config(None);
        config.volatility = 0.0;
        config.target_amount = Some(deterministic_terminal(config, config.mean_return));

        let mut rng = StdRng::seed_from_u64(5);
        let summary = estimate_success(config, &UniformPerturbation, &mut rng);
        assert_eq!(summary.success_probability, 100.0);
        assert_eq!(summary.p10_terminal_balance, summary.p90_terminal_balance);
    }

    #[test]
    fn pinned_zero_draws_take_the_worst_case_path() {
        let config = conservative_config(None);
        let worst = deterministic_terminal(config, config.mean_return - config.volatility);

        let mut rng = StepRng::new(0, 0);
        let summary = estimate_success(
            MonteCarloConfig {
                target_amount: Some(worst + 1.0),
                ..config
            },
            &UniformPerturbation,
            &mut rng,
        );
        assert_eq!(summary.success_probability, 0.0);
        assert!((summary.median_terminal_balance - worst).abs() < 1e-6);
    }

    #[test]
    fn alternating_draws_give_exact_half_success() {
        let config = MonteCarloConfig {
            initial_amount: 1_000.0,
            monthly_contribution: 0.0,
            years: 1,
            mean_return: 0.05,
            volatility: 0.10,
            target_amount: Some(1_050.0),
            simulations: 10,
        };

        let mut rng = CyclingRng::new(vec![0, u64::MAX]);
        let summary = estimate_success(config, &UniformPerturbation, &mut rng);
        assert_eq!(summary.success_probability, 50.0);
    }

    #[test]
    fn conservative_profile_clears_low_target_and_misses_high_target() {
        let mut rng = StdRng::seed_from_u64(42);
        let low = estimate_success(
            conservative_config(Some(5_000.0)),
            &UniformPerturbation,
            &mut rng,
        );
        assert_eq!(low.success_probability, 100.0);

        let high = estimate_success(
            conservative_config(Some(1_000_000.0)),
            &UniformPerturbation,
            &mut rng,
        );
        assert_eq!(high.success_probability, 0.0);
    }

    #[test]
    fn zero_years_leaves_balance_untouched() {
        let mut config = conservative_config(Some(10_000.0));
        config.years = 0;
        let mut rng = StdRng::seed_from_u64(8);
        let summary = estimate_success(config, &UniformPerturbation, &mut rng);
        assert_eq!(summary.success_probability, 100.0);
        assert_eq!(summary.median_terminal_balance, 10_000.0);

        config.target_amount = Some(10_000.01);
        let summary = estimate_success(config, &UniformPerturbation, &mut rng);
        assert_eq!(summary.success_probability, 0.0);
    }

    #[test]
    fn identical_seeds_give_identical_summaries() {
        let config = conservative_config(Some(30_000.0));
        let a = estimate_success(config, &SamplingMethod::Gaussian, &mut StdRng::seed_from_u64(7));
        let b = estimate_success(config, &SamplingMethod::Gaussian, &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn percentile_interpolates_between_ranks() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentile(&values, 0.0), 1.0);
        assert_eq!(percentile(&values, 100.0), 4.0);
        assert!((percentile(&values, 50.0) - 2.5).abs() < 1e-12);
        assert_eq!(percentile(&[], 50.0), 0.0);
    }

    #[test]
    fn summary_percentiles_come_from_sorted_terminal_balances() {
        // Draws alternate high, low, mid so the paths finish out of order.
        let config = MonteCarloConfig {
            initial_amount: 1_000.0,
            monthly_contribution: 0.0,
            years: 1,
            mean_return: 0.0,
            volatility: 0.5,
            target_amount: None,
            simulations: 3,
        };
        let mut rng = CyclingRng::new(vec![u64::MAX, 0, 1 << 63]);
        let summary = estimate_success(config, &UniformPerturbation, &mut rng);

        assert!((summary.median_terminal_balance - 1_000.0).abs() < 1e-6);
        assert!((summary.p10_terminal_balance - 600.0).abs() < 1e-6);
        assert!((summary.p90_terminal_balance - 1_400.0).abs() < 1e-6);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(24))]

        #[test]
        fn prop_success_probability_is_a_percentage(
            seed in any::<u64>(),
            initial in 0u32..1_000_000,
            monthly in 0u32..5_000,
            years in 0u32..40,
            mean_bp in -1_000i32..2_000,
            vol_bp in 0u32..4_000,
            target in 0u32..3_000_000,
            gaussian in any::<bool>()
        ) {
            let config = MonteCarloConfig {
                initial_amount: initial as f64,
                monthly_contribution: monthly as f64,
                years,
                mean_return: mean_bp as f64 / 10_000.0,
                volatility: vol_bp as f64 / 10_000.0,
                target_amount: Some(target as f64),
                simulations: 200,
            };
            let method = if gaussian {
                SamplingMethod::Gaussian
            } else {
                SamplingMethod::UniformPerturbation
            };
            let summary = estimate_success(config, &method, &mut StdRng::seed_from_u64(seed));
            prop_assert!((0.0..=100.0).contains(&summary.success_probability));
            prop_assert!(summary.p10_terminal_balance <= summary.median_terminal_balance + 1e-9);
            prop_assert!(summary.median_terminal_balance <= summary.p90_terminal_balance + 1e-9);
        }
    }
}
