//! Tests checking pooled and per-chain summaries against draws from a known
//! normal distribution.
//!
//! Four chains receive independent N(mean, sd^2) draws after a warmup of
//! outliers; the kept summaries must match the target within sampling error.

use mcmc_chains::chains::Chains;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const N_CHAINS: usize = 4;
    const WARMUP: usize = 200;
    const KEPT: usize = 5_000;
    const SEED: u64 = 42;

    /// Builds a store with a scalar `mu ~ N(3, 2^2)` and a vector
    /// `beta ~ N([-1, 1], 0.5^2)`; warmup draws are all `1e6`.
    fn normal_chains() -> Chains {
        let mut chains = Chains::new(N_CHAINS, [("mu", vec![]), ("beta", vec![2])])
            .expect("Expected chains construction to succeed")
            .set_seed(SEED);
        let mu = Normal::new(3.0, 2.0).unwrap();
        let beta = [Normal::new(-1.0, 0.5).unwrap(), Normal::new(1.0, 0.5).unwrap()];
        for chain in 0..N_CHAINS {
            let mut rng = SmallRng::seed_from_u64(SEED + chain as u64);
            for _ in 0..WARMUP {
                chains.add(chain, &[1e6; 3]).unwrap();
            }
            for _ in 0..KEPT {
                let draw = [
                    mu.sample(&mut rng),
                    beta[0].sample(&mut rng),
                    beta[1].sample(&mut rng),
                ];
                chains.add(chain, &draw).unwrap();
            }
        }
        chains.set_warmup(WARMUP);
        chains
    }

    #[test]
    fn test_counts() {
        let chains = normal_chains();
        assert_eq!(chains.num_samples(), N_CHAINS * (WARMUP + KEPT));
        assert_eq!(chains.num_warmup_samples(), N_CHAINS * WARMUP);
        assert_eq!(chains.num_kept_samples(), N_CHAINS * KEPT);
        assert_eq!(chains.kept_samples_permuted(0).unwrap().len(), N_CHAINS * KEPT);
    }

    #[test]
    fn test_pooled_moments() {
        let chains = normal_chains();
        assert_abs_diff_eq!(chains.mean(0).unwrap(), 3.0, epsilon = 0.1);
        assert_abs_diff_eq!(chains.sd(0).unwrap(), 2.0, epsilon = 0.1);

        let beta_2 = chains.flat_index("beta", &[1]).unwrap();
        assert_abs_diff_eq!(chains.mean(beta_2).unwrap(), 1.0, epsilon = 0.05);
        assert_abs_diff_eq!(chains.sd(beta_2).unwrap(), 0.5, epsilon = 0.05);
    }

    #[test]
    fn test_per_chain_moments() {
        let chains = normal_chains();
        for chain in 0..N_CHAINS {
            assert_abs_diff_eq!(chains.chain_mean(chain, 0).unwrap(), 3.0, epsilon = 0.2);
            assert_abs_diff_eq!(chains.chain_sd(chain, 0).unwrap(), 2.0, epsilon = 0.2);
            assert_abs_diff_eq!(chains.chain_mean(chain, 1).unwrap(), -1.0, epsilon = 0.1);
        }
    }

    #[test]
    fn test_quantiles_match_normal() {
        let chains = normal_chains();
        // Standard normal quantiles at 2.5%, 50% and 97.5%.
        let z = [-1.959_963_985, 0.0, 1.959_963_985];
        let qs = chains.quantiles(0, &[0.025, 0.5, 0.975]).unwrap();
        for (q, z) in qs.iter().zip(z) {
            assert_abs_diff_eq!(*q, 3.0 + 2.0 * z, epsilon = 0.2);
        }

        let (lo, hi) = chains.central_interval(0, 0.95).unwrap();
        assert_abs_diff_eq!(lo, qs[0], epsilon = 1e-12);
        assert_abs_diff_eq!(hi, qs[2], epsilon = 1e-12);
    }

    #[test]
    fn test_warmup_outliers_are_excluded() {
        let mut chains = normal_chains();
        let kept_max = chains.quantile(0, 1.0).unwrap();
        assert!(kept_max < 1e3, "warmup draws leaked into kept draws");

        chains.set_warmup(0);
        assert_eq!(chains.quantile(0, 1.0).unwrap(), 1e6);
    }

    #[test]
    fn test_pooled_draws_stay_aligned() {
        let chains = normal_chains();
        let mu = chains.kept_samples_permuted(0).unwrap();
        let beta_1 = chains.kept_samples_permuted(1).unwrap();

        // Pair each pooled (mu, beta_1) and look it up in the stored draws.
        let mut stored: Vec<(u64, u64)> = (0..N_CHAINS)
            .flat_map(|k| chains.chain_draws(k).unwrap()[WARMUP..].to_vec())
            .map(|d| (d[0].to_bits(), d[1].to_bits()))
            .collect();
        let mut pooled: Vec<(u64, u64)> = mu
            .iter()
            .zip(&beta_1)
            .map(|(m, b)| (m.to_bits(), b.to_bits()))
            .collect();
        stored.sort_unstable();
        pooled.sort_unstable();
        assert_eq!(stored, pooled);

        // The pooled order is shuffled rather than chain-concatenated.
        assert_ne!(mu, chains.kept_samples(0).unwrap());
    }
}
