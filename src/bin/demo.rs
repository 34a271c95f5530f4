//! A small demo: fills four chains with autocorrelated Gaussian draws, discards
//! the warmup and prints pooled and per-chain summaries.

use indicatif::{ProgressBar, ProgressStyle};
use mcmc_chains::chains::Chains;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    const N_CHAINS: usize = 4;
    const WARMUP: usize = 500;
    const ITERATIONS: usize = 2_000;
    const SEED: u64 = 42;
    const RHO: f64 = 0.7;

    // mu ~ N(1, 1), theta ~ N([0, -2], 0.5^2) elementwise, each an AR(1) walk
    // started far from its mean so the warmup visibly matters.
    let targets = [(1.0, 1.0), (0.0, 0.5), (-2.0, 0.5)];
    let mut chains = Chains::new(N_CHAINS, [("mu", vec![]), ("theta", vec![2])])?.set_seed(SEED);

    let pb = ProgressBar::new((N_CHAINS * (WARMUP + ITERATIONS)) as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("##-"),
    );
    for chain in 0..N_CHAINS {
        let mut rng = SmallRng::seed_from_u64(SEED + chain as u64);
        let innovation = Normal::new(0.0, (1.0 - RHO * RHO).sqrt())?;
        let mut state = [10.0, 10.0, 10.0];
        for _ in 0..(WARMUP + ITERATIONS) {
            let draw: Vec<f64> = state
                .iter_mut()
                .zip(&targets)
                .map(|(x, &(mean, sd))| {
                    let z = (*x - mean) / sd;
                    *x = mean + sd * (RHO * z + innovation.sample(&mut rng));
                    *x
                })
                .collect();
            chains.add(chain, &draw)?;
            pb.inc(1);
        }
    }
    pb.finish_with_message("Done!");
    chains.set_warmup(WARMUP);

    println!(
        "Stored {} draws, kept {} after a warmup of {} per chain",
        chains.num_samples(),
        chains.num_kept_samples(),
        chains.warmup()
    );

    let probs = [0.05, 0.5, 0.95];
    println!(
        "{:>10} {:>9} {:>9} {:>9} {:>9} {:>9}",
        "param", "mean", "sd", "5%", "50%", "95%"
    );
    for row in chains.summary(&probs)? {
        println!(
            "{:>10} {:>9.3} {:>9.3} {:>9.3} {:>9.3} {:>9.3}",
            row.name, row.mean, row.sd, row.quantiles[0], row.quantiles[1], row.quantiles[2]
        );
    }

    println!("\nPer-chain 90% central intervals for mu:");
    for chain in 0..N_CHAINS {
        let (lo, hi) = chains.chain_central_interval(chain, 0, 0.9)?;
        println!("  chain {chain}: [{lo:.3}, {hi:.3}]");
    }

    #[cfg(feature = "csv")]
    {
        mcmc_chains::io::csv::save_csv(&chains, "/tmp/mcmc_chains_demo.csv")?;
        println!("\nSaved all draws to /tmp/mcmc_chains_demo.csv");
    }

    Ok(())
}
