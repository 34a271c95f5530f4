//! Summary statistics over kept draws: quantiles, central intervals, mean and
//! standard deviation, per chain or pooled across chains.
//!
//! Quantiles use linear interpolation between order statistics: for `n`
//! sorted draws the `q`-quantile sits at 0-based position `q * (n - 1)`.

use std::cmp::Ordering;

use log::debug;
use ndarray::ArrayView1;
use num_traits::{Float, FromPrimitive};

use crate::chains::Chains;
use crate::error::{check_probability, ChainsError, Result};

/// Interpolated `q`-quantile of already sorted draws; `None` if `sorted` is
/// empty or `q` is not a probability in `[0, 1]` (NaN included).
pub fn quantile_sorted<T: Float + FromPrimitive>(sorted: &[T], q: f64) -> Option<T> {
    if !(0.0..=1.0).contains(&q) {
        return None;
    }
    let last = sorted.len().checked_sub(1)?;
    let pos = q * last as f64;
    let lo = (pos.floor() as usize).min(last);
    let hi = (pos.ceil() as usize).min(last);
    let frac = T::from_f64(pos - lo as f64)?;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Arithmetic mean; `None` for an empty slice.
pub fn mean<T: Float + FromPrimitive>(draws: &[T]) -> Option<T> {
    ArrayView1::from(draws).mean()
}

/// Sample standard deviation with Bessel's correction; `None` below two draws.
pub fn sd<T: Float + FromPrimitive>(draws: &[T]) -> Option<T> {
    if draws.len() < 2 {
        return None;
    }
    Some(ArrayView1::from(draws).std(T::one()))
}

fn cmp_f64(a: &f64, b: &f64) -> Ordering {
    a.total_cmp(b)
}

fn sorted(mut draws: Vec<f64>) -> Vec<f64> {
    draws.sort_unstable_by(cmp_f64);
    draws
}

fn no_draws() -> ChainsError {
    ChainsError::OutOfRange("no kept samples available".into())
}

fn quantiles_of(draws: Vec<f64>, probs: &[f64]) -> Result<Vec<f64>> {
    let draws = sorted(draws);
    probs
        .iter()
        .map(|&q| quantile_sorted(&draws, q).ok_or_else(no_draws))
        .collect()
}

fn central_probs(prob: f64) -> Result<[f64; 2]> {
    check_probability(prob)?;
    Ok([(1.0 - prob) / 2.0, (1.0 + prob) / 2.0])
}

/// Pooled summary of one flat parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSummary {
    /// Flat label, e.g. `theta.2.1`.
    pub name: String,
    pub mean: f64,
    /// `NaN` when fewer than two draws are kept.
    pub sd: f64,
    /// One value per requested probability.
    pub quantiles: Vec<f64>,
}

impl Chains {
    /// `q`-quantile of the kept draws of flat parameter `param` in chain `chain`.
    pub fn chain_quantile(&self, chain: usize, param: usize, q: f64) -> Result<f64> {
        Ok(self.chain_quantiles(chain, param, &[q])?[0])
    }

    /// `q`-quantile of the pooled kept draws of flat parameter `param`.
    pub fn quantile(&self, param: usize, q: f64) -> Result<f64> {
        Ok(self.quantiles(param, &[q])?[0])
    }

    /**
    Quantiles of the kept draws of one chain, one per entry of `probs`.

    # Errors

    [`ChainsError::InvalidArgument`] for the first probability outside
    `[0, 1]`, [`ChainsError::OutOfRange`] for an unknown chain or parameter or
    when the chain has no kept draws.
    */
    pub fn chain_quantiles(&self, chain: usize, param: usize, probs: &[f64]) -> Result<Vec<f64>> {
        probs.iter().try_for_each(|&q| check_probability(q))?;
        quantiles_of(self.chain_kept_samples(chain, param)?, probs)
    }

    /// Pooled analogue of [`Self::chain_quantiles`].
    pub fn quantiles(&self, param: usize, probs: &[f64]) -> Result<Vec<f64>> {
        probs.iter().try_for_each(|&q| check_probability(q))?;
        quantiles_of(self.kept_samples_permuted(param)?, probs)
    }

    /// Interval holding mass `prob` around the median of one chain.
    pub fn chain_central_interval(&self, chain: usize, param: usize, prob: f64) -> Result<(f64, f64)> {
        let bounds = self.chain_quantiles(chain, param, &central_probs(prob)?)?;
        Ok((bounds[0], bounds[1]))
    }

    /// Interval holding mass `prob` around the pooled median.
    pub fn central_interval(&self, param: usize, prob: f64) -> Result<(f64, f64)> {
        let bounds = self.quantiles(param, &central_probs(prob)?)?;
        Ok((bounds[0], bounds[1]))
    }

    pub fn chain_mean(&self, chain: usize, param: usize) -> Result<f64> {
        mean(&self.chain_kept_samples(chain, param)?).ok_or_else(no_draws)
    }

    pub fn mean(&self, param: usize) -> Result<f64> {
        mean(&self.kept_samples_permuted(param)?).ok_or_else(no_draws)
    }

    pub fn chain_sd(&self, chain: usize, param: usize) -> Result<f64> {
        sd(&self.chain_kept_samples(chain, param)?)
            .ok_or_else(|| ChainsError::OutOfRange("sd needs at least two kept samples".into()))
    }

    pub fn sd(&self, param: usize) -> Result<f64> {
        sd(&self.kept_samples_permuted(param)?)
            .ok_or_else(|| ChainsError::OutOfRange("sd needs at least two kept samples".into()))
    }

    /**
    Pooled mean, sd and quantiles of every flat parameter.

    # Examples

    ```rust
    use mcmc_chains::chains::Chains;

    let mut chains = Chains::new(1, [("x", vec![])])?;
    for i in 0..=10 {
        chains.add(0, &[i as f64])?;
    }
    let summary = chains.summary(&[0.5])?;
    assert_eq!(summary[0].name, "x");
    assert_eq!(summary[0].mean, 5.0);
    assert_eq!(summary[0].quantiles, vec![5.0]);
    # Ok::<(), mcmc_chains::error::ChainsError>(())
    ```
    */
    pub fn summary(&self, probs: &[f64]) -> Result<Vec<ParamSummary>> {
        probs.iter().try_for_each(|&q| check_probability(q))?;
        debug!(
            "Summarising {} flat parameters over {} kept samples",
            self.num_params(),
            self.num_kept_samples()
        );
        self.schema()
            .flat_names()
            .into_iter()
            .enumerate()
            .map(|(param, name)| -> Result<ParamSummary> {
                let draws = self.kept_samples_permuted(param)?;
                Ok(ParamSummary {
                    name,
                    mean: mean(&draws).ok_or_else(no_draws)?,
                    sd: sd(&draws).unwrap_or(f64::NAN),
                    quantiles: quantiles_of(draws, probs)?,
                })
            })
            .collect()
    }
}
