/*!
# Multi-chain sample store

[`Chains`] holds the draws of `K` independent Markov chains. Each draw is a
flat vector covering every registered parameter (see [`crate::schema`]); the
store appends draws per chain and answers queries about all, warmup or kept
draws of a single flat parameter.

A single warmup cutoff is shared by all chains. A chain shorter than the cutoff
simply contributes no kept draws.

Pooled queries concatenate the kept draws of every chain and reorder them with
one shared permutation. The permutation only depends on the seed and on the
number of kept draws, so it is identical for every parameter until the store
changes, keeping draws from the same iteration aligned across parameters.

## Example

```rust
use mcmc_chains::chains::Chains;

let mut chains = Chains::new(2, [("mu", vec![]), ("theta", vec![2])])?.set_seed(42);
for i in 0..10 {
    let x = i as f64;
    chains.add(0, &[x, 2.0 * x, 3.0 * x])?;
    chains.add(1, &[-x, -2.0 * x, -3.0 * x])?;
}
chains.set_warmup(5);
assert_eq!(chains.num_kept_samples(), 10);

let mu = chains.kept_samples_permuted(0)?;
let theta_1 = chains.kept_samples_permuted(1)?;
for (m, t) in mu.iter().zip(&theta_1) {
    assert_eq!(2.0 * m, *t);
}
# Ok::<(), mcmc_chains::error::ChainsError>(())
```
*/

use std::ops::Range;
use std::sync::OnceLock;

use log::{debug, trace};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::error::{check_index, ChainsError, Result};
use crate::permutation::{permutation, permute};
use crate::schema::IndexSchema;

/// Seed used until [`Chains::set_seed`] is called.
pub const DEFAULT_SEED: u64 = 20_130_917;

/// The pooled permutation together with the store generation it was built for.
#[derive(Debug, Clone)]
struct PooledPermutation {
    generation: u64,
    perm: Vec<usize>,
}

/// Draws from several chains over a fixed parameter schema.
#[derive(Debug, Clone)]
pub struct Chains {
    schema: IndexSchema,
    warmup: usize,
    /// `samples[chain][draw][flat param]`
    samples: Vec<Vec<Vec<f64>>>,
    seed: u64,
    /// Bumped by every mutation; tags the cached permutation.
    generation: u64,
    permutation: OnceLock<PooledPermutation>,
}

impl Chains {
    /**
    Creates `num_chains` empty chains over the given `(name, dims)` parameters.

    The warmup starts at zero. `num_chains` may be zero.

    # Errors

    [`ChainsError::InvalidArgument`] if the parameters do not form a valid
    [`IndexSchema`].
    */
    pub fn new<I, S>(num_chains: usize, params: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Vec<usize>)>,
        S: Into<String>,
    {
        let schema = IndexSchema::new(params)?;
        Ok(Self::from_schema(num_chains, schema))
    }

    /// Creates `num_chains` empty chains over an existing schema.
    pub fn from_schema(num_chains: usize, schema: IndexSchema) -> Self {
        debug!(
            "Creating {} chains over {} parameters ({} flat)",
            num_chains,
            schema.num_param_names(),
            schema.num_params()
        );
        Self {
            schema,
            warmup: 0,
            samples: vec![Vec::new(); num_chains],
            seed: DEFAULT_SEED,
            generation: 0,
            permutation: OnceLock::new(),
        }
    }

    /**
    Sets the seed of the pooled permutation.

    # Examples

    ```rust
    use mcmc_chains::chains::Chains;

    let chains = Chains::new(2, [("a", vec![])]).unwrap().set_seed(7);
    assert_eq!(chains.seed(), 7);
    ```
    */
    pub fn set_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self.invalidate();
        self
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn schema(&self) -> &IndexSchema {
        &self.schema
    }

    pub fn num_chains(&self) -> usize {
        self.samples.len()
    }

    /// Width of a flat draw.
    pub fn num_params(&self) -> usize {
        self.schema.num_params()
    }

    /// Flat index of element `idxs` of the parameter called `name`.
    pub fn flat_index(&self, name: &str, idxs: &[usize]) -> Result<usize> {
        let param_idx = self.schema.param_name_to_index(name)?;
        self.schema.get_total_param_index(param_idx, idxs)
    }

    pub fn warmup(&self) -> usize {
        self.warmup
    }

    /// Sets the shared warmup cutoff. Any value is accepted.
    pub fn set_warmup(&mut self, warmup: usize) {
        debug!("Setting warmup from {} to {}", self.warmup, warmup);
        self.warmup = warmup;
        self.invalidate();
    }

    /**
    Appends a flat draw to chain `chain`.

    # Errors

    [`ChainsError::OutOfRange`] for an unknown chain and
    [`ChainsError::InvalidArgument`] if `sample` is not [`Self::num_params`]
    wide. The store is left untouched on error.
    */
    pub fn add(&mut self, chain: usize, sample: &[f64]) -> Result<()> {
        self.check_chain(chain)?;
        if sample.len() != self.num_params() {
            return Err(ChainsError::InvalidArgument(format!(
                "sample has {} values, expected {}",
                sample.len(),
                self.num_params()
            )));
        }
        self.samples[chain].push(sample.to_vec());
        trace!(
            "Chain {} now holds {} samples",
            chain,
            self.samples[chain].len()
        );
        self.invalidate();
        Ok(())
    }

    /// Raw draws of a chain, in insertion order.
    pub fn chain_draws(&self, chain: usize) -> Result<&[Vec<f64>]> {
        self.check_chain(chain)?;
        Ok(&self.samples[chain])
    }

    pub fn num_samples(&self) -> usize {
        self.samples.iter().map(Vec::len).sum()
    }

    pub fn num_chain_samples(&self, chain: usize) -> Result<usize> {
        self.check_chain(chain)?;
        Ok(self.samples[chain].len())
    }

    pub fn num_warmup_samples(&self) -> usize {
        self.samples
            .iter()
            .map(|draws| self.warmup.min(draws.len()))
            .sum()
    }

    pub fn num_chain_warmup_samples(&self, chain: usize) -> Result<usize> {
        Ok(self.warmup.min(self.num_chain_samples(chain)?))
    }

    pub fn num_kept_samples(&self) -> usize {
        self.samples
            .iter()
            .map(|draws| draws.len().saturating_sub(self.warmup))
            .sum()
    }

    pub fn num_chain_kept_samples(&self, chain: usize) -> Result<usize> {
        Ok(self.num_chain_samples(chain)?.saturating_sub(self.warmup))
    }

    /// All draws of flat parameter `param`, chains concatenated in order.
    pub fn samples(&self, param: usize) -> Result<Vec<f64>> {
        self.pooled(param, |chains, chain| chains.all_range(chain))
    }

    /// All draws of flat parameter `param` in chain `chain`, warmup included.
    pub fn chain_samples(&self, chain: usize, param: usize) -> Result<Vec<f64>> {
        self.column(chain, param, self.all_range(chain))
    }

    /// Warmup draws of flat parameter `param`, chains concatenated in order.
    pub fn warmup_samples(&self, param: usize) -> Result<Vec<f64>> {
        self.pooled(param, |chains, chain| chains.warmup_range(chain))
    }

    pub fn chain_warmup_samples(&self, chain: usize, param: usize) -> Result<Vec<f64>> {
        self.column(chain, param, self.warmup_range(chain))
    }

    /// Kept draws of flat parameter `param`, chains concatenated in order.
    pub fn kept_samples(&self, param: usize) -> Result<Vec<f64>> {
        self.pooled(param, |chains, chain| chains.kept_range(chain))
    }

    pub fn chain_kept_samples(&self, chain: usize, param: usize) -> Result<Vec<f64>> {
        self.column(chain, param, self.kept_range(chain))
    }

    /**
    Kept draws of flat parameter `param` from all chains, reordered by the
    pooled permutation.

    Two calls for different parameters on an unchanged store apply the same
    permutation, so element `i` of both results comes from the same draw.
    */
    pub fn kept_samples_permuted(&self, param: usize) -> Result<Vec<f64>> {
        let kept = self.kept_samples(param)?;
        permute(self.pooled_permutation(), &kept)
    }

    /// The permutation applied by [`Self::kept_samples_permuted`].
    pub fn pooled_permutation(&self) -> &[usize] {
        let cached = self.permutation.get_or_init(|| {
            let n = self.num_kept_samples();
            debug!(
                "Computing pooled permutation of {} kept samples (generation {})",
                n, self.generation
            );
            let mut rng = SmallRng::seed_from_u64(self.seed);
            PooledPermutation {
                generation: self.generation,
                perm: permutation(n, &mut rng),
            }
        });
        debug_assert_eq!(cached.generation, self.generation);
        &cached.perm
    }

    fn invalidate(&mut self) {
        self.generation += 1;
        self.permutation.take();
    }

    fn check_chain(&self, chain: usize) -> Result<()> {
        check_index("chain", chain, self.num_chains())
    }

    fn check_param(&self, param: usize) -> Result<()> {
        check_index("parameter", param, self.num_params())
    }

    // The range helpers assume `chain` has been checked.

    fn all_range(&self, chain: usize) -> Range<usize> {
        0..self.samples.get(chain).map_or(0, Vec::len)
    }

    fn warmup_range(&self, chain: usize) -> Range<usize> {
        let all = self.all_range(chain);
        0..self.warmup.min(all.end)
    }

    fn kept_range(&self, chain: usize) -> Range<usize> {
        let all = self.all_range(chain);
        self.warmup.min(all.end)..all.end
    }

    fn column(&self, chain: usize, param: usize, range: Range<usize>) -> Result<Vec<f64>> {
        self.check_chain(chain)?;
        self.check_param(param)?;
        Ok(self.samples[chain][range]
            .iter()
            .map(|draw| draw[param])
            .collect())
    }

    fn pooled<F>(&self, param: usize, range: F) -> Result<Vec<f64>>
    where
        F: Fn(&Self, usize) -> Range<usize>,
    {
        self.check_param(param)?;
        let mut out = Vec::new();
        for chain in 0..self.num_chains() {
            out.extend(self.column(chain, param, range(self, chain))?);
        }
        Ok(out)
    }
}
