/*!
Multi-dimensional index arithmetic.

Array-valued parameters are laid out column-major: the first index varies
fastest. A parameter with dimensions `[2, 3]` therefore stores its elements in
the order `(0,0), (1,0), (0,1), (1,1), (0,2), (1,2)`.

```rust
use mcmc_chains::indexing::{get_offset, increment_indexes};

let dims = [2, 3];
let mut idxs = vec![0, 0];
for expected in 0..6 {
    assert_eq!(get_offset(&dims, &idxs), expected);
    increment_indexes(&dims, &mut idxs).unwrap();
}
// Past the last element the indexes wrap around.
assert_eq!(idxs, vec![0, 0]);
```
*/

use crate::error::{ChainsError, Result};

/// Checks that `idxs` addresses an element of an array with dimensions `dims`.
///
/// Fails with [`ChainsError::InvalidArgument`] if the lengths differ and with
/// [`ChainsError::OutOfRange`] if any index reaches its dimension.
pub fn validate_dims_idxs(dims: &[usize], idxs: &[usize]) -> Result<()> {
    if dims.len() != idxs.len() {
        return Err(ChainsError::InvalidArgument(format!(
            "expected {} indexes, got {}",
            dims.len(),
            idxs.len()
        )));
    }
    for (i, (&dim, &idx)) in dims.iter().zip(idxs).enumerate() {
        if idx >= dim {
            return Err(ChainsError::OutOfRange(format!(
                "index {idx} in position {i} must be less than {dim}"
            )));
        }
    }
    Ok(())
}

/// Flat column-major offset of `idxs` within an array of shape `dims`.
///
/// Does no bounds checking; pair with [`validate_dims_idxs`] where needed.
pub fn get_offset(dims: &[usize], idxs: &[usize]) -> usize {
    let mut offset = 0;
    let mut stride = 1;
    for (&dim, &idx) in dims.iter().zip(idxs) {
        offset += idx * stride;
        stride *= dim;
    }
    offset
}

/// Advances `idxs` to the next element in column-major order.
///
/// Incrementing the last element wraps every index back to zero.
pub fn increment_indexes(dims: &[usize], idxs: &mut [usize]) -> Result<()> {
    validate_dims_idxs(dims, idxs)?;
    for (&dim, idx) in dims.iter().zip(idxs.iter_mut()) {
        *idx += 1;
        if *idx < dim {
            return Ok(());
        }
        *idx = 0;
    }
    Ok(())
}

/// Iterator over every index vector of an array, in storage order.
///
/// Yields a single empty vector for a scalar (`dims` empty) and nothing if
/// any dimension is zero.
#[derive(Debug, Clone)]
pub struct IndexIter<'a> {
    dims: &'a [usize],
    next: Option<Vec<usize>>,
}

/// Returns an [`IndexIter`] over all elements of an array with shape `dims`.
pub fn index_combinations(dims: &[usize]) -> IndexIter<'_> {
    let next = if dims.contains(&0) {
        None
    } else {
        Some(vec![0; dims.len()])
    };
    IndexIter { dims, next }
}

impl Iterator for IndexIter<'_> {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        let mut following = current.clone();
        // The dimensions are valid by construction so this cannot fail.
        if increment_indexes(self.dims, &mut following).is_ok()
            && following.iter().any(|&i| i != 0)
        {
            self.next = Some(following);
        }
        Some(current)
    }
}
