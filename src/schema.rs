/*!
Flat numbering of named, possibly multi-dimensional parameters.

Every parameter occupies a contiguous block of the flat sample vector. Blocks
follow registration order and elements inside a block are column-major (see
[`crate::indexing`]).

```rust
use mcmc_chains::schema::IndexSchema;

// b(), a(2), d(3, 4, 5), c(6, 7)
let schema = IndexSchema::new([
    ("b", vec![]),
    ("a", vec![2]),
    ("d", vec![3, 4, 5]),
    ("c", vec![6, 7]),
])?;
assert_eq!(schema.num_params(), 105);
assert_eq!(schema.param_starts(), vec![0, 1, 3, 63]);
assert_eq!(schema.get_total_param_index(2, &[1, 0, 0])?, 4);
# Ok::<(), mcmc_chains::error::ChainsError>(())
```
*/

use std::collections::HashMap;

use crate::error::{check_index, ChainsError, Result};
use crate::indexing::{get_offset, index_combinations, validate_dims_idxs};

/// A single registered parameter and its position in the flat layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    /// Unique parameter name.
    pub name: String,
    /// Dimensions; empty for a scalar.
    pub dims: Vec<usize>,
    /// Number of scalar elements, the product of `dims`.
    pub size: usize,
    /// Flat offset of the first element.
    pub start: usize,
}

/// Immutable mapping from (parameter, multi-index) to flat index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSchema {
    params: Vec<ParamSpec>,
    by_name: HashMap<String, usize>,
    num_params: usize,
}

impl IndexSchema {
    /**
    Builds a schema from `(name, dims)` pairs in registration order.

    # Errors

    [`ChainsError::InvalidArgument`] if a name repeats or a dimension is zero.
    */
    pub fn new<I, S>(params: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Vec<usize>)>,
        S: Into<String>,
    {
        let mut specs = Vec::new();
        let mut by_name = HashMap::new();
        let mut start = 0;
        for (name, dims) in params {
            let name = name.into();
            if dims.contains(&0) {
                return Err(ChainsError::InvalidArgument(format!(
                    "parameter '{name}' has a zero dimension in {dims:?}"
                )));
            }
            if by_name.insert(name.clone(), specs.len()).is_some() {
                return Err(ChainsError::InvalidArgument(format!(
                    "parameter '{name}' is registered twice"
                )));
            }
            let size = dims.iter().product();
            specs.push(ParamSpec {
                name,
                dims,
                size,
                start,
            });
            start += size;
        }
        Ok(Self {
            params: specs,
            by_name,
            num_params: start,
        })
    }

    /// Total width of a flat sample vector.
    pub fn num_params(&self) -> usize {
        self.num_params
    }

    /// Number of registered (named) parameters.
    pub fn num_param_names(&self) -> usize {
        self.params.len()
    }

    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    pub fn param(&self, idx: usize) -> Result<&ParamSpec> {
        check_index("parameter", idx, self.params.len())?;
        Ok(&self.params[idx])
    }

    pub fn param_names(&self) -> Vec<&str> {
        self.params.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn param_name(&self, idx: usize) -> Result<&str> {
        Ok(&self.param(idx)?.name)
    }

    pub fn param_starts(&self) -> Vec<usize> {
        self.params.iter().map(|p| p.start).collect()
    }

    pub fn param_start(&self, idx: usize) -> Result<usize> {
        Ok(self.param(idx)?.start)
    }

    pub fn param_sizes(&self) -> Vec<usize> {
        self.params.iter().map(|p| p.size).collect()
    }

    pub fn param_size(&self, idx: usize) -> Result<usize> {
        Ok(self.param(idx)?.size)
    }

    pub fn param_dimss(&self) -> Vec<&[usize]> {
        self.params.iter().map(|p| p.dims.as_slice()).collect()
    }

    pub fn param_dims(&self, idx: usize) -> Result<&[usize]> {
        Ok(&self.param(idx)?.dims)
    }

    /// Position of `name` in registration order.
    ///
    /// An unregistered name is an [`ChainsError::InvalidArgument`] error.
    pub fn param_name_to_index(&self, name: &str) -> Result<usize> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| ChainsError::InvalidArgument(format!("unknown parameter '{name}'")))
    }

    /// Flat index of element `idxs` of parameter `param_idx`.
    pub fn get_total_param_index(&self, param_idx: usize, idxs: &[usize]) -> Result<usize> {
        let spec = self.param(param_idx)?;
        validate_dims_idxs(&spec.dims, idxs)?;
        Ok(spec.start + get_offset(&spec.dims, idxs))
    }

    /// One label per flat element: `name` for scalars, `name.i1.i2` with
    /// 1-based indexes otherwise.
    pub fn flat_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.num_params);
        for spec in &self.params {
            if spec.dims.is_empty() {
                names.push(spec.name.clone());
                continue;
            }
            names.extend(index_combinations(&spec.dims).map(|idxs| {
                let suffix: Vec<String> = idxs.iter().map(|i| (i + 1).to_string()).collect();
                format!("{}.{}", spec.name, suffix.join("."))
            }));
        }
        names
    }
}
