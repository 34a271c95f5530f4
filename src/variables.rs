/*!
Infers parameter names and dimensions from flattened column names.

Sampler output names array elements `name.i1.i2...` with 1-based indexes
(`theta.2.3` is `theta[1, 2]` in 0-based terms). Columns without a numeric
suffix are scalars. The extent of each dimension is the largest index seen in
that position, so the output can be fed straight into
[`crate::chains::Chains::new`].

```rust
use mcmc_chains::variables::read_variables;

let columns = ["lp__", "mu.1", "mu.2", "sigma.1.1", "sigma.2.1", "sigma.1.2", "sigma.2.2"];
let vars = read_variables(&columns)?;
assert_eq!(
    vars,
    vec![
        ("lp__".to_string(), vec![]),
        ("mu".to_string(), vec![2]),
        ("sigma".to_string(), vec![2, 2]),
    ]
);
# Ok::<(), mcmc_chains::error::ChainsError>(())
```
*/

use std::collections::HashMap;

use crate::error::{ChainsError, Result};

/// Splits a column name into its base name and 1-based indexes.
///
/// Trailing dot-separated components are indexes as long as they parse as
/// integers; everything before them is the base name.
pub fn parse_column(column: &str) -> Result<(&str, Vec<usize>)> {
    let mut parts: Vec<&str> = column.split('.').collect();
    let mut idxs = Vec::new();
    while parts.len() > 1 {
        let Some(idx) = parts.last().and_then(|p| p.parse::<usize>().ok()) else {
            break;
        };
        if idx == 0 {
            return Err(ChainsError::InvalidArgument(format!(
                "column '{column}' uses index 0 but indexes are 1-based"
            )));
        }
        idxs.push(idx);
        parts.pop();
    }
    idxs.reverse();
    let base_len = parts.iter().map(|p| p.len()).sum::<usize>() + parts.len() - 1;
    let base = &column[..base_len];
    if base.is_empty() {
        return Err(ChainsError::InvalidArgument(format!(
            "column '{column}' has no parameter name"
        )));
    }
    Ok((base, idxs))
}

/**
Returns `(name, dims)` for every distinct base name, in order of first
appearance.

A scalar column such as `lp__` gets empty dims, not `[1]`. A schema built from
the result therefore labels it `lp__` again in
[`crate::schema::IndexSchema::flat_names`], while `[1]` would give `lp__.1`.

# Errors

[`ChainsError::InvalidArgument`] if a column is malformed or if the columns of
one parameter disagree on the number of indexes.
*/
pub fn read_variables<S: AsRef<str>>(columns: &[S]) -> Result<Vec<(String, Vec<usize>)>> {
    let mut vars: Vec<(String, Vec<usize>)> = Vec::new();
    let mut position: HashMap<String, usize> = HashMap::new();
    for column in columns {
        let (base, idxs) = parse_column(column.as_ref())?;
        match position.get(base).copied() {
            Some(pos) => {
                let dims = &mut vars[pos].1;
                if dims.len() != idxs.len() {
                    return Err(ChainsError::InvalidArgument(format!(
                        "column '{}' has {} indexes but '{}' was seen with {}",
                        column.as_ref(),
                        idxs.len(),
                        base,
                        dims.len()
                    )));
                }
                for (dim, idx) in dims.iter_mut().zip(idxs) {
                    *dim = (*dim).max(idx);
                }
            }
            None => {
                position.insert(base.to_string(), vars.len());
                vars.push((base.to_string(), idxs));
            }
        }
    }
    Ok(vars)
}
