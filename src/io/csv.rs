/*!
# CSV input and output for [`Chains`]

Enable via the `csv` feature.

Two layouts are understood:

- **Sampler output**: one file per chain, `#` comment lines allowed, one
  column per flat parameter named `name` or `name.i1.i2...` (1-based). Read
  with [`read_variables`] and [`load_chain`].
- **Pooled table**: the layout written by [`save_csv`], with leading `chain`
  and `sample` columns followed by the flat parameter columns. Read back with
  [`load_csv`].
*/

use std::error::Error;
use std::fs::File;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Writer};
use log::{debug, warn};

use crate::chains::Chains;
use crate::schema::IndexSchema;
use crate::variables::{self, parse_column};

// Row widths are not enforced by the reader; callers use `check_width`.
fn reader(path: &Path) -> Result<csv::Reader<File>, Box<dyn Error>> {
    Ok(ReaderBuilder::new()
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)?)
}

fn check_width(record: &StringRecord, width: usize, path: &Path) -> Result<(), Box<dyn Error>> {
    if record.len() != width {
        warn!(
            "Row with {} fields in {:?}, expected {}",
            record.len(),
            path,
            width
        );
        return Err(format!(
            "row width {} does not match the header width {} on line {:?}",
            record.len(),
            width,
            record.position().map(|p| p.line())
        )
        .into());
    }
    Ok(())
}

/// Column names of a sampler CSV file, skipping `#` comment lines.
pub fn read_header<P: AsRef<Path>>(path: P) -> Result<Vec<String>, Box<dyn Error>> {
    let mut rdr = reader(path.as_ref())?;
    Ok(rdr.headers()?.iter().map(str::to_string).collect())
}

/**
Infers `(name, dims)` for every parameter in the header of a sampler CSV file.

# Example

```rust
use mcmc_chains::io::csv::read_variables;
use std::io::Write;

let mut file = tempfile::NamedTempFile::new()?;
writeln!(file, "# comment lines are skipped")?;
writeln!(file, "lp__,theta.1,theta.2")?;
writeln!(file, "-1.5,0.1,0.2")?;

let vars = read_variables(file.path())?;
assert_eq!(vars, vec![("lp__".to_string(), vec![]), ("theta".to_string(), vec![2])]);
# Ok::<(), Box<dyn std::error::Error>>(())
```
*/
pub fn read_variables<P: AsRef<Path>>(
    path: P,
) -> Result<Vec<(String, Vec<usize>)>, Box<dyn Error>> {
    Ok(variables::read_variables(&read_header(path)?)?)
}

/// Maps every column to its flat index in `schema`, requiring every flat
/// parameter to appear exactly once.
fn column_map<S: AsRef<str>>(
    schema: &IndexSchema,
    columns: &[S],
) -> Result<Vec<usize>, Box<dyn Error>> {
    let mut seen = vec![false; schema.num_params()];
    let mut map = Vec::with_capacity(columns.len());
    for column in columns {
        let (base, idxs) = parse_column(column.as_ref())?;
        let param_idx = schema.param_name_to_index(base)?;
        let zero_based: Vec<usize> = idxs.iter().map(|i| i - 1).collect();
        let flat = schema.get_total_param_index(param_idx, &zero_based)?;
        if std::mem::replace(&mut seen[flat], true) {
            return Err(format!("column '{}' appears twice", column.as_ref()).into());
        }
        map.push(flat);
    }
    if let Some(missing) = seen.iter().position(|s| !s) {
        return Err(format!("no column for flat parameter {missing}").into());
    }
    Ok(map)
}

fn parse_draw(
    record: &StringRecord,
    values: usize,
    map: &[usize],
    width: usize,
) -> Result<Vec<f64>, Box<dyn Error>> {
    let mut draw = vec![0.0; width];
    for (field, &flat) in record.iter().skip(values).zip(map) {
        draw[flat] = field.parse::<f64>().map_err(|e| {
            format!(
                "cannot parse '{field}' on line {:?}: {e}",
                record.position().map(|p| p.line())
            )
        })?;
    }
    Ok(draw)
}

/**
Appends every row of a sampler CSV file to chain `chain`.

Columns may come in any order but must cover the store's schema exactly. The
file is read completely before anything is added, so a malformed file leaves
the store unchanged. Returns the number of draws added.
*/
pub fn load_chain<P: AsRef<Path>>(
    chains: &mut Chains,
    chain: usize,
    path: P,
) -> Result<usize, Box<dyn Error>> {
    chains.num_chain_samples(chain)?;
    let mut rdr = reader(path.as_ref())?;
    let header = rdr.headers()?.clone();
    let map = column_map(chains.schema(), &header.iter().collect::<Vec<_>>())?;

    let mut draws = Vec::new();
    for record in rdr.records() {
        let record = record?;
        check_width(&record, header.len(), path.as_ref())?;
        draws.push(parse_draw(&record, 0, &map, chains.num_params())?);
    }
    for draw in &draws {
        chains.add(chain, draw)?;
    }
    debug!(
        "Loaded {} draws into chain {} from {:?}",
        draws.len(),
        chain,
        path.as_ref()
    );
    Ok(draws.len())
}

/**
Saves every draw (warmup included) of `chains` as a CSV file.

The header holds `"chain"`, `"sample"` and one column per flat parameter,
labelled as in [`IndexSchema::flat_names`]. Each following row is one draw of
one chain, chains in order.

# Examples

```rust
use mcmc_chains::chains::Chains;
use mcmc_chains::io::csv::save_csv;

let mut chains = Chains::new(1, [("a", vec![2])])?;
chains.add(0, &[1.0, 2.0])?;
save_csv(&chains, "/tmp/output.csv")?;
# Ok::<(), Box<dyn std::error::Error>>(())
```
*/
pub fn save_csv<P: AsRef<Path>>(chains: &Chains, filename: P) -> Result<(), Box<dyn Error>> {
    let mut wtr = Writer::from_writer(File::create(filename)?);

    let mut header: Vec<String> = vec!["chain".to_string(), "sample".to_string()];
    header.extend(chains.schema().flat_names());
    wtr.write_record(&header)?;

    for chain_idx in 0..chains.num_chains() {
        for (sample_idx, sample) in chains.chain_draws(chain_idx)?.iter().enumerate() {
            let mut row = vec![chain_idx.to_string(), sample_idx.to_string()];
            row.extend(sample.iter().map(|v| v.to_string()));
            wtr.write_record(&row)?;
        }
    }

    wtr.flush()?;
    Ok(())
}

/// Rebuilds a store from a file written by [`save_csv`].
///
/// The number of chains is one more than the largest chain index found; the
/// warmup is zero and the seed is the default.
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Chains, Box<dyn Error>> {
    let mut rdr = reader(path.as_ref())?;
    let header = rdr.headers()?.clone();
    if header.get(0) != Some("chain") || header.get(1) != Some("sample") {
        return Err("expected leading 'chain' and 'sample' columns".into());
    }
    let columns: Vec<&str> = header.iter().skip(2).collect();
    let schema = IndexSchema::new(variables::read_variables(&columns)?)?;
    let map = column_map(&schema, &columns)?;

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        check_width(&record, header.len(), path.as_ref())?;
        let chain: usize = record
            .get(0)
            .ok_or("missing chain column")?
            .parse()?;
        rows.push((chain, parse_draw(&record, 2, &map, schema.num_params())?));
    }
    let num_chains = rows.iter().map(|(chain, _)| chain + 1).max().unwrap_or(0);

    let mut chains = Chains::from_schema(num_chains, schema);
    for (chain, draw) in &rows {
        chains.add(*chain, draw)?;
    }
    Ok(chains)
}
