//! Storage and summary statistics for posterior draws from several MCMC chains.
//!
//! Parameters are registered once by name and dimensions ([`schema`]), draws
//! are appended per chain as flat vectors ([`chains`]) and kept draws are
//! summarised per chain or pooled across chains ([`stats`]).

pub mod chains;
pub mod error;
pub mod indexing;
pub mod io;
pub mod permutation;
pub mod schema;
pub mod stats;
pub mod variables;

pub use chains::Chains;
pub use error::{ChainsError, Result};
pub use schema::{IndexSchema, ParamSpec};
pub use stats::ParamSummary;
