//! File I/O for stored chains, each format behind its own cargo feature.

#[cfg(feature = "csv")]
pub mod csv;
