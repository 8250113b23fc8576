//! Cassandra molecular connectivity file (MCF) output.
//!
//! An MCF describes one molecular species: its atoms with non-bonded
//! parameters, its bonded terms, intramolecular scaling factors, and the
//! rigid fragments Cassandra uses for configurational-bias moves.
//!
//! Comment lines start with `!`, each section starts with a `# Name` header
//! followed by a row count, and the file ends with `END`. Indices are
//! 1-based and follow the topology's site registry order.

mod config;
mod fragment;
mod writer;

pub use config::McfConfig;
pub use writer::write;
