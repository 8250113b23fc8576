//! File output for simulation engines.
//!
//! [`mcf::write`] renders a topology to any [`Write`](std::io::Write) sink;
//! [`write_mcf`] writes it to a path so that the destination either receives
//! the complete file or is left exactly as it was.

use std::io::Write;
use std::path::Path;

use log::info;
use tempfile::NamedTempFile;

pub mod error;
pub mod mcf;

pub use mcf::McfConfig;

use crate::model::topology::Topology;
use error::Error;

/// Writes `topology` as a Cassandra MCF file at `path`.
///
/// The document is validated and rendered in memory, written to a temporary
/// file in the destination directory and then renamed over `path`. If any
/// step fails, no file is created at `path` and an existing one is untouched.
///
/// # Errors
///
/// Returns [`Error::EngineIncompatibility`] if any site's atom type or any
/// connection's potential has no Cassandra equivalent,
/// [`Error::Unparametrized`] if required data is missing, and
/// [`Error::Io`]/[`Error::Persist`] for filesystem failures.
pub fn write_mcf(
    path: impl AsRef<Path>,
    topology: &Topology,
    config: &McfConfig,
) -> Result<(), Error> {
    let path = path.as_ref();
    let mut buffer = Vec::new();
    mcf::write(&mut buffer, topology, config)?;

    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(directory)?;
    file.write_all(&buffer)?;
    file.as_file().sync_all()?;
    file.persist(path)?;

    info!(
        "wrote MCF for '{}' ({} sites) to {}",
        topology.name(),
        topology.n_sites(),
        path.display()
    );
    Ok(())
}
