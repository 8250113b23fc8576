//! Hierarchical molecular topologies with force-field aware export to the
//! Cassandra Monte Carlo engine.
//!
//! # Features
//!
//! - **Shared topology model** – Sites and atom types are identity-keyed
//!   handles, so a [`SubTopology`] groups the very same sites its parent
//!   [`Topology`] owns, and editing an [`AtomType`] is seen by every site
//!   that uses it
//! - **Symbolic potentials** – Potential-energy expressions are parsed and
//!   evaluated, not pattern-matched on their text
//! - **Form recognition** – Lennard-Jones, Mie, harmonic and torsion forms are
//!   recognized however their expressions are written
//! - **Cassandra MCF export** – All-or-nothing: an incompatible potential
//!   aborts the export before anything is written
//!
//! # Quick Start
//!
//! ```
//! use topoforge::{ForceField, McfConfig, Site, SubTopology, Topology, TopologyRef};
//!
//! // One argon atom, grouped in a sub-topology.
//! let topology = TopologyRef::new(Topology::new("argon"));
//! let atom = topology.add_subtopology(SubTopology::new("atom"))?;
//! atom.borrow_mut().add_site(&Site::new("Ar"), true)?;
//! assert_eq!(topology.borrow().n_sites(), 1);
//!
//! // Type it with the embedded noble-gas force field.
//! let force_field = ForceField::builtin();
//! assert_eq!(force_field.assign_by_name(&mut topology.borrow_mut()), 1);
//!
//! // Render the MCF in memory.
//! let mut buffer = Vec::new();
//! topoforge::io::mcf::write(&mut buffer, &topology.borrow(), &McfConfig::default())?;
//! let text = String::from_utf8(buffer)?;
//! assert!(text.contains("# Atom_Info"));
//! assert!(text.contains(" LJ "));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Module Organization
//!
//! - [`expr`] – Parsing and evaluation of potential expressions
//! - [`forms`] – Catalogue of Cassandra-compatible functional forms
//! - [`io`] – MCF output and atomic file writes
//!
//! # Data Types
//!
//! - [`Site`] – A particle with optional element, mass, charge and atom type
//! - [`AtomType`] – Shared non-bonded type wrapping a [`Potential`]
//! - [`Bond`], [`Angle`], [`Dihedral`], [`Improper`] – Parametrized connections
//! - [`Topology`] / [`TopologyRef`] – Canonical owner of sites and connections
//! - [`SubTopology`] – Named grouping of a topology's sites
//! - [`ForceField`] – Named atom types loaded from TOML

mod forcefield;
mod model;

pub mod expr;
pub mod forms;
pub mod io;

#[cfg(test)]
mod test_log;

pub use model::connection::{Angle, Bond, Connection, Dihedral, Improper};
pub use model::element::{Element, ParseElementError};
pub use model::potential::{AtomType, Potential};
pub use model::site::Site;
pub use model::subtopology::{
    DEFAULT_SUBTOPOLOGY_NAME, SharedSubTopology, SubTopology, SubTopologyJson,
};
pub use model::topology::{SiteJson, Topology, TopologyJson, TopologyRef, WeakTopology};

pub use forcefield::{AtomTypeParams, ForceField, ForceFieldParams};
pub use io::{McfConfig, write_mcf};

pub use expr::Error as ExprError;
pub use forcefield::Error as ForceFieldError;
pub use forms::Error as FormError;
pub use io::error::Error as IoError;
pub use model::error::Error as TopologyError;
