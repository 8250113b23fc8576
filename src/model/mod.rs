//! Core data structures representing molecular topologies.
//!
//! - [`element`] – Periodic table elements with standard masses.
//! - [`site`] – Shared, identity-keyed particle handles.
//! - [`potential`] – Potential-energy expressions and shared atom types.
//! - [`connection`] – Bonds, angles, dihedrals and impropers between sites.
//! - [`topology`] – The canonical owner of sites, types and connections.
//! - [`subtopology`] – Named, non-owning groupings of a topology's sites.
//!
//! Sites and atom types are handles: cloning one yields another reference to
//! the same object, and set membership is decided by a process-unique
//! identity rather than by value. This is what lets a [`SubTopology`] and its
//! parent [`Topology`] hold the *same* site.
//!
//! [`SubTopology`]: subtopology::SubTopology
//! [`Topology`]: topology::Topology

use std::sync::atomic::{AtomicU64, Ordering};

pub mod connection;
pub mod element;
pub mod error;
pub mod potential;
pub mod site;
pub mod subtopology;
pub mod topology;

pub(crate) fn next_identity() -> u64 {
    static NEXT: AtomicU64 = AtomicU64::new(1);
    NEXT.fetch_add(1, Ordering::Relaxed)
}
