//! Error types for topology construction and mutation.

use thiserror::Error;

/// Errors raised by [`Topology`](super::topology::Topology) and
/// [`SubTopology`](super::subtopology::SubTopology) operations.
///
/// Every variant is raised before any state is changed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The supplied parent handle does not refer to a live topology.
    #[error("argument {0} is not a live Topology")]
    InvalidParent(String),

    /// The requested operation is planned but not supported.
    #[error("{0} is not yet supported")]
    NotYetImplemented(&'static str),

    /// The operation needs a parent topology and the sub-topology has none.
    #[error("sub-topology '{0}' has no parent topology")]
    MissingParent(String),

    /// A site is not part of the topology's registry.
    #[error("site '{site}' is not registered in topology '{topology}'")]
    SiteNotFound {
        /// Name of the missing site.
        site: String,
        /// Name of the topology that was searched.
        topology: String,
    },

    /// The parent topology is already borrowed and cannot be accessed.
    #[error("parent topology is borrowed elsewhere")]
    ParentBusy,

    /// A connection is malformed, for example it names the same site twice.
    #[error("invalid {kind}: {detail}")]
    InvalidConnection {
        /// Connection kind ("bond", "angle", ...).
        kind: &'static str,
        /// Description of the problem.
        detail: String,
    },

    /// The topology document could not be serialized.
    #[error("failed to serialize topology: {0}")]
    Serialization(String),
}

impl Error {
    pub fn site_not_found(site: impl Into<String>, topology: impl Into<String>) -> Self {
        Self::SiteNotFound {
            site: site.into(),
            topology: topology.into(),
        }
    }

    pub fn invalid_connection(kind: &'static str, detail: impl Into<String>) -> Self {
        Self::InvalidConnection {
            kind,
            detail: detail.into(),
        }
    }
}
