use thiserror::Error;

use crate::forms;
use crate::model::error::Error as TopologyError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O operation failed: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("failed to move the written file into place: {0}")]
    Persist(#[from] tempfile::PersistError),

    /// A site or connection uses a potential the target engine cannot express.
    #[error("{entity} is incompatible with Cassandra: {source}")]
    EngineIncompatibility {
        entity: String,
        source: forms::Error,
    },

    /// A site or connection lacks data the target format requires.
    #[error("{entity} cannot be written: {detail}")]
    Unparametrized {
        entity: String,
        detail: &'static str,
    },

    #[error(transparent)]
    Topology(#[from] TopologyError),
}

impl Error {
    pub fn incompatible(entity: impl Into<String>, source: forms::Error) -> Self {
        Self::EngineIncompatibility {
            entity: entity.into(),
            source,
        }
    }

    pub fn unparametrized(entity: impl Into<String>, detail: &'static str) -> Self {
        Self::Unparametrized {
            entity: entity.into(),
            detail,
        }
    }
}
