//! Error types for force-field loading and assignment.

use thiserror::Error;

use crate::expr;
use crate::model::element::ParseElementError;

/// Errors raised while loading a force field or assigning its types.
#[derive(Debug, Error)]
pub enum Error {
    /// The force-field TOML is malformed.
    #[error("failed to parse force field: {0}")]
    Parse(#[from] toml::de::Error),

    /// An atom type's expression does not parse.
    #[error("invalid expression for atom type '{atom_type}': {source}")]
    Expression {
        /// Name of the offending atom type.
        atom_type: String,
        source: expr::Error,
    },

    /// An atom type names an unknown element.
    #[error("invalid element for atom type '{atom_type}': {source}")]
    Element {
        atom_type: String,
        source: ParseElementError,
    },

    /// The requested atom type is not defined by the force field.
    #[error("atom type '{0}' is not defined in this force field")]
    MissingAtomType(String),
}

impl Error {
    pub fn expression(atom_type: impl Into<String>, source: expr::Error) -> Self {
        Self::Expression {
            atom_type: atom_type.into(),
            source,
        }
    }

    pub fn element(atom_type: impl Into<String>, source: ParseElementError) -> Self {
        Self::Element {
            atom_type: atom_type.into(),
            source,
        }
    }
}
