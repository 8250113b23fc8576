//! Error types for potential-form classification.

use thiserror::Error;

use super::{Catalogue, PotentialForm};
use crate::expr;

/// Errors raised while matching a potential against a form catalogue.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The expression is not equivalent to any form in the catalogue.
    #[error("expression '{expression}' (in {variable}) matches no supported {catalogue} form")]
    NoMatchingForm {
        /// Catalogue that was searched.
        catalogue: Catalogue,
        /// The offending expression text.
        expression: String,
        /// The potential's independent variable.
        variable: String,
    },

    /// The form matched but a parameter it needs is absent.
    #[error("{form} potential is missing parameter '{parameter}'")]
    MissingParameter {
        form: PotentialForm,
        parameter: String,
    },

    /// The form matched but the parameter values have no Cassandra equivalent.
    #[error("{form} potential cannot be represented: {detail}")]
    Unrepresentable {
        form: PotentialForm,
        detail: String,
    },

    /// The expression text does not parse or evaluate.
    #[error(transparent)]
    Expression(#[from] expr::Error),
}

impl Error {
    pub fn no_matching_form(
        catalogue: Catalogue,
        expression: impl Into<String>,
        variable: impl Into<String>,
    ) -> Self {
        Self::NoMatchingForm {
            catalogue,
            expression: expression.into(),
            variable: variable.into(),
        }
    }

    pub fn missing_parameter(form: PotentialForm, parameter: impl Into<String>) -> Self {
        Self::MissingParameter {
            form,
            parameter: parameter.into(),
        }
    }

    pub fn unrepresentable(form: PotentialForm, detail: impl Into<String>) -> Self {
        Self::Unrepresentable {
            form,
            detail: detail.into(),
        }
    }
}
