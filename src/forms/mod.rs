//! Recognition of supported potential functional forms.
//!
//! Cassandra only understands a fixed set of functional forms, each
//! identified by a keyword in the MCF file. This module decides which of
//! those forms a [`Potential`] actually implements, independent of how its
//! expression happens to be written: `4*epsilon*((sigma/r)**12 - (sigma/r)**6)`
//! and `4*epsilon*(sigma**12/r**12 - sigma**6/r**6)` are both Lennard-Jones.
//!
//! # Catalogues
//!
//! | Catalogue   | Forms (in priority order)          | MCF keywords      |
//! |-------------|------------------------------------|-------------------|
//! | non-bonded  | Lennard-Jones, Mie                 | `LJ`, `Mie`       |
//! | bond        | harmonic                           | `fixed`           |
//! | angle       | harmonic                           | `harmonic`        |
//! | dihedral    | OPLS, periodic                     | `OPLS`, `CHARMM`  |
//! | improper    | harmonic                           | `harmonic`        |
//!
//! # Equivalence
//!
//! An expression matches a form when it has exactly the form's free symbols
//! and agrees with the canonical expression, within a relative tolerance of
//! `1e-9`, at eight fixed sample points drawn from physically plausible
//! parameter ranges. The sample points are deterministic, so classification
//! is reproducible. The first matching form in the catalogue wins.
//!
//! # Examples
//!
//! ```
//! use topoforge::Potential;
//! use topoforge::forms::{self, Catalogue, PotentialForm};
//!
//! let mut lj = Potential::lennard_jones(0.996066, 0.3405);
//! lj.set_expression("4*epsilon*(sigma**12/r**12 - sigma**6/r**6)").unwrap();
//!
//! let found = forms::classify(Catalogue::NonBonded, &lj).unwrap();
//! assert_eq!(found.form, PotentialForm::LennardJones);
//! assert_eq!(found.form.mcf_tag(), "LJ");
//! ```

mod catalogue;
mod equivalence;
mod error;
pub mod units;

use std::fmt;

use catalogue::FormRule;

pub use catalogue::{
    HARMONIC_ANGLE, HARMONIC_BOND, HARMONIC_IMPROPER, LENNARD_JONES, MIE, OPLS_TORSION,
    PERIODIC_TORSION,
};
pub use error::Error;

use crate::expr;
use crate::model::potential::Potential;

/// A family of interactions with its own set of supported forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Catalogue {
    NonBonded,
    Bond,
    Angle,
    Dihedral,
    Improper,
}

impl Catalogue {
    fn rules(self) -> &'static [FormRule] {
        match self {
            Catalogue::NonBonded => catalogue::NON_BONDED,
            Catalogue::Bond => catalogue::BOND,
            Catalogue::Angle => catalogue::ANGLE,
            Catalogue::Dihedral => catalogue::DIHEDRAL,
            Catalogue::Improper => catalogue::IMPROPER,
        }
    }

    /// Forms in this catalogue, in matching priority.
    pub fn forms(self) -> impl Iterator<Item = PotentialForm> {
        self.rules().iter().map(|rule| rule.form)
    }
}

impl fmt::Display for Catalogue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Catalogue::NonBonded => "non-bonded",
            Catalogue::Bond => "bond",
            Catalogue::Angle => "angle",
            Catalogue::Dihedral => "dihedral",
            Catalogue::Improper => "improper",
        };
        f.write_str(name)
    }
}

/// A functional form Cassandra can represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PotentialForm {
    /// 12-6 Lennard-Jones.
    LennardJones,
    /// Mie n-m potential.
    Mie,
    /// Harmonic bond stretch; exported as a fixed bond.
    HarmonicBond,
    HarmonicAngle,
    /// Four-term OPLS Fourier series.
    OplsTorsion,
    /// Single-term periodic (CHARMM-style) torsion.
    PeriodicTorsion,
    HarmonicImproper,
}

impl PotentialForm {
    /// The keyword Cassandra uses for this form.
    pub fn mcf_tag(self) -> &'static str {
        match self {
            PotentialForm::LennardJones => "LJ",
            PotentialForm::Mie => "Mie",
            PotentialForm::HarmonicBond => "fixed",
            PotentialForm::HarmonicAngle | PotentialForm::HarmonicImproper => "harmonic",
            PotentialForm::OplsTorsion => "OPLS",
            PotentialForm::PeriodicTorsion => "CHARMM",
        }
    }

    pub fn canonical_expression(self) -> &'static str {
        match self {
            PotentialForm::LennardJones => LENNARD_JONES,
            PotentialForm::Mie => MIE,
            PotentialForm::HarmonicBond => HARMONIC_BOND,
            PotentialForm::HarmonicAngle => HARMONIC_ANGLE,
            PotentialForm::OplsTorsion => OPLS_TORSION,
            PotentialForm::PeriodicTorsion => PERIODIC_TORSION,
            PotentialForm::HarmonicImproper => HARMONIC_IMPROPER,
        }
    }
}

impl fmt::Display for PotentialForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PotentialForm::LennardJones => "Lennard-Jones",
            PotentialForm::Mie => "Mie",
            PotentialForm::HarmonicBond => "harmonic bond",
            PotentialForm::HarmonicAngle => "harmonic angle",
            PotentialForm::OplsTorsion => "OPLS torsion",
            PotentialForm::PeriodicTorsion => "periodic torsion",
            PotentialForm::HarmonicImproper => "harmonic improper",
        };
        f.write_str(name)
    }
}

/// The outcome of a successful classification.
#[derive(Debug, Clone, PartialEq)]
pub struct FormMatch {
    pub form: PotentialForm,
    /// Coefficients in Cassandra's order and units.
    pub coefficients: Vec<f64>,
}

/// Finds the first form in `catalogue` that `potential` implements.
///
/// The potential's independent variable must be the form's variable (`r`,
/// `theta` or `phi`). Once a form matches, its parameters are converted to
/// Cassandra units; a missing or unrepresentable parameter is an error and
/// later forms are not tried.
///
/// # Errors
///
/// - [`Error::Expression`] if the expression does not parse.
/// - [`Error::NoMatchingForm`] if no form in the catalogue is equivalent.
/// - [`Error::MissingParameter`] or [`Error::Unrepresentable`] if the matched
///   form's coefficients cannot be produced.
pub fn classify(catalogue: Catalogue, potential: &Potential) -> Result<FormMatch, Error> {
    let candidate = potential.parsed()?;
    for rule in catalogue.rules() {
        if rule.variable != potential.independent_variable() {
            continue;
        }
        let canonical = expr::parse(rule.form.canonical_expression())?;
        if equivalence::equivalent(&candidate, &canonical, rule.domains) {
            return Ok(FormMatch {
                form: rule.form,
                coefficients: rule.coefficients(potential)?,
            });
        }
    }
    Err(Error::no_matching_form(
        catalogue,
        potential.expression(),
        potential.independent_variable(),
    ))
}
