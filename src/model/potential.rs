use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use super::element::Element;
use super::next_identity;
use crate::expr::{self, Expr};
use crate::forms::{
    HARMONIC_ANGLE, HARMONIC_BOND, HARMONIC_IMPROPER, LENNARD_JONES, MIE, OPLS_TORSION,
    PERIODIC_TORSION,
};

/// A named potential-energy expression with numeric parameters.
///
/// Parameters are stored in internal units (kJ/mol, nm, rad). The expression
/// text is validated by parsing whenever it is set.
#[derive(Debug, Clone, PartialEq)]
pub struct Potential {
    name: String,
    expression: String,
    independent_variable: String,
    parameters: BTreeMap<String, f64>,
}

impl Potential {
    pub fn new<K: Into<String>>(
        name: impl Into<String>,
        expression: &str,
        independent_variable: impl Into<String>,
        parameters: impl IntoIterator<Item = (K, f64)>,
    ) -> Result<Self, expr::Error> {
        expr::parse(expression)?;
        Ok(Self::canonical(name, expression, independent_variable, parameters))
    }

    fn canonical<K: Into<String>>(
        name: impl Into<String>,
        expression: &str,
        independent_variable: impl Into<String>,
        parameters: impl IntoIterator<Item = (K, f64)>,
    ) -> Self {
        Self {
            name: name.into(),
            expression: expression.to_string(),
            independent_variable: independent_variable.into(),
            parameters: parameters
                .into_iter()
                .map(|(key, value)| (key.into(), value))
                .collect(),
        }
    }

    pub fn lennard_jones(epsilon: f64, sigma: f64) -> Self {
        Self::canonical(
            "LennardJonesPotential",
            LENNARD_JONES,
            "r",
            [("epsilon", epsilon), ("sigma", sigma)],
        )
    }

    pub fn mie(epsilon: f64, sigma: f64, n: f64, m: f64) -> Self {
        Self::canonical(
            "MiePotential",
            MIE,
            "r",
            [("epsilon", epsilon), ("sigma", sigma), ("n", n), ("m", m)],
        )
    }

    pub fn harmonic_bond(k: f64, r_eq: f64) -> Self {
        Self::canonical(
            "HarmonicBondPotential",
            HARMONIC_BOND,
            "r",
            [("k", k), ("r_eq", r_eq)],
        )
    }

    pub fn harmonic_angle(k: f64, theta_eq: f64) -> Self {
        Self::canonical(
            "HarmonicAnglePotential",
            HARMONIC_ANGLE,
            "theta",
            [("k", k), ("theta_eq", theta_eq)],
        )
    }

    pub fn periodic_torsion(k: f64, n: f64, phi_eq: f64) -> Self {
        Self::canonical(
            "PeriodicTorsionPotential",
            PERIODIC_TORSION,
            "phi",
            [("k", k), ("n", n), ("phi_eq", phi_eq)],
        )
    }

    /// OPLS torsion with Fourier coefficients `k0` through `k4`.
    pub fn opls_torsion(k: [f64; 5]) -> Self {
        Self::canonical(
            "OPLSTorsionPotential",
            OPLS_TORSION,
            "phi",
            [
                ("k0", k[0]),
                ("k1", k[1]),
                ("k2", k[2]),
                ("k3", k[3]),
                ("k4", k[4]),
            ],
        )
    }

    pub fn harmonic_improper(k: f64, phi_eq: f64) -> Self {
        Self::canonical(
            "HarmonicImproperPotential",
            HARMONIC_IMPROPER,
            "phi",
            [("k", k), ("phi_eq", phi_eq)],
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn independent_variable(&self) -> &str {
        &self.independent_variable
    }

    pub fn parameters(&self) -> &BTreeMap<String, f64> {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<f64> {
        self.parameters.get(name).copied()
    }

    /// Replaces the expression, leaving the potential unchanged on a parse error.
    pub fn set_expression(&mut self, expression: &str) -> Result<(), expr::Error> {
        expr::parse(expression)?;
        self.expression = expression.to_string();
        Ok(())
    }

    pub fn set_parameter(&mut self, name: impl Into<String>, value: f64) {
        self.parameters.insert(name.into(), value);
    }

    pub fn parsed(&self) -> Result<Expr, expr::Error> {
        expr::parse(&self.expression)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct AtomTypeData {
    potential: Potential,
    mass: Option<f64>,
    charge: Option<f64>,
    element: Option<Element>,
}

/// A shared non-bonded parameter type.
///
/// Cloning an `AtomType` yields another handle to the same type, so an
/// expression change made through one handle is seen by every site that
/// references the type. Equality and hashing use the type's identity.
#[derive(Clone)]
pub struct AtomType {
    id: u64,
    data: Rc<RefCell<AtomTypeData>>,
}

impl AtomType {
    pub fn new(potential: Potential) -> Self {
        Self {
            id: next_identity(),
            data: Rc::new(RefCell::new(AtomTypeData {
                potential,
                mass: None,
                charge: None,
                element: None,
            })),
        }
    }

    pub fn with_mass(self, mass: f64) -> Self {
        self.data.borrow_mut().mass = Some(mass);
        self
    }

    pub fn with_charge(self, charge: f64) -> Self {
        self.data.borrow_mut().charge = Some(charge);
        self
    }

    pub fn with_element(self, element: Element) -> Self {
        self.data.borrow_mut().element = Some(element);
        self
    }

    pub fn with_name(self, name: impl Into<String>) -> Self {
        self.data.borrow_mut().potential.name = name.into();
        self
    }

    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> String {
        self.data.borrow().potential.name.clone()
    }

    /// Returns a snapshot of the type's potential.
    pub fn potential(&self) -> Potential {
        self.data.borrow().potential.clone()
    }

    pub fn expression(&self) -> String {
        self.data.borrow().potential.expression.clone()
    }

    pub fn set_expression(&self, expression: &str) -> Result<(), expr::Error> {
        self.data.borrow_mut().potential.set_expression(expression)
    }

    pub fn set_parameter(&self, name: impl Into<String>, value: f64) {
        self.data.borrow_mut().potential.set_parameter(name, value);
    }

    pub fn mass(&self) -> Option<f64> {
        self.data.borrow().mass
    }

    pub fn charge(&self) -> Option<f64> {
        self.data.borrow().charge
    }

    pub fn element(&self) -> Option<Element> {
        self.data.borrow().element
    }
}

impl PartialEq for AtomType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for AtomType {}

impl Hash for AtomType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for AtomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("AtomType");
        out.field("id", &self.id);
        match self.data.try_borrow() {
            Ok(data) => out
                .field("name", &data.potential.name)
                .field("expression", &data.potential.expression)
                .finish(),
            Err(_) => out.finish_non_exhaustive(),
        }
    }
}
