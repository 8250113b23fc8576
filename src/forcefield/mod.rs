//! Force-field definitions loaded from TOML.
//!
//! A force field is a table of named atom types, each carrying a potential
//! expression with its parameters and, optionally, a mass, charge and element.
//! Loading turns every entry into a shared [`AtomType`] handle, so assigning a
//! type to many sites makes all of them observe later edits to that type.
//!
//! # Format
//!
//! ```toml
//! name = "noble-gases"
//!
//! [atom_types.Ar]
//! expression = "4*epsilon*((sigma/r)**12 - (sigma/r)**6)"
//! independent_variable = "r"   # optional, defaults to "r"
//! element = "Ar"               # optional
//! mass = 39.948                # optional, amu
//! charge = 0.0                 # optional, e
//! parameters = { epsilon = 0.996066, sigma = 0.3405 }
//! ```
//!
//! Parameters are given in internal units: kJ/mol, nm, rad.

mod error;

use std::collections::BTreeMap;
use std::sync::OnceLock;

use log::debug;
use serde::Deserialize;

pub use error::Error;

use crate::model::element::Element;
use crate::model::potential::{AtomType, Potential};
use crate::model::site::Site;
use crate::model::topology::Topology;

const BUILTIN_TOML: &str = include_str!("../../resources/noble_gases.toml");

static BUILTIN_PARAMS: OnceLock<ForceFieldParams> = OnceLock::new();

#[derive(Debug, Clone, Deserialize)]
pub struct ForceFieldParams {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub atom_types: BTreeMap<String, AtomTypeParams>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AtomTypeParams {
    pub expression: String,
    #[serde(default = "default_independent_variable")]
    pub independent_variable: String,
    #[serde(default)]
    pub parameters: BTreeMap<String, f64>,
    pub mass: Option<f64>,
    pub charge: Option<f64>,
    pub element: Option<String>,
}

fn default_name() -> String {
    "ForceField".to_string()
}
fn default_independent_variable() -> String {
    "r".to_string()
}

fn builtin_params() -> &'static ForceFieldParams {
    BUILTIN_PARAMS.get_or_init(|| {
        toml::from_str(BUILTIN_TOML)
            .expect("Failed to parse embedded force field. This is a library bug.")
    })
}

/// A set of named atom types.
#[derive(Debug, Clone)]
pub struct ForceField {
    name: String,
    atom_types: BTreeMap<String, AtomType>,
}

impl ForceField {
    /// Parses a force field from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] for malformed TOML, and [`Error::Expression`]
    /// or [`Error::Element`] naming the first atom type whose expression or
    /// element is invalid.
    pub fn from_toml(text: &str) -> Result<Self, Error> {
        let params: ForceFieldParams = toml::from_str(text)?;
        Self::from_params(&params)
    }

    pub fn from_params(params: &ForceFieldParams) -> Result<Self, Error> {
        let atom_types = params
            .atom_types
            .iter()
            .map(|(name, entry)| Ok((name.clone(), build_atom_type(name, entry)?)))
            .collect::<Result<BTreeMap<_, _>, Error>>()?;
        Ok(Self {
            name: params.name.clone(),
            atom_types,
        })
    }

    /// The embedded noble-gas force field: argon as Lennard-Jones, xenon as Mie.
    ///
    /// Each call returns fresh, unshared atom type handles.
    pub fn builtin() -> Self {
        Self::from_params(builtin_params())
            .expect("Embedded force field has invalid atom types. This is a library bug.")
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn atom_type(&self, name: &str) -> Option<&AtomType> {
        self.atom_types.get(name)
    }

    pub fn atom_types(&self) -> impl Iterator<Item = (&str, &AtomType)> {
        self.atom_types.iter().map(|(name, t)| (name.as_str(), t))
    }

    /// Gives `site` the atom type called `type_name`.
    pub fn assign(&self, site: &Site, type_name: &str) -> Result<(), Error> {
        let atom_type = self
            .atom_type(type_name)
            .ok_or_else(|| Error::MissingAtomType(type_name.to_string()))?;
        site.set_atom_type(Some(atom_type.clone()));
        Ok(())
    }

    /// Types every site whose name is also an atom type name, then registers
    /// the assigned types with `topology`.
    ///
    /// Sites with no matching type keep their current type. Returns the number
    /// of sites typed.
    pub fn assign_by_name(&self, topology: &mut Topology) -> usize {
        let mut assigned = 0;
        for site in topology.sites() {
            if let Some(atom_type) = self.atom_types.get(&site.name()) {
                site.set_atom_type(Some(atom_type.clone()));
                assigned += 1;
            }
        }
        topology.update_atom_types();
        debug!(
            "assigned '{}' atom types to {assigned} of {} sites in '{}'",
            self.name,
            topology.n_sites(),
            topology.name()
        );
        assigned
    }
}

fn build_atom_type(name: &str, entry: &AtomTypeParams) -> Result<AtomType, Error> {
    let potential = Potential::new(
        name,
        &entry.expression,
        entry.independent_variable.as_str(),
        entry.parameters.iter().map(|(k, v)| (k.as_str(), *v)),
    )
    .map_err(|e| Error::expression(name, e))?;

    let mut atom_type = AtomType::new(potential);
    if let Some(mass) = entry.mass {
        atom_type = atom_type.with_mass(mass);
    }
    if let Some(charge) = entry.charge {
        atom_type = atom_type.with_charge(charge);
    }
    if let Some(symbol) = &entry.element {
        let element: Element = symbol.parse().map_err(|e| Error::element(name, e))?;
        atom_type = atom_type.with_element(element);
    }
    Ok(atom_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::{self, Catalogue, PotentialForm};

    #[test]
    fn builtin_defines_argon_and_xenon() {
        let ff = ForceField::builtin();
        assert_eq!(ff.name(), "noble-gases");

        let ar = ff.atom_type("Ar").unwrap();
        assert_eq!(ar.element(), Some(Element::Ar));
        assert_eq!(ar.mass(), Some(39.948));
        let found = forms::classify(Catalogue::NonBonded, &ar.potential()).unwrap();
        assert_eq!(found.form, PotentialForm::LennardJones);

        let xe = ff.atom_type("Xe").unwrap();
        let found = forms::classify(Catalogue::NonBonded, &xe.potential()).unwrap();
        assert_eq!(found.form, PotentialForm::Mie);
        assert_eq!(&found.coefficients[2..], &[14.0, 6.0]);
    }

    #[test]
    fn builtin_handles_are_fresh_per_call() {
        let a = ForceField::builtin();
        let b = ForceField::builtin();
        assert_ne!(a.atom_type("Ar"), b.atom_type("Ar"));
    }

    #[test]
    fn defaults_fill_name_and_variable() {
        let ff = ForceField::from_toml(
            r#"
            [atom_types.CH4]
            expression = "4*epsilon*((sigma/r)**12 - (sigma/r)**6)"
            parameters = { epsilon = 1.23, sigma = 0.373 }
            "#,
        )
        .unwrap();
        assert_eq!(ff.name(), "ForceField");
        let methane = ff.atom_type("CH4").unwrap().potential();
        assert_eq!(methane.independent_variable(), "r");
        assert_eq!(methane.name(), "CH4");
        assert_eq!(methane.parameter("sigma"), Some(0.373));
    }

    #[test]
    fn malformed_expression_names_the_type() {
        let err = ForceField::from_toml(
            r#"
            [atom_types.broken]
            expression = "4*epsilon*("
            "#,
        )
        .unwrap_err();
        match err {
            Error::Expression { atom_type, .. } => assert_eq!(atom_type, "broken"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_element_is_rejected() {
        let err = ForceField::from_toml(
            r#"
            [atom_types.X]
            expression = "epsilon"
            element = "Qq"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Element { ref atom_type, .. } if atom_type == "X"));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        assert!(matches!(
            ForceField::from_toml("atom_types = 3"),
            Err(Error::Parse(_))
        ));
    }

    #[test]
    fn assign_by_name_types_matching_sites() {
        let ff = ForceField::builtin();
        let mut top = Topology::new("mixture");
        let ar = Site::new("Ar");
        let xe = Site::new("Xe");
        let other = Site::new("He");
        for site in [&ar, &xe, &other] {
            top.add_site(site, true);
        }

        assert_eq!(ff.assign_by_name(&mut top), 2);
        assert_eq!(ar.atom_type().as_ref(), ff.atom_type("Ar"));
        assert!(other.atom_type().is_none());
        assert_eq!(top.atom_types().len(), 2);
        assert_eq!(ar.mass(), Some(39.948));
    }

    #[test]
    fn assign_unknown_type_fails() {
        let ff = ForceField::builtin();
        let site = Site::new("Ne");
        assert!(matches!(
            ff.assign(&site, "Ne"),
            Err(Error::MissingAtomType(name)) if name == "Ne"
        ));
        ff.assign(&site, "Ar").unwrap();
        assert_eq!(site.element(), Some(Element::Ar));
    }
}
