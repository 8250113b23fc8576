use super::error::Error;
use super::units::{kj_per_mol_to_kelvin, nm_to_angstrom, rad_to_deg};
use super::PotentialForm;
use crate::model::potential::Potential;

pub const LENNARD_JONES: &str = "4*epsilon*((sigma/r)**12 - (sigma/r)**6)";
pub const MIE: &str = "(n/(n-m))*(n/m)**(m/(n-m))*epsilon*((sigma/r)**n - (sigma/r)**m)";
pub const HARMONIC_BOND: &str = "0.5*k*(r-r_eq)**2";
pub const HARMONIC_ANGLE: &str = "0.5*k*(theta-theta_eq)**2";
pub const OPLS_TORSION: &str = "0.5*k0 + 0.5*k1*(1+cos(phi)) + 0.5*k2*(1-cos(2*phi)) \
                                + 0.5*k3*(1+cos(3*phi)) + 0.5*k4*(1-cos(4*phi))";
pub const PERIODIC_TORSION: &str = "k*(1+cos(n*phi-phi_eq))";
pub const HARMONIC_IMPROPER: &str = "0.5*k*(phi-phi_eq)**2";

/// Half-open sampling interval for one symbol.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Domain {
    lo: f64,
    hi: f64,
}

impl Domain {
    pub(crate) const fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    /// Point at `fraction` (in `[0, 1)`) of the way through the interval.
    pub(crate) fn at(&self, fraction: f64) -> f64 {
        self.lo + fraction * (self.hi - self.lo)
    }
}

const DISTANCE: Domain = Domain::new(0.25, 1.5);
const BOND_LENGTH: Domain = Domain::new(0.08, 0.25);
const ENERGY: Domain = Domain::new(0.1, 5.0);
const SIZE: Domain = Domain::new(0.2, 0.6);
const FORCE_CONSTANT: Domain = Domain::new(10.0, 500.0);
const TORSION: Domain = Domain::new(-3.0, 3.0);
const PHASE: Domain = Domain::new(-1.0, 1.0);

/// One entry of a form catalogue: a canonical expression, the variable it is
/// written in, sampling domains for all of its symbols, and the conversion of
/// its parameters into Cassandra coefficients.
pub(crate) struct FormRule {
    pub form: PotentialForm,
    pub variable: &'static str,
    pub domains: &'static [(&'static str, Domain)],
    extract: fn(&Parameters<'_>) -> Result<Vec<f64>, Error>,
}

impl FormRule {
    pub(crate) fn coefficients(&self, potential: &Potential) -> Result<Vec<f64>, Error> {
        (self.extract)(&Parameters {
            form: self.form,
            potential,
        })
    }
}

struct Parameters<'a> {
    form: PotentialForm,
    potential: &'a Potential,
}

impl Parameters<'_> {
    fn get(&self, name: &str) -> Result<f64, Error> {
        self.potential
            .parameter(name)
            .ok_or_else(|| Error::missing_parameter(self.form, name))
    }
}

pub(crate) const NON_BONDED: &[FormRule] = &[
    FormRule {
        form: PotentialForm::LennardJones,
        variable: "r",
        domains: &[("r", DISTANCE), ("epsilon", ENERGY), ("sigma", SIZE)],
        extract: |p| {
            Ok(vec![
                kj_per_mol_to_kelvin(p.get("epsilon")?),
                nm_to_angstrom(p.get("sigma")?),
            ])
        },
    },
    FormRule {
        form: PotentialForm::Mie,
        variable: "r",
        domains: &[
            ("r", DISTANCE),
            ("epsilon", ENERGY),
            ("sigma", SIZE),
            ("n", Domain::new(9.0, 15.0)),
            ("m", Domain::new(4.0, 8.0)),
        ],
        extract: |p| {
            Ok(vec![
                kj_per_mol_to_kelvin(p.get("epsilon")?),
                nm_to_angstrom(p.get("sigma")?),
                p.get("n")?,
                p.get("m")?,
            ])
        },
    },
];

/// Cassandra bonds are rigid, so only the equilibrium length is exported.
pub(crate) const BOND: &[FormRule] = &[FormRule {
    form: PotentialForm::HarmonicBond,
    variable: "r",
    domains: &[
        ("r", BOND_LENGTH),
        ("k", FORCE_CONSTANT),
        ("r_eq", BOND_LENGTH),
    ],
    extract: |p| Ok(vec![nm_to_angstrom(p.get("r_eq")?)]),
}];

pub(crate) const ANGLE: &[FormRule] = &[FormRule {
    form: PotentialForm::HarmonicAngle,
    variable: "theta",
    domains: &[
        ("theta", Domain::new(1.0, 2.5)),
        ("k", FORCE_CONSTANT),
        ("theta_eq", Domain::new(1.5, 2.2)),
    ],
    extract: |p| {
        Ok(vec![
            kj_per_mol_to_kelvin(0.5 * p.get("k")?),
            rad_to_deg(p.get("theta_eq")?),
        ])
    },
}];

pub(crate) const DIHEDRAL: &[FormRule] = &[
    FormRule {
        form: PotentialForm::OplsTorsion,
        variable: "phi",
        domains: &[
            ("phi", TORSION),
            ("k0", ENERGY),
            ("k1", ENERGY),
            ("k2", ENERGY),
            ("k3", ENERGY),
            ("k4", ENERGY),
        ],
        extract: |p| {
            let k4 = p.get("k4")?;
            if k4 != 0.0 {
                return Err(Error::unrepresentable(
                    p.form,
                    format!("k4 = {k4} but Cassandra's OPLS form stops at the cos(3*phi) term"),
                ));
            }
            ["k0", "k1", "k2", "k3"]
                .iter()
                .map(|name| p.get(name).map(|k| 0.5 * k))
                .collect()
        },
    },
    FormRule {
        form: PotentialForm::PeriodicTorsion,
        variable: "phi",
        domains: &[
            ("phi", TORSION),
            ("k", ENERGY),
            ("n", Domain::new(1.0, 4.0)),
            ("phi_eq", PHASE),
        ],
        extract: |p| {
            Ok(vec![
                p.get("k")?,
                p.get("n")?,
                rad_to_deg(p.get("phi_eq")?),
            ])
        },
    },
];

pub(crate) const IMPROPER: &[FormRule] = &[FormRule {
    form: PotentialForm::HarmonicImproper,
    variable: "phi",
    domains: &[("phi", TORSION), ("k", FORCE_CONSTANT), ("phi_eq", PHASE)],
    extract: |p| {
        Ok(vec![
            kj_per_mol_to_kelvin(0.5 * p.get("k")?),
            rad_to_deg(p.get("phi_eq")?),
        ])
    },
}];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::parse;
    use std::collections::BTreeSet;

    fn all_rules() -> impl Iterator<Item = &'static FormRule> {
        [NON_BONDED, BOND, ANGLE, DIHEDRAL, IMPROPER]
            .into_iter()
            .flatten()
    }

    #[test]
    fn every_canonical_expression_parses_with_covered_symbols() {
        for rule in all_rules() {
            let parsed = parse(rule.form.canonical_expression()).unwrap();
            let domains: BTreeSet<&str> = rule.domains.iter().map(|(name, _)| *name).collect();
            assert_eq!(parsed.symbols(), domains, "{}", rule.form);
            assert!(domains.contains(rule.variable), "{}", rule.form);
        }
    }

    #[test]
    fn missing_parameter_is_reported_by_name() {
        let potential = Potential::new("partial", LENNARD_JONES, "r", [("epsilon", 1.0)]).unwrap();
        let err = NON_BONDED[0].coefficients(&potential).unwrap_err();
        assert_eq!(
            err,
            Error::missing_parameter(PotentialForm::LennardJones, "sigma")
        );
    }

    #[test]
    fn opls_rejects_fourth_order_term() {
        let rule = &DIHEDRAL[0];
        let ok = Potential::opls_torsion([0.0, 2.0, 1.0, 4.0, 0.0]);
        assert_eq!(rule.coefficients(&ok).unwrap(), vec![0.0, 1.0, 0.5, 2.0]);

        let bad = Potential::opls_torsion([0.0, 2.0, 1.0, 4.0, 0.3]);
        assert!(matches!(
            rule.coefficients(&bad),
            Err(Error::Unrepresentable { .. })
        ));
    }
}
