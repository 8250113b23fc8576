use super::error::Error;
use super::potential::Potential;
use super::site::Site;

/// An N-body connection between sites, optionally parametrized.
#[derive(Debug, Clone, PartialEq)]
pub struct Connection<const N: usize> {
    members: [Site; N],
    potential: Option<Potential>,
}

pub type Bond = Connection<2>;
pub type Angle = Connection<3>;
pub type Dihedral = Connection<4>;
/// Improper torsion; the central site comes first.
pub type Improper = Connection<4>;

impl<const N: usize> Connection<N> {
    pub fn new(members: [Site; N]) -> Self {
        Self {
            members,
            potential: None,
        }
    }

    pub fn with_potential(mut self, potential: Potential) -> Self {
        self.potential = Some(potential);
        self
    }

    pub fn members(&self) -> &[Site; N] {
        &self.members
    }

    pub fn potential(&self) -> Option<&Potential> {
        self.potential.as_ref()
    }

    pub fn set_potential(&mut self, potential: Option<Potential>) {
        self.potential = potential;
    }

    /// Member names joined with `-`, e.g. `C1-C2-O1`.
    pub fn label(&self) -> String {
        self.members
            .iter()
            .map(Site::name)
            .collect::<Vec<_>>()
            .join("-")
    }

    pub(crate) fn validate(&self, kind: &'static str) -> Result<(), Error> {
        for (i, a) in self.members.iter().enumerate() {
            if self.members[i + 1..].contains(a) {
                return Err(Error::invalid_connection(
                    kind,
                    format!("site '{a}' appears more than once in {}", self.label()),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_joins_member_names() {
        let angle = Angle::new([Site::new("H1"), Site::new("O"), Site::new("H2")]);
        assert_eq!(angle.label(), "H1-O-H2");
        assert!(angle.potential().is_none());
    }

    #[test]
    fn validate_rejects_repeated_members() {
        let a = Site::new("A");
        let bond = Bond::new([a.clone(), a]);
        let err = bond.validate("bond").unwrap_err();
        assert!(matches!(err, Error::InvalidConnection { kind: "bond", .. }));
    }

    #[test]
    fn distinct_sites_with_equal_names_are_valid() {
        let bond = Bond::new([Site::new("C"), Site::new("C")])
            .with_potential(Potential::harmonic_bond(1000.0, 0.154));
        assert!(bond.validate("bond").is_ok());
        assert_eq!(bond.potential().unwrap().parameter("r_eq"), Some(0.154));
    }
}
