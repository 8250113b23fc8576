use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use super::element::Element;
use super::next_identity;
use super::potential::AtomType;

#[derive(Debug, Clone, PartialEq)]
struct SiteData {
    name: String,
    element: Option<Element>,
    position: [f64; 3],
    mass: Option<f64>,
    charge: Option<f64>,
    atom_type: Option<AtomType>,
}

/// A single particle.
///
/// `Site` is a handle: clones refer to the same particle, and equality and
/// hashing use a process-unique identity assigned at construction. Two sites
/// built from identical data are still distinct members of a registry.
#[derive(Clone)]
pub struct Site {
    id: u64,
    data: Rc<RefCell<SiteData>>,
}

impl Site {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: next_identity(),
            data: Rc::new(RefCell::new(SiteData {
                name: name.into(),
                element: None,
                position: [0.0; 3],
                mass: None,
                charge: None,
                atom_type: None,
            })),
        }
    }

    pub fn with_element(self, element: Element) -> Self {
        self.data.borrow_mut().element = Some(element);
        self
    }

    pub fn with_position(self, position: [f64; 3]) -> Self {
        self.data.borrow_mut().position = position;
        self
    }

    pub fn with_mass(self, mass: f64) -> Self {
        self.data.borrow_mut().mass = Some(mass);
        self
    }

    pub fn with_charge(self, charge: f64) -> Self {
        self.data.borrow_mut().charge = Some(charge);
        self
    }

    pub fn with_atom_type(self, atom_type: AtomType) -> Self {
        self.data.borrow_mut().atom_type = Some(atom_type);
        self
    }

    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> String {
        self.data.borrow().name.clone()
    }

    pub fn set_name(&self, name: impl Into<String>) {
        self.data.borrow_mut().name = name.into();
    }

    pub fn position(&self) -> [f64; 3] {
        self.data.borrow().position
    }

    /// The site's own element, else its atom type's.
    pub fn element(&self) -> Option<Element> {
        let data = self.data.borrow();
        data.element
            .or_else(|| data.atom_type.as_ref().and_then(AtomType::element))
    }

    /// The site's own mass, else its atom type's, else its element's standard mass.
    pub fn mass(&self) -> Option<f64> {
        let data = self.data.borrow();
        data.mass
            .or_else(|| data.atom_type.as_ref().and_then(AtomType::mass))
            .or_else(|| data.element.map(|e| e.atomic_mass()))
            .or_else(|| {
                data.atom_type
                    .as_ref()
                    .and_then(AtomType::element)
                    .map(|e| e.atomic_mass())
            })
    }

    /// The site's own charge, else its atom type's, else zero.
    pub fn charge(&self) -> f64 {
        let data = self.data.borrow();
        data.charge
            .or_else(|| data.atom_type.as_ref().and_then(AtomType::charge))
            .unwrap_or(0.0)
    }

    pub fn set_charge(&self, charge: Option<f64>) {
        self.data.borrow_mut().charge = charge;
    }

    pub fn atom_type(&self) -> Option<AtomType> {
        self.data.borrow().atom_type.clone()
    }

    pub fn set_atom_type(&self, atom_type: Option<AtomType>) {
        self.data.borrow_mut().atom_type = atom_type;
    }
}

impl PartialEq for Site {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Site {}

impl Hash for Site {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("Site");
        out.field("id", &self.id);
        match self.data.try_borrow() {
            Ok(data) => out
                .field("name", &data.name)
                .field("element", &data.element)
                .field("atom_type", &data.atom_type)
                .finish(),
            Err(_) => out.finish_non_exhaustive(),
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.data.try_borrow() {
            Ok(data) => write!(f, "{}", data.name),
            Err(_) => write!(f, "<site {}>", self.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::potential::Potential;
    use std::collections::HashSet;

    #[test]
    fn identity_not_value_decides_equality() {
        let a = Site::new("Ar");
        let b = Site::new("Ar");
        assert_ne!(a, b);
        assert_eq!(a, a.clone());

        let set: HashSet<Site> = [a.clone(), a.clone(), b].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn clones_observe_mutation() {
        let a = Site::new("C1");
        let alias = a.clone();
        alias.set_name("C2");
        alias.set_charge(Some(-0.5));
        assert_eq!(a.name(), "C2");
        assert_eq!(a.charge(), -0.5);
    }

    #[test]
    fn mass_and_charge_fall_back_through_atom_type_and_element() {
        let site = Site::new("Ar").with_element(Element::Ar);
        assert_eq!(site.mass(), Some(Element::Ar.atomic_mass()));
        assert_eq!(site.charge(), 0.0);

        let typed = AtomType::new(Potential::lennard_jones(1.0, 0.34))
            .with_mass(40.0)
            .with_charge(0.25)
            .with_element(Element::Ar);
        site.set_atom_type(Some(typed));
        assert_eq!(site.mass(), Some(40.0));
        assert_eq!(site.charge(), 0.25);

        let explicit = Site::new("X").with_mass(12.0).with_charge(1.0);
        assert_eq!(explicit.mass(), Some(12.0));
        assert_eq!(explicit.charge(), 1.0);
        assert_eq!(Site::new("bare").mass(), None);
    }

    #[test]
    fn element_falls_back_to_atom_type() {
        let typed = AtomType::new(Potential::lennard_jones(1.0, 0.34)).with_element(Element::Xe);
        let site = Site::new("Xe1").with_atom_type(typed);
        assert_eq!(site.element(), Some(Element::Xe));
        assert_eq!(site.mass(), Some(Element::Xe.atomic_mass()));
    }

    #[test]
    fn display_uses_name() {
        assert_eq!(Site::new("O1").to_string(), "O1");
    }
}
