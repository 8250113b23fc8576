use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::{Rc, Weak};

use indexmap::IndexSet;
use serde::Serialize;

use super::connection::{Angle, Bond, Connection, Dihedral, Improper};
use super::error::Error;
use super::potential::AtomType;
use super::site::Site;
use super::subtopology::{SharedSubTopology, SubTopology, SubTopologyJson};

/// The canonical owner of sites, atom types and connections.
///
/// Registry order is insertion order and never changes for a site once it is
/// registered, so [`get_index`](Self::get_index) is stable.
#[derive(Debug, Default)]
pub struct Topology {
    name: String,
    sites: IndexSet<Site>,
    atom_types: IndexSet<AtomType>,
    bonds: Vec<Bond>,
    angles: Vec<Angle>,
    dihedrals: Vec<Dihedral>,
    impropers: Vec<Improper>,
    subtopologies: Vec<SharedSubTopology>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteJson {
    pub name: String,
    pub element: Option<String>,
    pub mass: Option<f64>,
    pub charge: f64,
    pub atom_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopologyJson {
    pub name: String,
    pub atoms: Vec<SiteJson>,
    pub atom_types: Vec<String>,
    pub bonds: Vec<[usize; 2]>,
    pub subtopologies: Vec<SubTopologyJson>,
}

impl Topology {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn sites(&self) -> &IndexSet<Site> {
        &self.sites
    }

    #[inline]
    pub fn n_sites(&self) -> usize {
        self.sites.len()
    }

    pub fn site(&self, index: usize) -> Option<&Site> {
        self.sites.get_index(index)
    }

    pub fn atom_types(&self) -> &IndexSet<AtomType> {
        &self.atom_types
    }

    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    pub fn angles(&self) -> &[Angle] {
        &self.angles
    }

    pub fn dihedrals(&self) -> &[Dihedral] {
        &self.dihedrals
    }

    pub fn impropers(&self) -> &[Improper] {
        &self.impropers
    }

    pub fn subtopologies(&self) -> &[SharedSubTopology] {
        &self.subtopologies
    }

    #[inline]
    pub fn n_subtopologies(&self) -> usize {
        self.subtopologies.len()
    }

    /// Registers a site, returning `false` if it was already registered.
    ///
    /// With `update_types`, the site's atom type (if any) joins the type
    /// registry as well.
    pub fn add_site(&mut self, site: &Site, update_types: bool) -> bool {
        let inserted = self.sites.insert(site.clone());
        if update_types && let Some(atom_type) = site.atom_type() {
            self.atom_types.insert(atom_type);
        }
        inserted
    }

    /// Position of `site` in the canonical registry.
    pub fn get_index(&self, site: &Site) -> Option<usize> {
        self.sites.get_index_of(site)
    }

    pub(crate) fn index_of(&self, site: &Site) -> Result<usize, Error> {
        self.get_index(site)
            .ok_or_else(|| Error::site_not_found(site.name(), &self.name))
    }

    /// Re-registers the atom types of all sites, e.g. after types were
    /// assigned to sites that were already in the registry.
    pub fn update_atom_types(&mut self) {
        for site in &self.sites {
            if let Some(atom_type) = site.atom_type() {
                self.atom_types.insert(atom_type);
            }
        }
    }

    fn register_members<const N: usize>(
        &mut self,
        connection: &Connection<N>,
        kind: &'static str,
    ) -> Result<(), Error> {
        connection.validate(kind)?;
        for site in connection.members() {
            self.add_site(site, true);
        }
        Ok(())
    }

    pub fn add_bond(&mut self, bond: Bond) -> Result<(), Error> {
        self.register_members(&bond, "bond")?;
        self.bonds.push(bond);
        Ok(())
    }

    pub fn add_angle(&mut self, angle: Angle) -> Result<(), Error> {
        self.register_members(&angle, "angle")?;
        self.angles.push(angle);
        Ok(())
    }

    pub fn add_dihedral(&mut self, dihedral: Dihedral) -> Result<(), Error> {
        self.register_members(&dihedral, "dihedral")?;
        self.dihedrals.push(dihedral);
        Ok(())
    }

    pub fn add_improper(&mut self, improper: Improper) -> Result<(), Error> {
        self.register_members(&improper, "improper")?;
        self.impropers.push(improper);
        Ok(())
    }

    /// Builds the serializable document for the whole topology.
    pub fn json_dict(&self) -> Result<TopologyJson, Error> {
        let atoms = self
            .sites
            .iter()
            .map(|site| SiteJson {
                name: site.name(),
                element: site.element().map(|e| e.symbol().to_string()),
                mass: site.mass(),
                charge: site.charge(),
                atom_type: site.atom_type().map(|t| t.name()),
            })
            .collect();

        let bonds = self
            .bonds
            .iter()
            .map(|bond| {
                let [a, b] = bond.members();
                Ok([self.index_of(a)?, self.index_of(b)?])
            })
            .collect::<Result<Vec<_>, Error>>()?;

        let subtopologies = self
            .subtopologies
            .iter()
            .map(|shared| {
                let subtopology = shared.try_borrow().map_err(|_| Error::ParentBusy)?;
                subtopology.json_dict_in(self)
            })
            .collect::<Result<Vec<_>, Error>>()?;

        Ok(TopologyJson {
            name: self.name.clone(),
            atoms,
            atom_types: self.atom_types.iter().map(AtomType::name).collect(),
            bonds,
            subtopologies,
        })
    }

    pub fn to_json(&self) -> Result<String, Error> {
        let document = self.json_dict()?;
        serde_json::to_string_pretty(&document).map_err(|e| Error::Serialization(e.to_string()))
    }
}

/// Shared handle to a [`Topology`].
///
/// Sub-topologies keep a [`WeakTopology`] back-reference to their parent, so
/// a topology that should own sub-topologies lives behind this handle.
#[derive(Clone)]
pub struct TopologyRef(Rc<RefCell<Topology>>);

impl TopologyRef {
    pub fn new(topology: Topology) -> Self {
        Self(Rc::new(RefCell::new(topology)))
    }

    /// # Panics
    ///
    /// Panics if the topology is currently mutably borrowed.
    pub fn borrow(&self) -> Ref<'_, Topology> {
        self.0.borrow()
    }

    /// # Panics
    ///
    /// Panics if the topology is currently borrowed.
    pub fn borrow_mut(&self) -> RefMut<'_, Topology> {
        self.0.borrow_mut()
    }

    pub(crate) fn try_borrow(&self) -> Result<Ref<'_, Topology>, Error> {
        self.0.try_borrow().map_err(|_| Error::ParentBusy)
    }

    pub(crate) fn try_borrow_mut(&self) -> Result<RefMut<'_, Topology>, Error> {
        self.0.try_borrow_mut().map_err(|_| Error::ParentBusy)
    }

    pub fn downgrade(&self) -> WeakTopology {
        WeakTopology(Rc::downgrade(&self.0))
    }

    pub fn ptr_eq(&self, other: &TopologyRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Attaches `subtopology` to this topology.
    ///
    /// This is the sanctioned way to give a sub-topology a parent: its sites
    /// (and their atom types) are registered here, its parent is set without
    /// a warning, and the topology keeps it in its sub-topology list. The
    /// returned handle stays connected to the parent.
    pub fn add_subtopology(&self, mut subtopology: SubTopology) -> Result<SharedSubTopology, Error> {
        let mut topology = self.try_borrow_mut()?;
        for site in subtopology.sites() {
            topology.add_site(site, true);
        }
        subtopology.attach(self.downgrade());

        let shared = Rc::new(RefCell::new(subtopology));
        topology.subtopologies.push(Rc::clone(&shared));
        Ok(shared)
    }
}

impl fmt::Debug for TopologyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(topology) => write!(
                f,
                "TopologyRef({:?}, {} sites)",
                topology.name,
                topology.n_sites()
            ),
            Err(_) => f.write_str("TopologyRef(<borrowed>)"),
        }
    }
}

/// Non-owning back-reference to a [`Topology`].
#[derive(Clone, Default)]
pub struct WeakTopology(Weak<RefCell<Topology>>);

impl WeakTopology {
    /// A reference that never upgrades.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upgrade(&self) -> Option<TopologyRef> {
        self.0.upgrade().map(TopologyRef)
    }
}

impl fmt::Debug for WeakTopology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(topology) => write!(f, "Weak{topology:?}"),
            None => f.write_str("WeakTopology(<dropped>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::element::Element;
    use crate::model::potential::Potential;

    fn argon_type() -> AtomType {
        AtomType::new(Potential::lennard_jones(0.996, 0.3405))
            .with_name("Ar")
            .with_element(Element::Ar)
    }

    #[test]
    fn add_site_is_idempotent_and_ordered() {
        let mut top = Topology::new("box");
        let a = Site::new("A");
        let b = Site::new("B");

        assert!(top.add_site(&a, true));
        assert!(top.add_site(&b, true));
        assert!(!top.add_site(&a, true));

        assert_eq!(top.n_sites(), 2);
        assert_eq!(top.get_index(&a), Some(0));
        assert_eq!(top.get_index(&b), Some(1));
        assert_eq!(top.site(1), Some(&b));
        assert_eq!(top.get_index(&Site::new("A")), None);
    }

    #[test]
    fn update_types_controls_type_registration() {
        let ar = argon_type();
        let mut top = Topology::new("argon");

        top.add_site(&Site::new("Ar1").with_atom_type(ar.clone()), false);
        assert!(top.atom_types().is_empty());

        top.add_site(&Site::new("Ar2").with_atom_type(ar.clone()), true);
        top.add_site(&Site::new("Ar3").with_atom_type(ar.clone()), true);
        assert_eq!(top.atom_types().len(), 1);
        assert!(top.atom_types().contains(&ar));
    }

    #[test]
    fn update_atom_types_picks_up_late_assignments() {
        let mut top = Topology::new("late");
        let site = Site::new("Ar");
        top.add_site(&site, true);
        site.set_atom_type(Some(argon_type()));
        assert!(top.atom_types().is_empty());

        top.update_atom_types();
        assert_eq!(top.atom_types().len(), 1);
    }

    #[test]
    fn connections_register_their_members() {
        let mut top = Topology::new("water");
        let o = Site::new("O");
        let h1 = Site::new("H1");
        let h2 = Site::new("H2");

        top.add_bond(Bond::new([o.clone(), h1.clone()])).unwrap();
        top.add_bond(Bond::new([o.clone(), h2.clone()])).unwrap();
        top.add_angle(Angle::new([h1.clone(), o.clone(), h2.clone()]))
            .unwrap();

        assert_eq!(top.n_sites(), 3);
        assert_eq!(top.get_index(&o), Some(0));
        assert_eq!(top.get_index(&h1), Some(1));
        assert_eq!(top.get_index(&h2), Some(2));
        assert_eq!(top.bonds().len(), 2);
        assert_eq!(top.angles().len(), 1);
    }

    #[test]
    fn invalid_connection_leaves_topology_untouched() {
        let mut top = Topology::new("bad");
        let a = Site::new("A");
        let err = top.add_bond(Bond::new([a.clone(), a])).unwrap_err();
        assert!(matches!(err, Error::InvalidConnection { kind: "bond", .. }));
        assert_eq!(top.n_sites(), 0);
        assert!(top.bonds().is_empty());
    }

    #[test]
    fn add_subtopology_registers_sites_and_parent() {
        let top = TopologyRef::new(Topology::new("parent"));
        let a = Site::new("A");
        let b = Site::new("B");

        let mut sub = SubTopology::new("residue");
        sub.add_site(&a, true).unwrap();
        sub.add_site(&b, true).unwrap();
        let sub = top.add_subtopology(sub).unwrap();

        let parent = sub.borrow().parent().expect("attached");
        assert!(parent.ptr_eq(&top));
        assert_eq!(top.borrow().n_sites(), 2);
        assert_eq!(top.borrow().n_subtopologies(), 1);
        assert_eq!(top.borrow().get_index(&b), Some(1));
    }

    #[test]
    fn weak_topology_does_not_keep_parent_alive() {
        let top = TopologyRef::new(Topology::new("short-lived"));
        let weak = top.downgrade();
        assert!(weak.upgrade().is_some());
        drop(top);
        assert!(weak.upgrade().is_none());
        assert!(WeakTopology::new().upgrade().is_none());
    }

    #[test]
    fn json_document_includes_subtopologies() {
        let top = TopologyRef::new(Topology::new("doc"));
        let ar = argon_type();
        let a = Site::new("Ar1").with_atom_type(ar.clone());
        let b = Site::new("Ar2").with_atom_type(ar);
        top.borrow_mut().add_site(&a, true);

        let mut sub = SubTopology::new("pair");
        sub.add_site(&b, true).unwrap();
        sub.add_site(&a, true).unwrap();
        top.add_subtopology(sub).unwrap();

        let doc = top.borrow().json_dict().unwrap();
        assert_eq!(doc.atoms.len(), 2);
        assert_eq!(doc.atoms[0].element.as_deref(), Some("Ar"));
        assert_eq!(doc.atom_types, vec!["Ar".to_string()]);
        assert_eq!(doc.subtopologies[0].atoms, vec![1, 0]);

        let text = top.borrow().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["subtopologies"][0]["name"], "pair");
        assert_eq!(value["atoms"][1]["atom_type"], "Ar");
    }
}
