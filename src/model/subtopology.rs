use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexSet;
use log::warn;
use serde::Serialize;

use super::error::Error;
use super::next_identity;
use super::site::Site;
use super::topology::{Topology, TopologyRef, WeakTopology};

pub const DEFAULT_SUBTOPOLOGY_NAME: &str = "Sub-Topology";

/// Shared handle to a [`SubTopology`] owned by a topology.
pub type SharedSubTopology = Rc<RefCell<SubTopology>>;

/// A named grouping of sites within a topology.
///
/// A sub-topology references sites; it never owns them. Every site added
/// while a parent is set is also registered with that parent. Attaching
/// through [`TopologyRef::add_subtopology`] registers existing members too,
/// so the sites are then a subset of the parent's registry. Setting the
/// parent directly with [`set_parent`](Self::set_parent) does not, and
/// earlier members may be missing from the new parent.
///
/// # Examples
///
/// ```
/// use topoforge::{Site, SubTopology, Topology, TopologyRef};
///
/// let top = TopologyRef::new(Topology::new("box"));
/// let sub = top.add_subtopology(SubTopology::new("molecule")).unwrap();
///
/// let site = Site::new("Ar");
/// sub.borrow_mut().add_site(&site, true).unwrap();
///
/// assert_eq!(sub.borrow().n_sites(), 1);
/// assert_eq!(top.borrow().get_index(&site), Some(0));
/// ```
pub struct SubTopology {
    id: u64,
    name: String,
    parent: Option<WeakTopology>,
    sites: IndexSet<Site>,
}

/// Serializable form of a [`SubTopology`]: its name and the parent-registry
/// index of each member site, in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubTopologyJson {
    pub name: String,
    pub atoms: Vec<usize>,
}

impl SubTopology {
    pub fn new(name: impl ToString) -> Self {
        Self {
            id: next_identity(),
            name: name.to_string(),
            parent: None,
            sites: IndexSet::new(),
        }
    }

    /// Process-local identity, for diagnostics only.
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl ToString) {
        self.name = name.to_string();
    }

    /// The live parent topology, if one is set and still alive.
    pub fn parent(&self) -> Option<TopologyRef> {
        self.parent.as_ref().and_then(WeakTopology::upgrade)
    }

    /// Sets the parent directly, bypassing [`TopologyRef::add_subtopology`].
    ///
    /// Always logs a warning. Clearing the parent with `None` fails with
    /// [`Error::NotYetImplemented`]; a handle to a dropped topology fails with
    /// [`Error::InvalidParent`]. On failure the previous parent is kept.
    ///
    /// Unlike the sanctioned path, the sub-topology's existing sites are not
    /// registered with the new parent.
    pub fn set_parent(&mut self, parent: Option<WeakTopology>) -> Result<(), Error> {
        warn!(
            "setting the parent of sub-topology '{}' is potentially dangerous; \
             consider TopologyRef::add_subtopology instead",
            self.name
        );
        let parent = parent.ok_or(Error::NotYetImplemented("setting a parent to None"))?;
        if parent.upgrade().is_none() {
            return Err(Error::InvalidParent(format!("{parent:?}")));
        }
        self.parent = Some(parent);
        Ok(())
    }

    pub(crate) fn attach(&mut self, parent: WeakTopology) {
        self.parent = Some(parent);
    }

    /// The live, insertion-ordered member set.
    pub fn sites(&self) -> &IndexSet<Site> {
        &self.sites
    }

    #[inline]
    pub fn n_sites(&self) -> usize {
        self.sites.len()
    }

    pub fn contains(&self, site: &Site) -> bool {
        self.sites.contains(site)
    }

    /// Adds `site` to this sub-topology and, if it has a parent, to the parent.
    ///
    /// Re-adding a member logs a warning and leaves membership unchanged; the
    /// parent is still updated exactly once. Returns whether the site was new
    /// to this sub-topology.
    ///
    /// Fails without changing anything if the parent has been dropped or is
    /// currently borrowed.
    pub fn add_site(&mut self, site: &Site, update_types: bool) -> Result<bool, Error> {
        let parent = match &self.parent {
            Some(weak) => Some(
                weak.upgrade()
                    .ok_or_else(|| Error::InvalidParent(format!("{weak:?}")))?,
            ),
            None => None,
        };
        let mut parent_topology = parent.as_ref().map(TopologyRef::try_borrow_mut).transpose()?;

        let inserted = self.sites.insert(site.clone());
        if !inserted {
            warn!("redundantly adding site {site} to sub-topology '{}'", self.name);
        }
        if let Some(topology) = parent_topology.as_mut() {
            topology.add_site(site, update_types);
        }
        Ok(inserted)
    }

    /// Returns the name and parent-registry indices of the member sites.
    ///
    /// Indices are only meaningful relative to a parent, so this fails with
    /// [`Error::MissingParent`] on a detached sub-topology, and with
    /// [`Error::SiteNotFound`] if a member is not in the parent's registry.
    pub fn json_dict(&self) -> Result<SubTopologyJson, Error> {
        let parent = self
            .parent()
            .ok_or_else(|| Error::MissingParent(self.name.clone()))?;
        let topology = parent.try_borrow()?;
        self.json_dict_in(&topology)
    }

    pub(crate) fn json_dict_in(&self, topology: &Topology) -> Result<SubTopologyJson, Error> {
        let atoms = self
            .sites
            .iter()
            .map(|site| topology.index_of(site))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(SubTopologyJson {
            name: self.name.clone(),
            atoms,
        })
    }
}

impl Default for SubTopology {
    fn default() -> Self {
        Self::new(DEFAULT_SUBTOPOLOGY_NAME)
    }
}

impl fmt::Display for SubTopology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<SubTopology {}, {} sites, id: {}>",
            self.name,
            self.n_sites(),
            self.id
        )
    }
}

impl fmt::Debug for SubTopology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<SubTopology {},\n {} sites,\n id: {}>",
            self.name,
            self.n_sites(),
            self.id
        )
    }
}
