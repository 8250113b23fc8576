use std::collections::BTreeSet;

use crate::model::error::Error;
use crate::model::topology::Topology;

/// Groups registry indices into Cassandra fragments.
///
/// If the sub-topologies cover every site, each non-empty sub-topology is a
/// fragment. Otherwise fragments come from bonds: every site with two or more
/// neighbours anchors a fragment of itself and its neighbours, and sites left
/// over become singleton fragments. A topology with no such anchor is a single
/// fragment.
pub(crate) fn fragments(topology: &Topology) -> Result<Vec<Vec<usize>>, Error> {
    if topology.n_sites() == 0 {
        return Ok(Vec::new());
    }

    let grouped = subtopology_fragments(topology)?;
    let covered: BTreeSet<usize> = grouped.iter().flatten().copied().collect();
    if covered.len() == topology.n_sites() {
        return Ok(grouped);
    }

    let neighbours = adjacency(topology)?;
    let mut fragments: Vec<Vec<usize>> = neighbours
        .iter()
        .enumerate()
        .filter(|(_, bonded)| bonded.len() >= 2)
        .map(|(anchor, bonded)| std::iter::once(anchor).chain(bonded.iter().copied()).collect())
        .collect();

    if fragments.is_empty() {
        return Ok(vec![(0..topology.n_sites()).collect()]);
    }

    let covered: BTreeSet<usize> = fragments.iter().flatten().copied().collect();
    fragments.extend(
        (0..topology.n_sites())
            .filter(|i| !covered.contains(i))
            .map(|i| vec![i]),
    );
    Ok(fragments)
}

/// Pairs of fragment positions `(a, b)`, `a < b`, that share a site or are
/// joined by a bond.
pub(crate) fn connectivity(
    fragments: &[Vec<usize>],
    topology: &Topology,
) -> Result<Vec<(usize, usize)>, Error> {
    let bonds = bond_indices(topology)?;
    let sets: Vec<BTreeSet<usize>> = fragments
        .iter()
        .map(|members| members.iter().copied().collect())
        .collect();

    let mut pairs = Vec::new();
    for (a, left) in sets.iter().enumerate() {
        for (b, right) in sets.iter().enumerate().skip(a + 1) {
            let shared = !left.is_disjoint(right);
            let bonded = bonds.iter().any(|&(i, j)| {
                (left.contains(&i) && right.contains(&j)) || (left.contains(&j) && right.contains(&i))
            });
            if shared || bonded {
                pairs.push((a, b));
            }
        }
    }
    Ok(pairs)
}

fn subtopology_fragments(topology: &Topology) -> Result<Vec<Vec<usize>>, Error> {
    let mut fragments = Vec::new();
    for shared in topology.subtopologies() {
        let subtopology = shared.try_borrow().map_err(|_| Error::ParentBusy)?;
        let members = subtopology
            .sites()
            .iter()
            .map(|site| topology.index_of(site))
            .collect::<Result<Vec<_>, _>>()?;
        if !members.is_empty() {
            fragments.push(members);
        }
    }
    Ok(fragments)
}

fn bond_indices(topology: &Topology) -> Result<Vec<(usize, usize)>, Error> {
    topology
        .bonds()
        .iter()
        .map(|bond| {
            let [a, b] = bond.members();
            Ok((topology.index_of(a)?, topology.index_of(b)?))
        })
        .collect()
}

fn adjacency(topology: &Topology) -> Result<Vec<Vec<usize>>, Error> {
    let mut neighbours = vec![Vec::new(); topology.n_sites()];
    for (i, j) in bond_indices(topology)? {
        if !neighbours[i].contains(&j) {
            neighbours[i].push(j);
        }
        if !neighbours[j].contains(&i) {
            neighbours[j].push(i);
        }
    }
    Ok(neighbours)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::connection::Bond;
    use crate::model::site::Site;
    use crate::model::subtopology::SubTopology;
    use crate::model::topology::TopologyRef;

    fn chain(n: usize) -> (Topology, Vec<Site>) {
        let sites: Vec<Site> = (0..n).map(|i| Site::new(format!("C{i}"))).collect();
        let mut top = Topology::new("chain");
        for pair in sites.windows(2) {
            top.add_bond(Bond::new([pair[0].clone(), pair[1].clone()]))
                .unwrap();
        }
        (top, sites)
    }

    #[test]
    fn empty_topology_has_no_fragments() {
        assert!(fragments(&Topology::new("empty")).unwrap().is_empty());
    }

    #[test]
    fn single_site_is_one_fragment() {
        let mut top = Topology::new("argon");
        top.add_site(&Site::new("Ar"), true);
        assert_eq!(fragments(&top).unwrap(), vec![vec![0]]);
        assert!(connectivity(&[vec![0]], &top).unwrap().is_empty());
    }

    #[test]
    fn diatomic_without_anchor_is_one_fragment() {
        let (top, _) = chain(2);
        assert_eq!(fragments(&top).unwrap(), vec![vec![0, 1]]);
    }

    #[test]
    fn butane_backbone_has_two_overlapping_fragments() {
        let (top, _) = chain(4);
        let frags = fragments(&top).unwrap();
        assert_eq!(frags, vec![vec![1, 0, 2], vec![2, 1, 3]]);
        assert_eq!(connectivity(&frags, &top).unwrap(), vec![(0, 1)]);
    }

    #[test]
    fn leftover_sites_become_singletons() {
        let (mut top, _) = chain(3);
        top.add_site(&Site::new("Ar"), true);
        let frags = fragments(&top).unwrap();
        assert_eq!(frags, vec![vec![1, 0, 2], vec![3]]);
        assert!(connectivity(&frags, &top).unwrap().is_empty());
    }

    #[test]
    fn covering_subtopologies_define_fragments() {
        let (top, sites) = chain(4);
        let top = TopologyRef::new(top);
        let mut left = SubTopology::new("left");
        left.add_site(&sites[0], true).unwrap();
        left.add_site(&sites[1], true).unwrap();
        let mut right = SubTopology::new("right");
        right.add_site(&sites[2], true).unwrap();
        right.add_site(&sites[3], true).unwrap();
        top.add_subtopology(left).unwrap();
        top.add_subtopology(SubTopology::new("unused")).unwrap();
        top.add_subtopology(right).unwrap();

        let topology = top.borrow();
        let frags = fragments(&topology).unwrap();
        assert_eq!(frags, vec![vec![0, 1], vec![2, 3]]);
        // Joined by the C1-C2 bond.
        assert_eq!(connectivity(&frags, &topology).unwrap(), vec![(0, 1)]);
    }

    #[test]
    fn partial_subtopologies_fall_back_to_bonds() {
        let (top, sites) = chain(3);
        let top = TopologyRef::new(top);
        let mut partial = SubTopology::new("partial");
        partial.add_site(&sites[0], true).unwrap();
        top.add_subtopology(partial).unwrap();

        assert_eq!(fragments(&top.borrow()).unwrap(), vec![vec![1, 0, 2]]);
    }
}
