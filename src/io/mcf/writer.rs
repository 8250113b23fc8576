use std::io::Write;

use log::debug;

use super::config::McfConfig;
use super::fragment;
use crate::forms::{self, Catalogue, FormMatch};
use crate::io::error::Error;
use crate::model::connection::Connection;
use crate::model::potential::Potential;
use crate::model::site::Site;
use crate::model::topology::Topology;

const ATOM_FORMAT: [&str; 2] = [
    "!Atom Format",
    "!index element type mass charge vdw_type parameters",
];
const BOND_FORMAT: [&str; 2] = ["!Bond Format", "!index i j type r_eq"];
const ANGLE_FORMAT: [&str; 2] = ["!Angle Format", "!index i j k type k_theta theta_eq"];
const DIHEDRAL_FORMAT: [&str; 2] = ["!Dihedral Format", "!index i j k l type parameters"];
const IMPROPER_FORMAT: [&str; 2] = ["!Improper Format", "!index i j k l type k_psi psi_eq"];

/// Writes `topology` as a Cassandra MCF document.
///
/// Every site and connection is validated before the first byte is written,
/// so on error `writer` receives nothing.
pub fn write<W: Write>(mut writer: W, topology: &Topology, config: &McfConfig) -> Result<(), Error> {
    let atoms = topology
        .sites()
        .iter()
        .enumerate()
        .map(|(index, site)| atom_row(index, site))
        .collect::<Result<Vec<_>, _>>()?;
    let bonds = connection_rows(topology, topology.bonds(), Catalogue::Bond, None)?;
    let angles = connection_rows(topology, topology.angles(), Catalogue::Angle, None)?;
    let dihedrals =
        connection_rows(topology, topology.dihedrals(), Catalogue::Dihedral, Some("none"))?;
    let impropers =
        connection_rows(topology, topology.impropers(), Catalogue::Improper, Some("none"))?;

    let fragments = fragment::fragments(topology)?;
    let links = fragment::connectivity(&fragments, topology)?;

    debug!(
        "MCF for '{}': {} atoms, {} bonds, {} angles, {} dihedrals, {} impropers, {} fragments",
        topology.name(),
        atoms.len(),
        bonds.len(),
        angles.len(),
        dihedrals.len(),
        impropers.len(),
        fragments.len()
    );

    match &config.title {
        Some(title) => writeln!(writer, "!{title}")?,
        None => writeln!(writer, "!MCF file for {}", topology.name())?,
    }
    writeln!(writer)?;

    write_section(&mut writer, "Atom_Info", &ATOM_FORMAT, &atoms)?;
    write_section(&mut writer, "Bond_Info", &BOND_FORMAT, &bonds)?;
    write_section(&mut writer, "Angle_Info", &ANGLE_FORMAT, &angles)?;
    write_section(&mut writer, "Dihedral_Info", &DIHEDRAL_FORMAT, &dihedrals)?;
    write_section(&mut writer, "Improper_Info", &IMPROPER_FORMAT, &impropers)?;

    writeln!(writer, "# Intra_Scaling")?;
    writeln!(writer, "{}", scaling_row(&config.vdw_scaling))?;
    writeln!(writer, "{}", scaling_row(&config.charge_scaling))?;
    writeln!(writer)?;

    let fragment_rows: Vec<String> = fragments
        .iter()
        .enumerate()
        .map(|(index, members)| {
            let members: Vec<String> = members.iter().map(|m| (m + 1).to_string()).collect();
            format!("{:<6} {:<4} {}", index + 1, members.len(), members.join(" "))
        })
        .collect();
    write_section(&mut writer, "Fragment_Info", &[], &fragment_rows)?;

    let link_rows: Vec<String> = links
        .iter()
        .enumerate()
        .map(|(index, (a, b))| format!("{:<6} {:<6} {}", index + 1, a + 1, b + 1))
        .collect();
    write_section(&mut writer, "Fragment_Connectivity", &[], &link_rows)?;

    writeln!(writer, "END")?;
    writer.flush()?;
    Ok(())
}

fn write_section<W: Write>(
    writer: &mut W,
    name: &str,
    format: &[&str],
    rows: &[String],
) -> Result<(), Error> {
    for line in format {
        writeln!(writer, "{line}")?;
    }
    writeln!(writer, "# {name}")?;
    writeln!(writer, "{}", rows.len())?;
    for row in rows {
        writeln!(writer, "{row}")?;
    }
    writeln!(writer)?;
    Ok(())
}

fn atom_row(index: usize, site: &Site) -> Result<String, Error> {
    let entity = || format!("site {} ('{site}')", index + 1);
    let atom_type = site
        .atom_type()
        .ok_or_else(|| Error::unparametrized(entity(), "no atom type assigned"))?;
    let found = forms::classify(Catalogue::NonBonded, &atom_type.potential()).map_err(|e| {
        Error::incompatible(
            format!("{} with atom type '{}'", entity(), atom_type.name()),
            e,
        )
    })?;
    let element = site
        .element()
        .ok_or_else(|| Error::unparametrized(entity(), "element unknown"))?;
    let mass = site
        .mass()
        .ok_or_else(|| Error::unparametrized(entity(), "mass unknown"))?;
    let type_label = label(&atom_type.name());
    if type_label.is_empty() {
        return Err(Error::unparametrized(entity(), "atom type name is blank"));
    }

    Ok(format!(
        "{:<6} {:<4} {:<8} {:>10.4} {:>12.6} {:<6}{}",
        index + 1,
        element.symbol(),
        type_label,
        mass,
        site.charge(),
        found.form.mcf_tag(),
        coefficients(&found)
    ))
}

/// Renders one row per connection: 1-based member indices, the form's tag
/// and its coefficients. Connections without a potential are written with
/// `untyped` as their tag when given, and are an error otherwise.
fn connection_rows<const N: usize>(
    topology: &Topology,
    connections: &[Connection<N>],
    catalogue: Catalogue,
    untyped: Option<&str>,
) -> Result<Vec<String>, Error> {
    connections
        .iter()
        .enumerate()
        .map(|(index, connection)| -> Result<String, Error> {
            let members = connection
                .members()
                .iter()
                .map(|site| topology.index_of(site).map(|i| format!("{:<6}", i + 1)))
                .collect::<Result<Vec<_>, _>>()?
                .join(" ");
            let tail = match (connection.potential(), untyped) {
                (Some(potential), _) => classify(catalogue, connection, potential)?,
                (None, Some(tag)) => tag.to_string(),
                (None, None) => {
                    return Err(Error::unparametrized(
                        format!("{catalogue} {}", connection.label()),
                        "no potential assigned",
                    ));
                }
            };
            Ok(format!("{:<6} {members} {tail}", index + 1))
        })
        .collect()
}

fn classify<const N: usize>(
    catalogue: Catalogue,
    connection: &Connection<N>,
    potential: &Potential,
) -> Result<String, Error> {
    let found = forms::classify(catalogue, potential).map_err(|e| {
        Error::incompatible(
            format!(
                "{catalogue} {} with potential '{}'",
                connection.label(),
                potential.name()
            ),
            e,
        )
    })?;
    Ok(format!("{:<8}{}", found.form.mcf_tag(), coefficients(&found)))
}

fn coefficients(found: &FormMatch) -> String {
    found
        .coefficients
        .iter()
        .map(|c| format!(" {c:>12.5}"))
        .collect()
}

fn scaling_row(factors: &[f64; 4]) -> String {
    factors
        .iter()
        .map(|f| format!("{f:.4}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// MCF fields are whitespace separated.
fn label(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join("_")
}
