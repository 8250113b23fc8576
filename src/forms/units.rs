//! Conversions from internal units to Cassandra's.
//!
//! Internal: kJ/mol, nm, rad. Cassandra: K (energy over k_B) for
//! non-bonded and bending terms, Å, degrees.

/// Molar gas constant in kJ/(mol·K).
pub const GAS_CONSTANT: f64 = 8.314462618e-3;

/// Converts a molar energy in kJ/mol to a temperature in K.
#[inline]
pub fn kj_per_mol_to_kelvin(energy: f64) -> f64 {
    energy / GAS_CONSTANT
}

#[inline]
pub fn nm_to_angstrom(length: f64) -> f64 {
    length * 10.0
}

#[inline]
pub fn rad_to_deg(angle: f64) -> f64 {
    angle.to_degrees()
}
