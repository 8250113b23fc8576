/// Settings for writing a Cassandra molecular connectivity file.
///
/// Scaling factors apply to intramolecular pairs separated by one, two,
/// three, and more than three bonds, in that order.
#[derive(Debug, Clone, PartialEq)]
pub struct McfConfig {
    /// Van der Waals scaling for 1-2, 1-3, 1-4 and 1-N pairs.
    pub vdw_scaling: [f64; 4],
    /// Coulomb scaling for 1-2, 1-3, 1-4 and 1-N pairs.
    pub charge_scaling: [f64; 4],
    /// Comment line written at the top of the file. Defaults to a line
    /// naming the topology.
    pub title: Option<String>,
}

impl Default for McfConfig {
    fn default() -> Self {
        Self {
            vdw_scaling: [0.0, 0.0, 0.5, 1.0],
            charge_scaling: [0.0, 0.0, 0.5, 1.0],
            title: None,
        }
    }
}
