//! One complete synthesis run: build, connect, report.

use std::collections::BTreeSet;
use std::path::Path;

use log::info;

use crate::bitstream;
use crate::error::Result;
use crate::graph::ConnectivityGraph;
use crate::mapper::{build_netlist, MapperConfig};
use crate::netlist::Netlist;
use crate::report::UsageReport;
use crate::sop::SopSpec;

/// Everything produced by mapping one [`SopSpec`].
///
/// Only constructed once both the netlist and its graph are complete, so
/// anything persisted from it is consistent.
#[derive(Debug, Clone)]
pub struct Synthesis {
    pub netlist: Netlist,
    pub graph: ConnectivityGraph,
    pub usage: UsageReport,
    /// Names referenced by terms but never declared as outputs.
    pub primary_inputs: BTreeSet<String>,
    /// Declared output names.
    pub outputs: BTreeSet<String>,
}

impl Synthesis {
    /// Maps `spec` with the capacities of `config`.
    ///
    /// # Examples
    ///
    /// ```
    /// use vfpga::mapper::MapperConfig;
    /// use vfpga::sop::SopSpec;
    /// use vfpga::synth::Synthesis;
    ///
    /// let spec = SopSpec::parse("X=a*c+a*c*b+b*d").unwrap();
    /// let config = MapperConfig::default().with_lut4(100).with_lut6(100);
    /// let synthesis = Synthesis::run(&spec, &config).unwrap();
    ///
    /// assert_eq!(synthesis.netlist.len(), 4);
    /// assert_eq!(synthesis.graph.num_edges(), 3);
    /// assert_eq!(synthesis.usage.lut4.available, 97);
    /// ```
    pub fn run(spec: &SopSpec, config: &MapperConfig) -> Result<Self> {
        let (netlist, before, after) = build_netlist(spec, config)?;
        let graph = ConnectivityGraph::connect(&netlist);
        let usage = UsageReport::new(&before, &after);
        info!(
            "synthesis done: {} LUTs, {} connections, LUT4 {:.1}% / LUT6 {:.1}% used",
            netlist.len(),
            graph.num_edges(),
            usage.lut4.percent,
            usage.lut6.percent
        );
        Ok(Self {
            netlist,
            graph,
            usage,
            primary_inputs: spec.primary_inputs(),
            outputs: spec.output_names(),
        })
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(bitstream::encode(&self.netlist, &self.graph)?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        Ok(bitstream::save(path, &self.netlist, &self.graph)?)
    }
}
