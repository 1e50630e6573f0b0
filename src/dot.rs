//! Netlist to DOT (Graphviz) conversion.
//!
//! The rendering is read-only over the netlist and its connectivity graph.
//!
//! # DOT Format
//!
//! The generated DOT output follows these conventions:
//! - **Primary inputs** are rendered as circles at the top (source rank)
//! - **LUTs** are rendered as boxes labelled with their index and function
//! - **Declared outputs** are rendered as double octagons at the bottom (sink rank)
//! - **Edges**:
//!   - Solid lines connect LUTs, following the connectivity graph
//!   - Dashed lines connect primary inputs to the LUTs reading them
//!   - Bold lines connect the LUT driving a declared output to that output
//!
//! # Examples
//!
//! ```
//! use vfpga::dot::{to_dot, DotConfig};
//! use vfpga::graph::ConnectivityGraph;
//! use vfpga::mapper::{build_netlist, MapperConfig};
//! use vfpga::sop::SopSpec;
//!
//! let spec = SopSpec::parse("X=a*b+c").unwrap();
//! let (netlist, _, _) = build_netlist(&spec, &MapperConfig::default()).unwrap();
//! let graph = ConnectivityGraph::connect(&netlist);
//!
//! let dot = to_dot(&netlist, &graph, &spec.primary_inputs(), &spec.output_names(), &DotConfig::default()).unwrap();
//! // Write to file and render with: dot -Tpng output.dot -o output.png
//! assert!(dot.starts_with("digraph {"));
//! ```

use std::collections::BTreeSet;
use std::fmt::Write as _;

use crate::graph::ConnectivityGraph;
use crate::netlist::Netlist;

/// Configuration options for DOT output generation.
#[derive(Debug, Clone)]
pub struct DotConfig {
    /// Shape for LUT nodes (default: "box")
    pub lut_shape: &'static str,
    /// Shape for primary input nodes (default: "circle")
    pub input_shape: &'static str,
    /// Shape for output nodes (default: "doubleoctagon")
    pub output_shape: &'static str,
    /// Style for LUT-to-LUT edges (default: "solid")
    pub lut_edge_style: &'static str,
    /// Style for input-to-LUT edges (default: "dashed")
    pub input_edge_style: &'static str,
    /// Style for LUT-to-output edges (default: "bold")
    pub output_edge_style: &'static str,
    /// Graph direction (default: "TB")
    pub rankdir: &'static str,
}

impl Default for DotConfig {
    fn default() -> Self {
        Self {
            lut_shape: "box",
            input_shape: "circle",
            output_shape: "doubleoctagon",
            lut_edge_style: "solid",
            input_edge_style: "dashed",
            output_edge_style: "bold",
            rankdir: "TB",
        }
    }
}

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Renders the netlist as a DOT digraph.
///
/// # Arguments
///
/// * `inputs` - Primary input names; each gets its own node.
/// * `outputs` - Declared output names; each gets a node fed by its driving LUT.
///   Names without a driving LUT are skipped.
pub fn to_dot(
    netlist: &Netlist,
    graph: &ConnectivityGraph,
    inputs: &BTreeSet<String>,
    outputs: &BTreeSet<String>,
    config: &DotConfig,
) -> Result<String, std::fmt::Error> {
    let mut dot = String::new();
    writeln!(dot, "digraph {{")?;
    writeln!(dot, "rankdir={};", config.rankdir)?;
    writeln!(dot, "node [shape={}];", config.lut_shape)?;

    // Primary inputs
    writeln!(dot, "{{ rank=source")?;
    for name in inputs {
        writeln!(dot, "\"in_{}\" [shape={}, label=\"{}\"];", escape(name), config.input_shape, escape(name))?;
    }
    writeln!(dot, "}}")?;

    // LUTs
    for (id, lut) in netlist.iter() {
        writeln!(dot, "lut{} [label=\"#{}\\n{}\"];", id, id, escape(lut.function()))?;
    }

    // Input -> LUT
    for (id, lut) in netlist.iter() {
        for name in lut.inputs().iter().filter(|name| inputs.contains(*name)) {
            writeln!(dot, "\"in_{}\" -> lut{} [style={}];", escape(name), id, config.input_edge_style)?;
        }
    }

    // LUT -> LUT
    for (producer, consumer) in graph.edges() {
        writeln!(dot, "lut{} -> lut{} [style={}];", producer, consumer, config.lut_edge_style)?;
    }

    // Declared outputs
    writeln!(dot, "{{ rank=sink")?;
    for name in outputs.iter().filter(|name| netlist.producer(name).is_some()) {
        writeln!(dot, "\"out_{}\" [shape={}, label=\"{}\"];", escape(name), config.output_shape, escape(name))?;
    }
    writeln!(dot, "}}")?;
    for name in outputs {
        if let Some(id) = netlist.producer(name) {
            writeln!(dot, "lut{} -> \"out_{}\" [style={}];", id, escape(name), config.output_edge_style)?;
        }
    }

    writeln!(dot, "}}")?;
    Ok(dot)
}
