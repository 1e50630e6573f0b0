//! Persisted netlist + connectivity ("bitstream").
//!
//! # Format
//!
//! ```text
//! {
//!   "LUTs": [ { "id": 0, "inputs": ["a", "c"], "output": "Int0", "function": "Int0=a*c" }, ... ],
//!   "connections": { "0": [3], ... }
//! }
//! ```
//!
//! LUTs appear in netlist order and `id` equals the position. Truth tables
//! are not stored: [`decode`] recomputes them from the function strings.
//! The stored connections must agree with the ones derived from the
//! decoded LUTs.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{BitstreamError, Result};
use crate::graph::ConnectivityGraph;
use crate::netlist::{Lut, Netlist};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LutRecord {
    pub id: usize,
    pub inputs: Vec<String>,
    pub output: String,
    pub function: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Bitstream {
    #[serde(rename = "LUTs")]
    pub luts: Vec<LutRecord>,
    pub connections: BTreeMap<usize, Vec<usize>>,
}

impl Bitstream {
    pub fn new(netlist: &Netlist, graph: &ConnectivityGraph) -> Self {
        let luts = netlist
            .iter()
            .map(|(id, lut)| LutRecord {
                id,
                inputs: lut.inputs().to_vec(),
                output: lut.output().to_string(),
                function: lut.function().to_string(),
            })
            .collect();
        Self {
            luts,
            connections: graph.adjacency().clone(),
        }
    }

    /// Rebuilds the netlist and graph, validating the records.
    pub fn restore(self) -> Result<(Netlist, ConnectivityGraph), BitstreamError> {
        let mut netlist = Netlist::new();
        for (position, record) in self.luts.into_iter().enumerate() {
            if record.id != position {
                return Err(BitstreamError::Schema(format!(
                    "LUT at position {} has id {}",
                    position, record.id
                )));
            }
            let lut = Lut::new(record.inputs, record.output, record.function).map_err(|e| BitstreamError::Function {
                id: record.id,
                source: Box::new(e),
            })?;
            if let Err(lut) = netlist.push(lut) {
                return Err(BitstreamError::Schema(format!(
                    "output '{}' is driven by more than one LUT",
                    lut.output()
                )));
            }
        }

        for (&producer, consumers) in self.connections.iter() {
            if let Some(&bad) = std::iter::once(&producer).chain(consumers).find(|&&id| id >= netlist.len()) {
                return Err(BitstreamError::Schema(format!(
                    "connection refers to LUT {} but there are only {}",
                    bad,
                    netlist.len()
                )));
            }
        }

        let graph = ConnectivityGraph::from_adjacency(self.connections);
        let derived = ConnectivityGraph::connect(&netlist);
        if graph != derived {
            return Err(BitstreamError::Schema(
                "stored connections disagree with the LUT inputs".to_string(),
            ));
        }
        Ok((netlist, graph))
    }
}

/// Serializes a netlist and its graph to pretty-printed JSON.
pub fn encode(netlist: &Netlist, graph: &ConnectivityGraph) -> Result<Vec<u8>, BitstreamError> {
    debug!("encode(luts = {}, edges = {})", netlist.len(), graph.num_edges());
    let bitstream = Bitstream::new(netlist, graph);
    Ok(serde_json::to_vec_pretty(&bitstream)?)
}

/// Reconstructs a netlist and its graph from [`encode`]d bytes.
pub fn decode(bytes: &[u8]) -> Result<(Netlist, ConnectivityGraph), BitstreamError> {
    debug!("decode(bytes = {})", bytes.len());
    let bitstream: Bitstream = serde_json::from_slice(bytes)?;
    bitstream.restore()
}

/// Writes the bitstream to `path`.
pub fn save<P: AsRef<Path>>(path: P, netlist: &Netlist, graph: &ConnectivityGraph) -> Result<(), BitstreamError> {
    let bytes = encode(netlist, graph)?;
    fs::write(path.as_ref(), bytes)?;
    info!("saved {} LUTs to {}", netlist.len(), path.as_ref().display());
    Ok(())
}

/// Reads a bitstream from `path`.
pub fn load<P: AsRef<Path>>(path: P) -> Result<(Netlist, ConnectivityGraph), BitstreamError> {
    let bytes = fs::read(path.as_ref())?;
    let (netlist, graph) = decode(&bytes)?;
    info!("loaded {} LUTs from {}", netlist.len(), path.as_ref().display());
    Ok((netlist, graph))
}
