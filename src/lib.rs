//! # vfpga: SOP to LUT technology mapping
//!
//! **`vfpga`** compiles Boolean functions given as sums of products into a
//! network of lookup tables (LUTs) for a small virtual FPGA with two LUT
//! classes: 4-input and 6-input.
//!
//! ## Pipeline
//!
//! 1. **Specification**: a [`SopSpec`][crate::sop::SopSpec] maps output names
//!    to products of literals. Outputs may reference each other, but not in a loop.
//! 2. **Mapping**: each term is split into LUT-sized AND chunks drawing on a
//!    finite [`ResourcePool`][crate::resource::ResourcePool]; per-term results
//!    are joined by an OR stage named after the output.
//! 3. **Connectivity**: a [`ConnectivityGraph`][crate::graph::ConnectivityGraph]
//!    records which LUT feeds which.
//! 4. **Bitstream**: the netlist and graph are persisted as JSON and can be
//!    restored without running the mapper again.
//!
//! ## Basic Usage
//!
//! ```rust
//! use vfpga::bitstream;
//! use vfpga::mapper::MapperConfig;
//! use vfpga::sop::SopSpec;
//! use vfpga::synth::Synthesis;
//!
//! let spec = SopSpec::parse("X = a*c + a*c*b + b*d\nY = X*!d").unwrap();
//! let synthesis = Synthesis::run(&spec, &MapperConfig::default()).unwrap();
//!
//! for (id, lut) in synthesis.netlist.iter() {
//!     println!("#{} {}", id, lut.function());
//! }
//!
//! let bytes = synthesis.encode().unwrap();
//! let (netlist, graph) = bitstream::decode(&bytes).unwrap();
//! assert_eq!(netlist, synthesis.netlist);
//! assert_eq!(graph, synthesis.graph);
//! ```
//!
//! ## Core Components
//!
//! - **[`truth_table`]**: truth tables over sorted signal names.
//! - **[`decompose`]**: the greedy chunking policy.
//! - **[`mapper`]**: netlist construction per output.
//! - **[`bitstream`]**: persisted form of a mapped design.
//! - **[`dot`]**: Graphviz rendering of a mapped design.

pub mod bitstream;
pub mod decompose;
pub mod dot;
pub mod error;
pub mod expr;
pub mod graph;
pub mod literal;
pub mod mapper;
pub mod netlist;
pub mod report;
pub mod resource;
pub mod sop;
pub mod synth;
pub mod truth_table;

pub use error::{BitstreamError, Error, Result};
