//! Netlist construction from a sum-of-products specification.
//!
//! For each output, in declaration order, every term is decomposed into an
//! AND chain (see [`decompose`](crate::decompose)) and the per-term
//! representatives are joined by a terminal stage:
//!
//! - a single term gets a rename LUT `X=rep`;
//! - several terms get an OR LUT `X=rep0+rep1+...`; beyond 6 terms the OR
//!   stage itself is chained through intermediate LUTs of at most 6 inputs.
//!
//! Terminal stages do not draw on the resource pool; only term chunks do.

use std::collections::VecDeque;

use log::{debug, info, warn};

use crate::decompose::{decompose_term, NameGen};
use crate::error::{Error, Result};
use crate::literal::Term;
use crate::netlist::{Lut, Netlist, MAX_LUT_INPUTS};
use crate::resource::{PoolSnapshot, ResourcePool};
use crate::sop::SopSpec;

/// Capacity configuration for one mapping run.
///
/// # Examples
///
/// ```
/// use vfpga::mapper::MapperConfig;
///
/// let config = MapperConfig::default().with_lut4(100).with_lut6(0);
/// assert_eq!(config.lut4_total, 100);
/// assert_eq!(config.lut6_total, 0);
/// ```
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct MapperConfig {
    /// Number of 4-input LUTs on the fabric (0 disables the class).
    pub lut4_total: usize,
    /// Number of 6-input LUTs on the fabric (0 disables the class).
    pub lut6_total: usize,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            lut4_total: 64,
            lut6_total: 32,
        }
    }
}

impl MapperConfig {
    pub fn with_lut4(mut self, total: usize) -> Self {
        self.lut4_total = total;
        self
    }

    pub fn with_lut6(mut self, total: usize) -> Self {
        self.lut6_total = total;
        self
    }
}

/// Single-use builder owning the pool and the name counter of one build.
#[derive(Debug)]
pub struct NetlistBuilder {
    pool: ResourcePool,
    names: NameGen,
    netlist: Netlist,
}

impl NetlistBuilder {
    pub fn new(config: &MapperConfig) -> Self {
        Self {
            pool: ResourcePool::new(config.lut4_total, config.lut6_total),
            names: NameGen::new(),
            netlist: Netlist::new(),
        }
    }

    /// Keeps generated names clear of the given user signal names.
    pub fn reserve_names(&mut self, names: impl IntoIterator<Item = String>) {
        self.names = NameGen::with_reserved(names);
    }

    pub fn pool(&self) -> &ResourcePool {
        &self.pool
    }

    pub fn netlist(&self) -> &Netlist {
        &self.netlist
    }

    fn append(&mut self, lut: Lut) -> Result<()> {
        self.netlist.push(lut).map(|_| ()).map_err(|lut| {
            Error::malformed(
                lut.function(),
                0,
                format!("signal '{}' is already driven", lut.output()),
            )
        })
    }

    /// Maps one output. Does nothing if some LUT already drives `name`.
    ///
    /// Fails if a LUT built for this output would drive a name that is
    /// already driven, which [`reserve_names`](Self::reserve_names) rules out
    /// for user signals.
    pub fn add_output(&mut self, name: &str, terms: &[Term]) -> Result<()> {
        debug!("add_output(name = {}, terms = {})", name, terms.len());
        if self.netlist.producer(name).is_some() {
            warn!("output '{}' is already mapped, skipping", name);
            return Ok(());
        }
        if terms.is_empty() {
            return Err(Error::malformed(name, 0, "output has no terms"));
        }

        let mut representatives: Vec<String> = Vec::with_capacity(terms.len());
        for term in terms {
            let decomposition = decompose_term(term, &mut self.pool, &mut self.names)?;
            for lut in decomposition.luts {
                self.append(lut)?;
            }
            representatives.push(decomposition.representative);
        }

        if let [representative] = representatives.as_slice() {
            let function = format!("{}={}", name, representative);
            let lut = Lut::new(vec![representative.clone()], name, function)?;
            return self.append(lut);
        }

        let mut remaining: VecDeque<String> = representatives.into();
        while remaining.len() > MAX_LUT_INPUTS {
            let chunk: Vec<String> = remaining.drain(..MAX_LUT_INPUTS).collect();
            let output = self.names.fresh();
            debug!("add_output: OR stage over {} terms -> {}", chunk.len(), output);
            self.append(or_lut(chunk, &output)?)?;
            remaining.push_front(output);
        }
        self.append(or_lut(remaining.into(), name)?)
    }

    pub fn finish(self) -> (Netlist, ResourcePool) {
        (self.netlist, self.pool)
    }
}

/// Builds an OR LUT over `inputs`; duplicate names are wired once.
fn or_lut(inputs: Vec<String>, output: &str) -> Result<Lut> {
    let function = format!("{}={}", output, inputs.join("+"));
    let mut unique: Vec<String> = Vec::with_capacity(inputs.len());
    for name in inputs {
        if !unique.contains(&name) {
            unique.push(name);
        }
    }
    Lut::new(unique, output, function)
}

/// Builds the netlist for `spec`.
///
/// Fails before allocating anything if outputs depend on each other in a
/// loop. Returns the netlist with the pool snapshots taken before and after
/// the build.
pub fn build_netlist(spec: &SopSpec, config: &MapperConfig) -> Result<(Netlist, PoolSnapshot, PoolSnapshot)> {
    debug!("build_netlist(outputs = {}, config = {:?})", spec.len(), config);
    spec.check_acyclic()?;

    let mut builder = NetlistBuilder::new(config);
    builder.reserve_names(spec.output_names().into_iter().chain(spec.primary_inputs()));
    let before = builder.pool().snapshot();
    for (name, terms) in spec.iter() {
        builder.add_output(name, terms)?;
    }
    let (netlist, pool) = builder.finish();

    info!("mapped {} outputs onto {} LUTs", spec.len(), netlist.len());
    Ok((netlist, before, pool.snapshot()))
}
