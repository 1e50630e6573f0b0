//! Splitting product terms into LUT-sized chunks.
//!
//! # Chunking policy
//!
//! The remaining literals of a term are consumed front to back:
//!
//! 1. At most 4 left: take all of them, in a LUT4 if one is free, else a LUT6.
//! 2. More than 6 left and a LUT6 free: take the first 6.
//! 3. Otherwise (5 or 6 left, or no LUT6): take the first 4 in a LUT4.
//!
//! If none of these can get a LUT, decomposition fails with
//! [`Error::ResourceExhausted`]. After each chunk the fresh intermediate name
//! is pushed to the front of what is left, so later LUTs AND the running
//! product and the last LUT of the chain carries the whole term.
//!
//! The policy is greedy and deterministic; it does not try to minimise LUT count.

use std::collections::{HashSet, VecDeque};

use log::debug;

use crate::error::{Error, Result};
use crate::literal::{Literal, Term};
use crate::netlist::Lut;
use crate::resource::{LutClass, ResourcePool};

/// Prefix of generated intermediate signal names.
pub const INTERMEDIATE_PREFIX: &str = "Int";

/// Source of intermediate names `Int0`, `Int1`, ... for one build.
///
/// Names listed as reserved (user signals) are skipped, so generated names
/// never collide with the specification's own.
#[derive(Debug, Clone, Default)]
pub struct NameGen {
    next: usize,
    reserved: HashSet<String>,
}

impl NameGen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reserved(reserved: impl IntoIterator<Item = String>) -> Self {
        Self {
            next: 0,
            reserved: reserved.into_iter().collect(),
        }
    }

    pub fn fresh(&mut self) -> String {
        loop {
            let name = format!("{}{}", INTERMEDIATE_PREFIX, self.next);
            self.next += 1;
            if !self.reserved.contains(&name) {
                return name;
            }
        }
    }

    /// Number of names handed out or skipped so far.
    pub fn count(&self) -> usize {
        self.next
    }
}

/// Result of decomposing one term.
#[derive(Debug, Clone)]
pub struct Decomposition {
    /// LUTs of the chain, in creation order.
    pub luts: Vec<Lut>,
    /// Class drawn from the pool for each LUT of `luts`.
    pub classes: Vec<LutClass>,
    /// The signal carrying the term's value: the sole literal when no LUT
    /// was needed, else the output of the last LUT.
    pub representative: String,
}

/// Builds the AND LUT for one chunk.
pub fn and_lut(chunk: &[Literal], output: &str) -> Result<Lut> {
    let mut inputs: Vec<String> = Vec::with_capacity(chunk.len());
    for literal in chunk {
        if !inputs.iter().any(|name| name == literal.name()) {
            inputs.push(literal.name().to_string());
        }
    }
    let function = format!("{}={}", output, Term::new(chunk.iter().cloned()));
    Lut::new(inputs, output, function)
}

/// Decomposes `term` into a chain of AND LUTs, drawing capacity from `pool`.
///
/// A term made of a single positive literal needs no LUT.
pub fn decompose_term(term: &Term, pool: &mut ResourcePool, names: &mut NameGen) -> Result<Decomposition> {
    debug!("decompose_term(term = {})", term);

    match term.literals() {
        [] => return Err(Error::malformed("", 0, "empty term")),
        [literal] if !literal.is_inverted() => {
            return Ok(Decomposition {
                luts: Vec::new(),
                classes: Vec::new(),
                representative: literal.name().to_string(),
            });
        }
        _ => {}
    }

    let mut remaining: VecDeque<Literal> = term.literals().iter().cloned().collect();
    let mut luts = Vec::new();
    let mut classes = Vec::new();

    loop {
        let len = remaining.len();
        let allocation = if len <= LutClass::Lut4.inputs() {
            pool.acquire_first(&[LutClass::Lut4, LutClass::Lut6]).map(|class| (class, len))
        } else if len > LutClass::Lut6.inputs() && pool.acquire(LutClass::Lut6).is_ok() {
            Some((LutClass::Lut6, LutClass::Lut6.inputs()))
        } else {
            pool.acquire(LutClass::Lut4)
                .ok()
                .map(|_| (LutClass::Lut4, LutClass::Lut4.inputs()))
        };

        let Some((class, take)) = allocation else {
            let chunk: Vec<String> = remaining.iter().map(Literal::to_string).collect();
            debug!("decompose_term: exhausted on [{}]", chunk.join(", "));
            return Err(Error::ResourceExhausted {
                chunk,
                pool: pool.snapshot(),
            });
        };

        let chunk: Vec<Literal> = remaining.drain(..take).collect();
        let output = names.fresh();
        debug!("decompose_term: {} takes {} literals -> {}", class, take, output);
        luts.push(and_lut(&chunk, &output)?);
        classes.push(class);

        if remaining.is_empty() {
            return Ok(Decomposition {
                luts,
                classes,
                representative: output,
            });
        }
        remaining.push_front(Literal::positive(output));
    }
}
