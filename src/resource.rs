//! LUT capacity accounting.

use std::fmt;

use log::debug;

use crate::error::{Error, Result};

/// The two LUT sizes offered by the fabric.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum LutClass {
    Lut4,
    Lut6,
}

impl LutClass {
    pub const ALL: [LutClass; 2] = [LutClass::Lut4, LutClass::Lut6];

    /// Maximum number of inputs of a LUT of this class.
    pub const fn inputs(self) -> usize {
        match self {
            LutClass::Lut4 => 4,
            LutClass::Lut6 => 6,
        }
    }
}

impl fmt::Display for LutClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LUT{}", self.inputs())
    }
}

/// A copy of the pool counters at one point in time.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub struct PoolSnapshot {
    pub lut4_total: usize,
    pub lut4_available: usize,
    pub lut6_total: usize,
    pub lut6_available: usize,
}

impl PoolSnapshot {
    pub fn total(&self, class: LutClass) -> usize {
        match class {
            LutClass::Lut4 => self.lut4_total,
            LutClass::Lut6 => self.lut6_total,
        }
    }

    pub fn available(&self, class: LutClass) -> usize {
        match class {
            LutClass::Lut4 => self.lut4_available,
            LutClass::Lut6 => self.lut6_available,
        }
    }

    pub fn used(&self, class: LutClass) -> usize {
        self.total(class) - self.available(class)
    }
}

/// Remaining LUT capacity for one synthesis run.
///
/// Counters only ever go down: there is no release. For each class,
/// `used + available == total` holds at all times.
#[derive(Debug, Clone)]
pub struct ResourcePool {
    lut4_total: usize,
    lut4_available: usize,
    lut6_total: usize,
    lut6_available: usize,
}

impl ResourcePool {
    pub fn new(lut4_total: usize, lut6_total: usize) -> Self {
        Self {
            lut4_total,
            lut4_available: lut4_total,
            lut6_total,
            lut6_available: lut6_total,
        }
    }

    pub fn total(&self, class: LutClass) -> usize {
        self.snapshot().total(class)
    }

    pub fn available(&self, class: LutClass) -> usize {
        self.snapshot().available(class)
    }

    pub fn used(&self, class: LutClass) -> usize {
        self.snapshot().used(class)
    }

    pub fn snapshot(&self) -> PoolSnapshot {
        PoolSnapshot {
            lut4_total: self.lut4_total,
            lut4_available: self.lut4_available,
            lut6_total: self.lut6_total,
            lut6_available: self.lut6_available,
        }
    }

    /// Takes one LUT of the given class.
    ///
    /// Fails with [`Error::ResourceExhausted`] (with an empty chunk) if none is left.
    pub fn acquire(&mut self, class: LutClass) -> Result<()> {
        if self.available(class) == 0 {
            debug!("acquire(class = {}) -> exhausted", class);
            return Err(Error::ResourceExhausted {
                chunk: Vec::new(),
                pool: self.snapshot(),
            });
        }
        match class {
            LutClass::Lut4 => self.lut4_available -= 1,
            LutClass::Lut6 => self.lut6_available -= 1,
        }
        debug!("acquire(class = {}) -> {} left", class, self.available(class));
        Ok(())
    }

    /// Takes one LUT of the first class in `preference` that still has stock.
    pub fn acquire_first(&mut self, preference: &[LutClass]) -> Option<LutClass> {
        preference.iter().copied().find(|&class| self.acquire(class).is_ok())
    }
}
