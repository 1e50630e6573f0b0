//! Resource usage summary.
//!
//! Purely derived from two pool snapshots; nothing here touches the mapper.

use std::fmt;

use crate::resource::{LutClass, PoolSnapshot};

/// Usage of one LUT class between two snapshots.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ClassUsage {
    pub class: LutClass,
    pub total: usize,
    pub used: usize,
    pub available: usize,
    /// Share of `total` consumed, in percent. `0.0` when `total` is zero.
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UsageReport {
    pub lut4: ClassUsage,
    pub lut6: ClassUsage,
}

impl UsageReport {
    pub fn new(before: &PoolSnapshot, after: &PoolSnapshot) -> Self {
        let usage = |class: LutClass| {
            let total = before.available(class);
            let available = after.available(class);
            let used = total.saturating_sub(available);
            let percent = if total == 0 {
                0.0
            } else {
                used as f64 * 100.0 / total as f64
            };
            ClassUsage {
                class,
                total,
                used,
                available,
                percent,
            }
        };
        Self {
            lut4: usage(LutClass::Lut4),
            lut6: usage(LutClass::Lut6),
        }
    }

    pub fn get(&self, class: LutClass) -> &ClassUsage {
        match class {
            LutClass::Lut4 => &self.lut4,
            LutClass::Lut6 => &self.lut6,
        }
    }

    pub fn total_used(&self) -> usize {
        self.lut4.used + self.lut6.used
    }
}

impl fmt::Display for UsageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<6} {:>6} {:>6} {:>6} {:>7}", "class", "used", "free", "total", "used%")?;
        for usage in [&self.lut4, &self.lut6] {
            writeln!(
                f,
                "{:<6} {:>6} {:>6} {:>6} {:>6.1}%",
                usage.class.to_string(),
                usage.used,
                usage.available,
                usage.total,
                usage.percent
            )?;
        }
        Ok(())
    }
}
