//! LUT primitives and the netlist that holds them.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use log::debug;

use crate::error::{Error, Result};
use crate::expr::Function;
use crate::truth_table::TruthTable;

/// Upper bound on LUT inputs (the wider class).
pub const MAX_LUT_INPUTS: usize = 6;

/// A lookup table primitive.
///
/// The truth table is always derived from the function string, never
/// supplied directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lut {
    inputs: Vec<String>,
    output: String,
    function: String,
    truth_table: TruthTable,
}

impl Lut {
    /// Creates a LUT, computing its truth table from `function`.
    ///
    /// `function` must have the form `output=expr`, and its literals must be
    /// exactly the names listed in `inputs` (in any order).
    pub fn new(inputs: Vec<String>, output: impl Into<String>, function: impl Into<String>) -> Result<Self> {
        let output = output.into();
        let function = function.into();
        let parsed = Function::parse(&function)?;
        if parsed.output != output {
            return Err(Error::malformed(
                &function,
                0,
                format!("function drives '{}' but the LUT output is '{}'", parsed.output, output),
            ));
        }
        let truth_table = TruthTable::from_expr(&parsed.expr)?;
        let declared: BTreeSet<&str> = inputs.iter().map(String::as_str).collect();
        let used: BTreeSet<&str> = truth_table.vars().iter().map(String::as_str).collect();
        if declared != used || declared.len() != inputs.len() {
            return Err(Error::malformed(
                &function,
                0,
                format!("LUT inputs [{}] do not match the function literals", inputs.join(", ")),
            ));
        }
        if inputs.len() > MAX_LUT_INPUTS {
            return Err(Error::malformed(
                &function,
                0,
                format!("{} inputs exceed the LUT width of {}", inputs.len(), MAX_LUT_INPUTS),
            ));
        }
        Ok(Self {
            inputs,
            output,
            function,
            truth_table,
        })
    }

    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn truth_table(&self) -> &TruthTable {
        &self.truth_table
    }

    /// Number of inputs actually wired.
    pub fn bits(&self) -> usize {
        self.inputs.len()
    }
}

impl fmt::Display for Lut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LUT[{}]({}) {}", self.bits(), self.inputs.join(","), self.function)
    }
}

/// Append-only list of LUTs, indexed by position and by output name.
///
/// Exactly one LUT drives any given name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Netlist {
    luts: Vec<Lut>,
    index: HashMap<String, usize>,
}

impl Netlist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.luts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.luts.is_empty()
    }

    pub fn luts(&self) -> &[Lut] {
        &self.luts
    }

    pub fn get(&self, id: usize) -> Option<&Lut> {
        self.luts.get(id)
    }

    /// Index of the LUT driving `name`, if any.
    pub fn producer(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Appends a LUT and returns its index.
    ///
    /// Returns the LUT back if its output name is already driven.
    pub fn push(&mut self, lut: Lut) -> Result<usize, Lut> {
        if self.index.contains_key(lut.output()) {
            return Err(lut);
        }
        let id = self.luts.len();
        debug!("push(#{} = {})", id, lut);
        self.index.insert(lut.output().to_string(), id);
        self.luts.push(lut);
        Ok(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Lut)> {
        self.luts.iter().enumerate()
    }

    /// Names read by some LUT but driven by none.
    pub fn undriven_inputs(&self) -> BTreeSet<String> {
        self.luts
            .iter()
            .flat_map(|lut| lut.inputs.iter())
            .filter(|name| !self.index.contains_key(*name))
            .cloned()
            .collect()
    }

    /// Computes the value of every LUT output for the given input values.
    ///
    /// LUTs are swept in netlist order until no new value appears; the
    /// returned map also contains the supplied inputs.
    pub fn simulate(&self, inputs: &BTreeMap<String, bool>) -> Result<BTreeMap<String, bool>> {
        let mut values = inputs.clone();
        let mut remaining: Vec<&Lut> = self.luts.iter().collect();
        while !remaining.is_empty() {
            let before = remaining.len();
            remaining.retain(|lut| {
                let value = lut.truth_table.lookup(|name| values.get(name).copied());
                match value {
                    Some(value) => {
                        values.insert(lut.output.clone(), value);
                        false
                    }
                    None => true,
                }
            });
            if remaining.len() == before {
                let lut = remaining[0];
                let name = lut
                    .inputs
                    .iter()
                    .find(|name| !values.contains_key(*name))
                    .unwrap_or(&lut.output);
                return Err(Error::UnresolvedSignal { name: name.clone() });
            }
        }
        Ok(values)
    }
}

impl fmt::Display for Netlist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (id, lut) in self.iter() {
            writeln!(f, "#{:<3} {}", id, lut)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lut(inputs: &[&str], output: &str, function: &str) -> Lut {
        Lut::new(inputs.iter().map(|s| s.to_string()).collect(), output, function).unwrap()
    }

    #[test]
    fn test_lut_new() {
        let l = lut(&["a", "b", "c"], "Int0", "Int0=a*b*c");
        assert_eq!(l.bits(), 3);
        assert_eq!(l.truth_table().count_ones(), 1);
        assert_eq!(l.to_string(), "LUT[3](a,b,c) Int0=a*b*c");
    }

    #[test]
    fn test_lut_rejects_mismatch() {
        let inputs = vec!["a".to_string()];
        assert!(Lut::new(inputs.clone(), "X", "Y=a").is_err());
        assert!(Lut::new(inputs.clone(), "X", "X=a*b").is_err());
        assert!(Lut::new(vec!["a".into(), "a".into()], "X", "X=a").is_err());
        let wide: Vec<String> = (0..7).map(|i| format!("i{}", i)).collect();
        let function = format!("X={}", wide.join("*"));
        assert!(Lut::new(wide, "X", function).is_err());
    }

    #[test]
    fn test_push_unique_outputs() {
        let mut netlist = Netlist::new();
        assert_eq!(netlist.push(lut(&["a"], "X", "X=a")), Ok(0));
        assert!(netlist.push(lut(&["b"], "X", "X=b")).is_err());
        assert_eq!(netlist.len(), 1);
        assert_eq!(netlist.producer("X"), Some(0));
        assert_eq!(netlist.producer("a"), None);
    }

    #[test]
    fn test_simulate_out_of_order() {
        let mut netlist = Netlist::new();
        netlist.push(lut(&["Int0", "c"], "X", "X=Int0+c")).unwrap();
        netlist.push(lut(&["a", "b"], "Int0", "Int0=a*!b")).unwrap();
        assert_eq!(netlist.undriven_inputs().len(), 3);

        let inputs: BTreeMap<String, bool> = [("a", true), ("b", false), ("c", false)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        let values = netlist.simulate(&inputs).unwrap();
        assert_eq!(values["Int0"], true);
        assert_eq!(values["X"], true);
    }

    #[test]
    fn test_simulate_unresolved() {
        let mut netlist = Netlist::new();
        netlist.push(lut(&["a", "b"], "X", "X=a+b")).unwrap();
        let inputs: BTreeMap<String, bool> = [("a".to_string(), true)].into_iter().collect();
        match netlist.simulate(&inputs) {
            Err(Error::UnresolvedSignal { name }) => assert_eq!(name, "b"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
