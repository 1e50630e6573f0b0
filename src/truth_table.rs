//! Truth tables for LUT functions.
//!
//! A truth table fixes its variable order by sorting the referenced signal
//! names lexicographically. Row `i` holds the function value for the
//! assignment whose bits, read from the first variable to the last, spell
//! `i` in binary: the first variable is the most significant bit, so rows
//! enumerate assignments in the order `(0,..,0,0)`, `(0,..,0,1)`, ...

use std::fmt;

use log::debug;

use crate::error::{Error, Result};
use crate::expr::{Expr, Function};

/// Upper bound on the number of variables a table may span.
pub const MAX_VARS: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TruthTable {
    vars: Vec<String>,
    rows: Vec<bool>,
}

impl TruthTable {
    /// Builds the truth table of `expr` over its sorted variable names.
    pub fn from_expr(expr: &Expr) -> Result<Self> {
        let vars: Vec<String> = expr.vars().into_iter().collect();
        if vars.len() > MAX_VARS {
            return Err(Error::malformed(
                &expr.to_string(),
                0,
                format!("{} variables exceed the truth table limit of {}", vars.len(), MAX_VARS),
            ));
        }

        let n = vars.len();
        let mut rows = Vec::with_capacity(1 << n);
        let mut assignment = vec![false; n];
        for i in 0..(1usize << n) {
            for (j, value) in assignment.iter_mut().enumerate() {
                *value = (i >> (n - 1 - j)) & 1 == 1;
            }
            let lookup = |name: &str| vars.iter().position(|v| v == name).map(|k| assignment[k]);
            // Every variable of `expr` is in `vars`, so the lookup never misses.
            rows.push(expr.eval(&lookup).unwrap_or(false));
        }

        Ok(Self { vars, rows })
    }

    /// Parses a function string and builds its truth table.
    ///
    /// # Examples
    ///
    /// ```
    /// use vfpga::truth_table::TruthTable;
    ///
    /// let tt = TruthTable::from_function("Z = a*b+c").unwrap();
    /// assert_eq!(tt.vars(), &["a", "b", "c"]);
    /// assert_eq!(tt.get(&[true, true, false]), Some(true));
    /// assert_eq!(tt.get(&[true, false, false]), Some(false));
    /// ```
    pub fn from_function(function: &str) -> Result<Self> {
        debug!("from_function({:?})", function);
        let function = Function::parse(function)?;
        Self::from_expr(&function.expr)
    }

    /// Variable names in bit-position order.
    pub fn vars(&self) -> &[String] {
        &self.vars
    }

    pub fn num_vars(&self) -> usize {
        self.vars.len()
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    fn index_of(assignment: &[bool]) -> usize {
        assignment.iter().fold(0, |acc, &b| (acc << 1) | b as usize)
    }

    /// Looks up the result for an assignment given in [`vars`](Self::vars) order.
    ///
    /// Returns `None` if the assignment has the wrong width.
    pub fn get(&self, assignment: &[bool]) -> Option<bool> {
        if assignment.len() != self.vars.len() {
            return None;
        }
        self.rows.get(Self::index_of(assignment)).copied()
    }

    /// Looks up the result with signal values supplied by name.
    pub fn lookup(&self, value: impl Fn(&str) -> Option<bool>) -> Option<bool> {
        let assignment = self.vars.iter().map(|v| value(v.as_str())).collect::<Option<Vec<_>>>()?;
        self.get(&assignment)
    }

    /// Iterates over `(assignment, result)` rows in enumeration order.
    pub fn iter(&self) -> impl Iterator<Item = (Vec<bool>, bool)> + '_ {
        let n = self.vars.len();
        self.rows.iter().enumerate().map(move |(i, &result)| {
            let assignment = (0..n).map(|j| (i >> (n - 1 - j)) & 1 == 1).collect();
            (assignment, result)
        })
    }

    /// Number of assignments mapped to `true`.
    pub fn count_ones(&self) -> usize {
        self.rows.iter().filter(|&&b| b).count()
    }
}

impl fmt::Display for TruthTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "({})", self.vars.join(","))?;
        for (assignment, result) in self.iter() {
            let bits: Vec<&str> = assignment.iter().map(|&b| if b { "1" } else { "0" }).collect();
            writeln!(f, "({}): {}", bits.join(","), result as u8)?;
        }
        Ok(())
    }
}
