//! Sum-of-products specifications.
//!
//! A [`SopSpec`] maps output names to their terms, in declaration order.
//! Any literal name may refer either to a primary input or to another
//! declared output.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use log::debug;

use crate::error::{Error, Result};
use crate::literal::{is_identifier, Term};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SopSpec {
    outputs: Vec<(String, Vec<Term>)>,
}

impl SopSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an output. Builder-style counterpart of [`add_output`](Self::add_output).
    pub fn with_output(mut self, name: impl Into<String>, terms: Vec<Term>) -> Self {
        self.add_output(name, terms);
        self
    }

    /// Appends an output.
    ///
    /// Outputs are kept in insertion order. Declaring the same name twice
    /// keeps both entries; the mapper only builds the first.
    pub fn add_output(&mut self, name: impl Into<String>, terms: Vec<Term>) {
        self.outputs.push((name.into(), terms));
    }

    /// Parses a single equation such as `X=a*c+a*c*b+!b*d`.
    pub fn parse_equation(&mut self, equation: &str) -> Result<()> {
        let (lhs, rhs) = equation
            .split_once('=')
            .ok_or_else(|| Error::malformed(equation, 0, "missing '='"))?;
        let name = lhs.trim();
        if !is_identifier(name) {
            return Err(Error::malformed(equation, 0, format!("invalid output name '{}'", name)));
        }
        let terms = rhs
            .split('+')
            .map(Term::parse)
            .collect::<Result<Vec<_>>>()
            .map_err(|e| match e {
                Error::MalformedExpression { message, .. } => Error::malformed(equation, lhs.len() + 1, message),
                other => other,
            })?;
        self.add_output(name, terms);
        Ok(())
    }

    /// Parses one equation per line. Blank lines and lines starting with `#` are skipped.
    ///
    /// # Examples
    ///
    /// ```
    /// use vfpga::sop::SopSpec;
    ///
    /// let spec = SopSpec::parse("
    ///     ## shared product
    ///     X = a*c + b*d
    ///     Y = X*d
    /// ").unwrap();
    /// assert_eq!(spec.len(), 2);
    /// assert!(spec.primary_inputs().contains("a"));
    /// assert!(!spec.primary_inputs().contains("X"));
    /// ```
    pub fn parse(text: &str) -> Result<Self> {
        let mut spec = Self::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            spec.parse_equation(line)?;
        }
        Ok(spec)
    }

    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Term])> {
        self.outputs.iter().map(|(name, terms)| (name.as_str(), terms.as_slice()))
    }

    /// Outputs in declaration order, keeping only the first declaration of
    /// each name. This is what the mapper builds.
    pub fn declarations(&self) -> impl Iterator<Item = (&str, &[Term])> {
        let mut seen: BTreeSet<&str> = BTreeSet::new();
        self.iter().filter(move |(name, _)| seen.insert(*name))
    }

    /// Terms of the first output declared as `name`.
    pub fn terms(&self, name: &str) -> Option<&[Term]> {
        self.iter().find(|(n, _)| *n == name).map(|(_, terms)| terms)
    }

    /// Declared output names.
    pub fn output_names(&self) -> BTreeSet<String> {
        self.outputs.iter().map(|(name, _)| name.clone()).collect()
    }

    /// Names referenced by some term but never declared as an output.
    pub fn primary_inputs(&self) -> BTreeSet<String> {
        let outputs = self.output_names();
        self.outputs
            .iter()
            .flat_map(|(_, terms)| terms.iter())
            .flat_map(|term| term.literals().iter())
            .map(|literal| literal.name())
            .filter(|name| !outputs.contains(*name))
            .map(str::to_string)
            .collect()
    }

    /// Removes, per output, every term covered by another term
    /// (`a*b + a*b*c` becomes `a*b`). Of two identical terms the first is kept.
    /// Surviving terms keep their relative order.
    pub fn simplify(&mut self) {
        for (name, terms) in self.outputs.iter_mut() {
            let before = terms.len();
            *terms = absorb(terms);
            if terms.len() != before {
                debug!("simplify({}): {} -> {} terms", name, before, terms.len());
            }
        }
    }

    /// Finds a loop in the output-dependency graph (output -> outputs its terms reference).
    ///
    /// Returns the names on the loop with the first name repeated at the end.
    pub fn find_cycle(&self) -> Option<Vec<String>> {
        #[derive(Copy, Clone, Eq, PartialEq)]
        enum Mark {
            Active,
            Done,
        }

        let deps: BTreeMap<&str, Vec<&str>> = {
            let mut deps: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
            let outputs = self.output_names();
            for (name, terms) in self.declarations() {
                let entry = deps.entry(name).or_default();
                for literal in terms.iter().flat_map(|t| t.literals()) {
                    if outputs.contains(literal.name()) && !entry.contains(&literal.name()) {
                        entry.push(literal.name());
                    }
                }
            }
            deps
        };

        // Iterative DFS; `path` mirrors the active stack.
        let mut marks: HashMap<&str, Mark> = HashMap::new();
        for (root, _) in self.declarations() {
            if marks.contains_key(root) {
                continue;
            }
            let mut stack: Vec<(&str, usize)> = vec![(root, 0)];
            let mut path: Vec<&str> = vec![root];
            marks.insert(root, Mark::Active);
            while let Some((node, next)) = stack.last_mut() {
                let children = deps.get(*node).map(Vec::as_slice).unwrap_or(&[]);
                if let Some(&child) = children.get(*next) {
                    *next += 1;
                    match marks.get(child) {
                        Some(Mark::Active) => {
                            let start = path.iter().position(|&n| n == child).unwrap_or(0);
                            let mut cycle: Vec<String> = path[start..].iter().map(|s| s.to_string()).collect();
                            cycle.push(child.to_string());
                            return Some(cycle);
                        }
                        Some(Mark::Done) => {}
                        None => {
                            marks.insert(child, Mark::Active);
                            stack.push((child, 0));
                            path.push(child);
                        }
                    }
                } else {
                    marks.insert(*node, Mark::Done);
                    stack.pop();
                    path.pop();
                }
            }
        }
        None
    }

    /// Fails with [`Error::CyclicDependency`] if outputs depend on each other in a loop.
    pub fn check_acyclic(&self) -> Result<()> {
        match self.find_cycle() {
            Some(cycle) => Err(Error::CyclicDependency { cycle }),
            None => Ok(()),
        }
    }

    /// Evaluates every output directly from its terms, given primary input values.
    ///
    /// Outputs may depend on each other in any declaration order. Only the
    /// first declaration of a name counts.
    pub fn eval(&self, inputs: &BTreeMap<String, bool>) -> Result<BTreeMap<String, bool>> {
        self.check_acyclic()?;
        let mut values = inputs.clone();
        loop {
            let mut progress = false;
            let mut pending = None;
            for (name, terms) in self.declarations() {
                if values.contains_key(name) {
                    continue;
                }
                let lookup = |n: &str| values.get(n).copied();
                let result: Option<Vec<bool>> = terms.iter().map(|t| t.eval(lookup)).collect();
                match result {
                    Some(results) => {
                        let value = results.into_iter().any(|b| b);
                        values.insert(name.to_string(), value);
                        progress = true;
                    }
                    None => pending = pending.or(Some(name)),
                }
            }
            match pending {
                None => return Ok(values),
                Some(name) if !progress => return Err(Error::UnresolvedSignal { name: name.to_string() }),
                Some(_) => {}
            }
        }
    }
}

/// Drops terms covered by another term of the same sum.
pub fn absorb(terms: &[Term]) -> Vec<Term> {
    terms
        .iter()
        .enumerate()
        .filter(|&(i, term)| {
            !terms.iter().enumerate().any(|(j, other)| {
                // Equal length plus coverage means the same literal set.
                j != i && term.is_covered_by(other) && (other.len() < term.len() || j < i)
            })
        })
        .map(|(_, term)| term.clone())
        .collect()
}

impl fmt::Display for SopSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, terms) in self.iter() {
            let sum: Vec<String> = terms.iter().map(Term::to_string).collect();
            writeln!(f, "{}={}", name, sum.join("+"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    fn spec(text: &str) -> SopSpec {
        SopSpec::parse(text).unwrap()
    }

    #[test]
    fn test_parse_equation() {
        let s = spec("X=a*c+a*c*b+b*d");
        let terms = s.terms("X").unwrap();
        assert_eq!(terms.len(), 3);
        assert_eq!(terms[1], Term::from_names(&["a", "c", "b"]));
        assert_eq!(s.to_string(), "X=a*c+a*c*b+b*d\n");
    }

    #[test]
    fn test_parse_errors() {
        assert!(SopSpec::parse("X").is_err());
        assert!(SopSpec::parse("X=a++b").is_err());
        assert!(SopSpec::parse("1X=a").is_err());
        assert!(SopSpec::parse("X=a*(b)").is_err());
    }

    #[test]
    fn test_inputs_and_outputs() {
        let s = spec("X=a*c+b*d\nY=X*d\nZ=X*a+X*!c*d");
        let inputs: Vec<_> = s.primary_inputs().into_iter().collect();
        assert_eq!(inputs, vec!["a", "b", "c", "d"]);
        let outputs: Vec<_> = s.output_names().into_iter().collect();
        assert_eq!(outputs, vec!["X", "Y", "Z"]);
    }

    #[test]
    fn test_simplify_absorbs_supersets() {
        let mut s = spec("X=a*b+a*b*c+a*c+d+d*e+f");
        s.simplify();
        assert_eq!(s.to_string(), "X=a*b+a*c+d+f\n");
    }

    #[test]
    fn test_simplify_duplicates() {
        let mut s = spec("X=b*a+a*b+c");
        s.simplify();
        assert_eq!(s.to_string(), "X=b*a+c\n");
    }

    #[test]
    fn test_simplify_keeps_polarity_apart() {
        let mut s = spec("X=a*b+!a*b*c");
        s.simplify();
        assert_eq!(s.terms("X").unwrap().len(), 2);
    }

    #[test]
    fn test_find_cycle() {
        let s = spec("A=B*x\nB=C+y\nC=A*z");
        let cycle = s.find_cycle().unwrap();
        assert_eq!(cycle, vec!["A", "B", "C", "A"]);
        assert!(matches!(s.check_acyclic(), Err(Error::CyclicDependency { .. })));
    }

    #[test]
    fn test_self_loop() {
        let s = spec("A=A*x+y");
        assert_eq!(s.find_cycle(), Some(vec!["A".to_string(), "A".to_string()]));
    }

    #[test]
    fn test_duplicate_declaration_ignored_for_cycles() {
        let s = spec("X=a\nX=Y\nY=X");
        assert_eq!(s.find_cycle(), None);
        let inputs: BTreeMap<String, bool> = [("a".to_string(), true)].into_iter().collect();
        let values = s.eval(&inputs).unwrap();
        assert_eq!(values["X"], true);
        assert_eq!(values["Y"], true);

        let looped = spec("X=Y\nX=a\nY=X");
        assert_eq!(looped.find_cycle(), Some(vec!["X".to_string(), "Y".to_string(), "X".to_string()]));
    }

    #[test]
    fn test_acyclic_diamond() {
        let s = spec("W=X*Y*Z+X*Y\nX=a*b\nY=X*d\nZ=X*a+Y");
        assert_eq!(s.find_cycle(), None);
    }

    #[test]
    fn test_eval_dependent_outputs() {
        let s = spec("Y=X*d\nX=a*c+b*d");
        let inputs: BTreeMap<String, bool> = [("a", false), ("b", true), ("c", false), ("d", true)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        let values = s.eval(&inputs).unwrap();
        assert_eq!(values["X"], true);
        assert_eq!(values["Y"], true);
    }

    #[test]
    fn test_eval_missing_input() {
        let s = spec("X=a*b");
        let inputs: BTreeMap<String, bool> = [("a".to_string(), true)].into_iter().collect();
        assert!(matches!(s.eval(&inputs), Err(Error::UnresolvedSignal { .. })));
    }
}
