//! Literals and product terms.
//!
//! A [`Literal`] is a named signal, optionally inverted. A [`Term`] is an
//! AND-product of literals. Literal order inside a term only matters for
//! display and for how the term is chunked into LUTs; its Boolean value
//! does not depend on it.

use std::fmt::{self, Display};
use std::ops::Not;

use crate::error::{Error, Result};

/// Prefix marking an inverted literal.
pub const INVERSION_MARKER: char = '!';

/// Returns `true` if `name` is a valid signal identifier:
/// ASCII alphanumerics and `_`, not starting with a digit.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// A Boolean literal: a signal name and its polarity.
///
/// Two literals are equal iff both the name and the polarity match.
///
/// # Examples
///
/// ```
/// use vfpga::literal::Literal;
///
/// let a = Literal::positive("a");
/// let not_a = !a.clone();
///
/// assert!(not_a.is_inverted());
/// assert_eq!(not_a.name(), "a");
/// assert_eq!(not_a.to_string(), "!a");
/// assert_eq!(Literal::parse("!a").unwrap(), not_a);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Literal {
    name: String,
    inverted: bool,
}

impl Literal {
    pub fn positive(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inverted: false,
        }
    }

    pub fn negative(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inverted: true,
        }
    }

    /// Parses a literal token such as `a` or `!a`.
    pub fn parse(token: &str) -> Result<Self> {
        let trimmed = token.trim();
        let (inverted, name) = match trimmed.strip_prefix(INVERSION_MARKER) {
            Some(rest) => (true, rest.trim_start()),
            None => (false, trimmed),
        };
        if !is_identifier(name) {
            return Err(Error::malformed(token, 0, format!("invalid literal name '{}'", name)));
        }
        Ok(Self {
            name: name.to_string(),
            inverted,
        })
    }

    /// The base signal name, without the inversion marker.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    /// Value of this literal given the value of its base signal.
    pub fn apply(&self, value: bool) -> bool {
        value != self.inverted
    }
}

impl Not for Literal {
    type Output = Self;

    fn not(self) -> Self::Output {
        Self {
            name: self.name,
            inverted: !self.inverted,
        }
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.inverted {
            write!(f, "{}", INVERSION_MARKER)?;
        }
        write!(f, "{}", self.name)
    }
}

/// An AND-product of literals.
///
/// Exact duplicate literals are dropped on construction (first occurrence
/// wins), so `a*b*a` is stored as `a*b`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Term {
    literals: Vec<Literal>,
}

impl Term {
    pub fn new(literals: impl IntoIterator<Item = Literal>) -> Self {
        let mut result: Vec<Literal> = Vec::new();
        for literal in literals {
            if !result.contains(&literal) {
                result.push(literal);
            }
        }
        Self { literals: result }
    }

    /// Builds a term of positive literals.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Self {
        Self::new(names.iter().map(|s| Literal::positive(s.as_ref())))
    }

    /// Parses a product such as `a*!b*c`.
    pub fn parse(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Err(Error::malformed(text, 0, "empty term"));
        }
        let literals = text.split('*').map(Literal::parse).collect::<Result<Vec<_>>>()?;
        Ok(Self::new(literals))
    }

    pub fn literals(&self) -> &[Literal] {
        &self.literals
    }

    pub fn len(&self) -> usize {
        self.literals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    /// Returns `true` if every literal of `other` also occurs in `self`,
    /// i.e. `self` implies `other`.
    pub fn is_covered_by(&self, other: &Term) -> bool {
        other.literals.iter().all(|l| self.literals.contains(l))
    }

    /// Evaluates the product, looking base signal values up with `value`.
    /// Returns `None` if some signal has no value.
    pub fn eval(&self, mut value: impl FnMut(&str) -> Option<bool>) -> Option<bool> {
        let mut result = true;
        for literal in &self.literals {
            result &= literal.apply(value(literal.name())?);
        }
        Some(result)
    }
}

impl Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, literal) in self.literals.iter().enumerate() {
            if i > 0 {
                write!(f, "*")?;
            }
            write!(f, "{}", literal)?;
        }
        Ok(())
    }
}
