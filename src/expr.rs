//! Boolean expressions over named signals.
//!
//! Function strings such as `Z=a*b+!c` are parsed once into an [`Expr`] tree
//! and evaluated by walking that tree. The grammar is:
//!
//! ```text
//! function := ident '=' or
//! or       := and ('+' and)*
//! and      := unary ('*' unary)*
//! unary    := '!' unary | '(' or ')' | ident
//! ```
//!
//! Whitespace between tokens is ignored. A parsed expression holds at most
//! [`MAX_EXPR_NODES`] nodes and nests at most [`MAX_EXPR_DEPTH`] levels of
//! `!` and parentheses; longer input is rejected as malformed.

use std::collections::BTreeSet;
use std::fmt::{self, Display};

use crate::error::{Error, Result};
use crate::literal::{is_identifier, Literal, Term, INVERSION_MARKER};

/// Upper bound on the nodes of a parsed expression.
pub const MAX_EXPR_NODES: usize = 1024;

/// Upper bound on nested `!` and parentheses in a parsed expression.
pub const MAX_EXPR_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Var(String),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

impl Expr {
    pub fn var(name: impl Into<String>) -> Self {
        Expr::Var(name.into())
    }

    pub fn not(value: Self) -> Self {
        match value {
            Expr::Not(inner) => *inner,
            _ => Expr::Not(Box::new(value)),
        }
    }

    pub fn and(lhs: Self, rhs: Self) -> Self {
        Expr::And(Box::new(lhs), Box::new(rhs))
    }

    pub fn or(lhs: Self, rhs: Self) -> Self {
        Expr::Or(Box::new(lhs), Box::new(rhs))
    }

    pub fn literal(literal: &Literal) -> Self {
        let var = Expr::var(literal.name());
        if literal.is_inverted() {
            Expr::not(var)
        } else {
            var
        }
    }

    /// Left-folded AND of the term's literals.
    ///
    /// Returns `None` for an empty term.
    pub fn product(term: &Term) -> Option<Self> {
        term.literals().iter().map(Expr::literal).reduce(Expr::and)
    }

    /// Left-folded OR of the products.
    ///
    /// Returns `None` if there are no terms or one of them is empty.
    pub fn sum_of_products(terms: &[Term]) -> Option<Self> {
        terms
            .iter()
            .map(Expr::product)
            .collect::<Option<Vec<_>>>()?
            .into_iter()
            .reduce(Expr::or)
    }

    /// Signal names referenced by the expression, sorted.
    /// Inverted occurrences contribute their base name.
    pub fn vars(&self) -> BTreeSet<String> {
        let mut vars = BTreeSet::new();
        self.collect_vars(&mut vars);
        vars
    }

    fn collect_vars(&self, vars: &mut BTreeSet<String>) {
        match self {
            Expr::Var(name) => {
                vars.insert(name.clone());
            }
            Expr::Not(a) => a.collect_vars(vars),
            Expr::And(a, b) | Expr::Or(a, b) => {
                a.collect_vars(vars);
                b.collect_vars(vars);
            }
        }
    }

    /// Evaluates the expression, looking signal values up with `value`.
    /// Returns `None` as soon as a referenced signal has no value.
    pub fn eval(&self, value: &impl Fn(&str) -> Option<bool>) -> Option<bool> {
        Some(match self {
            Expr::Var(name) => value(name)?,
            Expr::Not(a) => !a.eval(value)?,
            Expr::And(a, b) => a.eval(value)? && b.eval(value)?,
            Expr::Or(a, b) => a.eval(value)? || b.eval(value)?,
        })
    }

    fn precedence(&self) -> u8 {
        match self {
            Expr::Or(..) => 0,
            Expr::And(..) => 1,
            Expr::Not(_) | Expr::Var(_) => 2,
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>, min: u8) -> fmt::Result {
        if self.precedence() < min {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Var(name) => write!(f, "{}", name),
            Expr::Not(a) => {
                write!(f, "{}", INVERSION_MARKER)?;
                a.fmt_operand(f, 2)
            }
            Expr::And(a, b) => {
                a.fmt_operand(f, 1)?;
                write!(f, "*")?;
                b.fmt_operand(f, 2)
            }
            Expr::Or(a, b) => {
                a.fmt_operand(f, 0)?;
                write!(f, "+")?;
                b.fmt_operand(f, 1)
            }
        }
    }
}

/// A parsed function string: `output = expr`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub output: String,
    pub expr: Expr,
}

impl Function {
    pub fn new(output: impl Into<String>, expr: Expr) -> Self {
        Self {
            output: output.into(),
            expr,
        }
    }

    /// Parses `output = expr`.
    ///
    /// # Examples
    ///
    /// ```
    /// use vfpga::expr::Function;
    ///
    /// let f = Function::parse("Z = a*b+c").unwrap();
    /// assert_eq!(f.output, "Z");
    /// assert_eq!(f.expr.to_string(), "a*b+c");
    /// ```
    pub fn parse(input: &str) -> Result<Self> {
        let (lhs, rhs) = input
            .split_once('=')
            .ok_or_else(|| Error::malformed(input, 0, "missing '='"))?;
        let output = lhs.trim();
        if !is_identifier(output) {
            return Err(Error::malformed(input, 0, format!("invalid output name '{}'", output)));
        }
        let offset = lhs.len() + 1;
        let mut parser = Parser::new(input, rhs, offset);
        let expr = parser.parse_or()?;
        parser.skip_whitespace();
        if let Some(c) = parser.peek() {
            return Err(parser.error(format!("unexpected '{}'", c)));
        }
        Ok(Self::new(output, expr))
    }

    /// Parses a bare expression (no `output =` prefix).
    pub fn parse_expr(input: &str) -> Result<Expr> {
        let mut parser = Parser::new(input, input, 0);
        let expr = parser.parse_or()?;
        parser.skip_whitespace();
        if let Some(c) = parser.peek() {
            return Err(parser.error(format!("unexpected '{}'", c)));
        }
        Ok(expr)
    }
}

impl Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.output, self.expr)
    }
}

struct Parser<'a> {
    input: &'a str,
    text: &'a str,
    offset: usize,
    pos: usize,
    nodes: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str, text: &'a str, offset: usize) -> Self {
        Self {
            input,
            text,
            offset,
            pos: 0,
            nodes: 0,
            depth: 0,
        }
    }

    fn count_node(&mut self) -> Result<()> {
        self.nodes += 1;
        if self.nodes > MAX_EXPR_NODES {
            return Err(self.error(format!("expression exceeds {} nodes", MAX_EXPR_NODES)));
        }
        Ok(())
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_EXPR_DEPTH {
            return Err(self.error(format!("expression nests deeper than {}", MAX_EXPR_DEPTH)));
        }
        Ok(())
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::malformed(self.input, self.offset + self.pos, message)
    }

    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        self.skip_whitespace();
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn parse_or(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_and()?;
        while self.eat('+') {
            self.count_node()?;
            let rhs = self.parse_and()?;
            lhs = Expr::or(lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_unary()?;
        while self.eat('*') {
            self.count_node()?;
            let rhs = self.parse_unary()?;
            lhs = Expr::and(lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        if self.eat(INVERSION_MARKER) {
            self.count_node()?;
            self.enter()?;
            let inner = self.parse_unary()?;
            self.depth -= 1;
            return Ok(Expr::not(inner));
        }
        if self.eat('(') {
            self.enter()?;
            let inner = self.parse_or()?;
            if !self.eat(')') {
                return Err(self.error("expected ')'"));
            }
            self.depth -= 1;
            return Ok(inner);
        }
        self.parse_ident()
    }

    fn parse_ident(&mut self) -> Result<Expr> {
        self.skip_whitespace();
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !(c.is_ascii_alphanumeric() || c == '_') {
                break;
            }
            self.pos += c.len_utf8();
        }
        let name = &self.text[start..self.pos];
        if name.is_empty() {
            return Err(match self.peek() {
                Some(c) => self.error(format!("expected literal, found '{}'", c)),
                None => self.error("expected literal, found end of input"),
            });
        }
        if !is_identifier(name) {
            self.pos = start;
            return Err(self.error(format!("invalid literal name '{}'", name)));
        }
        self.count_node()?;
        Ok(Expr::var(name))
    }
}
