// ABOUTME: Safe arithmetic expression parser and evaluator for knowledge-base BMR formulas
// ABOUTME: Grammar restricted to numbers, + - * / ( ), and the variables weight, height, age
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # BMR Formula Evaluator
//!
//! BMR formulas are data supplied by the knowledge base, e.g.
//! `10 * weight + 6.25 * height - 5 * age + 5`. They are compiled once at load
//! time into a small expression tree and evaluated against [`FormulaInputs`].
//!
//! Grammar:
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := ('+' | '-') unary | primary
//! primary := number | variable | '(' expr ')'
//! ```
//!
//! Nothing else is accepted: no function calls, no exponentiation, no
//! attribute access, no identifiers other than `weight`, `height`, `age`.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Maximum nesting of parentheses and unary operators
const MAX_DEPTH: usize = 64;

/// Failure to parse or evaluate a formula
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaError {
    /// Formula is blank
    #[error("formula is empty")]
    Empty,
    /// Character outside the grammar
    #[error("unexpected character '{ch}' at position {position}")]
    UnexpectedCharacter {
        /// Offending character
        ch: char,
        /// Byte offset
        position: usize,
    },
    /// Malformed numeric literal
    #[error("invalid number '{literal}' at position {position}")]
    InvalidNumber {
        /// Literal text
        literal: String,
        /// Byte offset
        position: usize,
    },
    /// Identifier other than `weight`, `height`, `age`
    #[error("unknown variable '{name}' at position {position} (allowed: weight, height, age)")]
    UnknownVariable {
        /// Identifier text
        name: String,
        /// Byte offset
        position: usize,
    },
    /// Token in a position the grammar does not allow
    #[error("unexpected '{found}' at position {position}")]
    UnexpectedToken {
        /// Token text
        found: String,
        /// Byte offset
        position: usize,
    },
    /// Input ended in the middle of an expression
    #[error("unexpected end of formula")]
    UnexpectedEnd,
    /// Nesting exceeds [`MAX_DEPTH`]
    #[error("formula nests deeper than {MAX_DEPTH} levels")]
    TooDeep,
    /// Right-hand side of `/` evaluated to zero
    #[error("division by zero")]
    DivisionByZero,
    /// Result is NaN or infinite
    #[error("formula produced a non-finite result")]
    NonFinite,
}

/// Variables a formula may reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Variable {
    /// Body weight in kilograms
    Weight,
    /// Height in centimeters
    Height,
    /// Age in years
    Age,
}

impl Variable {
    fn from_identifier(name: &str) -> Option<Self> {
        match name {
            "weight" => Some(Self::Weight),
            "height" => Some(Self::Height),
            "age" => Some(Self::Age),
            _ => None,
        }
    }

    /// Identifier used in formulas
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Weight => "weight",
            Self::Height => "height",
            Self::Age => "age",
        }
    }
}

/// Values bound to the formula variables
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormulaInputs {
    /// Body weight in kilograms
    pub weight: f64,
    /// Height in centimeters
    pub height: f64,
    /// Age in years
    pub age: f64,
}

impl FormulaInputs {
    const fn value_of(&self, variable: Variable) -> f64 {
        match variable {
            Variable::Weight => self.weight,
            Variable::Height => self.height,
            Variable::Age => self.age,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Number(f64),
    Variable(Variable),
    Negate(Box<Expr>),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

impl Expr {
    fn evaluate(&self, inputs: &FormulaInputs) -> Result<f64, FormulaError> {
        match self {
            Self::Number(value) => Ok(*value),
            Self::Variable(variable) => Ok(inputs.value_of(*variable)),
            Self::Negate(inner) => Ok(-inner.evaluate(inputs)?),
            Self::Binary { op, lhs, rhs } => {
                let left = lhs.evaluate(inputs)?;
                let right = rhs.evaluate(inputs)?;
                match op {
                    BinaryOp::Add => Ok(left + right),
                    BinaryOp::Sub => Ok(left - right),
                    BinaryOp::Mul => Ok(left * right),
                    BinaryOp::Div if right == 0.0 => Err(FormulaError::DivisionByZero),
                    BinaryOp::Div => Ok(left / right),
                }
            }
        }
    }

    fn collect_variables(&self, found: &mut Vec<Variable>) {
        match self {
            Self::Number(_) => {}
            Self::Variable(variable) => {
                if !found.contains(variable) {
                    found.push(*variable);
                }
            }
            Self::Negate(inner) => inner.collect_variables(found),
            Self::Binary { lhs, rhs, .. } => {
                lhs.collect_variables(found);
                rhs.collect_variables(found);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Variable(Variable),
    Plus,
    Minus,
    Star,
    Slash,
    LeftParen,
    RightParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Variable(variable) => f.write_str(variable.name()),
            Self::Plus => f.write_str("+"),
            Self::Minus => f.write_str("-"),
            Self::Star => f.write_str("*"),
            Self::Slash => f.write_str("/"),
            Self::LeftParen => f.write_str("("),
            Self::RightParen => f.write_str(")"),
        }
    }
}

#[derive(Debug, Clone)]
struct Spanned {
    token: Token,
    position: usize,
}

fn tokenize(source: &str) -> Result<Vec<Spanned>, FormulaError> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some(&(position, ch)) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }

        let token = if ch.is_ascii_digit() || ch == '.' {
            let mut literal = String::new();
            while let Some(&(_, c)) = chars.peek() {
                if c.is_ascii_digit() || c == '.' {
                    literal.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            let value = literal
                .parse::<f64>()
                .map_err(|_| FormulaError::InvalidNumber {
                    literal: literal.clone(),
                    position,
                })?;
            Token::Number(value)
        } else if ch.is_ascii_alphabetic() || ch == '_' {
            let mut name = String::new();
            while let Some(&(_, c)) = chars.peek() {
                if c.is_ascii_alphanumeric() || c == '_' {
                    name.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            let variable = Variable::from_identifier(&name)
                .ok_or(FormulaError::UnknownVariable { name, position })?;
            Token::Variable(variable)
        } else {
            chars.next();
            match ch {
                '+' => Token::Plus,
                '-' => Token::Minus,
                '*' => Token::Star,
                '/' => Token::Slash,
                '(' => Token::LeftParen,
                ')' => Token::RightParen,
                _ => return Err(FormulaError::UnexpectedCharacter { ch, position }),
            }
        };

        tokens.push(Spanned { token, position });
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Spanned>,
    cursor: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.cursor).map(|spanned| &spanned.token)
    }

    fn advance(&mut self) -> Option<Spanned> {
        let spanned = self.tokens.get(self.cursor).cloned();
        if spanned.is_some() {
            self.cursor += 1;
        }
        spanned
    }

    fn enter(&mut self) -> Result<(), FormulaError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(FormulaError::TooDeep);
        }
        Ok(())
    }

    fn parse_formula(&mut self) -> Result<Expr, FormulaError> {
        let expr = self.parse_expr()?;
        match self.advance() {
            None => Ok(expr),
            Some(Spanned { token, position }) => Err(FormulaError::UnexpectedToken {
                found: token.to_string(),
                position,
            }),
        }
    }

    fn parse_expr(&mut self) -> Result<Expr, FormulaError> {
        let mut lhs = self.parse_term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.parse_term()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    fn parse_term(&mut self) -> Result<Expr, FormulaError> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.parse_unary()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, FormulaError> {
        match self.peek() {
            Some(Token::Minus) => {
                self.advance();
                self.enter()?;
                let inner = self.parse_unary()?;
                self.depth -= 1;
                Ok(Expr::Negate(Box::new(inner)))
            }
            Some(Token::Plus) => {
                self.advance();
                self.enter()?;
                let inner = self.parse_unary()?;
                self.depth -= 1;
                Ok(inner)
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, FormulaError> {
        let Spanned { token, position } = self.advance().ok_or(FormulaError::UnexpectedEnd)?;
        match token {
            Token::Number(value) => Ok(Expr::Number(value)),
            Token::Variable(variable) => Ok(Expr::Variable(variable)),
            Token::LeftParen => {
                self.enter()?;
                let inner = self.parse_expr()?;
                self.depth -= 1;
                match self.advance() {
                    Some(Spanned {
                        token: Token::RightParen,
                        ..
                    }) => Ok(inner),
                    Some(Spanned { token, position }) => Err(FormulaError::UnexpectedToken {
                        found: token.to_string(),
                        position,
                    }),
                    None => Err(FormulaError::UnexpectedEnd),
                }
            }
            other => Err(FormulaError::UnexpectedToken {
                found: other.to_string(),
                position,
            }),
        }
    }
}

/// A compiled BMR formula
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    source: String,
    expr: Expr,
}

impl Formula {
    /// Compile a formula
    ///
    /// # Errors
    ///
    /// Returns `FormulaError` if the text is outside the arithmetic grammar
    pub fn parse(source: &str) -> Result<Self, FormulaError> {
        let tokens = tokenize(source)?;
        if tokens.is_empty() {
            return Err(FormulaError::Empty);
        }
        let mut parser = Parser {
            tokens,
            cursor: 0,
            depth: 0,
        };
        let expr = parser.parse_formula()?;
        Ok(Self {
            source: source.to_owned(),
            expr,
        })
    }

    /// Evaluate against the bound variables
    ///
    /// # Errors
    ///
    /// Returns `FormulaError::DivisionByZero` or `FormulaError::NonFinite`
    pub fn evaluate(&self, inputs: &FormulaInputs) -> Result<f64, FormulaError> {
        let value = self.expr.evaluate(inputs)?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(FormulaError::NonFinite)
        }
    }

    /// Original formula text
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Variables referenced, in order of first appearance
    #[must_use]
    pub fn variables(&self) -> Vec<Variable> {
        let mut found = Vec::new();
        self.expr.collect_variables(&mut found);
        found
    }
}

impl FromStr for Formula {
    type Err = FormulaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
