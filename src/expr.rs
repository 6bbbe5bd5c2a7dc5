//! Sandboxed expression language for filters and computed series.
//!
//! A deliberately small arithmetic/comparison language evaluated columnwise
//! over a [`Table`](crate::table::Table). Column names resolve to whole
//! columns; there are no function calls, no assignment, and no access to
//! anything outside the table, which keeps the security boundary explicit.
//!
//! Grammar, by rising precedence:
//!
//! ```text
//! or-expr   := and-expr ( "or" and-expr )*
//! and-expr  := not-expr ( "and" not-expr )*
//! not-expr  := "not" not-expr | cmp-expr
//! cmp-expr  := add-expr ( ("==" | "!=" | "<" | "<=" | ">" | ">=") add-expr )?
//! add-expr  := mul-expr ( ("+" | "-") mul-expr )*
//! mul-expr  := unary ( ("*" | "/" | "%") unary )*
//! unary     := "-" unary | power
//! power     := atom ( "**" unary )?
//! atom      := number | string | identifier | "`" any name "`" | "(" or-expr ")"
//! ```
//!
//! `&`, `|` and `~` are accepted as aliases for `and`, `or` and `not`.

mod eval;
mod lexer;
mod parser;

pub use eval::{Series, evaluate};
pub use parser::parse;

use std::fmt;

/// A parsed expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Numeric literal.
    Number(f64),
    /// String literal.
    Str(String),
    /// Reference to a column by name.
    Column(String),
    /// Unary operation.
    Unary {
        /// Operator.
        op: UnaryOp,
        /// Operand.
        operand: Box<Expr>,
    },
    /// Binary operation.
    Binary {
        /// Operator.
        op: BinaryOp,
        /// Left operand.
        lhs: Box<Expr>,
        /// Right operand.
        rhs: Box<Expr>,
    },
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Arithmetic negation.
    Neg,
    /// Boolean negation.
    Not,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
    /// `**`
    Pow,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `and`
    And,
    /// `or`
    Or,
}

/// Errors from parsing or evaluating an expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprError {
    /// The expression text is malformed.
    Parse(String),
    /// The expression references a column the table does not have.
    UnknownColumn(String),
    /// An operator was applied to operands it does not support.
    Type(String),
}

impl fmt::Display for ExprError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "parse error: {msg}"),
            Self::UnknownColumn(name) => write!(f, "unknown column '{name}'"),
            Self::Type(msg) => write!(f, "type error: {msg}"),
        }
    }
}

impl std::error::Error for ExprError {}
