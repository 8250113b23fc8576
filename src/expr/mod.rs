//! Symbolic potential-energy expressions.
//!
//! Force-field types carry their functional form as a plain-text expression
//! such as `4*epsilon*((sigma/r)**12 - (sigma/r)**6)`. This module turns that
//! text into an [`Expr`] tree and evaluates it numerically, which is all the
//! [`forms`](crate::forms) catalogue needs to decide whether two expressions
//! describe the same function.
//!
//! # Grammar
//!
//! - Numbers: `4`, `0.5`, `1e-3`, `.25`
//! - Symbols: identifiers such as `epsilon`, `r_eq`, `k0`
//! - Binary operators: `+ - * /`, and `**` or `^` for powers
//! - Unary `-` and `+`
//! - Parentheses and function calls: `cos(phi)`, `exp(-a*r)`
//! - The constant `pi`
//!
//! Nesting is bounded by [`MAX_NESTING`]; deeper input is a parse error.
//!
//! Powers are right-associative and bind tighter than unary minus, so
//! `-x**2` is `-(x**2)` and `2**3**2` is `2**9`.
//!
//! # Examples
//!
//! ```
//! use std::collections::HashMap;
//! use topoforge::expr;
//!
//! let lj = expr::parse("4*epsilon*((sigma/r)**12 - (sigma/r)**6)").unwrap();
//! assert_eq!(
//!     lj.symbols().into_iter().collect::<Vec<_>>(),
//!     vec!["epsilon", "r", "sigma"]
//! );
//!
//! let bindings = HashMap::from([("epsilon", 1.0), ("sigma", 1.0), ("r", 1.0)]);
//! assert_eq!(lj.eval(&bindings).unwrap(), 0.0);
//! ```

mod ast;
mod error;
mod eval;
mod parser;

pub use ast::{BinaryOp, Expr};
pub use error::Error;
pub use parser::{MAX_NESTING, parse};
