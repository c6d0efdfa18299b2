//! Restricted expression language for row-level predicates and formulas.
//!
//! Rules and derived fills are configured as strings like
//! `zip_code >= 19019 and zip_code <= 19160` or
//! `num_bll_5plus / num_screen * 100`. They compile once into an [`Expr`]
//! and evaluate per row against named columns. The grammar is closed:
//! comparisons, arithmetic, boolean logic, literals, and field references
//! only — configuration can never reach host capabilities.

pub mod eval;
pub mod lexer;
pub mod parser;

pub use parser::{BinaryOp, Expr, UnaryOp};
