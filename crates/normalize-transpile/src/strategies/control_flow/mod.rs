//! Structural rewrites for statements and pattern matching.

pub mod foreach;
pub mod match_expr;
pub mod switch;
pub mod using;
