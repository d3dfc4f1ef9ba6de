//! SQL generation module.
//!
//! A small type-safe builder for the single-table SELECT statements the
//! compiler emits:
//!
//! - [`query`] - SELECT query builder and literal binding
//! - [`token`] - Token types for SQL generation
//! - [`dialect`] - quoting rules for the target dialect

pub mod dialect;
pub mod query;
pub mod token;


pub use query::{
    Binder, CompareOp, Expr, LiteralMode, OrderByExpr, Predicate, Query, RenderedSql, SelectExpr,
};
pub use token::{Token, TokenStream};
