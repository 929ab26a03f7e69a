//! Recursive-descent parser.
//!
//! Entry point is [`parser::parse`]. Statement and declaration forms
//! live in `stmt` and `decl`, expressions use precedence climbing in
//! `expr`, and type syntax is in `types`. Every parsing function
//! returns a [`parser::PResult`]; hitting the end of the stream where a
//! token was required unwinds to the top-level loop, which reports a
//! single unexpected-end-of-file error.

pub mod decl;
pub mod expr;
pub mod lookups;
pub mod parser;
pub mod stmt;
pub mod types;

#[cfg(test)]
mod tests;
