//! The abstract syntax tree and the tables it hangs off.
//!
//! Declarations live in a [`decls::DeclTable`] arena and refer to each
//! other by [`decls::DeclId`]; types are interned in a
//! [`types::TypeTable`] and named by [`types::TypeId`]. Statements and
//! expressions own their children directly.

pub mod decls;
pub mod expressions;
pub mod statements;
pub mod symbol;
pub mod types;

/// Identity of a statement that `break`/`continue` can target.
/// Handed out by the parser, unique within one compilation unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeId(pub u32);
