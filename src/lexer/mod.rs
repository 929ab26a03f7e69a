//! Lexical analysis module for the compiler.
//!
//! This module contains the lexer (tokenizer) that converts source code
//! into a stream of tokens for parsing. It handles:
//!
//! - Tokenization of source code using an anchored regex pattern table
//! - Context-free keyword recognition for the Human Plus keyword set
//! - Number literals with radix prefixes, type suffixes and the
//!   widen-until-it-fits fallback chain
//! - Character/string literals with escape sequences
//! - Nested block comments
//! - Line/column tracking for diagnostics
//!
//! Lexical errors never abort tokenization; a placeholder token is
//! substituted and lexing continues.

pub mod lexer;
pub mod tokens;

#[cfg(test)]
mod tests;
