//! Diagnostics for the compiler front end.
//!
//! This module defines the diagnostic machinery shared by every phase:
//!
//! - The fixed catalog of diagnostic kinds and their message templates
//! - The diagnostics engine that collects reported diagnostics
//! - Fluent builders for supplying message parameters
//! - Report scopes that summarise errors and warnings for a unit of work
//!
//! No phase aborts compilation on its own; everything is reported here and
//! the driver decides afterwards whether code generation may proceed.

pub mod codes;
pub mod engine;

#[cfg(test)]
mod tests;

pub use codes::{DiagCode, Severity};
pub use engine::{Diagnostic, DiagnosticBuilder, Diagnostics, DiagnosticsReport};
