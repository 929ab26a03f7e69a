//! Name resolution and semantic validation.
//!
//! A single pass over the unit: [`validator::validate_unit`] walks
//! declarations in source order, resolving names through `resolver`,
//! typing expressions in `expr`, and checking statement-level rules.
//! Validation never aborts; faults mark the enclosing node invalid and
//! suppress follow-on errors from the same fault.

pub mod expr;
pub mod resolver;
pub mod scope;
pub mod validator;

#[cfg(test)]
mod tests;
