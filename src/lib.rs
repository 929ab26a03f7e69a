#![allow(clippy::module_inception)]

use std::rc::Rc;

use thiserror::Error;

use crate::diag::Diagnostics;

pub mod ast;
pub mod diag;
pub mod lexer;
pub mod macros;
pub mod parser;
pub mod sema;

extern crate regex;

/// A source location: file, 1-based line and column, and the length in
/// characters of the region the location covers. Used purely for
/// diagnostics; it never affects program semantics.
#[derive(Debug, Clone)]
pub struct SrcLoc {
    pub file: Rc<String>,
    pub line: u32,
    pub column: u32,
    pub length: u32,
}

impl SrcLoc {
    pub fn new(file: Rc<String>, line: u32, column: u32, length: u32) -> Self {
        SrcLoc {
            file,
            line,
            column,
            length,
        }
    }

    pub fn null() -> Self {
        SrcLoc {
            file: Rc::new(String::from("<null>")),
            line: 0,
            column: 0,
            length: 0,
        }
    }

    /// Joins two locations into one spanning both. Only locations in the
    /// same file can be joined; otherwise the receiver is returned as is.
    /// Locations on different lines keep the receiver's extent since the
    /// span is only used to underline a region on a single line.
    pub fn join(&self, other: &SrcLoc) -> SrcLoc {
        if self.file != other.file {
            return self.clone();
        }
        if self.line == other.line && other.column + other.length >= self.column {
            let mut joined = self.clone();
            joined.length = other.column + other.length - self.column;
            return joined;
        }
        self.clone()
    }
}

impl PartialEq for SrcLoc {
    fn eq(&self, other: &Self) -> bool {
        self.file == other.file
            && self.line == other.line
            && self.column == other.column
            && self.length == other.length
    }
}

impl std::fmt::Display for SrcLoc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Errors the driver surface can produce. The core pipeline itself never
/// returns these; it reports through [`diag::Diagnostics`] instead.
#[derive(Error, Debug)]
pub enum DriverError {
    #[error("no input file provided")]
    NoInputFile,
    #[error("cannot open file {path:?}")]
    CannotOpenFile { path: String },
    #[error("compilation failed with {errors} error(s)")]
    CompilationFailed { errors: usize },
}

/// Runs the whole front end over one source buffer: lexing, parsing and
/// semantic validation. All problems are reported into `diags`; the
/// returned unit is complete but must not be handed to code generation
/// when `diags.has_errors()`.
pub fn compile_source(
    source: &str,
    file: Option<String>,
    diags: &mut Diagnostics,
) -> ast::decls::CompilationUnit {
    let file_name = Rc::new(file.unwrap_or_else(|| String::from("shell")));
    let tokens = lexer::lexer::tokenize(source, Rc::clone(&file_name), diags);
    let mut unit = ast::decls::CompilationUnit::new(Rc::clone(&file_name));
    parser::parser::parse(tokens, &mut unit, diags);
    sema::validator::validate_unit(&mut unit, diags);
    unit
}

/// Returns the 1-based `line` of `content`, for diagnostics display.
pub fn get_line(content: &str, line: u32) -> Option<&str> {
    if line == 0 {
        return None;
    }
    content.lines().nth(line as usize - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_line() {
        let content = "first\nsecond\nthird\n";
        assert_eq!(get_line(content, 1), Some("first"));
        assert_eq!(get_line(content, 3), Some("third"));
        assert_eq!(get_line(content, 4), None);
        assert_eq!(get_line(content, 0), None);
    }

    #[test]
    fn test_srcloc_join_same_line() {
        let file = Rc::new(String::from("test.hp"));
        let a = SrcLoc::new(Rc::clone(&file), 3, 5, 2);
        let b = SrcLoc::new(Rc::clone(&file), 3, 10, 4);
        let joined = a.join(&b);
        assert_eq!(joined.line, 3);
        assert_eq!(joined.column, 5);
        assert_eq!(joined.length, 9);
    }

    #[test]
    fn test_srcloc_join_other_file() {
        let a = SrcLoc::new(Rc::new(String::from("a.hp")), 1, 1, 1);
        let b = SrcLoc::new(Rc::new(String::from("b.hp")), 1, 4, 1);
        assert_eq!(a.join(&b), a);
    }
}
