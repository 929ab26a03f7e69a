use std::fmt;

use crate::SrcLoc;

/// One `::`-separated piece of a symbol reference.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolSegment {
    pub name: String,
    pub loc: SrcLoc,
}

/// A possibly-qualified name as written in the source, e.g.
/// `math::vector::length`. Resolution happens later; the symbol itself
/// is purely syntactic.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub segments: Vec<SymbolSegment>,
}

impl Symbol {
    pub fn simple(name: String, loc: SrcLoc) -> Symbol {
        Symbol {
            segments: vec![SymbolSegment { name, loc }],
        }
    }

    pub fn is_nested(&self) -> bool {
        self.segments.len() > 1
    }

    /// The trailing segment, which names the entity itself.
    pub fn last(&self) -> &SymbolSegment {
        self.segments.last().unwrap_or_else(|| unreachable!())
    }

    pub fn path_string(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>()
            .join("::")
    }

    pub fn loc(&self) -> SrcLoc {
        let first = &self.segments[0].loc;
        first.join(&self.last().loc)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path_string())
    }
}
