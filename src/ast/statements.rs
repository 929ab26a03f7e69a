use crate::SrcLoc;

use super::decls::DeclId;
use super::expressions::Expr;
use super::NodeId;

/// Which control transfers a statement can absorb.
pub const CATCH_BREAK: u8 = 1 << 0;
pub const CATCH_CONTINUE: u8 = 1 << 1;

#[derive(Debug)]
pub struct Stmt {
    pub kind: StmtKind,
    /// Cleared when validation finds a fault in this statement or in a
    /// child it depends on. Invalid statements still get validated as
    /// far as possible.
    pub valid: bool,
    /// Whether every path through this statement returns.
    pub returns: bool,
}

impl Stmt {
    pub fn new(kind: StmtKind) -> Stmt {
        Stmt {
            kind,
            valid: true,
            returns: false,
        }
    }

    pub fn resign_validation(&mut self) {
        self.valid = false;
    }
}

#[derive(Debug)]
pub struct SwitchCase {
    /// `None` for the `default` label.
    pub value: Option<Expr>,
    pub body: Vec<Stmt>,
    pub loc: SrcLoc,
}

#[derive(Debug)]
pub enum StmtKind {
    Compound {
        body: Vec<Stmt>,
        end_loc: SrcLoc,
    },
    /// One `let`, possibly naming several variables.
    VarDecl {
        decls: Vec<DeclId>,
        init: Option<Expr>,
        loc: SrcLoc,
    },
    Return {
        value: Option<Expr>,
        loc: SrcLoc,
    },
    Break {
        loc: SrcLoc,
        /// Filled in by validation with the statement broken out of.
        target: Option<NodeId>,
    },
    Continue {
        loc: SrcLoc,
        target: Option<NodeId>,
    },
    If {
        cond: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    /// `while`, `until` and both `do` forms. `until` loops negate the
    /// condition; `post` loops test after the first iteration.
    Loop {
        cond: Expr,
        body: Box<Stmt>,
        until: bool,
        post: bool,
        id: NodeId,
    },
    For {
        init: Vec<Stmt>,
        cond: Option<Expr>,
        step: Vec<Expr>,
        body: Box<Stmt>,
        id: NodeId,
    },
    Switch {
        subject: Expr,
        cases: Vec<SwitchCase>,
        id: NodeId,
    },
    Expr(Expr),
}
