use crate::lexer::tokens::TokenKind;
use crate::SrcLoc;

use super::decls::DeclId;
use super::symbol::Symbol;
use super::types::TypeId;

#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    /// Cleared when this expression or an operand of it fails to
    /// validate. An invalid expression reports no further errors about
    /// its own type.
    pub valid: bool,
    /// Filled in by validation.
    pub ty: Option<TypeId>,
    pub loc: SrcLoc,
}

impl Expr {
    pub fn new(kind: ExprKind, loc: SrcLoc) -> Expr {
        Expr {
            kind,
            valid: true,
            ty: None,
            loc,
        }
    }

    pub fn resign_validation(&mut self) {
        self.valid = false;
    }

    /// Whether the expression names a storage slot.
    pub fn is_assignable(&self) -> bool {
        matches!(self.kind, ExprKind::VarRef { .. } | ExprKind::FieldAccess { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Negate,
    LogicalNot,
    BitwiseNot,
}

/// Grouping of binary operators by their typing rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryClass {
    Arithmetic,
    Comparison,
    Logical,
    Bitwise,
    Assignment,
}

pub fn classify_binary(op: TokenKind) -> Option<BinaryClass> {
    use TokenKind::*;
    match op {
        Plus | Dash | Star | Slash | Percent => Some(BinaryClass::Arithmetic),
        Less | LessEquals | Greater | GreaterEquals | Equals | NotEquals => {
            Some(BinaryClass::Comparison)
        }
        AndAnd | OrOr => Some(BinaryClass::Logical),
        ShiftLeft | ShiftRight | Amp | Pipe => Some(BinaryClass::Bitwise),
        Assign | ArrowLeft | PlusAssign | DashAssign | StarAssign | SlashAssign
        | PercentAssign => Some(BinaryClass::Assignment),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    IntLit(i32),
    UIntLit(u32),
    LongLit(i64),
    ULongLit(u64),
    FloatLit(f32),
    DoubleLit(f64),
    CharLit(char),
    StringLit(String),
    BoolLit(bool),
    /// The `nothing` literal.
    NullPointer,
    VarRef {
        symbol: Symbol,
        /// Bound by validation.
        decl: Option<DeclId>,
    },
    Call {
        symbol: Symbol,
        args: Vec<Expr>,
        /// The overload chosen by validation.
        resolved: Option<DeclId>,
    },
    FieldAccess {
        entity: Box<Expr>,
        member: String,
        member_loc: SrcLoc,
        /// Bound by validation.
        field: Option<DeclId>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: TokenKind,
        op_loc: SrcLoc,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// Inserted by validation where a value converts to a different
    /// type without source syntax.
    ImplicitCast {
        inner: Box<Expr>,
    },
    /// Inserted by validation where a non-bool scalar is evaluated as a
    /// condition.
    Eval {
        inner: Box<Expr>,
    },
}
