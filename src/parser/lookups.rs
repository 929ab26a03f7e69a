use crate::lexer::tokens::TokenKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
    LeftToRight,
    RightToLeft,
}

/// Binding power for binary operators. Zero means "not a binary
/// operator", which terminates precedence climbing.
pub fn precedence(op: TokenKind) -> u8 {
    use TokenKind::*;
    match op {
        ShiftLeft | ShiftRight => 80,
        Star | Slash | Percent | Amp => 70,
        Plus | Dash | Pipe => 60,
        Less | LessEquals | Greater | GreaterEquals | Equals | NotEquals => 50,
        AndAnd => 40,
        OrOr => 30,
        Assign | ArrowLeft | PlusAssign | DashAssign | StarAssign | SlashAssign
        | PercentAssign => 20,
        _ => 0,
    }
}

pub fn is_binary(op: TokenKind) -> bool {
    precedence(op) > 0
}

/// Prefix operators. `Dash` is also binary; the position decides.
pub fn is_unary(op: TokenKind) -> bool {
    use TokenKind::*;
    matches!(op, Dash | Not | Tilde)
}

pub fn associativity(op: TokenKind) -> Assoc {
    if is_assignment(op) {
        Assoc::RightToLeft
    } else {
        Assoc::LeftToRight
    }
}

pub fn is_assignment(op: TokenKind) -> bool {
    use TokenKind::*;
    matches!(
        op,
        Assign | ArrowLeft | PlusAssign | DashAssign | StarAssign | SlashAssign | PercentAssign
    )
}

/// The arithmetic operator a compound assignment abbreviates, `None`
/// for plain assignment.
pub fn detach_assignment(op: TokenKind) -> Option<TokenKind> {
    use TokenKind::*;
    match op {
        PlusAssign => Some(Plus),
        DashAssign => Some(Dash),
        StarAssign => Some(Star),
        SlashAssign => Some(Slash),
        PercentAssign => Some(Percent),
        _ => None,
    }
}
