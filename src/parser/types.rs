use crate::{
    ast::types::{BuiltinKind, TypeId},
    diag::DiagCode,
    lexer::tokens::TokenKind,
};

use super::expr::parse_symbol;
use super::parser::{PResult, Parser};

fn builtin_for(kind: TokenKind) -> Option<BuiltinKind> {
    use TokenKind::*;
    match kind {
        Void => Some(BuiltinKind::Void),
        Bool => Some(BuiltinKind::Bool),
        Char => Some(BuiltinKind::Char),
        String => Some(BuiltinKind::String),
        Int8 => Some(BuiltinKind::Int8),
        Int16 => Some(BuiltinKind::Int16),
        Int32 => Some(BuiltinKind::Int32),
        Int64 => Some(BuiltinKind::Int64),
        UInt8 => Some(BuiltinKind::UInt8),
        UInt16 => Some(BuiltinKind::UInt16),
        UInt32 => Some(BuiltinKind::UInt32),
        UInt64 => Some(BuiltinKind::UInt64),
        Float => Some(BuiltinKind::Float32),
        Double => Some(BuiltinKind::Float64),
        _ => None,
    }
}

/// Parses a type reference:
///
/// ```text
/// type := qualifier* (builtin | "pointer" "to" type | symbol)
/// ```
///
/// Named types come back as unresolved; the resolver looks them up
/// once the namespace tables are complete.
pub fn parse_type(parser: &mut Parser) -> PResult<TypeId> {
    parser.check_eof()?;

    let mut constant = false;
    let mut volatile = false;
    loop {
        match parser.current_kind() {
            TokenKind::Const => {
                constant = true;
                parser.advance();
            }
            TokenKind::Volatile => {
                volatile = true;
                parser.advance();
            }
            _ => break,
        }
        parser.check_eof()?;
    }

    let inner = if let Some(builtin) = builtin_for(parser.current_kind()) {
        parser.advance();
        parser.unit.types.builtin(builtin)
    } else if parser.current_kind() == TokenKind::Pointer {
        parser.advance();
        parser.expect(TokenKind::To)?;
        let pointee = parse_type(parser)?;
        parser.unit.types.pointer_to(pointee)
    } else if parser.current_kind() == TokenKind::Identifier {
        let symbol = parse_symbol(parser)?;
        parser.unit.types.unresolved(symbol)
    } else {
        // Not a type at all. Report it and stand in int32 so the
        // declaration can finish parsing.
        let found = parser.current_token().clone();
        parser
            .diags
            .report(DiagCode::ExpectedTypeName, Some(found.loc))
            .arg(&found.text);
        parser.unit.types.builtin(BuiltinKind::Int32)
    };

    Ok(parser.unit.types.qualified(inner, constant, volatile))
}
