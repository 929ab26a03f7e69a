use crate::{
    ast::{
        expressions::{Expr, ExprKind, UnaryOp},
        symbol::{Symbol, SymbolSegment},
    },
    diag::DiagCode,
    lexer::tokens::{TokenKind, TokenPayload},
};

use super::lookups::{associativity, is_binary, is_unary, precedence, Assoc};
use super::parser::{PResult, Parser};

/// Parses `ident ("::" ident)*`.
pub fn parse_symbol(parser: &mut Parser) -> PResult<Symbol> {
    let first = parser.expect_identifier()?;
    let mut segments = vec![SymbolSegment {
        name: first.text,
        loc: first.loc,
    }];
    while parser.current_kind() == TokenKind::ColonColon {
        parser.advance();
        let next = parser.expect_identifier()?;
        segments.push(SymbolSegment {
            name: next.text,
            loc: next.loc,
        });
    }
    Ok(Symbol { segments })
}

pub fn parse_expr(parser: &mut Parser) -> PResult<Expr> {
    let lhs = parse_primary(parser)?;
    parse_binary_rhs(parser, lhs, 1)
}

/// Precedence climbing over the operator table in `lookups`. `min_prec`
/// is the weakest operator this level is willing to absorb.
fn parse_binary_rhs(parser: &mut Parser, mut lhs: Expr, min_prec: u8) -> PResult<Expr> {
    loop {
        if !is_binary(parser.current_kind()) {
            return Ok(lhs);
        }
        let prec = precedence(parser.current_kind());
        if prec < min_prec {
            return Ok(lhs);
        }
        let op = parser.advance();

        let mut rhs = parse_primary(parser)?;
        loop {
            let next_prec = precedence(parser.current_kind());
            if next_prec > prec {
                rhs = parse_binary_rhs(parser, rhs, prec + 1)?;
            } else if next_prec == prec
                && associativity(parser.current_kind()) == Assoc::RightToLeft
            {
                // Assignment chains associate to the right.
                rhs = parse_binary_rhs(parser, rhs, prec)?;
            } else {
                break;
            }
        }

        let loc = lhs.loc.join(&rhs.loc);
        lhs = Expr::new(
            ExprKind::Binary {
                op: op.kind,
                op_loc: op.loc,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            loc,
        );
    }
}

fn parse_call_args(parser: &mut Parser) -> PResult<Vec<Expr>> {
    let mut args = vec![];
    if parser.current_kind() != TokenKind::CloseParen {
        loop {
            args.push(parse_expr(parser)?);
            if parser.current_kind() != TokenKind::Comma {
                break;
            }
            parser.advance();
            parser.check_eof()?;
        }
    }
    Ok(args)
}

fn parse_primary(parser: &mut Parser) -> PResult<Expr> {
    parser.check_eof()?;
    let tok = parser.current_token().clone();

    let mut expr = match tok.kind {
        TokenKind::IntLit => {
            parser.advance();
            let value = match tok.payload {
                TokenPayload::Int(v) => v,
                _ => 0,
            };
            Expr::new(ExprKind::IntLit(value), tok.loc)
        }
        TokenKind::UIntLit => {
            parser.advance();
            let value = match tok.payload {
                TokenPayload::UInt(v) => v,
                _ => 0,
            };
            Expr::new(ExprKind::UIntLit(value), tok.loc)
        }
        TokenKind::LongLit => {
            parser.advance();
            let value = match tok.payload {
                TokenPayload::Long(v) => v,
                _ => 0,
            };
            Expr::new(ExprKind::LongLit(value), tok.loc)
        }
        TokenKind::ULongLit => {
            parser.advance();
            let value = match tok.payload {
                TokenPayload::ULong(v) => v,
                _ => 0,
            };
            Expr::new(ExprKind::ULongLit(value), tok.loc)
        }
        TokenKind::FloatLit => {
            parser.advance();
            let value = match tok.payload {
                TokenPayload::Float(v) => v,
                _ => 0.0,
            };
            Expr::new(ExprKind::FloatLit(value), tok.loc)
        }
        TokenKind::DoubleLit => {
            parser.advance();
            let value = match tok.payload {
                TokenPayload::Double(v) => v,
                _ => 0.0,
            };
            Expr::new(ExprKind::DoubleLit(value), tok.loc)
        }
        TokenKind::CharLit => {
            parser.advance();
            let value = match tok.payload {
                TokenPayload::Char(v) => v,
                _ => '\0',
            };
            Expr::new(ExprKind::CharLit(value), tok.loc)
        }
        TokenKind::StringLit => {
            parser.advance();
            let value = match tok.payload {
                TokenPayload::Str(v) => v,
                _ => String::new(),
            };
            Expr::new(ExprKind::StringLit(value), tok.loc)
        }
        TokenKind::True => {
            parser.advance();
            Expr::new(ExprKind::BoolLit(true), tok.loc)
        }
        TokenKind::False => {
            parser.advance();
            Expr::new(ExprKind::BoolLit(false), tok.loc)
        }
        TokenKind::Nothing => {
            parser.advance();
            Expr::new(ExprKind::NullPointer, tok.loc)
        }
        TokenKind::OpenParen => {
            parser.advance();
            let inner = parse_expr(parser)?;
            parser.expect(TokenKind::CloseParen)?;
            inner
        }
        kind if is_unary(kind) => {
            parser.advance();
            let op = match kind {
                TokenKind::Dash => UnaryOp::Negate,
                TokenKind::Not => UnaryOp::LogicalNot,
                _ => UnaryOp::BitwiseNot,
            };
            let operand = parse_primary(parser)?;
            let loc = tok.loc.join(&operand.loc);
            Expr::new(
                ExprKind::Unary {
                    op,
                    operand: Box::new(operand),
                },
                loc,
            )
        }
        TokenKind::Identifier => {
            let symbol = parse_symbol(parser)?;
            if parser.current_kind() == TokenKind::OpenParen {
                parser.advance();
                let args = parse_call_args(parser)?;
                let close = parser.expect(TokenKind::CloseParen)?;
                let loc = symbol.loc().join(&close.loc);
                Expr::new(
                    ExprKind::Call {
                        symbol,
                        args,
                        resolved: None,
                    },
                    loc,
                )
            } else {
                let loc = symbol.loc();
                Expr::new(ExprKind::VarRef { symbol, decl: None }, loc)
            }
        }
        _ => {
            parser
                .diags
                .report(DiagCode::ExpectedExpression, Some(tok.loc.clone()))
                .arg(&tok.text);
            // Consume the offending token so the parse makes progress,
            // and hand back a poisoned placeholder.
            parser.advance();
            let mut placeholder = Expr::new(ExprKind::IntLit(0), tok.loc);
            placeholder.resign_validation();
            placeholder
        }
    };

    while parser.current_kind() == TokenKind::Dot {
        parser.advance();
        let member = parser.expect_identifier()?;
        let loc = expr.loc.join(&member.loc);
        expr = Expr::new(
            ExprKind::FieldAccess {
                entity: Box::new(expr),
                member: member.text,
                member_loc: member.loc,
                field: None,
            },
            loc,
        );
    }

    Ok(expr)
}
