use crate::{
    ast::{
        decls::{Decl, VarDecl},
        expressions::{Expr, ExprKind},
        statements::{Stmt, StmtKind, SwitchCase},
    },
    diag::DiagCode,
    lexer::tokens::TokenKind,
};

use super::expr::parse_expr;
use super::parser::{PResult, Parser};
use super::types::parse_type;

pub fn parse_stmt(parser: &mut Parser) -> PResult<Stmt> {
    parser.check_eof()?;
    match parser.current_kind() {
        TokenKind::OpenBrace => parse_compound(parser),
        TokenKind::Let => {
            let stmt = parse_let(parser)?;
            finish_simple(parser, stmt)
        }
        TokenKind::If => parse_if(parser),
        TokenKind::Switch => parse_switch(parser),
        TokenKind::While => parse_while(parser, false),
        TokenKind::Until => parse_while(parser, true),
        TokenKind::Do => parse_do(parser),
        TokenKind::For => parse_for(parser),
        TokenKind::Return => {
            let stmt = parse_return(parser)?;
            finish_simple(parser, stmt)
        }
        TokenKind::Break => {
            let tok = parser.advance();
            let stmt = Stmt::new(StmtKind::Break {
                loc: tok.loc,
                target: None,
            });
            finish_simple(parser, stmt)
        }
        TokenKind::Continue => {
            let tok = parser.advance();
            let stmt = Stmt::new(StmtKind::Continue {
                loc: tok.loc,
                target: None,
            });
            finish_simple(parser, stmt)
        }
        _ => {
            let expr = parse_expr(parser)?;
            let stmt = Stmt::new(StmtKind::Expr(expr));
            finish_simple(parser, stmt)
        }
    }
}

/// Applies any trailing complement clause, then the delimiter. A
/// trailing `if` wraps the statement in a conditional; a trailing
/// `while`/`until` wraps it in a pre-tested loop.
fn finish_simple(parser: &mut Parser, stmt: Stmt) -> PResult<Stmt> {
    let stmt = match parser.current_kind() {
        TokenKind::If => {
            parser.advance();
            let cond = parse_expr(parser)?;
            Stmt::new(StmtKind::If {
                cond,
                then_branch: Box::new(stmt),
                else_branch: None,
            })
        }
        TokenKind::While | TokenKind::Until => {
            let until = parser.current_kind() == TokenKind::Until;
            parser.advance();
            let cond = parse_expr(parser)?;
            let id = parser.node_id();
            Stmt::new(StmtKind::Loop {
                cond,
                body: Box::new(stmt),
                until,
                post: false,
                id,
            })
        }
        _ => stmt,
    };
    parser.expect_delimiter()?;
    Ok(stmt)
}

pub fn parse_compound(parser: &mut Parser) -> PResult<Stmt> {
    parser.expect(TokenKind::OpenBrace)?;
    let mut body = vec![];
    while parser.current_kind() != TokenKind::CloseBrace {
        parser.check_eof()?;
        body.push(parse_stmt(parser)?);
    }
    let close = parser.advance();
    Ok(Stmt::new(StmtKind::Compound {
        body,
        end_loc: close.loc,
    }))
}

/// `let [type] name ("," name)* ["be" expr]`
///
/// Whether a type was written is decided by lookahead: a type keyword,
/// or an identifier that is itself followed by an identifier or `::`.
fn parse_let(parser: &mut Parser) -> PResult<Stmt> {
    let let_tok = parser.advance();
    parser.check_eof()?;

    let has_type = parser.current_kind().starts_type()
        || (parser.current_kind() == TokenKind::Identifier
            && matches!(
                parser.peek_kind(1),
                TokenKind::Identifier | TokenKind::ColonColon
            ));
    let ty = if has_type {
        Some(parse_type(parser)?)
    } else {
        None
    };

    let mut names = vec![];
    loop {
        names.push(parser.expect_identifier()?);
        if parser.current_kind() != TokenKind::Comma {
            break;
        }
        parser.advance();
        parser.check_eof()?;
    }

    let init = if parser.current_kind() == TokenKind::Be {
        parser.advance();
        Some(parse_expr(parser)?)
    } else {
        None
    };

    let loc = let_tok.loc.join(&parser.last_token().loc);
    if names.len() > 1 && init.is_some() {
        parser
            .diags
            .report(DiagCode::MultipleVariablesWithSingleInitializer, Some(loc.clone()));
    }
    if ty.is_none() && init.is_none() {
        parser
            .diags
            .report(DiagCode::VariableNeedsTypeOrInitializer, Some(loc.clone()))
            .arg(&names[0].text);
    }
    if ty.is_none() {
        if let Some(Expr {
            kind: ExprKind::NullPointer,
            ..
        }) = init
        {
            parser
                .diags
                .report(DiagCode::CannotInferTypeFromNullLiteral, Some(loc.clone()))
                .arg(&names[0].text);
        }
    }

    let decls = names
        .into_iter()
        .map(|name| {
            parser.unit.decls.alloc(Decl::LocalVar(VarDecl {
                name: name.text,
                loc: name.loc,
                ty,
                init: None,
            }))
        })
        .collect();

    Ok(Stmt::new(StmtKind::VarDecl { decls, init, loc }))
}

fn parse_if(parser: &mut Parser) -> PResult<Stmt> {
    parser.advance();
    let cond = parse_expr(parser)?;
    if parser.current_kind() == TokenKind::Then {
        parser.advance();
    }
    let then_branch = Box::new(parse_stmt(parser)?);
    let else_branch = if parser.current_kind() == TokenKind::Else {
        parser.advance();
        Some(Box::new(parse_stmt(parser)?))
    } else {
        None
    };
    Ok(Stmt::new(StmtKind::If {
        cond,
        then_branch,
        else_branch,
    }))
}

fn parse_while(parser: &mut Parser, until: bool) -> PResult<Stmt> {
    parser.advance();
    let cond = parse_expr(parser)?;
    if parser.current_kind() == TokenKind::Then {
        parser.advance();
    }
    let body = Box::new(parse_stmt(parser)?);
    let id = parser.node_id();
    Ok(Stmt::new(StmtKind::Loop {
        cond,
        body,
        until,
        post: false,
        id,
    }))
}

fn parse_do(parser: &mut Parser) -> PResult<Stmt> {
    parser.advance();
    let body = Box::new(parse_stmt(parser)?);
    parser.check_eof()?;

    let until = match parser.current_kind() {
        TokenKind::While => false,
        TokenKind::Until => true,
        _ => {
            let found = parser.current_token().clone();
            parser
                .diags
                .report(DiagCode::ExpectedLoopKeywordAfterDo, Some(found.loc.clone()));
            // Degrade to a single pass of the body.
            let mut cond = Expr::new(ExprKind::BoolLit(false), found.loc);
            cond.resign_validation();
            let id = parser.node_id();
            return Ok(Stmt::new(StmtKind::Loop {
                cond,
                body,
                until: false,
                post: true,
                id,
            }));
        }
    };
    parser.advance();
    let cond = parse_expr(parser)?;
    parser.expect_delimiter()?;
    let id = parser.node_id();
    Ok(Stmt::new(StmtKind::Loop {
        cond,
        body,
        until,
        post: true,
        id,
    }))
}

fn parse_for(parser: &mut Parser) -> PResult<Stmt> {
    parser.advance();
    parser.expect(TokenKind::OpenParen)?;

    let mut init = vec![];
    if parser.current_kind() != TokenKind::Semicolon {
        if parser.current_kind() == TokenKind::Let {
            init.push(parse_let(parser)?);
        } else {
            loop {
                let expr = parse_expr(parser)?;
                init.push(Stmt::new(StmtKind::Expr(expr)));
                if parser.current_kind() != TokenKind::Comma {
                    break;
                }
                parser.advance();
                parser.check_eof()?;
            }
        }
    }
    parser.expect(TokenKind::Semicolon)?;

    let cond = if parser.current_kind() != TokenKind::Semicolon {
        Some(parse_expr(parser)?)
    } else {
        None
    };
    parser.expect(TokenKind::Semicolon)?;

    let mut step = vec![];
    if parser.current_kind() != TokenKind::CloseParen {
        loop {
            step.push(parse_expr(parser)?);
            if parser.current_kind() != TokenKind::Comma {
                break;
            }
            parser.advance();
            parser.check_eof()?;
        }
    }
    parser.expect(TokenKind::CloseParen)?;

    let body = Box::new(parse_stmt(parser)?);
    let id = parser.node_id();
    Ok(Stmt::new(StmtKind::For {
        init,
        cond,
        step,
        body,
        id,
    }))
}

fn parse_switch(parser: &mut Parser) -> PResult<Stmt> {
    parser.advance();
    let subject = parse_expr(parser)?;
    parser.expect(TokenKind::OpenBrace)?;

    let mut cases = vec![];
    while parser.current_kind() != TokenKind::CloseBrace {
        parser.check_eof()?;
        match parser.current_kind() {
            TokenKind::Case => {
                let tok = parser.advance();
                let value = parse_expr(parser)?;
                parser.expect(TokenKind::Colon)?;
                let body = parse_case_body(parser)?;
                cases.push(SwitchCase {
                    value: Some(value),
                    body,
                    loc: tok.loc,
                });
            }
            TokenKind::Default => {
                let tok = parser.advance();
                parser.expect(TokenKind::Colon)?;
                let body = parse_case_body(parser)?;
                cases.push(SwitchCase {
                    value: None,
                    body,
                    loc: tok.loc,
                });
            }
            _ => {
                let found = parser.advance();
                parser
                    .diags
                    .report(DiagCode::ExpectedCaseLabel, Some(found.loc));
            }
        }
    }
    parser.advance();

    let id = parser.node_id();
    Ok(Stmt::new(StmtKind::Switch { subject, cases, id }))
}

fn parse_case_body(parser: &mut Parser) -> PResult<Vec<Stmt>> {
    let mut body = vec![];
    while !matches!(
        parser.current_kind(),
        TokenKind::Case | TokenKind::Default | TokenKind::CloseBrace
    ) {
        parser.check_eof()?;
        body.push(parse_stmt(parser)?);
    }
    Ok(body)
}

fn parse_return(parser: &mut Parser) -> PResult<Stmt> {
    let tok = parser.advance();
    let value = if parser.at_statement_boundary() || parser.current_kind() == TokenKind::If {
        None
    } else {
        Some(parse_expr(parser)?)
    };
    Ok(Stmt::new(StmtKind::Return {
        value,
        loc: tok.loc,
    }))
}
