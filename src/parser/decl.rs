use crate::{
    ast::{
        decls::{
            AliasDecl, ClassDecl, Decl, DeclId, FieldDecl, FunctionDecl, NamespaceDecl,
            ProtocolDecl, VarDecl,
        },
        expressions::{Expr, ExprKind},
        statements::Stmt,
        types::TypeId,
    },
    diag::DiagCode,
    lexer::tokens::{Token, TokenKind},
};

use super::expr::parse_expr;
use super::parser::{PResult, Parser};
use super::stmt::parse_compound;
use super::types::parse_type;

/// Parses one top-level construct into namespace `ns`. Unrecognized
/// tokens are reported and skipped so the loop always makes progress.
pub fn parse_top_level(parser: &mut Parser, ns: DeclId) -> PResult<()> {
    parser.check_eof()?;
    match parser.current_kind() {
        TokenKind::Namespace => parse_namespace(parser, ns),
        TokenKind::Let => parse_global_let(parser, ns),
        TokenKind::Alias => parse_alias(parser, ns),
        TokenKind::Class => parse_class(parser, ns),
        TokenKind::Protocol => parse_protocol(parser, ns),
        TokenKind::Nostalgic => {
            parser.advance();
            parser.expect(TokenKind::Function)?;
            let name = parser.expect_identifier()?;
            parse_function_rest(parser, ns, name, true)
        }
        TokenKind::Function => {
            parser.advance();
            let name = parser.expect_identifier()?;
            parse_function_rest(parser, ns, name, false)
        }
        TokenKind::Identifier => parse_stated_function(parser, ns),
        _ => {
            let found = parser.advance();
            parser
                .diags
                .report(DiagCode::ExpectedTopLevelConstruct, Some(found.loc))
                .arg(&found.text);
            Ok(())
        }
    }
}

fn parse_namespace(parser: &mut Parser, ns: DeclId) -> PResult<()> {
    parser.advance();
    let name = parser.expect_identifier()?;
    parser.expect(TokenKind::OpenBrace)?;

    // Reopening an existing namespace appends to it.
    let existing = parser
        .unit
        .decls
        .namespace(ns)
        .namespaces
        .get(&name.text)
        .copied();
    let inner = match existing {
        Some(id) => id,
        None => {
            let id = parser.unit.decls.alloc(Decl::Namespace(NamespaceDecl::new(
                name.text.clone(),
                name.loc,
                Some(ns),
            )));
            let parent = parser.unit.decls.namespace_mut(ns);
            parent.ordered.push(id);
            parent.namespaces.insert(name.text, id);
            id
        }
    };

    while parser.current_kind() != TokenKind::CloseBrace {
        parser.check_eof()?;
        parse_top_level(parser, inner)?;
    }
    parser.advance();
    Ok(())
}

/// `let [type] name ("," name)* ["be" expr] ;` at namespace scope.
fn parse_global_let(parser: &mut Parser, ns: DeclId) -> PResult<()> {
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
    parser.expect_delimiter()?;

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
                .report(DiagCode::CannotInferTypeFromNullLiteral, Some(loc))
                .arg(&names[0].text);
        }
    }

    let mut init = init;
    for name in names {
        let previous = parser
            .unit
            .decls
            .namespace(ns)
            .variables
            .get(&name.text)
            .copied();
        if let Some(previous) = previous {
            let prev_loc = parser.unit.decls.loc_of(previous).clone();
            parser
                .diags
                .report(DiagCode::RedefinitionOfGlobalVariable, Some(name.loc.clone()))
                .arg(&name.text);
            parser
                .diags
                .report(DiagCode::PreviousDefinitionIsHere, Some(prev_loc));
            continue;
        }
        let decl = parser.unit.decls.alloc(Decl::GlobalVar(VarDecl {
            name: name.text.clone(),
            loc: name.loc,
            ty,
            init: init.take(),
        }));
        let namespace = parser.unit.decls.namespace_mut(ns);
        namespace.ordered.push(decl);
        namespace.variables.insert(name.text, decl);
    }
    Ok(())
}

/// `alias Name as type ;`
fn parse_alias(parser: &mut Parser, ns: DeclId) -> PResult<()> {
    parser.advance();
    let name = parser.expect_identifier()?;
    parser.expect(TokenKind::As)?;
    let target = parse_type(parser)?;
    parser.expect_delimiter()?;

    let decl = parser.unit.decls.alloc(Decl::TypeAlias(AliasDecl {
        name: name.text.clone(),
        loc: name.loc.clone(),
        target,
    }));
    register_type(parser, ns, name, decl);
    Ok(())
}

fn register_type(parser: &mut Parser, ns: DeclId, name: Token, decl: DeclId) {
    let previous = parser
        .unit
        .decls
        .namespace(ns)
        .types
        .get(&name.text)
        .copied();
    if let Some(previous) = previous {
        let prev_loc = parser.unit.decls.loc_of(previous).clone();
        parser
            .diags
            .report(DiagCode::RedefinitionOfType, Some(name.loc))
            .arg(&name.text);
        parser
            .diags
            .report(DiagCode::PreviousDefinitionIsHere, Some(prev_loc));
        return;
    }
    let namespace = parser.unit.decls.namespace_mut(ns);
    namespace.ordered.push(decl);
    namespace.types.insert(name.text, decl);
}

/// `class Name { ([a|an] type name ;)* }`
fn parse_class(parser: &mut Parser, ns: DeclId) -> PResult<()> {
    parser.advance();
    let name = parser.expect_identifier()?;
    parser.expect(TokenKind::OpenBrace)?;

    let class = parser.unit.decls.alloc(Decl::Class(ClassDecl {
        name: name.text.clone(),
        loc: name.loc.clone(),
        fields: vec![],
        ty: TypeId(0),
    }));
    let ty = parser.unit.types.class(class);
    match parser.unit.decls.get_mut(class) {
        Decl::Class(decl) => decl.ty = ty,
        _ => unreachable!(),
    }

    let mut index = 0u32;
    while parser.current_kind() != TokenKind::CloseBrace {
        parser.check_eof()?;
        let before = parser.offset();
        if parser.current_kind() == TokenKind::Article {
            parser.advance();
        }
        let field_ty = parse_type(parser)?;
        let field_name = parser.expect_identifier()?;
        parser.expect_delimiter()?;

        let duplicate = parser
            .unit
            .decls
            .class(class)
            .fields
            .iter()
            .find(|f| parser.unit.decls.name_of(**f) == field_name.text)
            .copied();
        if let Some(previous) = duplicate {
            let prev_loc = parser.unit.decls.loc_of(previous).clone();
            parser
                .diags
                .report(DiagCode::RedefinitionOfField, Some(field_name.loc))
                .arg(&field_name.text)
                .arg(&name.text);
            parser
                .diags
                .report(DiagCode::PreviousDefinitionIsHere, Some(prev_loc));
        } else {
            let field = parser.unit.decls.alloc(Decl::Field(FieldDecl {
                name: field_name.text,
                loc: field_name.loc,
                ty: field_ty,
                index,
                owner: class,
            }));
            index += 1;
            match parser.unit.decls.get_mut(class) {
                Decl::Class(decl) => decl.fields.push(field),
                _ => unreachable!(),
            }
        }

        // A member that consumed nothing would re-read the same token
        // forever; skip it and resume on the next one.
        if parser.offset() == before {
            parser.advance();
        }
    }
    parser.advance();

    register_type(parser, ns, name, class);
    Ok(())
}

/// `protocol Name { (function signature ;)* }`
///
/// Protocol members are signatures only; member dispatch is not part
/// of validation yet, so the body is parsed for well-formedness and
/// the protocol is registered by name.
fn parse_protocol(parser: &mut Parser, ns: DeclId) -> PResult<()> {
    parser.advance();
    let name = parser.expect_identifier()?;
    parser.expect(TokenKind::OpenBrace)?;

    while parser.current_kind() != TokenKind::CloseBrace {
        parser.check_eof()?;
        let before = parser.offset();
        parser.expect(TokenKind::Function)?;
        let _ = parser.expect_identifier()?;
        let mut params = vec![];
        parser.expect(TokenKind::OpenParen)?;
        parse_params(parser, &mut params)?;
        parser.expect(TokenKind::CloseParen)?;
        if parser.current_kind() == TokenKind::Returning {
            parser.advance();
            let _ = parse_type(parser)?;
        }
        parser.expect_delimiter()?;

        // Same progress guard as the class body: a signature made
        // entirely of recovery tokens consumes nothing.
        if parser.offset() == before {
            parser.advance();
        }
    }
    parser.advance();

    let decl = parser.unit.decls.alloc(Decl::Protocol(ProtocolDecl {
        name: name.text.clone(),
        loc: name.loc.clone(),
    }));
    register_type(parser, ns, name, decl);
    Ok(())
}

fn parse_params(parser: &mut Parser, params: &mut Vec<DeclId>) -> PResult<()> {
    if parser.current_kind() == TokenKind::CloseParen {
        return Ok(());
    }
    loop {
        parser.check_eof()?;
        if parser.current_kind() == TokenKind::Article {
            parser.advance();
        }
        let ty = parse_type(parser)?;
        let name = if parser.current_kind() == TokenKind::Identifier {
            parser.advance()
        } else {
            let found = parser.current_token().clone();
            parser
                .diags
                .report(DiagCode::ExpectedParameterName, Some(found.loc.clone()))
                .arg(&found.text);
            crate::MK_TOKEN!(
                TokenKind::Identifier,
                String::new(),
                crate::lexer::tokens::TokenPayload::None,
                found.loc
            )
        };
        params.push(parser.unit.decls.alloc(Decl::Param(VarDecl {
            name: name.text,
            loc: name.loc,
            ty: Some(ty),
            init: None,
        })));
        if parser.current_kind() != TokenKind::Comma {
            break;
        }
        parser.advance();
    }
    Ok(())
}

/// Shared tail of every function form: parameter list already parsed
/// or about to be, then `returning type`, then a body or `;`.
fn parse_function_rest(
    parser: &mut Parser,
    ns: DeclId,
    name: Token,
    nostalgic: bool,
) -> PResult<()> {
    let mut params = vec![];
    parser.expect(TokenKind::OpenParen)?;
    parse_params(parser, &mut params)?;
    parser.expect(TokenKind::CloseParen)?;
    finish_function(parser, ns, name.text, name.loc, params, nostalgic)
}

/// A stated function: atoms interleaved with parameter groups, e.g.
/// `distance (a point p) to (a point q) returning double { ... }`.
/// The function's name is the atoms joined with underscores.
fn parse_stated_function(parser: &mut Parser, ns: DeclId) -> PResult<()> {
    let first = parser.advance();
    let first_loc = first.loc.clone();
    let mut atoms = vec![first.text];
    let mut params = vec![];

    loop {
        match parser.current_kind() {
            // Reserved connector words still count as name atoms here,
            // as in `send (a string s) to (a person p)`.
            TokenKind::Identifier | TokenKind::To | TokenKind::As => {
                atoms.push(parser.advance().text);
            }
            TokenKind::OpenParen => {
                parser.advance();
                parse_params(parser, &mut params)?;
                parser.expect(TokenKind::CloseParen)?;
            }
            _ => break,
        }
        parser.check_eof()?;
    }

    finish_function(parser, ns, atoms.join("_"), first_loc, params, false)
}

fn finish_function(
    parser: &mut Parser,
    ns: DeclId,
    name: String,
    loc: crate::SrcLoc,
    params: Vec<DeclId>,
    nostalgic: bool,
) -> PResult<()> {
    let return_type = if parser.current_kind() == TokenKind::Returning {
        parser.advance();
        parse_type(parser)?
    } else {
        parser
            .unit
            .types
            .builtin(crate::ast::types::BuiltinKind::Void)
    };

    let body: Option<Stmt> = match parser.current_kind() {
        TokenKind::Semicolon => {
            parser.advance();
            None
        }
        TokenKind::OpenBrace => Some(parse_compound(parser)?),
        TokenKind::EOF => return Err(super::parser::Eof),
        _ => {
            let loc = parser.current_token().loc.clone();
            parser
                .diags
                .report(DiagCode::ExpectedFunctionBody, Some(loc));
            None
        }
    };

    let decl = parser.unit.decls.alloc(Decl::Function(FunctionDecl {
        name: name.clone(),
        loc,
        params,
        return_type,
        body,
        nostalgic,
        containing: ns,
    }));
    let namespace = parser.unit.decls.namespace_mut(ns);
    namespace.ordered.push(decl);
    namespace.functions.entry(name).or_default().push(decl);
    Ok(())
}
