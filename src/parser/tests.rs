use std::rc::Rc;

use crate::{
    ast::{
        decls::{CompilationUnit, Decl},
        expressions::{Expr, ExprKind},
        statements::{Stmt, StmtKind},
    },
    diag::{DiagCode, Diagnostics},
    lexer::{lexer::tokenize, tokens::TokenKind},
};

fn parse_source(source: &str) -> (CompilationUnit, Diagnostics) {
    let file = Rc::new(String::from("test"));
    let mut diags = Diagnostics::new();
    let tokens = tokenize(source, Rc::clone(&file), &mut diags);
    let mut unit = CompilationUnit::new(file);
    super::parser::parse(tokens, &mut unit, &mut diags);
    (unit, diags)
}

/// The body of the sole function in the unit.
fn only_body(unit: &CompilationUnit) -> &Vec<Stmt> {
    let global = unit.decls.namespace(unit.global_namespace);
    for id in &global.ordered {
        if let Decl::Function(f) = unit.decls.get(*id) {
            if let Some(Stmt {
                kind: StmtKind::Compound { body, .. },
                ..
            }) = &f.body
            {
                return body;
            }
        }
    }
    panic!("no function body in test source");
}

fn only_expr(unit: &CompilationUnit) -> &Expr {
    match &only_body(unit)[0].kind {
        StmtKind::Expr(expr) => expr,
        other => panic!("expected expression statement, got {:?}", other),
    }
}

fn wrap(expr: &str) -> String {
    format!("function f() {{ {}; }}", expr)
}

#[test]
fn test_precedence_mul_binds_tighter() {
    let (unit, diags) = parse_source(&wrap("5 + 3 * 4"));
    assert!(!diags.has_errors());
    match &only_expr(&unit).kind {
        ExprKind::Binary { op, lhs, rhs, .. } => {
            assert_eq!(*op, TokenKind::Plus);
            assert!(matches!(lhs.kind, ExprKind::IntLit(5)));
            assert!(matches!(rhs.kind, ExprKind::Binary { op: TokenKind::Star, .. }));
        }
        other => panic!("expected binary, got {:?}", other),
    }

    let (unit, _) = parse_source(&wrap("5 * 3 + 4"));
    match &only_expr(&unit).kind {
        ExprKind::Binary { op, lhs, rhs, .. } => {
            assert_eq!(*op, TokenKind::Plus);
            assert!(matches!(lhs.kind, ExprKind::Binary { op: TokenKind::Star, .. }));
            assert!(matches!(rhs.kind, ExprKind::IntLit(4)));
        }
        other => panic!("expected binary, got {:?}", other),
    }
}

#[test]
fn test_assignment_is_right_associative() {
    let (unit, _) = parse_source("function f() { a = b = c; }");
    match &only_expr(&unit).kind {
        ExprKind::Binary { op, lhs, rhs, .. } => {
            assert_eq!(*op, TokenKind::Assign);
            assert!(matches!(lhs.kind, ExprKind::VarRef { .. }));
            assert!(matches!(rhs.kind, ExprKind::Binary { op: TokenKind::Assign, .. }));
        }
        other => panic!("expected assignment, got {:?}", other),
    }
}

#[test]
fn test_arrow_is_assignment_synonym() {
    let (unit, _) = parse_source("function f() { a <- 1; }");
    assert!(matches!(
        only_expr(&unit).kind,
        ExprKind::Binary { op: TokenKind::ArrowLeft, .. }
    ));
}

#[test]
fn test_unary_and_member_chain() {
    let (unit, _) = parse_source("function f() { -p.x.y; }");
    match &only_expr(&unit).kind {
        ExprKind::Unary { operand, .. } => match &operand.kind {
            ExprKind::FieldAccess { entity, member, .. } => {
                assert_eq!(member, "y");
                assert!(matches!(entity.kind, ExprKind::FieldAccess { .. }));
            }
            other => panic!("expected member access, got {:?}", other),
        },
        other => panic!("expected unary, got {:?}", other),
    }
}

#[test]
fn test_call_with_qualified_name() {
    let (unit, diags) = parse_source("function f() { math::sqrt(2.0, x); }");
    assert!(!diags.has_errors());
    match &only_expr(&unit).kind {
        ExprKind::Call { symbol, args, .. } => {
            assert_eq!(symbol.path_string(), "math::sqrt");
            assert_eq!(args.len(), 2);
        }
        other => panic!("expected call, got {:?}", other),
    }
}

#[test]
fn test_eof_reports_exactly_once() {
    let (_, diags) = parse_source("function foo(");
    assert_eq!(diags.count_of(DiagCode::UnexpectedEof), 1);
}

#[test]
fn test_trailing_if_wraps_statement() {
    let (unit, diags) = parse_source("function f() { return 1 if x; }");
    assert!(!diags.has_errors());
    match &only_body(&unit)[0].kind {
        StmtKind::If {
            then_branch,
            else_branch,
            ..
        } => {
            assert!(matches!(then_branch.kind, StmtKind::Return { .. }));
            assert!(else_branch.is_none());
        }
        other => panic!("expected if, got {:?}", other),
    }
}

#[test]
fn test_trailing_while_wraps_statement() {
    let (unit, diags) = parse_source("function f() { x = x + 1 while x < 10; }");
    assert!(!diags.has_errors());
    match &only_body(&unit)[0].kind {
        StmtKind::Loop { until, post, .. } => {
            assert!(!until);
            assert!(!post);
        }
        other => panic!("expected loop, got {:?}", other),
    }
}

#[test]
fn test_do_until_loop() {
    let (unit, diags) = parse_source("function f() { do { x; } until x > 3; }");
    assert!(!diags.has_errors());
    match &only_body(&unit)[0].kind {
        StmtKind::Loop { until, post, .. } => {
            assert!(*until);
            assert!(*post);
        }
        other => panic!("expected loop, got {:?}", other),
    }
}

#[test]
fn test_do_without_loop_keyword() {
    let (_, diags) = parse_source("function f() { do { x; } 5; }");
    assert!(diags.contains(DiagCode::ExpectedLoopKeywordAfterDo));
}

#[test]
fn test_for_statement() {
    let (unit, diags) = parse_source("function f() { for (let int i be 0; i < 10; i = i + 1) { } }");
    assert!(!diags.has_errors());
    match &only_body(&unit)[0].kind {
        StmtKind::For {
            init, cond, step, ..
        } => {
            assert_eq!(init.len(), 1);
            assert!(cond.is_some());
            assert_eq!(step.len(), 1);
        }
        other => panic!("expected for, got {:?}", other),
    }
}

#[test]
fn test_switch_statement() {
    let (unit, diags) = parse_source(
        "function f() { switch x { case 1: y; break; case 2: z; default: w; } }",
    );
    assert!(!diags.has_errors());
    match &only_body(&unit)[0].kind {
        StmtKind::Switch { cases, .. } => {
            assert_eq!(cases.len(), 3);
            assert!(cases[0].value.is_some());
            assert!(cases[2].value.is_none());
        }
        other => panic!("expected switch, got {:?}", other),
    }
}

#[test]
fn test_let_with_multiple_names_and_init() {
    let (_, diags) = parse_source("function f() { let int a, b be 3; }");
    assert!(diags.contains(DiagCode::MultipleVariablesWithSingleInitializer));
}

#[test]
fn test_let_needs_type_or_initializer() {
    let (_, diags) = parse_source("function f() { let a; }");
    assert!(diags.contains(DiagCode::VariableNeedsTypeOrInitializer));
}

#[test]
fn test_let_cannot_infer_from_nothing() {
    let (_, diags) = parse_source("function f() { let p be nothing; }");
    assert!(diags.contains(DiagCode::CannotInferTypeFromNullLiteral));
}

#[test]
fn test_stated_function_name_joins_atoms() {
    let (unit, diags) =
        parse_source("distance (a double x) to (a double y) returning double { return x - y; }");
    assert!(!diags.has_errors());
    let global = unit.decls.namespace(unit.global_namespace);
    let overloads = &global.functions["distance_to"];
    assert_eq!(overloads.len(), 1);
    let f = unit.decls.function(overloads[0]);
    assert_eq!(f.params.len(), 2);
}

#[test]
fn test_namespace_reopening_merges() {
    let (unit, diags) = parse_source(
        "namespace m { function f() { } } namespace m { function g() { } }",
    );
    assert!(!diags.has_errors());
    let global = unit.decls.namespace(unit.global_namespace);
    assert_eq!(global.namespaces.len(), 1);
    let m = unit.decls.namespace(global.namespaces["m"]);
    assert!(m.functions.contains_key("f"));
    assert!(m.functions.contains_key("g"));
}

#[test]
fn test_missing_delimiter_is_assumed() {
    let (unit, diags) = parse_source("function f() { let int a be 1 let int b be 2; }");
    assert!(diags.contains(DiagCode::ExpectedDelimiter));
    // Both declarations survive the missing semicolon.
    assert_eq!(only_body(&unit).len(), 2);
}

#[test]
fn test_global_variable_redefinition() {
    let (_, diags) = parse_source("let int x be 1; let int x be 2;");
    assert!(diags.contains(DiagCode::RedefinitionOfGlobalVariable));
    assert!(diags.contains(DiagCode::PreviousDefinitionIsHere));
}

#[test]
fn test_alias_declaration() {
    let (unit, diags) = parse_source("alias id as int;");
    assert!(!diags.has_errors());
    let global = unit.decls.namespace(unit.global_namespace);
    assert!(global.types.contains_key("id"));
}

#[test]
fn test_class_with_duplicate_field() {
    let (_, diags) = parse_source("class point { a double x; a double x; }");
    assert!(diags.contains(DiagCode::RedefinitionOfField));
}

#[test]
fn test_class_body_garbage_recovers() {
    // A member that parses to nothing must not stall the member loop.
    let (unit, diags) = parse_source("class c { 42 } function f() { }");
    assert!(diags.has_errors());
    let global = unit.decls.namespace(unit.global_namespace);
    assert!(global.types.contains_key("c"));
    assert!(global.functions.contains_key("f"));
}

#[test]
fn test_protocol_body_garbage_recovers() {
    let (unit, diags) = parse_source("protocol p { 42 } function f() { }");
    assert!(diags.has_errors());
    let global = unit.decls.namespace(unit.global_namespace);
    assert!(global.types.contains_key("p"));
    assert!(global.functions.contains_key("f"));
}

#[test]
fn test_do_with_unbraced_body_loses_while_to_complement() {
    // The complement rule claims the trailing `while c` for the body
    // statement, so the `do` is left without its loop keyword. A braced
    // body keeps the keyword for the `do`.
    let (unit, diags) = parse_source("function f() { do x = 1 while c; }");
    assert!(diags.contains(DiagCode::ExpectedLoopKeywordAfterDo));
    match &only_body(&unit)[0].kind {
        StmtKind::Loop { post, body, .. } => {
            assert!(*post);
            assert!(matches!(
                body.kind,
                StmtKind::Loop { post: false, .. }
            ));
        }
        other => panic!("expected loop, got {:?}", other),
    }
}

#[test]
fn test_operator_classification() {
    use super::lookups::{is_binary, is_unary};
    assert!(is_binary(TokenKind::Plus));
    assert!(is_binary(TokenKind::Dash));
    assert!(!is_binary(TokenKind::Not));
    assert!(is_unary(TokenKind::Dash));
    assert!(is_unary(TokenKind::Tilde));
    assert!(!is_unary(TokenKind::Star));
}

#[test]
fn test_garbage_top_level_recovers() {
    let (unit, diags) = parse_source("42 function f() { }");
    assert!(diags.contains(DiagCode::ExpectedTopLevelConstruct));
    let global = unit.decls.namespace(unit.global_namespace);
    assert!(global.functions.contains_key("f"));
}
