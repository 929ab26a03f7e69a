use crate::{
    ast::{
        decls::CompilationUnit,
        expressions::ExprKind,
        statements::{Stmt, StmtKind},
    },
    compile_source,
    diag::{DiagCode, Diagnostics},
};

fn check(source: &str) -> (CompilationUnit, Diagnostics) {
    let mut diags = Diagnostics::new();
    let unit = compile_source(source, None, &mut diags);
    (unit, diags)
}

fn body_of<'a>(unit: &'a CompilationUnit, name: &str) -> &'a Vec<Stmt> {
    let global = unit.decls.namespace(unit.global_namespace);
    let decl = global.functions[name][0];
    match &unit.decls.function(decl).body {
        Some(Stmt {
            kind: StmtKind::Compound { body, .. },
            ..
        }) => body,
        other => panic!("function '{}' has no compound body: {:?}", name, other),
    }
}

#[test]
fn test_shadowing_in_inner_scope_is_fine() {
    let (_, diags) = check(
        "function f() { let int x be 1; { let double x be 2.0; x = 3.0; } x = 4; }",
    );
    assert!(!diags.has_errors());
}

#[test]
fn test_redefinition_in_same_scope() {
    let (_, diags) = check("function f() { let int x be 1; let int x be 2; }");
    assert_eq!(diags.count_of(DiagCode::RedefinitionOfLocalVariable), 1);
    assert_eq!(
        diags.count_of(DiagCode::PreviousVariableDeclarationWasHere),
        1
    );
}

#[test]
fn test_redefinition_with_different_type() {
    let (_, diags) = check("function f() { let int x be 1; let double x be 2.0; }");
    assert!(diags.contains(DiagCode::RedefinitionOfLocalVarWithDifType));
    assert!(!diags.contains(DiagCode::RedefinitionOfLocalVariable));
}

#[test]
fn test_undeclared_identifier() {
    let (_, diags) = check("function f() { y = 1; }");
    assert!(diags.contains(DiagCode::UnresolvedSymbol));
}

#[test]
fn test_variable_used_in_own_initializer() {
    let (_, diags) = check("function f() { let x be x + 1; }");
    assert!(diags.contains(DiagCode::VariableUsedInOwnInitializer));
}

#[test]
fn test_initializer_gets_implicit_cast() {
    let (unit, diags) = check("function f() { let double d be 3; d = d; }");
    assert!(!diags.has_errors());
    match &body_of(&unit, "f")[0].kind {
        StmtKind::VarDecl { init, .. } => {
            let init = init.as_ref().unwrap();
            assert!(matches!(init.kind, ExprKind::ImplicitCast { .. }));
        }
        other => panic!("expected var decl, got {:?}", other),
    }
}

#[test]
fn test_numeric_assignment_is_permissive() {
    // Narrowing float into int is allowed in assignment position.
    let (_, diags) = check("function f() { let int a be 3.5; a = 2.5; }");
    assert!(!diags.has_errors());
}

#[test]
fn test_string_to_int_has_no_conversion() {
    let (_, diags) = check("function f() { let int a be \"text\"; }");
    assert!(diags.contains(DiagCode::NoViableConversion));
}

#[test]
fn test_overload_prefers_exact_match() {
    let (_, diags) = check(
        "function pick(a int x) { }\
         function pick(a double x) { }\
         function f() { pick(3); pick(3.0); }",
    );
    assert!(!diags.has_errors());
}

#[test]
fn test_ambiguous_call_lists_candidates() {
    let (_, diags) = check(
        "function pick(a int x, a double y) { }\
         function pick(a double x, a int y) { }\
         function f() { pick(1, 2); }",
    );
    assert!(diags.contains(DiagCode::FunctionCallIsAmbiguous));
    assert_eq!(diags.count_of(DiagCode::CandidateFunction), 2);
}

#[test]
fn test_no_viable_overload() {
    let (_, diags) = check(
        "function pick(a int x) { }\
         function f() { pick(\"text\"); }",
    );
    assert!(diags.contains(DiagCode::FunctionOverloadDoesNotExist));
    assert!(diags.contains(DiagCode::CandidateFunction));
}

#[test]
fn test_compound_assignment_desugars() {
    // `x += y` reports exactly what `x = x + y` would.
    let (_, diags) = check("function f() { let int x be 1; x += y; }");
    assert_eq!(diags.count_of(DiagCode::UnresolvedSymbol), 1);
}

#[test]
fn test_assignment_to_unassignable_expression() {
    let (_, diags) = check("function f() { 1 = 2; }");
    assert!(diags.contains(DiagCode::ExpressionNotAssignable));
}

#[test]
fn test_assignment_to_const() {
    let (_, diags) = check("function f() { let const int c be 1; c = 2; }");
    assert!(diags.contains(DiagCode::AssignmentToConstant));
}

#[test]
fn test_break_outside_loop() {
    let (_, diags) = check("function f() { break; }");
    assert!(diags.contains(DiagCode::BreakNotInBreakableStatement));
}

#[test]
fn test_switch_catches_break_but_not_continue() {
    let (_, diags) = check(
        "function f() { switch 1 { case 1: break; default: continue; } }",
    );
    assert!(!diags.contains(DiagCode::BreakNotInBreakableStatement));
    assert!(diags.contains(DiagCode::ContinueNotInContinuableStatement));
}

#[test]
fn test_continue_in_switch_inside_loop_reaches_loop() {
    let (_, diags) = check(
        "function f() { while true { switch 1 { case 1: continue; } } }",
    );
    assert!(!diags.has_errors());
}

#[test]
fn test_non_void_function_must_return_on_all_paths() {
    let (_, diags) = check(
        "function f(a bool c) returning int { if c then return 1; }",
    );
    assert!(diags.contains(DiagCode::ControlReachesEndOfNonVoidFunction));

    let (_, diags) = check(
        "function g(a bool c) returning int { if c then return 1; else return 2; }",
    );
    assert!(!diags.has_errors());
}

#[test]
fn test_void_function_returning_value() {
    let (_, diags) = check("function f() { return 1; }");
    assert!(diags.contains(DiagCode::ReturnForVoidFunctionHasValue));
}

#[test]
fn test_non_void_function_bare_return() {
    let (_, diags) = check("function f() returning int { return; }");
    assert!(diags.contains(DiagCode::ReturnForNonVoidFunctionNeedsValue));
}

#[test]
fn test_numeric_condition_is_coerced() {
    let (unit, diags) = check("function f() { if 1 then { } }");
    assert!(!diags.has_errors());
    match &body_of(&unit, "f")[0].kind {
        StmtKind::If { cond, .. } => {
            assert!(matches!(cond.kind, ExprKind::Eval { .. }));
        }
        other => panic!("expected if, got {:?}", other),
    }
}

#[test]
fn test_string_condition_is_rejected() {
    let (_, diags) = check("function f() { if \"yes\" then { } }");
    assert!(diags.contains(DiagCode::ConditionNotConvertibleToBool));
}

#[test]
fn test_unknown_type_name() {
    let (_, diags) = check("function f() { let widget w; }");
    assert!(diags.contains(DiagCode::UnresolvedTypeName));
}

#[test]
fn test_class_member_access() {
    let (_, diags) = check(
        "class point { a double x; a double y; }\
         function f() { let point p; p.x = 1; }",
    );
    assert!(!diags.has_errors());
}

#[test]
fn test_missing_member() {
    let (_, diags) = check(
        "class point { a double x; }\
         function f() { let point p; p.z = 1; }",
    );
    assert!(diags.contains(DiagCode::NoObjectMemberInType));
}

#[test]
fn test_namespace_qualified_access() {
    let (_, diags) = check(
        "namespace m { let int x be 0; function bump() { x = x + 1; } }\
         function f() { m::x = 2; m::bump(); }",
    );
    assert!(!diags.has_errors());
}

#[test]
fn test_alias_is_equivalent_to_target() {
    let (_, diags) = check(
        "alias num as int;\
         function f(a num n) returning int { return n; }",
    );
    assert!(!diags.has_errors());
}

#[test]
fn test_null_literal_takes_pointer_type() {
    let (unit, diags) = check(
        "function f() { let pointer to int p be nothing; p = nothing; }",
    );
    assert!(!diags.has_errors());
    // The null literal is retyped in place, not cast.
    match &body_of(&unit, "f")[0].kind {
        StmtKind::VarDecl { init, .. } => {
            let init = init.as_ref().unwrap();
            assert!(matches!(init.kind, ExprKind::NullPointer));
            assert!(init.ty.is_some());
        }
        other => panic!("expected var decl, got {:?}", other),
    }
}

#[test]
fn test_prototype_is_callable() {
    let (_, diags) = check(
        "nostalgic function putchar(a int c) returning int;\
         function f() { putchar(65); }",
    );
    assert!(!diags.has_errors());
}

#[test]
fn test_errors_do_not_cascade() {
    // One bad symbol produces one error, not a chain from every
    // enclosing expression.
    let (_, diags) = check("function f() { let int a be y + 1; }");
    assert_eq!(diags.error_count(), 1);
    assert!(diags.contains(DiagCode::UnresolvedSymbol));
}

#[test]
fn test_unknown_namespace_is_blamed_on_the_namespace() {
    let (_, diags) = check("function f() { let int a be nowhere::x; }");
    assert!(diags.contains(DiagCode::UnresolvedNamespace));
    assert!(!diags.contains(DiagCode::UnresolvedSymbol));
}

#[test]
fn test_own_initializer_error_points_at_the_declaration() {
    let (_, diags) = check("function f() { let x be x + 1; }");
    assert_eq!(diags.count_of(DiagCode::VariableUsedInOwnInitializer), 1);
    assert_eq!(diags.count_of(DiagCode::DeclaredHere), 1);
}
