use std::rc::Rc;

use humanplus::{
    ast::decls::CompilationUnit,
    compile_source,
    diag::{DiagCode, Diagnostics, DiagnosticsReport},
    lexer::{
        lexer::tokenize,
        tokens::{TokenKind, RESERVED_LOOKUP},
    },
};

fn check(source: &str) -> (CompilationUnit, Diagnostics) {
    let mut diags = Diagnostics::new();
    let unit = compile_source(source, None, &mut diags);
    (unit, diags)
}

#[test]
fn test_every_keyword_lexes_to_its_token() {
    for (text, kind) in RESERVED_LOOKUP.iter() {
        let mut diags = Diagnostics::new();
        let tokens = tokenize(text, Rc::new(String::from("test")), &mut diags);
        assert!(!diags.has_errors());
        assert_eq!(tokens.len(), 2, "keyword '{}' should be one token", text);
        assert_eq!(tokens[0].kind, *kind, "keyword '{}'", text);
        assert_eq!(tokens[1].kind, TokenKind::EOF);
    }
}

#[test]
fn test_identifier_shaped_strings_stay_identifiers() {
    for text in ["Function", "lets", "bee", "nothingness", "_if"] {
        let mut diags = Diagnostics::new();
        let tokens = tokenize(text, Rc::new(String::from("test")), &mut diags);
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[0].text, text);
    }
}

#[test]
fn test_well_formed_program_compiles_cleanly() {
    let source = r#"
namespace geometry {
    class point {
        a double x;
        a double y;
    }

    function origin() returning point;

    function length_squared(a point p) returning double {
        return p.x * p.x + p.y * p.y;
    }
}

alias scalar as double;

distance (a geometry::point p) from origin returning scalar {
    let scalar sum be geometry::length_squared(p);
    let scalar out be 0.0;
    let int steps be 0;
    while out * out < sum {
        out = out + 0.5;
        steps += 1;
        break if steps > 100;
    }
    return out;
}

function main() returning int {
    let geometry::point p be geometry::origin();
    p.x = 3.0;
    p.y = 4.0;
    let result be distance_from_origin(p);
    for (let int i be 0; i < 3; i = i + 1) {
        switch i {
            case 0:
                result = result + 1.0;
                break;
            default:
                result = result - 1.0;
        }
    }
    do {
        result = result / 2.0;
    } until result < 1.0;
    return 0;
}
"#;
    let (unit, diags) = check(source);
    assert!(
        !diags.has_errors(),
        "unexpected diagnostics: {:?}",
        diags
            .diagnostics()
            .iter()
            .map(|d| d.message.clone())
            .collect::<Vec<_>>()
    );
    let global = unit.decls.namespace(unit.global_namespace);
    assert!(global.namespaces.contains_key("geometry"));
    assert!(global.functions.contains_key("distance_from_origin"));
    assert!(global.functions.contains_key("main"));
}

#[test]
fn test_truncated_input_reports_one_eof() {
    for source in [
        "function foo(",
        "namespace m {",
        "function f() { let int x be",
        "class point { a double",
    ] {
        let (_, diags) = check(source);
        assert_eq!(
            diags.count_of(DiagCode::UnexpectedEof),
            1,
            "source: {:?}",
            source
        );
    }
}

#[test]
fn test_lexical_errors_do_not_stop_the_front_end() {
    let source = "function f() { let int x be 999999999999999999999999999999; x = @; }";
    let (unit, diags) = check(source);
    assert!(diags.contains(DiagCode::UnrecognisedCharacter));
    // The function still exists and later statements were seen.
    let global = unit.decls.namespace(unit.global_namespace);
    assert!(global.functions.contains_key("f"));
}

#[test]
fn test_validation_continues_after_errors() {
    let source = "function f() { y = 1; z = 2; let int a be \"no\"; }";
    let (_, diags) = check(source);
    // One error per independent fault.
    assert_eq!(diags.count_of(DiagCode::UnresolvedSymbol), 2);
    assert_eq!(diags.count_of(DiagCode::NoViableConversion), 1);
}

#[test]
fn test_report_summary_counts() {
    let mut diags = Diagnostics::new();
    let report = DiagnosticsReport::open(&diags);
    compile_source("function f() { y = 1; }", None, &mut diags);
    assert_eq!(report.errors(&diags), 1);
    assert_eq!(
        report.close(&diags).as_deref(),
        Some("1 error generated")
    );
}

#[test]
fn test_compile_is_deterministic() {
    let source = "function pick(a int x) { } function pick(a double x) { } \
                  function f() { pick(1); pick(2.0); }";
    let (_, first) = check(source);
    let (_, second) = check(source);
    let first_msgs: Vec<_> = first.diagnostics().iter().map(|d| d.message.clone()).collect();
    let second_msgs: Vec<_> = second.diagnostics().iter().map(|d| d.message.clone()).collect();
    assert_eq!(first_msgs, second_msgs);
}
