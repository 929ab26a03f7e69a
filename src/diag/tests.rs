//! Unit tests for the diagnostics engine.

use super::codes::DiagCode;
use super::engine::{Diagnostics, DiagnosticsReport};
use crate::SrcLoc;

#[test]
fn test_template_param_count() {
    assert_eq!(DiagCode::UnexpectedEof.param_count(), 0);
    assert_eq!(DiagCode::UnresolvedSymbol.param_count(), 1);
    assert_eq!(DiagCode::IncompatibleTypesInBinary.param_count(), 2);
    assert_eq!(DiagCode::RedefinitionOfLocalVarWithDifType.param_count(), 3);
}

#[test]
fn test_builder_formats_message() {
    let mut diags = Diagnostics::new();
    diags
        .report(DiagCode::IncompatibleTypesInBinary, Some(SrcLoc::null()))
        .arg("int32")
        .arg("string");
    assert_eq!(diags.error_count(), 1);
    assert_eq!(
        diags.diagnostics()[0].message,
        "invalid operands to binary expression ('int32' and 'string')"
    );
}

#[test]
fn test_builder_without_params() {
    let mut diags = Diagnostics::new();
    diags.report(DiagCode::UnexpectedEof, None);
    assert_eq!(diags.error_count(), 1);
    assert_eq!(diags.diagnostics()[0].message, "unexpected end of file");
}

#[test]
fn test_notes_do_not_count_as_errors() {
    let mut diags = Diagnostics::new();
    diags.report(DiagCode::RedefinitionOfLocalVariable, None).arg("x");
    diags.report(DiagCode::PreviousVariableDeclarationWasHere, None);
    assert_eq!(diags.error_count(), 1);
    assert_eq!(diags.note_count(), 1);
}

#[test]
fn test_report_summary() {
    let mut diags = Diagnostics::new();
    let report = DiagnosticsReport::open(&diags);
    diags.report(DiagCode::UnresolvedSymbol, None).arg("foo");
    diags.report(DiagCode::UnresolvedSymbol, None).arg("bar");
    assert_eq!(report.errors(&diags), 2);
    assert_eq!(
        report.close(&diags).unwrap(),
        "2 errors generated"
    );
}

#[test]
fn test_report_summary_empty() {
    let diags = Diagnostics::new();
    let report = DiagnosticsReport::open(&diags);
    assert!(report.close(&diags).is_none());
}

#[test]
fn test_report_scopes_are_nested_counts() {
    let mut diags = Diagnostics::new();
    diags.report(DiagCode::UnresolvedSymbol, None).arg("before");
    let report = DiagnosticsReport::open(&diags);
    diags.report(DiagCode::UnresolvedSymbol, None).arg("inside");
    assert_eq!(report.errors(&diags), 1);
    assert_eq!(report.close(&diags).unwrap(), "1 error generated");
}
