//! The diagnostics engine and its fluent builders.

use std::fmt::Display;

use crate::SrcLoc;

use super::codes::{DiagCode, Severity};

/// A fully-formatted diagnostic, ready for display.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub code: DiagCode,
    pub severity: Severity,
    pub message: String,
    pub loc: Option<SrcLoc>,
}

/// Collects every diagnostic reported during a compilation.
///
/// Phases report through [`Diagnostics::report`] and never abort on their
/// own; the driver checks [`Diagnostics::error_count`] once the validator
/// pass has completed.
#[derive(Debug, Default)]
pub struct Diagnostics {
    diagnostics: Vec<Diagnostic>,
    errors: usize,
    warnings: usize,
    notes: usize,
}

impl Diagnostics {
    pub fn new() -> Self {
        Diagnostics::default()
    }

    /// Starts a diagnostic of the given kind. The returned builder commits
    /// the diagnostic when dropped, once its template parameters have been
    /// supplied with [`DiagnosticBuilder::arg`].
    pub fn report(&mut self, code: DiagCode, loc: Option<SrcLoc>) -> DiagnosticBuilder<'_> {
        DiagnosticBuilder {
            engine: self,
            code,
            loc,
            args: Vec::new(),
        }
    }

    pub fn error_count(&self) -> usize {
        self.errors
    }

    pub fn warning_count(&self) -> usize {
        self.warnings
    }

    pub fn note_count(&self) -> usize {
        self.notes
    }

    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// True if any emitted diagnostic carries the given code. Used by tests.
    pub fn contains(&self, code: DiagCode) -> bool {
        self.diagnostics.iter().any(|d| d.code == code)
    }

    pub fn count_of(&self, code: DiagCode) -> usize {
        self.diagnostics.iter().filter(|d| d.code == code).count()
    }

    fn commit(&mut self, code: DiagCode, loc: Option<SrcLoc>, args: Vec<String>) {
        let severity = code.severity();
        let message = format_template(code.template(), &args);
        match severity {
            Severity::Error => self.errors += 1,
            Severity::Warning => self.warnings += 1,
            Severity::Note => self.notes += 1,
        }
        self.diagnostics.push(Diagnostic {
            code,
            severity,
            message,
            loc,
        });
    }
}

/// Fluent parameter collector for one diagnostic.
///
/// The diagnostic is emitted when the builder is dropped; by then every
/// `%N` the template references must have been supplied.
pub struct DiagnosticBuilder<'a> {
    engine: &'a mut Diagnostics,
    code: DiagCode,
    loc: Option<SrcLoc>,
    args: Vec<String>,
}

impl DiagnosticBuilder<'_> {
    pub fn arg(mut self, value: impl Display) -> Self {
        self.args.push(value.to_string());
        self
    }
}

impl Drop for DiagnosticBuilder<'_> {
    fn drop(&mut self) {
        debug_assert!(
            self.args.len() >= self.code.param_count(),
            "diagnostic {:?} needs {} parameters, got {}",
            self.code,
            self.code.param_count(),
            self.args.len()
        );
        let args = std::mem::take(&mut self.args);
        let loc = self.loc.take();
        self.engine.commit(self.code, loc, args);
    }
}

fn format_template(template: &str, args: &[String]) -> String {
    let mut out = String::with_capacity(template.len());
    let bytes = template.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 1 < bytes.len() && bytes[i + 1].is_ascii_digit() {
            let n = (bytes[i + 1] - b'0') as usize;
            match args.get(n) {
                Some(arg) => out.push_str(arg),
                None => out.push_str("<missing>"),
            }
            i += 2;
        } else {
            // Templates are ASCII apart from supplied parameters.
            out.push(bytes[i] as char);
            i += 1;
        }
    }
    out
}

/// Counts the diagnostics emitted during one unit of work (typically one
/// file) and produces the closing summary line.
#[derive(Debug)]
pub struct DiagnosticsReport {
    errors_at_open: usize,
    warnings_at_open: usize,
}

impl DiagnosticsReport {
    pub fn open(diags: &Diagnostics) -> Self {
        DiagnosticsReport {
            errors_at_open: diags.error_count(),
            warnings_at_open: diags.warning_count(),
        }
    }

    pub fn errors(&self, diags: &Diagnostics) -> usize {
        diags.error_count() - self.errors_at_open
    }

    pub fn warnings(&self, diags: &Diagnostics) -> usize {
        diags.warning_count() - self.warnings_at_open
    }

    /// Closes the scope and renders the "N errors and M warnings generated"
    /// summary, or `None` when nothing was reported.
    pub fn close(self, diags: &Diagnostics) -> Option<String> {
        let errors = self.errors(diags);
        let warnings = self.warnings(diags);
        if errors == 0 && warnings == 0 {
            return None;
        }
        let errors_part = match errors {
            0 => None,
            1 => Some(String::from("1 error")),
            n => Some(format!("{} errors", n)),
        };
        let warnings_part = match warnings {
            0 => None,
            1 => Some(String::from("1 warning")),
            n => Some(format!("{} warnings", n)),
        };
        let summary = match (errors_part, warnings_part) {
            (Some(e), Some(w)) => format!("{} and {} generated", e, w),
            (Some(e), None) => format!("{} generated", e),
            (None, Some(w)) => format!("{} generated", w),
            (None, None) => unreachable!(),
        };
        Some(summary)
    }
}
