//! Command-line driver: compile one source file and print diagnostics.

use std::{env, fs, process};

use humanplus::{
    compile_source,
    diag::{Diagnostic, Diagnostics, DiagnosticsReport, Severity},
    get_line, DriverError,
};

fn main() {
    if let Err(err) = run() {
        eprintln!("humanplus: {}", err);
        process::exit(1);
    }
}

fn run() -> Result<(), DriverError> {
    let path = env::args().nth(1).ok_or(DriverError::NoInputFile)?;
    let source = fs::read_to_string(&path).map_err(|_| DriverError::CannotOpenFile {
        path: path.clone(),
    })?;

    let mut diags = Diagnostics::new();
    let report = DiagnosticsReport::open(&diags);
    let _unit = compile_source(&source, Some(path), &mut diags);

    for diag in diags.diagnostics() {
        print_diagnostic(&source, diag);
    }
    if let Some(summary) = report.close(&diags) {
        eprintln!("{}", summary);
    }

    if diags.has_errors() {
        return Err(DriverError::CompilationFailed {
            errors: diags.error_count(),
        });
    }
    Ok(())
}

fn print_diagnostic(source: &str, diag: &Diagnostic) {
    let label = match diag.severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Note => "note",
    };
    match &diag.loc {
        Some(loc) => {
            eprintln!("{}: {}: {}", loc, label, diag.message);
            if let Some(line) = get_line(source, loc.line) {
                eprintln!("{}", line);
                let mut marker = String::new();
                for _ in 1..loc.column {
                    marker.push(' ');
                }
                marker.push('^');
                for _ in 1..loc.length {
                    marker.push('~');
                }
                eprintln!("{}", marker);
            }
        }
        None => eprintln!("{}: {}", label, diag.message),
    }
}
