//! Fixture-driven harness: every directory under `tests/programs/` with a
//! `case.yaml` runs through the full pipeline and is checked against its
//! declared outcome.

use std::fs;
use std::io::Cursor;
use std::path::Path;

use anyhow::{Context, Result, ensure};

use bhasha::analyzer::SemanticAnalyzer;
use bhasha::fixtures::{Case, CaseClass, load_cases};
use bhasha::interpreter::Interpreter;
use bhasha::lexer;
use bhasha::parser::Parser;

fn normalize_output(output: &str) -> String {
    output.replace("\r\n", "\n").trim_end().to_string()
}

/// Outcome of one pipeline run: collected front-end diagnostics, program
/// stdout, and the runtime error message if execution failed.
struct RunOutcome {
    diagnostics: Vec<String>,
    stdout: String,
    runtime_error: Option<String>,
}

fn run_pipeline(source: &str, stdin: Option<&str>) -> RunOutcome {
    let mut diagnostics = Vec::new();

    let (tokens, lex_errors) = lexer::tokenize_safe(source);
    diagnostics.extend(lex_errors.iter().map(|error| error.to_string()));

    let program = match Parser::new(tokens).parse() {
        Ok(program) => program,
        Err(collection) => {
            diagnostics.extend(collection.errors.iter().map(|error| error.to_string()));
            return RunOutcome {
                diagnostics,
                stdout: String::new(),
                runtime_error: None,
            };
        }
    };

    let semantic_errors = SemanticAnalyzer::new().analyze(&program);
    diagnostics.extend(semantic_errors.iter().map(|error| error.to_string()));

    if !diagnostics.is_empty() {
        return RunOutcome {
            diagnostics,
            stdout: String::new(),
            runtime_error: None,
        };
    }

    let input = stdin.unwrap_or("").to_string();
    let mut interpreter = Interpreter::with_input(Box::new(Cursor::new(input)));
    let result = interpreter.execute(&program);
    RunOutcome {
        diagnostics,
        stdout: interpreter.take_output(),
        runtime_error: result.err().map(|error| error.to_string()),
    }
}

fn check_case(case: &Case) -> Result<()> {
    let source = fs::read_to_string(&case.program_path)
        .with_context(|| format!("Reading {}", case.name))?;
    let outcome = run_pipeline(&source, case.spec.stdin.as_deref());

    match case.spec.class {
        CaseClass::RuntimeSuccess => {
            ensure!(
                case.spec.expected.exit_code == 0,
                "Case {} expected exit code must be 0 for runtime_success",
                case.name
            );
            ensure!(
                outcome.diagnostics.is_empty(),
                "Case {} produced diagnostics: {:?}",
                case.name,
                outcome.diagnostics
            );
            ensure!(
                outcome.runtime_error.is_none(),
                "Case {} failed at runtime: {:?}",
                case.name,
                outcome.runtime_error
            );
            let stdout_file = case
                .spec
                .expected
                .stdout_file
                .as_deref()
                .with_context(|| format!("Missing stdout_file in {}", case.name))?;
            let expected = case.read_text(stdout_file)?;
            ensure!(
                normalize_output(&outcome.stdout) == normalize_output(&expected),
                "Case {} stdout mismatch:\n--- expected ---\n{}\n--- actual ---\n{}",
                case.name,
                expected,
                outcome.stdout
            );
        }
        CaseClass::FrontendError => {
            ensure!(
                case.spec.expected.exit_code == 1,
                "Case {} expected exit code must be 1 for frontend_error",
                case.name
            );
            let expected_file = case
                .spec
                .expected
                .error_contains_file
                .as_deref()
                .with_context(|| format!("Missing error_contains_file in {}", case.name))?;
            let expected = case.read_text(expected_file)?;
            let expected = expected.trim();
            ensure!(
                outcome
                    .diagnostics
                    .iter()
                    .any(|diagnostic| diagnostic.contains(expected)),
                "Case {} expected a diagnostic containing '{expected}', got {:?}",
                case.name,
                outcome.diagnostics
            );
        }
        CaseClass::RuntimeError => {
            ensure!(
                case.spec.expected.exit_code == 1,
                "Case {} expected exit code must be 1 for runtime_error",
                case.name
            );
            ensure!(
                outcome.diagnostics.is_empty(),
                "Case {} unexpectedly failed in the front end: {:?}",
                case.name,
                outcome.diagnostics
            );
            let expected_file = case
                .spec
                .expected
                .error_contains_file
                .as_deref()
                .with_context(|| format!("Missing error_contains_file in {}", case.name))?;
            let expected = case.read_text(expected_file)?;
            let expected = expected.trim();
            let error = outcome
                .runtime_error
                .with_context(|| format!("Case {} did not fail at runtime", case.name))?;
            ensure!(
                error.contains(expected),
                "Case {} expected runtime error containing '{expected}', got '{error}'",
                case.name
            );
        }
    }
    Ok(())
}

#[test]
fn runs_all_program_fixtures() -> Result<()> {
    let cases = load_cases(Path::new("tests/programs"))?;
    for case in &cases {
        check_case(case).with_context(|| format!("Case {}", case.name))?;
    }
    Ok(())
}
