//! Phase driver.
//!
//! Runs lexing, parsing, and semantic analysis unconditionally, dumps IR on
//! request, and executes only when the front-end produced no diagnostics.

use anyhow::Result;

use crate::analyzer::SemanticAnalyzer;
use crate::diagnostics::{Diagnostic, ErrorLanguage, render};
use crate::interpreter::Interpreter;
use crate::irgen::IrGenerator;
use crate::lexer;
use crate::parser::Parser;

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Run the semantic analysis pass (phase 3).
    pub run_semantic: bool,
    /// Dump the 3AC listing before execution (phase 4).
    pub emit_ir: bool,
    /// Print tokens and the parsed AST.
    pub debug: bool,
    pub error_language: ErrorLanguage,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            run_semantic: true,
            emit_ir: false,
            debug: false,
            error_language: ErrorLanguage::default(),
        }
    }
}

fn report(diagnostic: &dyn Diagnostic, language: ErrorLanguage) {
    eprintln!("{}", render(diagnostic, language));
}

/// Run the full pipeline over one source text. Diagnostics go to stderr;
/// program output accumulates in the interpreter's buffer for the caller to
/// drain (the binary prints it, tests read it). Returns the process exit
/// code: 0 for a clean run, 1 for any diagnostic or runtime failure.
pub fn run_source(
    source: &str,
    interpreter: &mut Interpreter,
    options: &PipelineOptions,
) -> Result<i32> {
    let language = options.error_language;

    // Phase 1 — lexing (panic mode). Lex errors are reported but the token
    // stream is still handed to the parser so its errors surface too.
    let (tokens, lex_errors) = lexer::tokenize_safe(source);
    if options.debug {
        eprintln!("=== Tokens ===");
        for token in &tokens {
            eprintln!(
                "  {:?} at line {}, col {}",
                token.kind,
                token.line(),
                token.column()
            );
        }
    }
    for error in &lex_errors {
        report(error, language);
    }
    let mut front_end_failed = !lex_errors.is_empty();

    // Phase 2 — parsing (panic mode).
    let program = match Parser::new(tokens).parse() {
        Ok(program) => program,
        Err(collection) => {
            for error in &collection.errors {
                report(error, language);
            }
            return Ok(1);
        }
    };
    if options.debug {
        eprintln!("=== AST ===\n{program}");
    }

    // Phase 3 — semantic analysis (non-fatal, full walk).
    if options.run_semantic {
        let errors = SemanticAnalyzer::new().analyze(&program);
        for error in &errors {
            report(error, language);
        }
        front_end_failed = front_end_failed || !errors.is_empty();
    }

    if front_end_failed {
        return Ok(1);
    }

    // Phase 4 — IR dump, on request only.
    if options.emit_ir {
        let ir = IrGenerator::new().generate(&program);
        println!("{}", ir.dump());
        println!();
    }

    // Phase 5 — execution. Output produced before a runtime failure stays in
    // the buffer so the caller still flushes it.
    match interpreter.execute(&program) {
        Ok(()) => Ok(0),
        Err(error) => {
            report(&error, language);
            Ok(1)
        }
    }
}
