//! End-to-end pipeline scenarios: source text in, output or diagnostics out.

use bhasha::analyzer::{SemanticAnalyzer, SemanticError};
use bhasha::interpreter::{Interpreter, RuntimeError};
use bhasha::irgen::IrGenerator;
use bhasha::lexer::{self, LexerError};
use bhasha::parser::{Parser, ParserError};
use bhasha::pipeline::{PipelineOptions, run_source};
use indoc::indoc;

/// Run the whole pipeline, requiring a clean front end and a clean run.
fn run_ok(source: &str) -> String {
    let tokens = lexer::tokenize(source).expect("tokenize failed");
    let program = Parser::new(tokens).parse().expect("parse failed");
    let errors = SemanticAnalyzer::new().analyze(&program);
    assert!(errors.is_empty(), "unexpected semantic errors: {errors:?}");
    let mut interpreter = Interpreter::new();
    interpreter.execute(&program).expect("execution failed");
    interpreter.take_output()
}

fn run_expecting_runtime_error(source: &str) -> RuntimeError {
    let tokens = lexer::tokenize(source).expect("tokenize failed");
    let program = Parser::new(tokens).parse().expect("parse failed");
    let errors = SemanticAnalyzer::new().analyze(&program);
    assert!(errors.is_empty(), "unexpected semantic errors: {errors:?}");
    let mut interpreter = Interpreter::new();
    interpreter
        .execute(&program)
        .expect_err("expected a runtime error")
}

fn semantic_errors(source: &str) -> Vec<SemanticError> {
    let tokens = lexer::tokenize(source).expect("tokenize failed");
    let program = Parser::new(tokens).parse().expect("parse failed");
    SemanticAnalyzer::new().analyze(&program)
}

#[test]
fn scenario_hello_world() {
    let output = run_ok(indoc! {r#"
        maan naam = "Duniya"
        likho("Namaste, " + naam + "!")
    "#});
    assert_eq!(output, "Namaste, Duniya!\n");
}

#[test]
fn scenario_arithmetic_and_shadowing() {
    let output = run_ok(indoc! {"
        maan x = 10
        { maan x = x + 5  likho(x) }
        likho(x)
    "});
    assert_eq!(output, "15\n10\n");
}

#[test]
fn scenario_panic_mode_lexer_and_parser() {
    let source = indoc! {r#"
        maan x = @
        likho("ok"
        likho("done")
    "#};

    let (tokens, lex_errors) = lexer::tokenize_safe(source);
    assert!(
        lex_errors
            .iter()
            .any(|error| matches!(error, LexerError::UnexpectedCharacter { character: '@', .. }))
    );

    let parse_errors = Parser::new(tokens)
        .parse()
        .expect_err("expected parse errors")
        .errors;
    assert!(
        parse_errors
            .iter()
            .any(|error| error.to_string().contains("')'")),
        "expected a missing ')' diagnostic, got {parse_errors:?}"
    );

    // Phase 5 must not run: the driver stops on any front-end diagnostic.
    let mut interpreter = Interpreter::new();
    let code = run_source(source, &mut interpreter, &PipelineOptions::default())
        .expect("driver failed");
    assert_eq!(code, 1);
    assert_eq!(interpreter.take_output(), "");
}

#[test]
fn scenario_closure_capture() {
    let output = run_ok(indoc! {"
        kaam make_adder(n) { wapas lambda(x) -> x + n }
        maan add5 = make_adder(5)
        likho(add5(3))
    "});
    assert_eq!(output, "8\n");
}

#[test]
fn scenario_inheritance_and_super() {
    let output = run_ok(indoc! {r#"
        class A { kaam __init__(n) { yeh.n = n } kaam who() { likho("A:" + str(yeh.n)) } }
        class B extends A { kaam __init__(n) { upar(n) } }
        maan b = naya B(7)
        b.who()
    "#});
    assert_eq!(output, "A:7\n");
}

#[test]
fn scenario_try_catch_finally_with_throw() {
    let output = run_ok(indoc! {r#"
        koshish { uchalo "boom" } pakad e { likho("caught:" + e) } aakhir { likho("fin") }
    "#});
    assert_eq!(output, "caught:boom\nfin\n");
}

// ---------------------------------------------------------------------------
// Driver contract: run_source orders the phases and gates execution
// ---------------------------------------------------------------------------

fn drive(source: &str) -> (i32, String) {
    let mut interpreter = Interpreter::new();
    let code = run_source(source, &mut interpreter, &PipelineOptions::default())
        .expect("driver failed");
    (code, interpreter.take_output())
}

#[test]
fn driver_runs_a_clean_program_and_exits_zero() {
    let (code, output) = drive("maan x = 40\nlikho(x + 2)");
    assert_eq!(code, 0);
    assert_eq!(output, "42\n");
}

#[test]
fn driver_gates_execution_behind_lexical_errors() {
    // The bad character is skipped, so the program still parses and analyzes
    // cleanly; only the lex-error gate keeps phase 5 from running.
    let (code, output) = drive("maan x = 5 @\nlikho(x)");
    assert_eq!(code, 1);
    assert_eq!(output, "");
}

#[test]
fn driver_gates_execution_behind_semantic_errors() {
    let (code, output) = drive("likho(ajnabi)");
    assert_eq!(code, 1);
    assert_eq!(output, "");
}

#[test]
fn driver_reports_runtime_failures_and_keeps_prior_output() {
    let (code, output) = drive("likho(\"pehle\")\nlikho(1 / 0)");
    assert_eq!(code, 1);
    assert_eq!(output, "pehle\n");
}

// ---------------------------------------------------------------------------
// Boundary behaviors
// ---------------------------------------------------------------------------

#[test]
fn empty_source_parses_to_empty_program() {
    let tokens = lexer::tokenize("").expect("tokenize failed");
    let program = Parser::new(tokens).parse().expect("parse failed");
    assert!(program.statements.is_empty());
}

#[test]
fn unterminated_string_is_one_error_and_lexing_continues() {
    let (tokens, errors) = lexer::tokenize_safe("maan x = \"abc\nmaan y = 2");
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], LexerError::UnterminatedString { .. }));
    // The next line still tokenizes.
    assert!(tokens.len() > 4);
}

#[test]
fn multiple_unknown_characters_each_get_their_own_error() {
    let (_, errors) = lexer::tokenize_safe("@ # ^");
    let columns: Vec<usize> = errors
        .iter()
        .map(|error| error.span().column)
        .collect();
    assert_eq!(columns, vec![1, 3, 5]);
}

#[test]
fn missing_brace_reports_and_recovers() {
    let source = indoc! {"
        kaam f() {
            likho(1)
        likho(2)
    "};
    let (tokens, _) = lexer::tokenize_safe(source);
    let errors = Parser::new(tokens)
        .parse()
        .expect_err("expected parse errors")
        .errors;
    assert!(
        errors
            .iter()
            .any(|error| matches!(error, ParserError::MissingToken { .. }))
    );
}

#[test]
fn redeclaration_same_scope_errors_nested_scope_shadows() {
    let errors = semantic_errors("maan x = 1\nmaan x = 2");
    assert!(matches!(errors[0], SemanticError::Redefinition { .. }));

    let errors = semantic_errors("maan x = 1\n{ maan x = 2 }");
    assert!(errors.is_empty());
}

#[test]
fn break_at_top_level_is_a_semantic_error() {
    let errors = semantic_errors("ruk");
    assert!(matches!(errors[0], SemanticError::BreakOutsideLoop { .. }));
}

#[test]
fn yeh_in_a_free_function_is_a_semantic_error() {
    let errors = semantic_errors("kaam f() { wapas yeh }");
    assert!(matches!(errors[0], SemanticError::ThisOutsideClass { .. }));
}

#[test]
fn division_by_zero_is_a_runtime_error() {
    assert!(matches!(
        run_expecting_runtime_error("likho(10 / 0)"),
        RuntimeError::DivisionByZero { .. }
    ));
}

#[test]
fn runaway_recursion_trips_the_guard() {
    assert!(matches!(
        run_expecting_runtime_error("kaam f() { wapas f() }\nf()"),
        RuntimeError::RecursionError { .. }
    ));
}

#[test]
fn closure_reads_from_its_defining_scope() {
    let output = run_ok(indoc! {"
        maan greeting = \"namaste\"
        kaam greeter() { wapas lambda(who) -> greeting + \" \" + who }
        kaam call_elsewhere(f) {
            maan greeting = \"alvida\"
            wapas f(\"ji\")
        }
        likho(call_elsewhere(greeter()))
    "});
    assert_eq!(output, "namaste ji\n");
}

#[test]
fn break_only_exits_the_innermost_loop_and_continue_skips() {
    let output = run_ok(indoc! {"
        maan log = []
        har i mein [1, 2, 3] {
            agar i == 2 { age_badho }
            har j mein [1, 2, 3] {
                agar j == 3 { ruk }
                append(log, i * 10 + j)
            }
        }
        likho(log)
    "});
    assert_eq!(output, "[11, 12, 31, 32]\n");
}

#[test]
fn executing_twice_with_same_input_gives_same_output() {
    let source = "maan x = 2\nlikho(x * 21)";
    assert_eq!(run_ok(source), run_ok(source));
}

#[test]
fn analysis_is_idempotent_across_calls() {
    let tokens = lexer::tokenize("likho(missing)").expect("tokenize failed");
    let program = Parser::new(tokens).parse().expect("parse failed");
    let mut analyzer = SemanticAnalyzer::new();
    assert_eq!(analyzer.analyze(&program), analyzer.analyze(&program));
}

#[test]
fn ir_dump_for_simple_declaration_matches_listing_format() {
    let tokens = lexer::tokenize("maan x = 3 + 4").expect("tokenize failed");
    let program = Parser::new(tokens).parse().expect("parse failed");
    let ir = IrGenerator::new().generate(&program);
    assert_eq!(
        ir.dump(),
        indoc! {"
            t0 = 3
            t1 = 4
            t2 = t0 + t1
            x = t2"
        }
    );
}

#[test]
fn pretty_print_round_trip_is_stable() {
    let source = indoc! {r#"
        maan total = 0
        kaam tally(xs) {
            har x mein xs {
                agar x % 2 == 0 { total = total + x } warna_agar x < 0 { ruk } warna { age_badho }
            }
            wapas total
        }
        class Counter {
            kaam __init__() { yeh.count = 0 }
            kaam bump() { yeh.count = yeh.count + 1 wapas yeh.count }
        }
        maan c = naya Counter()
        c.bump()
        likho(tally([1, 2, 3, 4]), c.count)
    "#};
    let tokens = lexer::tokenize(source).expect("tokenize failed");
    let first = Parser::new(tokens).parse().expect("parse failed");
    let rendered = first.to_string();
    let tokens = lexer::tokenize(&rendered).expect("re-tokenize failed");
    let second = Parser::new(tokens).parse().expect("re-parse failed");
    assert_eq!(rendered, second.to_string());
}
