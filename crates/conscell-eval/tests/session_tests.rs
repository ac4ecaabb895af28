//! Integration tests for batch sessions: error isolation between top-level
//! expressions, captured output, configuration, and the JSON report.

use conscell_eval::{
    ErrorCategory, ErrorCode, EvalConfig, EvalError, Outcome, Session, Value,
};

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

fn int(n: i64) -> Value {
    Value::int(n)
}

fn sym(name: &str) -> Value {
    Value::symbol(name)
}

fn call(op: &str, args: Vec<Value>) -> Value {
    Value::cons(sym(op), Value::list(args))
}

fn captured() -> Session {
    Session::new(EvalConfig::captured())
}

fn value_text(outcome: &Outcome) -> &str {
    match outcome {
        Outcome::Value { text } => text.as_str(),
        Outcome::Error { message, .. } => panic!("expected value, got error: {message}"),
    }
}

// ─────────────────────────────────────────────────────────────────────
// Single expressions
// ─────────────────────────────────────────────────────────────────────

#[test]
fn session_keeps_bindings_between_calls() {
    let mut session = captured();
    session
        .eval(&call("define", vec![sym("x"), int(5)]))
        .unwrap();
    assert_eq!(session.eval(&sym("x")), Ok(int(5)));
    assert!(session.environment().contains("x"));
}

#[test]
fn session_survives_failed_expression() {
    let mut session = captured();
    assert_eq!(
        session.eval(&sym("nope")),
        Err(EvalError::UnboundSymbol("nope".into()))
    );
    assert_eq!(session.eval(&call("+", vec![int(2), int(2)])), Ok(int(4)));
}

#[test]
fn captured_print_output() {
    let mut session = captured();
    session.eval(&call("print", vec![int(1)])).unwrap();
    session
        .eval(&call(
            "print",
            vec![call("quote", vec![Value::list([int(2), int(3)])])],
        ))
        .unwrap();
    assert_eq!(session.output(), "1\n(2 3)\n");
    assert_eq!(session.take_output(), "1\n(2 3)\n");
    assert_eq!(session.output(), "");
}

#[test]
fn stdout_session_captures_nothing() {
    let session = Session::default();
    assert!(!session.config().capture_output);
    assert_eq!(session.output(), "");
}

// ─────────────────────────────────────────────────────────────────────
// Batches
// ─────────────────────────────────────────────────────────────────────

#[test]
fn batch_isolates_errors() {
    let mut session = captured();
    let report = session.eval_all(&[
        call("define", vec![sym("x"), int(3)]),
        call("/", vec![sym("x"), int(0)]),
        call("*", vec![sym("x"), int(4)]),
        sym("missing"),
        call("print", vec![sym("x")]),
    ]);

    assert_eq!(report.outcomes.len(), 5);
    assert_eq!(report.total_errors, 2);
    assert!(report.has_errors());
    assert!(!report.stopped_early);

    assert_eq!(value_text(&report.outcomes[0]), "()");
    assert_eq!(
        report.outcomes[1],
        Outcome::Error {
            code: ErrorCode::DIVISION_BY_ZERO,
            category: ErrorCategory::Arithmetic,
            message: "division by zero".into(),
        }
    );
    assert_eq!(value_text(&report.outcomes[2]), "12");
    assert!(report.outcomes[3].is_error());
    assert_eq!(value_text(&report.outcomes[4]), "()");
    assert_eq!(session.output(), "3\n");
}

#[test]
fn batch_stops_when_configured() {
    let config = EvalConfig {
        capture_output: true,
        continue_on_error: false,
    };
    let mut session = Session::new(config);
    let report = session.eval_all(&[
        int(1),
        call("car", vec![int(1)]),
        call("print", vec![int(2)]),
    ]);
    assert_eq!(report.outcomes.len(), 2);
    assert_eq!(report.total_errors, 1);
    assert!(report.stopped_early);
    assert_eq!(session.output(), "");
}

#[test]
fn batch_failure_on_last_expression_is_not_early_stop() {
    let config = EvalConfig {
        capture_output: true,
        continue_on_error: false,
    };
    let mut session = Session::new(config);
    let report = session.eval_all(&[int(1), sym("missing")]);
    assert_eq!(report.outcomes.len(), 2);
    assert!(!report.stopped_early);
}

#[test]
fn batch_reports_malformed_result_in_dotted_form() {
    let mut session = captured();
    let dotted = Value::cons(int(1), int(2));
    let report = session.eval_all(&[call("quote", vec![dotted])]);
    assert_eq!(value_text(&report.outcomes[0]), "(1 . 2)");
}

#[test]
fn batch_reals_render_naturally() {
    let mut session = captured();
    let report = session.eval_all(&[
        call("+", vec![int(1), Value::real(2.0)]),
        call("/", vec![int(1), Value::real(4.0)]),
    ]);
    assert_eq!(value_text(&report.outcomes[0]), "3");
    assert_eq!(value_text(&report.outcomes[1]), "0.25");
}

// ─────────────────────────────────────────────────────────────────────
// JSON report
// ─────────────────────────────────────────────────────────────────────

#[test]
fn report_json_shape() {
    let mut session = captured();
    let report = session.eval_all(&[
        call("+", vec![int(1), int(2)]),
        call("define", vec![sym("if"), int(1)]),
    ]);
    let parsed: serde_json::Value = serde_json::from_str(&report.to_json()).unwrap();

    assert_eq!(parsed["total_errors"], 1);
    assert_eq!(parsed["stopped_early"], false);
    assert_eq!(parsed["outcomes"][0]["status"], "value");
    assert_eq!(parsed["outcomes"][0]["text"], "3");
    assert_eq!(parsed["outcomes"][1]["status"], "error");
    assert_eq!(parsed["outcomes"][1]["code"], 501);
    assert_eq!(parsed["outcomes"][1]["category"], "binding");
    assert_eq!(
        parsed["outcomes"][1]["message"],
        "built-in operator `if` cannot be redefined"
    );
}

#[test]
fn config_from_json_drives_session() {
    let config = EvalConfig::from_json(r#"{ "capture_output": true }"#).unwrap();
    let mut session = Session::new(config);
    session.eval(&call("print", vec![int(7)])).unwrap();
    assert_eq!(session.output(), "7\n");
}
