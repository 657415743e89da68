use super::*;

// Kind → message

#[test]
fn not_constant_has_correct_kind() {
    let err = not_constant();
    assert!(err.is_not_constant());
    assert_eq!(err.message, "expression is not constant");
    assert!(!err.reported);
}

#[test]
fn division_by_zero_carries_operands() {
    let err = division_by_zero("a", "0");
    assert_eq!(
        err.kind,
        EvalErrorKind::DivisionByZero {
            numerator: "a".to_string(),
            denominator: "0".to_string(),
        }
    );
    assert_eq!(err.to_string(), "division by zero in `a / 0`");
}

#[test]
fn modulo_by_zero_message() {
    assert_eq!(
        modulo_by_zero("7", "0").message,
        "modulo by zero in `mod(7, 0)`"
    );
}

#[test]
fn integer_overflow_has_correct_kind() {
    let err = integer_overflow("multiplication");
    assert_eq!(
        err.kind,
        EvalErrorKind::IntegerOverflow {
            operation: "multiplication".to_string()
        }
    );
    assert_eq!(err.message, "integer overflow in multiplication");
}

#[test]
fn index_out_of_bounds_message() {
    assert_eq!(
        index_out_of_bounds(5, 3).message,
        "index 5 out of bounds for dimension of size 3"
    );
}

// Classification

#[test]
fn only_recursion_limit_is_fatal() {
    assert!(recursion_limit_exceeded(4).is_fatal());
    assert!(!division_by_zero("1", "0").is_fatal());
    assert!(!internal_error("x").is_fatal());
    assert!(!not_constant().is_fatal());
}

#[test]
fn silent_kinds_are_not_reportable() {
    assert!(!not_constant().kind.is_reportable());
    assert!(!index_out_of_bounds(0, 2).kind.is_reportable());
    assert!(unbound_value("x").kind.is_reportable());
    assert!(internal_error("x").kind.always_reported());
    assert!(!unbound_value("x").kind.always_reported());
}

#[test]
fn precedence_prefers_specific_failures() {
    let nc = not_constant().kind.precedence();
    let unbound = unbound_value("x").kind.precedence();
    let div = division_by_zero("1", "0").kind.precedence();
    let internal = internal_error("x").kind.precedence();
    let limit = recursion_limit_exceeded(1).kind.precedence();
    assert!(nc < unbound && unbound < div && div < internal && internal < limit);
}

// Builders

#[test]
fn builders_attach_context() {
    let err = invalid_argument("log", "argument must be positive")
        .with_span(Span::new(3, 8))
        .with_note("log(0.0)")
        .mark_reported();
    assert_eq!(err.span, Some(Span::new(3, 8)));
    assert_eq!(err.notes, vec!["log(0.0)".to_string()]);
    assert!(err.reported);
    assert_eq!(
        err.message,
        "invalid argument to `log`: argument must be positive"
    );
}
