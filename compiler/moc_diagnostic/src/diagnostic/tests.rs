use pretty_assertions::assert_eq;

use super::*;

#[test]
fn test_builder_collects_parts() {
    let diag = Diagnostic::error(ErrorCode::E6003)
        .with_message("division by zero in `1 / x`")
        .with_label(Span::new(4, 9), "divisor evaluates to zero")
        .with_note("denominator: x")
        .with_suggestion("guard the division");

    assert!(diag.is_error());
    assert_eq!(diag.primary_span(), Some(Span::new(4, 9)));
    assert_eq!(diag.notes, vec!["denominator: x".to_string()]);
    assert_eq!(diag.suggestions.len(), 1);
}

#[test]
fn test_primary_span_skips_secondary_labels() {
    let diag = Diagnostic::warning(ErrorCode::E6001)
        .with_secondary_label(Span::new(0, 1), "declared here")
        .with_label(Span::new(5, 6), "used here");
    assert!(!diag.is_error());
    assert_eq!(diag.primary_span(), Some(Span::new(5, 6)));
}

#[test]
fn test_display_format() {
    let diag = Diagnostic::error(ErrorCode::E6005)
        .with_message("recursion limit of 8 exceeded")
        .with_label(Span::new(1, 3), "while evaluating this expression")
        .with_note("the binding may refer to itself");

    assert_eq!(
        diag.to_string(),
        "error [E6005]: recursion limit of 8 exceeded\n  \
         --> 1..3: while evaluating this expression\n  \
         = note: the binding may refer to itself"
    );
}
