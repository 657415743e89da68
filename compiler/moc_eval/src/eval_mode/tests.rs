use super::*;

#[test]
fn implicit_reads_variables_silently() {
    assert!(EvalMode::Implicit.reads_variables());
    assert!(!EvalMode::Implicit.reports_unbound());
}

#[test]
fn explicit_reports_unbound() {
    assert!(!EvalMode::Explicit.reads_variables());
    assert!(EvalMode::Explicit.reports_unbound());
    assert_eq!(EvalMode::default(), EvalMode::Explicit);
}

#[test]
fn diag_context_span() {
    assert_eq!(DiagContext::Silent.span(), None);
    assert!(!DiagContext::default().is_reporting());
    let at = DiagContext::Reporting(Span::new(2, 5));
    assert!(at.is_reporting());
    assert_eq!(at.span(), Some(Span::new(2, 5)));
}
