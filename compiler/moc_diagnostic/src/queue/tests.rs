use pretty_assertions::assert_eq;

use super::*;
use crate::ErrorCode;

fn div_zero(start: u32) -> Diagnostic {
    Diagnostic::error(ErrorCode::E6003)
        .with_message("division by zero")
        .with_label(Span::new(start, start + 1), "here")
}

#[test]
fn test_deduplicates_identical_diagnostics() {
    let mut queue = DiagnosticQueue::new();
    assert!(queue.add(div_zero(3)));
    assert!(!queue.add(div_zero(3)));
    assert!(queue.add(div_zero(7)));
    assert_eq!(queue.len(), 2);
    assert_eq!(queue.error_count(), 2);
}

#[test]
fn test_error_limit() {
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig {
        error_limit: 2,
        deduplicate: false,
    });
    assert!(queue.add(div_zero(1)));
    assert!(queue.add(div_zero(1)));
    assert!(!queue.add(div_zero(2)));
    // Warnings do not count toward the limit.
    assert!(queue.add(Diagnostic::warning(ErrorCode::E6013).with_message("not constant")));
    assert_eq!(queue.len(), 3);
}

#[test]
fn test_flush_sorts_by_position() {
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig::unlimited());
    queue.add(div_zero(20));
    queue.add(div_zero(5));
    queue.add(div_zero(12));

    let flushed = queue.flush();
    let starts: Vec<u32> = flushed
        .iter()
        .filter_map(Diagnostic::primary_span)
        .map(|s| s.start)
        .collect();
    assert_eq!(starts, vec![5, 12, 20]);
    assert!(queue.is_empty());
    assert!(!queue.has_errors());
}
