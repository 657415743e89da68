//! Destinations for reported diagnostics.

use parking_lot::Mutex;

use crate::{Diagnostic, DiagnosticQueue};

/// Receives diagnostics the evaluator decided to report.
///
/// Takes `&self` so one sink can be shared by every evaluator of a session.
pub trait DiagnosticSink {
    fn report(&self, diagnostic: Diagnostic);
}

/// Discards everything.
#[derive(Copy, Clone, Debug, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn report(&self, _diagnostic: Diagnostic) {}
}

/// Collects diagnostics into a [`DiagnosticQueue`].
#[derive(Debug, Default)]
pub struct CollectingSink {
    queue: Mutex<DiagnosticQueue>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_queue(queue: DiagnosticQueue) -> Self {
        CollectingSink {
            queue: Mutex::new(queue),
        }
    }

    /// Number of diagnostics collected so far.
    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }

    /// Take all collected diagnostics, sorted by position.
    pub fn take(&self) -> Vec<Diagnostic> {
        self.queue.lock().flush()
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, diagnostic: Diagnostic) {
        self.queue.lock().add(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorCode;
    use moc_ir::Span;

    #[test]
    fn test_collecting_sink_round_trip() {
        let sink = CollectingSink::new();
        assert!(sink.is_empty());
        sink.report(
            Diagnostic::error(ErrorCode::E6006)
                .with_message("sqrt of negative number")
                .with_label(Span::new(0, 4), "here"),
        );
        assert_eq!(sink.len(), 1);
        let taken = sink.take();
        assert_eq!(taken[0].code, ErrorCode::E6006);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_null_sink_is_object_safe() {
        let sink: &dyn DiagnosticSink = &NullSink;
        sink.report(Diagnostic::error(ErrorCode::E9001));
    }
}
