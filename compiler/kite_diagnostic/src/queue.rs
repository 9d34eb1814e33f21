//! Diagnostic queue for collecting, deduplicating, and sorting diagnostics.
//!
//! Features:
//! - Error limit to keep one broken unit from flooding the output
//! - Suppression of exact duplicates (same code, primary span and message)
//! - Stable ordering by primary span
//! - `ErrorGuaranteed` proof that errors were emitted

use std::collections::HashSet;

use kite_ir::Span;

use crate::{Diagnostic, ErrorCode, ErrorGuaranteed};

/// Configuration for diagnostic processing.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DiagnosticConfig {
    /// Maximum number of errors kept (0 = unlimited).
    pub error_limit: usize,
    /// Drop diagnostics identical to one already queued.
    pub deduplicate: bool,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        DiagnosticConfig {
            error_limit: 0,
            deduplicate: true,
        }
    }
}

impl DiagnosticConfig {
    /// Keep at most `limit` errors.
    pub fn with_error_limit(limit: usize) -> Self {
        DiagnosticConfig {
            error_limit: limit,
            ..Self::default()
        }
    }
}

type DedupKey = (ErrorCode, Option<Span>, String);

/// Queue for collecting, deduplicating, and sorting diagnostics.
///
/// ```text
/// let mut queue = DiagnosticQueue::new();
/// let guarantee = queue.emit_error(diagnostic);
/// let sorted = queue.flush();
/// ```
#[derive(Clone, Debug, Default)]
pub struct DiagnosticQueue {
    diagnostics: Vec<Diagnostic>,
    seen: HashSet<DedupKey>,
    error_count: usize,
    config: DiagnosticConfig,
}

impl DiagnosticQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DiagnosticConfig) -> Self {
        DiagnosticQueue {
            config,
            ..Self::default()
        }
    }

    /// Queue a diagnostic. Returns `false` if it was filtered.
    pub fn add(&mut self, diag: Diagnostic) -> bool {
        let is_error = diag.is_error();
        if is_error && self.limit_reached() {
            return false;
        }

        if self.config.deduplicate
            && !self
                .seen
                .insert((diag.code, diag.primary_span(), diag.message.clone()))
        {
            return false;
        }

        if is_error {
            self.error_count += 1;
        }
        self.diagnostics.push(diag);
        true
    }

    /// Queue an error diagnostic and get proof it was emitted.
    ///
    /// The proof holds even when the record itself was filtered as a
    /// duplicate or over the limit: an equivalent error is already queued.
    pub fn emit_error(&mut self, diag: Diagnostic) -> ErrorGuaranteed {
        debug_assert!(diag.is_error(), "emit_error called with {}", diag.severity);
        self.add(diag);
        ErrorGuaranteed::new()
    }

    pub fn limit_reached(&self) -> bool {
        self.config.error_limit > 0 && self.error_count >= self.config.error_limit
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// `Some` if at least one error was queued.
    pub fn has_errors(&self) -> Option<ErrorGuaranteed> {
        ErrorGuaranteed::from_error_count(self.error_count)
    }

    /// Drain the queue, sorted by primary span.
    ///
    /// The sort is stable: diagnostics at the same position keep their
    /// emission order. Spanless diagnostics sort last.
    pub fn flush(&mut self) -> Vec<Diagnostic> {
        let mut result = std::mem::take(&mut self.diagnostics);
        result.sort_by_key(|d| {
            d.primary_span()
                .map_or((u32::MAX, u32::MAX), |s| (s.start, s.end))
        });

        self.seen.clear();
        self.error_count = 0;
        result
    }
}
