//! Diagnostic queue for collecting and deduplicating diagnostics.
//!
//! Features:
//! - Error limits to keep a badly broken module from flooding the build log
//! - Deduplication of identical diagnostics (same code, message, location)
//! - `ErrorGuaranteed` proof that errors were emitted
//!
//! Diagnostics keep emission order; the weave visits types and commands
//! deterministically, so the order is already meaningful.

use rustc_hash::FxHashSet;

use crate::{Diagnostic, ErrorGuaranteed, Severity};

/// Configuration for diagnostic processing.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DiagnosticConfig {
    /// Maximum number of errors kept (0 = unlimited).
    pub error_limit: usize,
    /// Drop a diagnostic identical to one already queued.
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
    /// No limits and no deduplication (for testing).
    pub fn unlimited() -> Self {
        DiagnosticConfig {
            error_limit: 0,
            deduplicate: false,
        }
    }
}

/// Queue for collecting diagnostics during one weave.
///
/// ```text
/// let mut queue = DiagnosticQueue::new();
/// queue.add(Diagnostic::warning(ErrorCode::E1001).with_message("..."));
/// let guarantee = queue.emit_error(Diagnostic::error(ErrorCode::E4001));
/// let diagnostics = queue.flush();
/// ```
#[derive(Clone, Debug, Default)]
pub struct DiagnosticQueue {
    diagnostics: Vec<Diagnostic>,
    seen: FxHashSet<Diagnostic>,
    error_count: usize,
    warning_count: usize,
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

    /// Queue a diagnostic and mirror it to the tracing log.
    ///
    /// Returns `true` if the diagnostic was added, `false` if it was
    /// filtered as a duplicate or by the error limit.
    pub fn add(&mut self, diag: Diagnostic) -> bool {
        let is_error = diag.is_error();
        if is_error && self.config.error_limit > 0 && self.error_count >= self.config.error_limit {
            return false;
        }
        if self.config.deduplicate && !self.seen.insert(diag.clone()) {
            return false;
        }

        match diag.severity {
            Severity::Error => {
                tracing::error!(code = %diag.code, location = ?diag.location, "{}", diag.message);
                self.error_count += 1;
            }
            Severity::Warning => {
                tracing::warn!(code = %diag.code, location = ?diag.location, "{}", diag.message);
                self.warning_count += 1;
            }
            Severity::Note => {
                tracing::info!(code = %diag.code, location = ?diag.location, "{}", diag.message);
            }
        }
        self.diagnostics.push(diag);
        true
    }

    /// Queue an error diagnostic and return proof that it was reported.
    ///
    /// Duplicates are still filtered, but the guarantee holds either way:
    /// an identical error is already in the queue.
    pub fn emit_error(&mut self, diag: Diagnostic) -> ErrorGuaranteed {
        debug_assert!(diag.is_error(), "emit_error called with {}", diag.severity);
        let diag = Diagnostic {
            severity: Severity::Error,
            ..diag
        };
        self.add(diag);
        ErrorGuaranteed::new()
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Queued diagnostics, in emission order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Take every queued diagnostic and reset the queue.
    pub fn flush(&mut self) -> Vec<Diagnostic> {
        self.seen.clear();
        self.error_count = 0;
        self.warning_count = 0;
        std::mem::take(&mut self.diagnostics)
    }
}

#[cfg(test)]
mod tests;
