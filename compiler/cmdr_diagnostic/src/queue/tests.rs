use pretty_assertions::assert_eq;

use super::*;
use crate::ErrorCode;

fn warning(msg: &str) -> Diagnostic {
    Diagnostic::warning(ErrorCode::E1001).with_message(msg)
}

fn error(msg: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E4001).with_message(msg)
}

#[test]
fn counts_by_severity() {
    let mut queue = DiagnosticQueue::new();
    assert!(queue.add(warning("a")));
    assert!(queue.add(error("b")));
    assert!(queue.add(warning("c")));

    assert_eq!(queue.len(), 3);
    assert_eq!(queue.warning_count(), 2);
    assert_eq!(queue.error_count(), 1);
    assert!(queue.has_errors());
}

#[test]
fn warnings_alone_are_not_errors() {
    let mut queue = DiagnosticQueue::new();
    queue.add(warning("a"));
    assert!(!queue.has_errors());
}

#[test]
fn deduplicates_identical_diagnostics() {
    let mut queue = DiagnosticQueue::new();
    assert!(queue.add(warning("same")));
    assert!(!queue.add(warning("same")));
    assert!(queue.add(warning("same").at("elsewhere")));
    assert_eq!(queue.len(), 2);
}

#[test]
fn unlimited_keeps_duplicates() {
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig::unlimited());
    queue.add(warning("same"));
    queue.add(warning("same"));
    assert_eq!(queue.len(), 2);
}

#[test]
fn error_limit_drops_excess_errors_but_not_warnings() {
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig {
        error_limit: 1,
        deduplicate: false,
    });
    assert!(queue.add(error("first")));
    assert!(!queue.add(error("second")));
    assert!(queue.add(warning("still kept")));
    assert_eq!(queue.error_count(), 1);
    assert_eq!(queue.len(), 2);
}

#[test]
fn emit_error_returns_guarantee() {
    let mut queue = DiagnosticQueue::new();
    let _guarantee: ErrorGuaranteed = queue.emit_error(error("boom"));
    assert_eq!(queue.error_count(), 1);
}

#[test]
fn flush_preserves_order_and_resets() {
    let mut queue = DiagnosticQueue::new();
    queue.add(warning("one"));
    queue.add(error("two"));
    let drained = queue.flush();

    let messages: Vec<&str> = drained.iter().map(|d| d.message.as_str()).collect();
    assert_eq!(messages, vec!["one", "two"]);
    assert!(queue.is_empty());
    assert!(!queue.has_errors());

    // Dedup state is reset too.
    assert!(queue.add(warning("one")));
}
