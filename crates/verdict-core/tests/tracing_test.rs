//! Tests for tracing initialization.

use std::sync::Mutex;

use verdict_core::tracing::init_tracing;

/// Serializes tests that touch `VERDICT_LOG`.
static TRACING_MUTEX: Mutex<()> = Mutex::new(());

#[test]
fn test_verdict_log_filter_accepted() {
    let _lock = TRACING_MUTEX.lock().unwrap();
    std::env::set_var("VERDICT_LOG", "verdict_analysis::engine=debug,verdict_core=warn");
    init_tracing();
    std::env::remove_var("VERDICT_LOG");
}

#[test]
fn test_init_tracing_idempotent() {
    let _lock = TRACING_MUTEX.lock().unwrap();
    init_tracing();
    init_tracing();
}

#[test]
fn test_invalid_filter_falls_back() {
    let _lock = TRACING_MUTEX.lock().unwrap();
    std::env::set_var("VERDICT_LOG", "[[not a filter");
    init_tracing();
    std::env::remove_var("VERDICT_LOG");
}
