//! Tests for utility functions

use prometheus_preload::core::is_safe_url;
use prometheus_preload::util::{init_tracing, DEFAULT_FILTER};

#[test]
fn test_init_tracing_is_idempotent() {
    init_tracing();
    init_tracing();
    assert!(DEFAULT_FILTER.starts_with("prometheus_preload"));
}

#[test]
fn test_safe_url_reexport() {
    assert!(is_safe_url("https://example.com/a.jpg"));
    assert!(!is_safe_url("javascript:x()"));
}
