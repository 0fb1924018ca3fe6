//! Tests for error types

use prometheus_preload::core::{ConfigError, PreloadError, ResourceCategory};

#[test]
fn test_load_error() {
    let err = PreloadError::load("a.jpg", ResourceCategory::Image, "error event");
    assert_eq!(
        format!("{}", err),
        "failed to load image resource a.jpg: error event"
    );
    assert_eq!(err.url(), "a.jpg");
    assert!(!err.is_timeout());
}

#[test]
fn test_timeout_error() {
    let err = PreloadError::Timeout {
        url: "b.mp3".to_string(),
        timeout_ms: 15000,
    };
    assert_eq!(format!("{}", err), "timed out after 15000ms loading b.mp3");
    assert!(err.is_timeout());
}

#[test]
fn test_panicked_error() {
    let err = PreloadError::Panicked {
        url: "c.xyz".to_string(),
        message: "boom".to_string(),
    };
    assert_eq!(format!("{}", err), "fetcher panicked loading c.xyz: boom");
}

#[test]
fn test_config_error() {
    let err = ConfigError::Invalid {
        field: "max_concurrency",
        reason: "must be between 1 and 2".to_string(),
    };
    assert_eq!(
        format!("{}", err),
        "invalid value for `max_concurrency`: must be between 1 and 2"
    );
}
