//! Tests for configuration validation

use prometheus_preload::config::{IdleConfig, PreloadConfig};
use prometheus_preload::core::CancelMode;

#[test]
fn test_default_config_is_valid() {
    let cfg = PreloadConfig::default();
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.default_timeout_ms, 15000);
    assert_eq!(cfg.max_concurrency, 2);
    assert_eq!(cfg.idle.min_time_remaining_ms, 12);
    assert_eq!(cfg.idle.estimated_process_time_ms, 3);
    assert_eq!(cfg.idle.max_batch_size, 2);
    assert_eq!(cfg.idle.hidden_backoff_ms, 1000);
}

#[test]
fn test_invalid_timeout() {
    let cfg = PreloadConfig {
        default_timeout_ms: 0,
        ..PreloadConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn test_invalid_concurrency() {
    for max_concurrency in [0, 3] {
        let cfg = PreloadConfig {
            max_concurrency,
            ..PreloadConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}

#[test]
fn test_invalid_idle_values() {
    let cfg = PreloadConfig {
        idle: IdleConfig {
            estimated_process_time_ms: 0,
            ..IdleConfig::default()
        },
        ..PreloadConfig::default()
    };
    assert!(cfg.validate().is_err());

    let cfg = PreloadConfig {
        idle: IdleConfig {
            max_batch_size: 0,
            ..IdleConfig::default()
        },
        ..PreloadConfig::default()
    };
    assert!(cfg.validate().is_err());

    let cfg = PreloadConfig {
        idle: IdleConfig {
            max_batch_size: 3,
            ..IdleConfig::default()
        },
        ..PreloadConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn test_oversized_idle_batch_rejected_from_json() {
    let err = PreloadConfig::from_json_str(r#"{"idle": {"max_batch_size": 10}}"#).unwrap_err();
    assert!(err.to_string().contains("max_batch_size"));
}

#[test]
fn test_starved_fallback_is_allowed() {
    let cfg = PreloadConfig {
        idle: IdleConfig {
            fallback_time_remaining_ms: 5,
            ..IdleConfig::default()
        },
        ..PreloadConfig::default()
    };
    assert!(cfg.validate().is_ok());
}

#[test]
fn test_config_from_json() {
    let json = r#"{
        "default_timeout_ms": 8000,
        "cancel_mode": "plain",
        "idle": {
            "hidden_backoff_ms": 2000
        }
    }"#;

    let cfg = PreloadConfig::from_json_str(json).unwrap();
    assert_eq!(cfg.default_timeout_ms, 8000);
    assert_eq!(cfg.cancel_mode, CancelMode::Plain);
    assert_eq!(cfg.idle.hidden_backoff_ms, 2000);
    assert_eq!(cfg.idle.min_time_remaining_ms, 12);
    assert_eq!(cfg.max_concurrency, 2);
}

#[test]
fn test_config_from_json_rejects_invalid() {
    assert!(PreloadConfig::from_json_str(r#"{"max_concurrency": 5}"#).is_err());
    assert!(PreloadConfig::from_json_str("not json").is_err());
}

#[test]
fn test_config_from_env() {
    std::env::set_var("PRELOAD_DEFAULT_TIMEOUT_MS", "9000");
    std::env::set_var("PRELOAD_CANCEL_MODE", "plain");
    let cfg = PreloadConfig::from_env().unwrap();
    std::env::remove_var("PRELOAD_DEFAULT_TIMEOUT_MS");
    std::env::remove_var("PRELOAD_CANCEL_MODE");

    assert_eq!(cfg.default_timeout_ms, 9000);
    assert_eq!(cfg.cancel_mode, CancelMode::Plain);
}
