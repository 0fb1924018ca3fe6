//! Tests for tokio spawner utilities and the request API

use prometheus_preload::core::{Spawn, Strategy};
use prometheus_preload::runtime::tokio_spawner::TokioSpawner;
use prometheus_preload::runtime::PreloadRequest;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_tokio_spawner_spawn() {
    let spawner = TokioSpawner::new(tokio::runtime::Handle::current());

    let (tx, rx) = tokio::sync::oneshot::channel();
    spawner.spawn(async move {
        tx.send(123).unwrap();
    });

    let result = rx.await.expect("oneshot result");
    assert_eq!(result, 123);
}

#[tokio::test]
async fn test_tokio_spawner_current() {
    assert!(TokioSpawner::current().is_ok());
}

#[test]
fn test_tokio_spawner_current_outside_runtime() {
    assert!(TokioSpawner::current().is_err());
}

#[test]
fn test_request_defaults() {
    let req = PreloadRequest::from_json_str(r#"{"resources": ["a.jpg"]}"#).unwrap();
    assert_eq!(req.strategy, Strategy::Immediate);
    assert_eq!(req.batch_size, None);
    assert_eq!(req.timeout_ms, None);

    let req = PreloadRequest::from_json_str(r#"{"resources": [], "strategy": "idle"}"#).unwrap();
    assert_eq!(req.strategy, Strategy::Idle);
}
