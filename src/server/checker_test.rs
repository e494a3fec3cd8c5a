//! Tests for the built-in checkers

use super::*;
use std::time::Duration;
use tokio::net::TcpListener;

#[tokio::test]
async fn test_fn_checker_passes_through_result() {
    let ok = from_fn("ok", || Ok(()));
    let failing = from_fn("failing", || Err(anyhow::anyhow!("disk full")));

    assert_eq!(ok.name(), "ok");
    assert!(ok.check().await.is_ok());

    let err = failing.check().await.expect_err("closure error should surface");
    assert_eq!(err.to_string(), "disk full");
}

/// Checkers are idempotent: running one repeatedly gives the same answer
#[tokio::test]
async fn test_fn_checker_is_repeatable() {
    let checker = from_fn("simple", || Ok(()));

    for _ in 0..3 {
        assert!(checker.check().await.is_ok());
    }
}

#[tokio::test]
async fn test_tcp_checker_passes_when_dependency_listens() {
    // ARRANGE: a local listener standing in for a dependency
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("listener address");

    let checker = TcpChecker::new("upstream", addr).with_timeout(Duration::from_secs(2));

    // ACT + ASSERT
    assert_eq!(checker.name(), "upstream");
    assert!(checker.check().await.is_ok());
}

#[tokio::test]
async fn test_tcp_checker_fails_when_dependency_is_down() {
    // ARRANGE: grab a free port, then close it
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("listener address");
    drop(listener);

    let checker = TcpChecker::new("upstream", addr).with_timeout(Duration::from_secs(2));

    // ACT
    let err = checker
        .check()
        .await
        .expect_err("closed port should fail the check");

    // ASSERT
    assert!(
        err.to_string().contains(&addr.to_string()),
        "error should name the address, got: {}",
        err
    );
}
