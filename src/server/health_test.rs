//! Tests for health endpoints

use super::*;
use axum::body::to_bytes;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

async fn body_text(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");
    String::from_utf8(bytes.to_vec()).expect("body should be utf-8")
}

#[tokio::test]
async fn test_readiness_reflects_flag_with_200() {
    let registry = CheckRegistry::new();
    let endpoint = HealthEndpoint::new(registry.clone());

    // Not ready is still a 200; the flag is the payload
    let response = endpoint.readiness().await;
    assert_eq!(response, ReadinessResponse { ready: false });
    let response = response.into_response();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, r#"{"ready":false}"#);

    registry.set_ready(true).await;
    let response = endpoint.readiness().await.into_response();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, r#"{"ready":true}"#);
}

#[tokio::test]
async fn test_liveness_without_checkers_is_ok() {
    let endpoint = HealthEndpoint::new(CheckRegistry::new());

    let response = endpoint.liveness().await;
    assert_eq!(response, LivenessResponse::Ok);

    let response = response.into_response();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");
}

#[tokio::test]
async fn test_liveness_reports_failing_checker() {
    // ARRANGE
    let registry = CheckRegistry::new();
    registry
        .add_checker(from_fn("X", || Err(anyhow::anyhow!("connection refused"))))
        .await;
    let endpoint = HealthEndpoint::new(registry);

    // ACT
    let response = endpoint.liveness().await.into_response();

    // ASSERT
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_text(response).await;
    assert!(body.contains('X'), "body should name the checker: {}", body);
    assert!(
        body.contains("connection refused"),
        "body should carry the checker error: {}",
        body
    );
}

#[tokio::test]
async fn test_liveness_fails_fast() {
    // ARRANGE: first checker fails, second would fail too if invoked
    let registry = CheckRegistry::new();
    let second_calls = Arc::new(AtomicUsize::new(0));
    let counter = second_calls.clone();
    registry
        .add_checker(from_fn("first", || Err(anyhow::anyhow!("first down"))))
        .await;
    registry
        .add_checker(from_fn("second", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(anyhow::anyhow!("second down"))
        }))
        .await;
    let endpoint = HealthEndpoint::new(registry);

    // ACT
    let response = endpoint.liveness().await;

    // ASSERT
    assert_eq!(
        response,
        LivenessResponse::Failed("checker first failed: first down".to_string())
    );
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        second_calls.load(Ordering::SeqCst),
        0,
        "second checker must not run"
    );
}

/// End-to-end: both routes over a real listener
#[tokio::test]
async fn test_routes_over_http() {
    // ARRANGE: start on an ephemeral port
    let registry = CheckRegistry::new();
    registry.add_checker(from_fn("simple", || Ok(()))).await;
    let mut server = DebugServer::new(
        "127.0.0.1:0".parse().expect("literal address"),
        Duration::from_secs(5),
        registry.clone(),
    );
    let addr = server.start().await.expect("Failed to start health server");
    let client = reqwest::Client::new();

    // ACT + ASSERT: /ready
    let response = client
        .get(format!("http://{}/ready", addr))
        .timeout(Duration::from_secs(5))
        .send()
        .await
        .expect("Failed to connect to health server");
    assert_eq!(response.status(), 200);
    let body: ReadinessResponse = response.json().await.expect("readiness body is json");
    assert!(body.ready, "server reports ready once listening");

    // ACT + ASSERT: /live passes
    let response = client
        .get(format!("http://{}/live", addr))
        .timeout(Duration::from_secs(5))
        .send()
        .await
        .expect("Failed to connect to health server");
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.expect("live body"), "ok");

    // ACT + ASSERT: /live fails after a broken checker is added
    registry
        .add_checker(from_fn("db", || Err(anyhow::anyhow!("timeout"))))
        .await;
    let response = client
        .get(format!("http://{}/live", addr))
        .timeout(Duration::from_secs(5))
        .send()
        .await
        .expect("Failed to connect to health server");
    assert_eq!(response.status(), 500);
    assert_eq!(
        response.text().await.expect("live body"),
        "checker db failed: timeout"
    );

    // Cleanup
    drop(client);
    server.shutdown().await.expect("Failed to stop health server");
}

/// In-memory log sink for asserting on emitted events
#[derive(Clone, Default)]
struct CapturedLogs(Arc<std::sync::Mutex<Vec<u8>>>);

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0
            .lock()
            .expect("log buffer poisoned")
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl CapturedLogs {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().expect("log buffer poisoned")).into_owned()
    }
}

/// A passing liveness run is visible at the default INFO level
#[tokio::test]
async fn test_liveness_success_logged_at_info() {
    // ARRANGE: subscriber that drops anything below INFO
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let registry = CheckRegistry::new();
    registry.add_checker(from_fn("simple", || Ok(()))).await;
    let endpoint = HealthEndpoint::new(registry);

    // ACT
    let response = endpoint.liveness().await;

    // ASSERT
    assert_eq!(response, LivenessResponse::Ok);
    let output = logs.text();
    assert!(
        output.contains("INFO") && output.contains("Checkers passed"),
        "expected an INFO 'Checkers passed' event, got: {}",
        output
    );
}
