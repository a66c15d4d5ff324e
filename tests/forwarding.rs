//! Executor behavior against live local upstreams.

mod common;

use std::time::{Duration, Instant};

use serde_json::{json, Value};

use request_relay::config::{ClientConfig, TimeoutConfig};
use request_relay::descriptor::{RequestBody, RequestDescriptor};
use request_relay::forward::Executor;
use request_relay::outcome::{CompletedExchange, ErrorCode, ExecutionError, ExecutionResult};

fn executor() -> Executor {
    Executor::new(&ClientConfig::default(), &TimeoutConfig::default()).unwrap()
}

fn completed(result: ExecutionResult) -> CompletedExchange {
    match result {
        ExecutionResult::Completed(exchange) => exchange,
        ExecutionResult::Failed(error) => panic!("expected a completed exchange, got {error:?}"),
    }
}

fn failed(result: ExecutionResult) -> ExecutionError {
    match result {
        ExecutionResult::Failed(error) => error,
        ExecutionResult::Completed(exchange) => panic!("expected a failure, got {exchange:?}"),
    }
}

#[tokio::test]
async fn test_json_round_trip_through_echo() {
    let addr = common::start_upstream().await;
    let descriptor = RequestDescriptor::builder("POST", format!("http://{addr}/echo?x=1"))
        .header("X-Test", "yes")
        .body(RequestBody::Json(json!({ "a": 1 })))
        .build()
        .unwrap();

    let exchange = completed(executor().execute(&descriptor).await);

    assert_eq!(exchange.status, 200);
    assert_eq!(exchange.status_text, "OK");
    assert!(exchange.headers["content-type"].starts_with("application/json"));
    assert_eq!(exchange.data["method"], "POST");
    assert_eq!(exchange.data["query"], "x=1");
    assert_eq!(exchange.data["body"], r#"{"a":1}"#);
    assert_eq!(exchange.data["headers"]["x-test"], "yes");
    assert_eq!(exchange.data["headers"]["content-type"], "application/json");
    assert_eq!(exchange.data["headers"]["user-agent"], "Postman-Lite/1.0");
    assert_eq!(
        exchange.data["headers"]["accept"],
        "application/json, text/plain, */*"
    );
}

#[tokio::test]
async fn test_caller_headers_override_defaults() {
    let addr = common::start_upstream().await;
    let descriptor = RequestDescriptor::builder("PUT", format!("http://{addr}/echo"))
        .header("user-agent", "custom/2.0")
        .header("Accept", "text/xml")
        .header("Content-Type", "application/vnd.api+json")
        .body(RequestBody::Json(json!([1, 2])))
        .build()
        .unwrap();

    let exchange = completed(executor().execute(&descriptor).await);
    let headers = &exchange.data["headers"];
    assert_eq!(headers["user-agent"], "custom/2.0");
    assert_eq!(headers["accept"], "text/xml");
    assert_eq!(headers["content-type"], "application/vnd.api+json");
}

#[tokio::test]
async fn test_body_dropped_for_get() {
    let addr = common::start_upstream().await;
    let descriptor = RequestDescriptor::builder("GET", format!("http://{addr}/echo"))
        .body(RequestBody::Text("ignored".into()))
        .build()
        .unwrap();

    let exchange = completed(executor().execute(&descriptor).await);
    assert_eq!(exchange.data["method"], "GET");
    assert_eq!(exchange.data["body"], "");
    assert!(exchange.data["headers"].get("content-type").is_none());
}

#[tokio::test]
async fn test_text_body_sent_verbatim() {
    let addr = common::start_upstream().await;
    let descriptor = RequestDescriptor::builder("patch", format!("http://{addr}/echo"))
        .body(RequestBody::Text("plain words".into()))
        .build()
        .unwrap();

    let exchange = completed(executor().execute(&descriptor).await);
    assert_eq!(exchange.data["method"], "PATCH");
    assert_eq!(exchange.data["body"], "plain words");
}

#[tokio::test]
async fn test_error_statuses_are_completions() {
    let addr = common::start_upstream().await;
    let executor = executor();

    for (code, reason) in [(404, "Not Found"), (500, "Internal Server Error"), (503, "Service Unavailable")] {
        let descriptor = RequestDescriptor::builder("GET", format!("http://{addr}/status/{code}"))
            .build()
            .unwrap();
        let exchange = completed(executor.execute(&descriptor).await);
        assert_eq!(exchange.status, code);
        assert_eq!(exchange.status_text, reason);
        assert_eq!(exchange.data, json!({ "status": code }));
    }
}

#[tokio::test]
async fn test_text_response_stays_text() {
    let addr = common::start_upstream().await;
    let descriptor = RequestDescriptor::builder("GET", format!("http://{addr}/text"))
        .build()
        .unwrap();

    let exchange = completed(executor().execute(&descriptor).await);
    assert_eq!(exchange.data, Value::String("hello".into()));
}

#[tokio::test]
async fn test_malformed_json_falls_back_to_text() {
    let addr = common::start_upstream().await;
    let descriptor = RequestDescriptor::builder("GET", format!("http://{addr}/broken-json"))
        .build()
        .unwrap();

    let exchange = completed(executor().execute(&descriptor).await);
    assert_eq!(exchange.status, 200);
    assert_eq!(exchange.data, Value::String("{not json".into()));
}

#[tokio::test]
async fn test_missing_content_type_is_text() {
    let addr = common::start_raw_backend(common::raw_response("200 OK", &[], r#"{"looks":"json"}"#)).await;
    let descriptor = RequestDescriptor::builder("GET", format!("http://{addr}/"))
        .build()
        .unwrap();

    let exchange = completed(executor().execute(&descriptor).await);
    assert_eq!(exchange.data, Value::String(r#"{"looks":"json"}"#.into()));
    assert!(!exchange.headers.contains_key("content-type"));
}

#[tokio::test]
async fn test_repeated_headers_are_joined() {
    let raw = common::raw_response(
        "200 OK",
        &[("X-Multi", "a"), ("X-Multi", "b"), ("Content-Type", "application/problem+json")],
        r#"{"ok":true}"#,
    );
    let addr = common::start_raw_backend(raw).await;
    let descriptor = RequestDescriptor::builder("GET", format!("http://{addr}/"))
        .build()
        .unwrap();

    let exchange = completed(executor().execute(&descriptor).await);
    assert_eq!(exchange.headers["x-multi"], "a, b");
    assert_eq!(exchange.data, json!({ "ok": true }));
}

#[tokio::test]
async fn test_redirects_are_followed() {
    let addr = common::start_upstream().await;
    let descriptor = RequestDescriptor::builder("GET", format!("http://{addr}/redirect"))
        .build()
        .unwrap();

    let exchange = completed(executor().execute(&descriptor).await);
    assert_eq!(exchange.status, 200);
    assert_eq!(exchange.data["path"], "/echo");
}

#[tokio::test]
async fn test_redirects_disabled() {
    let addr = common::start_upstream().await;
    let config = ClientConfig {
        max_redirects: 0,
        ..ClientConfig::default()
    };
    let executor = Executor::new(&config, &TimeoutConfig::default()).unwrap();
    let descriptor = RequestDescriptor::builder("GET", format!("http://{addr}/redirect"))
        .build()
        .unwrap();

    let exchange = completed(executor.execute(&descriptor).await);
    assert!((300..400).contains(&exchange.status));
    assert_eq!(exchange.headers["location"], "/echo");
}

#[tokio::test]
async fn test_timeout_honors_descriptor_deadline() {
    let addr = common::start_upstream().await;
    let descriptor = RequestDescriptor::builder("GET", format!("http://{addr}/slow/3000"))
        .timeout_ms(200)
        .build()
        .unwrap();

    let start = Instant::now();
    let error = failed(executor().execute(&descriptor).await);
    let elapsed = start.elapsed();

    assert_eq!(error.code, ErrorCode::Timeout);
    assert_eq!(error.error, "Request timeout");
    assert!(elapsed >= Duration::from_millis(190), "returned after {elapsed:?}");
    assert!(elapsed < Duration::from_millis(1500), "returned after {elapsed:?}");
}

#[tokio::test]
async fn test_executor_max_caps_descriptor_timeout() {
    let addr = common::start_upstream().await;
    let timeouts = TimeoutConfig {
        default_ms: 100,
        max_ms: 150,
    };
    let executor = Executor::new(&ClientConfig::default(), &timeouts).unwrap();
    let descriptor = RequestDescriptor::builder("GET", format!("http://{addr}/slow/3000"))
        .timeout_ms(10_000)
        .build()
        .unwrap();

    let start = Instant::now();
    let error = failed(executor.execute(&descriptor).await);
    assert_eq!(error.code, ErrorCode::Timeout);
    assert!(start.elapsed() < Duration::from_millis(1500));
}

#[tokio::test]
async fn test_connection_refused() {
    let addr = common::unused_addr().await;
    let descriptor = RequestDescriptor::builder("GET", format!("http://{addr}/"))
        .build()
        .unwrap();

    let error = failed(executor().execute(&descriptor).await);
    assert_eq!(error.code, ErrorCode::ConnectionRefused);
    assert_eq!(error.error, "Connection refused");
    assert!(!error.message.is_empty());
}

#[tokio::test]
async fn test_unresolvable_host() {
    let descriptor = RequestDescriptor::builder("GET", "http://relay-test-host.invalid/")
        .timeout_ms(5_000)
        .build()
        .unwrap();

    let error = failed(executor().execute(&descriptor).await);
    assert!(
        matches!(error.code, ErrorCode::HostNotFound | ErrorCode::ConnectionRefused),
        "unexpected code {:?}: {}",
        error.code,
        error.message
    );
}

#[tokio::test]
async fn test_failure_serializes_without_status() {
    let addr = common::unused_addr().await;
    let descriptor = RequestDescriptor::builder("GET", format!("http://{addr}/"))
        .build()
        .unwrap();

    let value = serde_json::to_value(executor().execute(&descriptor).await).unwrap();
    assert_eq!(value["code"], "CONNECTION_REFUSED");
    assert!(value.get("status").is_none());
    assert!(value.get("data").is_none());
}
