//! End-to-end tests for the logging interceptor.

use bytes::Bytes;
use http::{Request, Response};
use reqtap::{
    transport_fn, EntryShape, LogLevel, LogMode, LoggingTransport, MemorySink,
    RequestLoggingOptions, RequestLoggingOptionsBuilder, Transport, NOT_LOGGED,
};
use serde_json::{json, Value};
use std::sync::Arc;

fn builder(sink: Arc<MemorySink>) -> RequestLoggingOptionsBuilder {
    RequestLoggingOptions::builder().sink(sink)
}

fn ok_transport(
    status: u16,
    body: &'static str,
) -> impl Transport {
    transport_fn(move |_request| async move {
        Ok(Response::builder()
            .status(status)
            .header("etag", "*")
            .body(Bytes::from(body))
            .expect("valid response"))
    })
}

fn post_request() -> Request<Bytes> {
    Request::builder()
        .method("POST")
        .uri("https://example.com/path?query=1")
        .header("referer", "https://example.com/referrer")
        .body(Bytes::from("this is the request body"))
        .expect("valid request")
}

#[tokio::test]
async fn logs_one_entry_with_full_request_and_response_detail() {
    let sink = Arc::new(MemorySink::new());
    let options = builder(Arc::clone(&sink))
        .response_body_log_mode(LogMode::All)
        .build()
        .expect("options build");
    let client = LoggingTransport::new(options, ok_transport(200, "this is the response body"));

    let response = client.send(post_request()).await.expect("succeeds");
    assert_eq!(response.status(), 200);
    assert_eq!(response.body(), &Bytes::from("this is the response body"));

    let entries = sink.entries();
    assert_eq!(entries.len(), 1);

    let entry = &entries[0];
    assert_eq!(entry.level, LogLevel::Info);
    assert!(entry.error.is_none());
    assert_eq!(
        entry.message_template,
        "HTTP {RequestMethod} {RequestUri} responded {StatusCode} in {ElapsedMilliseconds} ms"
    );

    assert_eq!(entry.property("RequestMethod"), Some(&json!("POST")));
    assert_eq!(entry.property("RequestScheme"), Some(&json!("https")));
    assert_eq!(entry.property("RequestHost"), Some(&json!("example.com")));
    assert_eq!(entry.property("RequestPath"), Some(&json!("/path")));
    assert_eq!(entry.property("RequestQueryString"), Some(&json!("?query=1")));
    assert_eq!(entry.property("RequestQuery"), Some(&json!({"query": "1"})));
    assert_eq!(
        entry.property("RequestBodyString"),
        Some(&json!("this is the request body"))
    );
    assert_eq!(entry.property("RequestBody"), Some(&Value::Null));
    assert_eq!(
        entry.property("RequestHeaders"),
        Some(&json!({"referer": "https://example.com/referrer"}))
    );

    assert_eq!(entry.property("StatusCode"), Some(&json!(200)));
    assert_eq!(entry.property("IsSucceed"), Some(&json!(true)));
    assert_eq!(
        entry.property("ResponseBodyString"),
        Some(&json!("this is the response body"))
    );
    assert_eq!(entry.property("ResponseBody"), Some(&Value::Null));
    assert_eq!(entry.property("ResponseHeaders"), Some(&json!({"etag": "*"})));

    let elapsed = entry
        .property("ElapsedMilliseconds")
        .and_then(Value::as_f64)
        .expect("elapsed is numeric");
    assert!(elapsed >= 0.0);

    assert!(entry.message.starts_with("HTTP POST https://example.com/path?query=1 responded 200 in "));
}

#[tokio::test]
async fn response_body_defaults_to_failures_only() {
    let sink = Arc::new(MemorySink::new());
    let options = builder(Arc::clone(&sink)).build().expect("options build");
    let client = LoggingTransport::new(options, ok_transport(200, "hidden on success"));

    client.send(post_request()).await.expect("succeeds");

    let entries = sink.entries();
    assert_eq!(
        entries[0].property("ResponseBodyString"),
        Some(&json!(NOT_LOGGED))
    );
    // The request body axis defaults to LogMode::All and stays captured.
    assert_eq!(
        entries[0].property("RequestBodyString"),
        Some(&json!("this is the request body"))
    );
}

#[tokio::test]
async fn failed_status_captures_response_body_and_warns() {
    let sink = Arc::new(MemorySink::new());
    let options = builder(Arc::clone(&sink)).build().expect("options build");
    let client = LoggingTransport::new(options, ok_transport(404, "not here"));

    client.send(post_request()).await.expect("status is not an error");

    let entries = sink.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].level, LogLevel::Warn);
    assert_eq!(entries[0].property("IsSucceed"), Some(&json!(false)));
    assert_eq!(entries[0].property("ResponseBodyString"), Some(&json!("not here")));
}

#[tokio::test]
async fn server_error_logs_at_error_level() {
    let sink = Arc::new(MemorySink::new());
    let options = builder(Arc::clone(&sink)).build().expect("options build");
    let client = LoggingTransport::new(options, ok_transport(503, "unavailable"));

    client.send(post_request()).await.expect("status is not an error");
    assert_eq!(sink.entries()[0].level, LogLevel::Error);
}

#[tokio::test]
async fn transport_error_is_logged_and_reraised() {
    let sink = Arc::new(MemorySink::new());
    let options = builder(Arc::clone(&sink)).build().expect("options build");
    let client = LoggingTransport::new(
        options,
        transport_fn(|_request| async { Err::<Response<Bytes>, _>("deadline exceeded".into()) }),
    );

    let error = client.send(post_request()).await.expect_err("fails");
    assert_eq!(error.to_string(), "deadline exceeded");

    let entries = sink.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].level, LogLevel::Error);
    assert_eq!(entries[0].error.as_deref(), Some("deadline exceeded"));
    assert_eq!(entries[0].property("StatusCode"), Some(&Value::Null));
    assert_eq!(entries[0].property("IsSucceed"), Some(&json!(false)));
}

#[tokio::test]
async fn masks_sensitive_headers_and_body_fields() {
    let sink = Arc::new(MemorySink::new());
    let options = builder(Arc::clone(&sink))
        .response_body_log_mode(LogMode::All)
        .build()
        .expect("options build");
    let client = LoggingTransport::new(
        options,
        transport_fn(|_request| async {
            Ok(Response::builder()
                .status(200)
                .body(Bytes::from(r#"{"data": {"access_token": "tok"}, "ok": true}"#))
                .expect("valid response"))
        }),
    );

    let request = Request::builder()
        .method("POST")
        .uri("https://example.com/login")
        .header("authorization", "Bearer abcdef")
        .header("accept", "application/json")
        .body(Bytes::from(r#"{"user": "ada", "password": "hunter2"}"#))
        .expect("valid request");
    client.send(request).await.expect("succeeds");

    let entries = sink.entries();
    let entry = &entries[0];
    assert_eq!(
        entry.property("RequestHeaders"),
        Some(&json!({
            "authorization": "*** MASKED ***",
            "accept": "application/json"
        }))
    );
    assert_eq!(
        entry.property("RequestBody"),
        Some(&json!({"user": "ada", "password": "*** MASKED ***"}))
    );
    assert_eq!(
        entry.property("ResponseBody"),
        Some(&json!({"data": {"access_token": "*** MASKED ***"}, "ok": true}))
    );
}

#[tokio::test]
async fn truncates_captured_bodies_to_the_configured_limit() {
    let sink = Arc::new(MemorySink::new());
    let options = builder(Arc::clone(&sink))
        .request_body_text_length_limit(10)
        .build()
        .expect("options build");
    let client = LoggingTransport::new(options, ok_transport(200, ""));

    let request = Request::builder()
        .method("POST")
        .uri("https://example.com/upload")
        .body(Bytes::from("0123456789abcdef"))
        .expect("valid request");
    client.send(request).await.expect("succeeds");

    assert_eq!(
        sink.entries()[0].property("RequestBodyString"),
        Some(&json!("0123456789"))
    );
}

#[tokio::test]
async fn overall_gate_off_emits_nothing() {
    let sink = Arc::new(MemorySink::new());
    let options = builder(Arc::clone(&sink))
        .log_mode(LogMode::None)
        .response_body_log_mode(LogMode::All)
        .build()
        .expect("options build");
    let client = LoggingTransport::new(options, ok_transport(500, "boom"));

    let response = client.send(post_request()).await.expect("passes through");
    assert_eq!(response.status(), 500);
    assert!(sink.entries().is_empty());
}

#[tokio::test]
async fn overall_failures_mode_skips_successes() {
    let sink = Arc::new(MemorySink::new());
    let options = builder(Arc::clone(&sink))
        .log_mode(LogMode::Failures)
        .build()
        .expect("options build");
    let transport = Arc::new(ok_transport(200, "fine"));
    let client = LoggingTransport::new(options, Arc::clone(&transport));

    client.send(post_request()).await.expect("succeeds");
    assert!(sink.entries().is_empty());

    let failing_sink = Arc::new(MemorySink::new());
    let options = builder(Arc::clone(&failing_sink))
        .log_mode(LogMode::Failures)
        .build()
        .expect("options build");
    let client = LoggingTransport::new(options, ok_transport(500, "broken"));
    client.send(post_request()).await.expect("passes through");
    assert_eq!(failing_sink.entries().len(), 1);
}

#[tokio::test]
async fn disabled_sink_level_means_no_entry_at_all() {
    let sink = Arc::new(MemorySink::disabled());
    let options = builder(Arc::clone(&sink))
        .response_body_log_mode(LogMode::All)
        .build()
        .expect("options build");
    let client = LoggingTransport::new(options, ok_transport(200, "anything"));

    client.send(post_request()).await.expect("succeeds");
    assert!(sink.entries().is_empty());
}

#[tokio::test]
async fn structured_context_shape_carries_one_property() {
    let sink = Arc::new(MemorySink::new());
    let options = builder(Arc::clone(&sink))
        .entry_shape(EntryShape::StructuredContext)
        .response_body_log_mode(LogMode::All)
        .build()
        .expect("options build");
    let client = LoggingTransport::new(options, ok_transport(200, "this is the response body"));

    client.send(post_request()).await.expect("succeeds");

    let entries = sink.entries();
    let entry = &entries[0];
    assert_eq!(entry.properties.len(), 1);

    let context = entry.property("Context").expect("context property");
    assert_eq!(context["Request"]["Method"], json!("POST"));
    assert_eq!(context["Request"]["Host"], json!("example.com"));
    assert_eq!(context["Response"]["StatusCode"], json!(200));
    assert_eq!(context["Response"]["IsSucceed"], json!(true));

    // With no flat properties, the template renders from the positional
    // parameters.
    assert!(entry.message.starts_with("HTTP POST https://example.com/path?query=1 responded 200 in "));
}
