//! Outbound call interceptor
//!
//! [`LoggingTransport`] wraps a transport, times every call with the
//! monotonic clock, and emits at most one log entry per call. Logging is a
//! side effect only: the call's outcome — response or error — is always
//! returned to the caller unchanged.

use crate::capture::{capture_request, capture_response};
use crate::config::RequestLoggingOptions;
use crate::context::{CallContext, RequestSnapshot};
use crate::transport::{BoxError, Transport, TransportFuture};
use bytes::Bytes;
use http::{Request, Response};
use std::sync::Arc;
use std::time::Instant;

/// A transport wrapper that logs every outbound call.
///
/// Per call: snapshot the request, dispatch to the wrapped transport, then
/// select a severity, consult the sink's level filter, evaluate the overall
/// gate, capture and mask whatever the per-axis modes allow, and hand the
/// assembled entry to the sink. Wrappers chain, since `LoggingTransport` is
/// itself a [`Transport`].
///
/// # Example
///
/// ```rust
/// use bytes::Bytes;
/// use http::Response;
/// use reqtap::{transport_fn, LoggingTransport, RequestLoggingOptions, Transport};
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
/// let options = RequestLoggingOptions::builder().build()?;
/// let client = LoggingTransport::new(
///     options,
///     transport_fn(|_request| async { Ok(Response::builder().status(200).body(Bytes::new())?) }),
/// );
///
/// let request = http::Request::builder()
///     .uri("https://example.com/health")
///     .body(Bytes::new())?;
/// let response = client.send(request).await?;
/// assert_eq!(response.status(), 200);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct LoggingTransport {
    inner: Arc<dyn Transport>,
    options: RequestLoggingOptions,
}

impl LoggingTransport {
    /// Wrap a transport with the given options.
    pub fn new(options: RequestLoggingOptions, inner: impl Transport + 'static) -> Self {
        Self {
            inner: Arc::new(inner),
            options,
        }
    }

    /// The options this interceptor was built with.
    pub fn options(&self) -> &RequestLoggingOptions {
        &self.options
    }
}

impl Transport for LoggingTransport {
    fn send(&self, request: Request<Bytes>) -> TransportFuture {
        let inner = Arc::clone(&self.inner);
        let options = self.options.clone();
        Box::pin(async move {
            let snapshot = RequestSnapshot::of(&request);
            let start = Instant::now();
            let outcome = inner.send(request).await;
            let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
            match &outcome {
                Ok(response) => log_call(&options, &snapshot, Some(response), elapsed_ms, None),
                Err(error) => log_call(&options, &snapshot, None, elapsed_ms, Some(error)),
            }
            outcome
        })
    }
}

/// Build and emit the log entry for one completed call.
///
/// The sink's level filter is checked before any capture work, and the
/// overall gate before per-axis capture; failing either means no entry.
fn log_call(
    options: &RequestLoggingOptions,
    request: &RequestSnapshot,
    response: Option<&Response<Bytes>>,
    elapsed_ms: f64,
    error: Option<&BoxError>,
) {
    let level = options
        .entry_policy()
        .select_level(request, response, elapsed_ms, error);
    if !options.sink().is_enabled(level) {
        return;
    }

    let succeeded = error.is_none() && response.is_some_and(|r| r.status().as_u16() < 400);
    if !options.log_mode().should_log(succeeded) {
        return;
    }

    let context = CallContext {
        request: capture_request(options, request, succeeded),
        response: capture_response(options, response, succeeded, elapsed_ms),
    };
    let entry = options.entry_policy().build_entry(&context, options);
    options.sink().write(level, error, &entry);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{LogLevel, LogMode};
    use crate::sink::MemorySink;
    use crate::transport::transport_fn;

    fn options(sink: Arc<MemorySink>) -> RequestLoggingOptions {
        RequestLoggingOptions::builder()
            .sink(sink)
            .build()
            .expect("options build")
    }

    fn request() -> Request<Bytes> {
        Request::builder()
            .method("GET")
            .uri("https://example.com/things")
            .body(Bytes::new())
            .expect("valid request")
    }

    #[tokio::test]
    async fn test_success_emits_one_info_entry() {
        let sink = Arc::new(MemorySink::new());
        let client = LoggingTransport::new(
            options(Arc::clone(&sink)),
            transport_fn(|_request| async {
                Ok(Response::builder()
                    .status(200)
                    .body(Bytes::new())
                    .expect("valid response"))
            }),
        );

        let response = client.send(request()).await.expect("succeeds");
        assert_eq!(response.status(), 200);

        let entries = sink.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].level, LogLevel::Info);
    }

    #[tokio::test]
    async fn test_failure_is_logged_then_reraised() {
        let sink = Arc::new(MemorySink::new());
        let client = LoggingTransport::new(
            options(Arc::clone(&sink)),
            transport_fn(|_request| async { Err::<Response<Bytes>, _>("connection refused".into()) }),
        );

        let error = client.send(request()).await.expect_err("fails");
        assert_eq!(error.to_string(), "connection refused");

        let entries = sink.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].level, LogLevel::Error);
        assert_eq!(entries[0].error.as_deref(), Some("connection refused"));
    }

    #[tokio::test]
    async fn test_overall_gate_off_logs_nothing() {
        let sink = Arc::new(MemorySink::new());
        let options = RequestLoggingOptions::builder()
            .log_mode(LogMode::None)
            .sink(sink.clone())
            .build()
            .expect("options build");
        let client = LoggingTransport::new(
            options,
            transport_fn(|_request| async {
                Ok(Response::builder()
                    .status(500)
                    .body(Bytes::new())
                    .expect("valid response"))
            }),
        );

        let response = client.send(request()).await.expect("passes through");
        assert_eq!(response.status(), 500);
        assert!(sink.entries().is_empty());
    }

    #[tokio::test]
    async fn test_disabled_sink_level_short_circuits() {
        let sink = Arc::new(MemorySink::disabled());
        let client = LoggingTransport::new(
            options(Arc::clone(&sink)),
            transport_fn(|_request| async {
                Ok(Response::builder()
                    .status(200)
                    .body(Bytes::new())
                    .expect("valid response"))
            }),
        );

        client.send(request()).await.expect("succeeds");
        assert!(sink.entries().is_empty());
    }

    #[tokio::test]
    async fn test_logging_transports_chain() {
        let outer_sink = Arc::new(MemorySink::new());
        let inner_sink = Arc::new(MemorySink::new());
        let inner = LoggingTransport::new(
            options(Arc::clone(&inner_sink)),
            transport_fn(|_request| async {
                Ok(Response::builder()
                    .status(200)
                    .body(Bytes::new())
                    .expect("valid response"))
            }),
        );
        let outer = LoggingTransport::new(options(Arc::clone(&outer_sink)), inner);

        outer.send(request()).await.expect("succeeds");
        assert_eq!(outer_sink.entries().len(), 1);
        assert_eq!(inner_sink.entries().len(), 1);
    }
}
