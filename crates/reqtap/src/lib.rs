//! # reqtap
//!
//! Outbound HTTP request/response logging with wildcard field masking.
//!
//! reqtap wraps a transport with an interceptor that times every call,
//! captures request/response metadata under a per-axis visibility policy,
//! masks sensitive fields before anything leaves the process, and emits one
//! structured log entry per call through a pluggable sink.
//!
//! - **Per-axis policy** — overall, request headers, request body, response
//!   headers, and response body each log never, always, or on failure only.
//! - **Field masking** — glob patterns (`*token*`, `*authorization*`) match
//!   JSON property paths and header names case-insensitively; matched values
//!   are replaced by a mask literal before logging.
//! - **Bounded capture** — bodies are captured from their buffered form and
//!   truncated to a configurable character limit.
//! - **Never in the way** — the wrapped call's outcome is returned unchanged;
//!   capture and parse failures degrade log fidelity, never the call.
//!
//! ## Example
//!
//! ```rust
//! use bytes::Bytes;
//! use http::Response;
//! use reqtap::{transport_fn, LogMode, LoggingTransport, RequestLoggingOptions, Transport};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//! let options = RequestLoggingOptions::builder()
//!     .response_body_log_mode(LogMode::All)
//!     .masked_property("*session*")
//!     .build()?;
//!
//! let client = LoggingTransport::new(
//!     options,
//!     transport_fn(|_request| async {
//!         Ok(Response::builder()
//!             .status(200)
//!             .body(Bytes::from(r#"{"session": "s3cret", "ok": true}"#))?)
//!     }),
//! );
//!
//! let request = http::Request::builder()
//!     .method("POST")
//!     .uri("https://example.com/login")
//!     .body(Bytes::from(r#"{"user": "ada"}"#))?;
//! let response = client.send(request).await?;
//! assert_eq!(response.status(), 200);
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - `hyper-client` — a plain-HTTP [`HyperTransport`] backed by the
//!   hyper-util legacy client.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod capture;
pub mod config;
pub mod context;
pub mod interceptor;
pub mod mask;
pub mod policy;
pub mod sink;
pub mod transport;

#[cfg(feature = "hyper-client")]
pub mod hyper_client;

pub use capture::NOT_LOGGED;
pub use config::{ConfigError, EntryShape, RequestLoggingOptions, RequestLoggingOptionsBuilder};
pub use context::{CallContext, RequestContext, RequestSnapshot, ResponseContext};
pub use interceptor::LoggingTransport;
pub use mask::{mask_fields, mask_pairs, MaskSet};
pub use policy::{DefaultEntryPolicy, EntryPolicy, LogEntry, LogLevel, LogMode};
pub use sink::{LogSink, MemorySink, RecordedEntry, TracingSink};
pub use transport::{transport_fn, BoxError, Transport, TransportFn, TransportFuture};

#[cfg(feature = "hyper-client")]
pub use hyper_client::HyperTransport;
