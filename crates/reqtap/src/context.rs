//! Per-call log context
//!
//! One `CallContext` is assembled per outbound call, lives for the duration
//! of building and emitting a single log entry, and is discarded afterwards.
//! Property names serialize in PascalCase so structured sinks see the same
//! names the flat entry shape uses.

use bytes::Bytes;
use http::{HeaderMap, Method, Request, Uri};
use serde::Serialize;
use serde_json::{Map, Value};

/// A pre-dispatch copy of the outbound request descriptor.
///
/// Taken before the request is handed to the wrapped transport, because the
/// transport consumes the request. Cloning the buffered body is a cheap
/// reference-count bump.
#[derive(Debug, Clone)]
pub struct RequestSnapshot {
    /// HTTP method.
    pub method: Method,
    /// Absolute request URI.
    pub uri: Uri,
    /// Request headers.
    pub headers: HeaderMap,
    /// Buffered request body.
    pub body: Bytes,
}

impl RequestSnapshot {
    /// Snapshot the parts of a request needed for logging.
    pub fn of(request: &Request<Bytes>) -> Self {
        Self {
            method: request.method().clone(),
            uri: request.uri().clone(),
            headers: request.headers().clone(),
            body: request.body().clone(),
        }
    }
}

/// Captured request-side information.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RequestContext {
    /// HTTP method, e.g. `POST`.
    pub method: String,
    /// URI scheme, e.g. `https`. Empty for relative URIs.
    pub scheme: String,
    /// Host name, e.g. `example.com`. Empty for relative URIs.
    pub host: String,
    /// Request path, e.g. `/api/v1/tickets`.
    pub path: String,
    /// Raw query string including its leading `?`, or empty.
    pub query_string: String,
    /// Parsed query parameters; repeated keys group into arrays.
    pub query: Map<String, Value>,
    /// Body as text, possibly truncated, or the `(Not Logged)` sentinel.
    pub body_string: String,
    /// Body as a masked structured value, when it parsed as JSON.
    pub body: Option<Value>,
    /// Headers after masking; multi-valued names keep an array value.
    pub headers: Map<String, Value>,
}

impl RequestContext {
    /// The full request URI as a display string.
    pub fn uri_string(&self) -> String {
        if self.host.is_empty() {
            format!("{}{}", self.path, self.query_string)
        } else {
            format!(
                "{}://{}{}{}",
                self.scheme, self.host, self.path, self.query_string
            )
        }
    }
}

/// Captured response-side information, or the failure outcome.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResponseContext {
    /// Response status code; absent when the transport failed.
    pub status_code: Option<u16>,
    /// True when no error occurred and the status code is below 400.
    pub is_succeed: bool,
    /// Wall-clock time spent in the wrapped transport, in milliseconds.
    pub elapsed_milliseconds: f64,
    /// Body as text, possibly truncated, or the `(Not Logged)` sentinel.
    pub body_string: String,
    /// Body as a masked structured value, when it parsed as JSON.
    pub body: Option<Value>,
    /// Headers after masking; multi-valued names keep an array value.
    pub headers: Map<String, Value>,
}

/// The request/response pair handed to the entry builder.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CallContext {
    /// Request-side capture.
    pub request: RequestContext,
    /// Response-side capture.
    pub response: ResponseContext,
}
