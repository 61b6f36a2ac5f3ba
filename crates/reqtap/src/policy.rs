//! Visibility policy and log entry construction
//!
//! Five independent axes (overall, request headers, request body, response
//! headers, response body) each carry a three-state [`LogMode`]. Severity
//! selection and entry construction are a strategy object ([`EntryPolicy`])
//! so callers can replace either wholesale.

use crate::config::{EntryShape, RequestLoggingOptions};
use crate::context::{CallContext, RequestSnapshot};
use crate::transport::BoxError;
use bytes::Bytes;
use http::Response;
use serde_json::Value;

/// When a logging axis captures data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogMode {
    /// Never capture, whether the call succeeded or failed.
    None,
    /// Capture every call.
    #[default]
    All,
    /// Capture failed calls only.
    Failures,
}

impl LogMode {
    /// Resolve this axis for a call outcome.
    pub fn should_log(self, succeeded: bool) -> bool {
        match self {
            LogMode::None => false,
            LogMode::All => true,
            LogMode::Failures => !succeeded,
        }
    }
}

/// Severity of an emitted log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Finest-grained detail.
    Trace,
    /// Diagnostic detail.
    Debug,
    /// Normal completion.
    Info,
    /// Client-class failures (4xx).
    Warn,
    /// Transport errors, missing responses, and server-class failures.
    Error,
}

impl LogLevel {
    /// The equivalent `tracing` level.
    pub fn as_tracing(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// A log entry ready for a sink.
///
/// The message template carries `{Name}` placeholders. A sink resolves each
/// placeholder from the named properties first, falling back to the
/// positional parameter with the same ordinal as the placeholder.
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// Message template with named placeholders.
    pub message_template: String,
    /// Positional parameter values, in template placeholder order.
    pub message_parameters: Vec<Value>,
    /// Named properties attached to the entry.
    pub properties: Vec<(String, Value)>,
}

impl LogEntry {
    /// Look up a named property.
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Render the message template.
    ///
    /// `{Name}` and `{Name:format}` placeholders resolve from the named
    /// properties, then from the positional parameters by placeholder
    /// ordinal. Unresolvable placeholders are kept verbatim.
    pub fn render_message(&self) -> String {
        let mut out = String::with_capacity(self.message_template.len());
        let mut rest = self.message_template.as_str();
        let mut ordinal = 0usize;
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            match after.find('}') {
                Some(close) => {
                    let token = &after[..close];
                    let name = token.split(':').next().unwrap_or(token);
                    let resolved = self
                        .property(name)
                        .or_else(|| self.message_parameters.get(ordinal));
                    match resolved {
                        Some(value) => out.push_str(&render_value(value)),
                        None => {
                            out.push('{');
                            out.push_str(token);
                            out.push('}');
                        }
                    }
                    ordinal += 1;
                    rest = &after[close + 1..];
                }
                None => {
                    out.push('{');
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        out
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Strategy for severity selection and log entry construction.
///
/// The default implementation is [`DefaultEntryPolicy`]; either behavior can
/// be replaced per options instance.
pub trait EntryPolicy: Send + Sync {
    /// Choose the severity for a completed call.
    ///
    /// Called before any capture work, so it only sees the raw outcome.
    fn select_level(
        &self,
        request: &RequestSnapshot,
        response: Option<&Response<Bytes>>,
        elapsed_ms: f64,
        error: Option<&BoxError>,
    ) -> LogLevel;

    /// Build the log entry for an assembled call context.
    fn build_entry(&self, context: &CallContext, options: &RequestLoggingOptions) -> LogEntry;
}

/// Default severity and entry construction.
///
/// Severity: `Error` when the transport failed, no response arrived, or the
/// status is 5xx; `Warn` for 4xx; `Info` otherwise. Entries carry either the
/// flat property set or a single `Context` property, per the configured
/// [`EntryShape`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultEntryPolicy;

impl EntryPolicy for DefaultEntryPolicy {
    fn select_level(
        &self,
        _request: &RequestSnapshot,
        response: Option<&Response<Bytes>>,
        _elapsed_ms: f64,
        error: Option<&BoxError>,
    ) -> LogLevel {
        match response {
            _ if error.is_some() => LogLevel::Error,
            None => LogLevel::Error,
            Some(response) if response.status().as_u16() >= 500 => LogLevel::Error,
            Some(response) if response.status().as_u16() >= 400 => LogLevel::Warn,
            Some(_) => LogLevel::Info,
        }
    }

    fn build_entry(&self, context: &CallContext, options: &RequestLoggingOptions) -> LogEntry {
        let request = &context.request;
        let response = &context.response;

        let status = response
            .status_code
            .map(Value::from)
            .unwrap_or(Value::Null);
        let message_parameters = vec![
            Value::String(request.method.clone()),
            Value::String(request.uri_string()),
            status.clone(),
            Value::from(response.elapsed_milliseconds),
        ];

        let properties = match options.entry_shape() {
            EntryShape::FlatProperties => vec![
                ("RequestMethod".to_string(), Value::String(request.method.clone())),
                ("RequestScheme".to_string(), Value::String(request.scheme.clone())),
                ("RequestHost".to_string(), Value::String(request.host.clone())),
                ("RequestPath".to_string(), Value::String(request.path.clone())),
                (
                    "RequestQueryString".to_string(),
                    Value::String(request.query_string.clone()),
                ),
                ("RequestQuery".to_string(), Value::Object(request.query.clone())),
                (
                    "RequestBodyString".to_string(),
                    Value::String(request.body_string.clone()),
                ),
                (
                    "RequestBody".to_string(),
                    request.body.clone().unwrap_or(Value::Null),
                ),
                (
                    "RequestHeaders".to_string(),
                    Value::Object(request.headers.clone()),
                ),
                ("StatusCode".to_string(), status),
                ("IsSucceed".to_string(), Value::Bool(response.is_succeed)),
                (
                    "ElapsedMilliseconds".to_string(),
                    Value::from(response.elapsed_milliseconds),
                ),
                (
                    "ResponseBodyString".to_string(),
                    Value::String(response.body_string.clone()),
                ),
                (
                    "ResponseBody".to_string(),
                    response.body.clone().unwrap_or(Value::Null),
                ),
                (
                    "ResponseHeaders".to_string(),
                    Value::Object(response.headers.clone()),
                ),
            ],
            EntryShape::StructuredContext => {
                let value = serde_json::to_value(context).unwrap_or(Value::Null);
                vec![("Context".to_string(), value)]
            }
        };

        LogEntry {
            message_template: options.message_template().to_string(),
            message_parameters,
            properties,
        }
    }
}
