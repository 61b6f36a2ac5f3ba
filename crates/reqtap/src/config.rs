//! Request logging configuration
//!
//! Options are built once, validated eagerly, and shared read-only by every
//! in-flight call for the lifetime of the interceptor.

use crate::mask::MaskSet;
use crate::policy::{DefaultEntryPolicy, EntryPolicy, LogMode};
use crate::sink::{LogSink, TracingSink};
use std::sync::Arc;

const DEFAULT_MESSAGE_TEMPLATE: &str =
    "HTTP {RequestMethod} {RequestUri} responded {StatusCode} in {ElapsedMilliseconds} ms";

const DEFAULT_MASK_FORMAT: &str = "*** MASKED ***";

const DEFAULT_BODY_TEXT_LENGTH_LIMIT: usize = 4000;

const DEFAULT_MASKED_PROPERTIES: &[&str] = &[
    "*password*",
    "*token*",
    "*clientsecret*",
    "*bearer*",
    "*authorization*",
    "*client-secret*",
    "*otp",
];

/// Configuration errors, surfaced at construction time before any call.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A mask pattern failed to compile.
    #[error("invalid mask pattern {pattern:?}: {source}")]
    InvalidMaskPattern {
        /// The offending pattern.
        pattern: String,
        /// The compilation failure.
        #[source]
        source: regex::Error,
    },

    /// The message template is empty.
    #[error("message template must not be empty")]
    EmptyMessageTemplate,
}

/// How the log entry carries its captured data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntryShape {
    /// One named property per captured field (`RequestMethod`,
    /// `RequestHeaders`, `StatusCode`, ...).
    #[default]
    FlatProperties,
    /// A single `Context` property carrying the whole serialized
    /// [`CallContext`](crate::context::CallContext).
    StructuredContext,
}

/// Options for [`LoggingTransport`](crate::interceptor::LoggingTransport).
///
/// Immutable once built; cheap to clone (shared strategy objects).
///
/// # Example
///
/// ```rust
/// use reqtap::{LogMode, RequestLoggingOptions};
///
/// let options = RequestLoggingOptions::builder()
///     .response_body_log_mode(LogMode::All)
///     .masked_property("*session*")
///     .build()
///     .unwrap();
/// # let _ = options;
/// ```
#[derive(Clone)]
pub struct RequestLoggingOptions {
    log_mode: LogMode,
    request_header_log_mode: LogMode,
    request_body_log_mode: LogMode,
    response_header_log_mode: LogMode,
    response_body_log_mode: LogMode,
    request_body_text_length_limit: usize,
    response_body_text_length_limit: usize,
    masked_properties: Vec<String>,
    mask_format: String,
    log_request_body_as_structured: bool,
    log_response_body_as_structured: bool,
    message_template: String,
    entry_shape: EntryShape,
    masks: MaskSet,
    entry_policy: Arc<dyn EntryPolicy>,
    sink: Arc<dyn LogSink>,
}

impl RequestLoggingOptions {
    /// Start building options from the defaults.
    pub fn builder() -> RequestLoggingOptionsBuilder {
        RequestLoggingOptionsBuilder::default()
    }

    /// The overall gate: when any logging happens at all.
    pub fn log_mode(&self) -> LogMode {
        self.log_mode
    }

    /// When request headers are captured.
    pub fn request_header_log_mode(&self) -> LogMode {
        self.request_header_log_mode
    }

    /// When the request body is captured.
    pub fn request_body_log_mode(&self) -> LogMode {
        self.request_body_log_mode
    }

    /// When response headers are captured.
    pub fn response_header_log_mode(&self) -> LogMode {
        self.response_header_log_mode
    }

    /// When the response body is captured.
    pub fn response_body_log_mode(&self) -> LogMode {
        self.response_body_log_mode
    }

    /// Character limit for the captured request body text.
    pub fn request_body_text_length_limit(&self) -> usize {
        self.request_body_text_length_limit
    }

    /// Character limit for the captured response body text.
    pub fn response_body_text_length_limit(&self) -> usize {
        self.response_body_text_length_limit
    }

    /// The configured wildcard patterns.
    pub fn masked_properties(&self) -> &[String] {
        &self.masked_properties
    }

    /// The replacement literal for masked values.
    pub fn mask_format(&self) -> &str {
        &self.mask_format
    }

    /// Whether the request body is parsed for structured masking.
    pub fn log_request_body_as_structured(&self) -> bool {
        self.log_request_body_as_structured
    }

    /// Whether the response body is parsed for structured masking.
    pub fn log_response_body_as_structured(&self) -> bool {
        self.log_response_body_as_structured
    }

    /// The log entry message template.
    pub fn message_template(&self) -> &str {
        &self.message_template
    }

    /// How the entry carries captured data.
    pub fn entry_shape(&self) -> EntryShape {
        self.entry_shape
    }

    /// The compiled mask patterns.
    pub fn masks(&self) -> &MaskSet {
        &self.masks
    }

    pub(crate) fn entry_policy(&self) -> &Arc<dyn EntryPolicy> {
        &self.entry_policy
    }

    pub(crate) fn sink(&self) -> &Arc<dyn LogSink> {
        &self.sink
    }
}

/// Builder for [`RequestLoggingOptions`].
pub struct RequestLoggingOptionsBuilder {
    log_mode: LogMode,
    request_header_log_mode: LogMode,
    request_body_log_mode: LogMode,
    response_header_log_mode: LogMode,
    response_body_log_mode: LogMode,
    request_body_text_length_limit: usize,
    response_body_text_length_limit: usize,
    masked_properties: Vec<String>,
    mask_format: String,
    log_request_body_as_structured: bool,
    log_response_body_as_structured: bool,
    message_template: String,
    entry_shape: EntryShape,
    entry_policy: Arc<dyn EntryPolicy>,
    sink: Arc<dyn LogSink>,
}

impl Default for RequestLoggingOptionsBuilder {
    fn default() -> Self {
        Self {
            log_mode: LogMode::All,
            request_header_log_mode: LogMode::All,
            request_body_log_mode: LogMode::All,
            response_header_log_mode: LogMode::All,
            response_body_log_mode: LogMode::Failures,
            request_body_text_length_limit: DEFAULT_BODY_TEXT_LENGTH_LIMIT,
            response_body_text_length_limit: DEFAULT_BODY_TEXT_LENGTH_LIMIT,
            masked_properties: DEFAULT_MASKED_PROPERTIES
                .iter()
                .map(|p| p.to_string())
                .collect(),
            mask_format: DEFAULT_MASK_FORMAT.to_string(),
            log_request_body_as_structured: true,
            log_response_body_as_structured: true,
            message_template: DEFAULT_MESSAGE_TEMPLATE.to_string(),
            entry_shape: EntryShape::default(),
            entry_policy: Arc::new(DefaultEntryPolicy),
            sink: Arc::new(TracingSink::new()),
        }
    }
}

impl RequestLoggingOptionsBuilder {
    /// Set the overall gate.
    pub fn log_mode(mut self, mode: LogMode) -> Self {
        self.log_mode = mode;
        self
    }

    /// Set when request headers are captured.
    pub fn request_header_log_mode(mut self, mode: LogMode) -> Self {
        self.request_header_log_mode = mode;
        self
    }

    /// Set when the request body is captured.
    pub fn request_body_log_mode(mut self, mode: LogMode) -> Self {
        self.request_body_log_mode = mode;
        self
    }

    /// Set when response headers are captured.
    pub fn response_header_log_mode(mut self, mode: LogMode) -> Self {
        self.response_header_log_mode = mode;
        self
    }

    /// Set when the response body is captured.
    pub fn response_body_log_mode(mut self, mode: LogMode) -> Self {
        self.response_body_log_mode = mode;
        self
    }

    /// Set the request body character limit.
    pub fn request_body_text_length_limit(mut self, limit: usize) -> Self {
        self.request_body_text_length_limit = limit;
        self
    }

    /// Set the response body character limit.
    pub fn response_body_text_length_limit(mut self, limit: usize) -> Self {
        self.response_body_text_length_limit = limit;
        self
    }

    /// Add a wildcard pattern to mask.
    pub fn masked_property(mut self, pattern: impl Into<String>) -> Self {
        self.masked_properties.push(pattern.into());
        self
    }

    /// Replace the wildcard pattern list.
    pub fn masked_properties(mut self, patterns: Vec<String>) -> Self {
        self.masked_properties = patterns;
        self
    }

    /// Set the replacement literal for masked values.
    pub fn mask_format(mut self, mask: impl Into<String>) -> Self {
        self.mask_format = mask.into();
        self
    }

    /// Set whether the request body is parsed for structured masking.
    pub fn log_request_body_as_structured(mut self, structured: bool) -> Self {
        self.log_request_body_as_structured = structured;
        self
    }

    /// Set whether the response body is parsed for structured masking.
    pub fn log_response_body_as_structured(mut self, structured: bool) -> Self {
        self.log_response_body_as_structured = structured;
        self
    }

    /// Set the log entry message template.
    pub fn message_template(mut self, template: impl Into<String>) -> Self {
        self.message_template = template.into();
        self
    }

    /// Set how the entry carries captured data.
    pub fn entry_shape(mut self, shape: EntryShape) -> Self {
        self.entry_shape = shape;
        self
    }

    /// Replace the severity/entry strategy.
    pub fn entry_policy(mut self, policy: Arc<dyn EntryPolicy>) -> Self {
        self.entry_policy = policy;
        self
    }

    /// Replace the log sink.
    pub fn sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Validate and build the options.
    ///
    /// Pattern compilation and template validation happen here, before any
    /// call is made.
    pub fn build(self) -> Result<RequestLoggingOptions, ConfigError> {
        if self.message_template.is_empty() {
            return Err(ConfigError::EmptyMessageTemplate);
        }
        let masks = MaskSet::compile(&self.masked_properties)?;
        Ok(RequestLoggingOptions {
            log_mode: self.log_mode,
            request_header_log_mode: self.request_header_log_mode,
            request_body_log_mode: self.request_body_log_mode,
            response_header_log_mode: self.response_header_log_mode,
            response_body_log_mode: self.response_body_log_mode,
            request_body_text_length_limit: self.request_body_text_length_limit,
            response_body_text_length_limit: self.response_body_text_length_limit,
            masked_properties: self.masked_properties,
            mask_format: self.mask_format,
            log_request_body_as_structured: self.log_request_body_as_structured,
            log_response_body_as_structured: self.log_response_body_as_structured,
            message_template: self.message_template,
            entry_shape: self.entry_shape,
            masks,
            entry_policy: self.entry_policy,
            sink: self.sink,
        })
    }
}
