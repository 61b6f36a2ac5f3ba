//! Body and header capture
//!
//! Capture works on buffered bodies only and never fails the call: anything
//! that does not parse degrades to an unparsed, truncated representation and
//! a diagnostic event on the `reqtap` target.

use crate::config::RequestLoggingOptions;
use crate::context::{RequestContext, RequestSnapshot, ResponseContext};
use crate::mask::{mask_fields, mask_pairs, MaskSet};
use bytes::Bytes;
use http::{HeaderMap, Response};
use serde_json::{Map, Value};

/// Body text recorded when an axis resolves to "do not capture".
pub const NOT_LOGGED: &str = "(Not Logged)";

/// Placeholder for header values that are not valid UTF-8.
const NON_UTF8: &str = "[non-utf8]";

/// Read, mask, and truncate one side's body.
///
/// Returns the body as text plus, when `structured` is set and the text
/// parses as JSON, the masked tree. When `capture` is false the text is the
/// [`NOT_LOGGED`] sentinel and no structured value is produced.
pub fn capture_body(
    body: &Bytes,
    capture: bool,
    structured: bool,
    masks: &MaskSet,
    mask: &str,
    limit: usize,
) -> (String, Option<Value>) {
    if !capture {
        return (NOT_LOGGED.to_string(), None);
    }

    let mut text = if body.is_empty() {
        String::new()
    } else {
        String::from_utf8_lossy(body).into_owned()
    };

    let mut structured_value = None;
    if structured && !text.trim().is_empty() {
        // A body that does not parse stays on the text-only path.
        if let Some(parsed) = try_parse_json(&text) {
            let masked = mask_fields(parsed, masks, mask);
            if let Ok(serialized) = serde_json::to_string(&masked) {
                text = serialized;
            }
            structured_value = Some(masked);
        }
    }

    truncate_chars(&mut text, limit);
    (text, structured_value)
}

/// Parse text as JSON when it plausibly is JSON.
///
/// Requires the trimmed text to be delimited as an object or array before
/// attempting the parse, so plain prose never pays for a failed parse.
pub fn try_parse_json(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    let delimited = (trimmed.starts_with('{') && trimmed.ends_with('}'))
        || (trimmed.starts_with('[') && trimmed.ends_with(']'));
    if !delimited {
        return None;
    }
    serde_json::from_str(trimmed).ok()
}

/// Truncate to at most `limit` characters, at a character boundary.
pub fn truncate_chars(text: &mut String, limit: usize) {
    if let Some((index, _)) = text.char_indices().nth(limit) {
        text.truncate(index);
    }
}

/// Capture one side's headers as a masked name → value map.
///
/// Values are grouped per distinct name before masking; a single-valued name
/// flattens to a scalar, a multi-valued name keeps an array.
pub fn capture_headers(
    headers: &HeaderMap,
    capture: bool,
    masks: &MaskSet,
    mask: &str,
) -> Map<String, Value> {
    if !capture {
        return Map::new();
    }

    let pairs: Vec<(String, Vec<String>)> = headers
        .keys()
        .map(|name| {
            let values = headers
                .get_all(name)
                .iter()
                .map(|value| value.to_str().unwrap_or(NON_UTF8).to_string())
                .collect();
            (name.as_str().to_string(), values)
        })
        .collect();

    let mut map = Map::new();
    for (name, mut values) in mask_pairs(pairs, masks, mask) {
        let value = if values.len() > 1 {
            Value::Array(values.into_iter().map(Value::String).collect())
        } else {
            Value::String(values.pop().unwrap_or_default())
        };
        map.insert(name, value);
    }
    map
}

/// Parse a raw query string into its display form and a key → values map.
///
/// The display form keeps the leading `?`. Repeated keys group into arrays.
/// A query that fails to parse degrades to an empty map and a diagnostic
/// event; it never fails the call.
pub fn parse_query(query: Option<&str>) -> (String, Map<String, Value>) {
    let raw = match query {
        Some(q) => format!("?{q}"),
        None => String::new(),
    };

    let mut map = Map::new();
    if let Some(q) = query.filter(|q| !q.is_empty()) {
        match serde_urlencoded::from_str::<Vec<(String, String)>>(q) {
            Ok(pairs) => {
                for (key, value) in pairs {
                    match map.get_mut(&key) {
                        Some(Value::Array(values)) => values.push(Value::String(value)),
                        Some(existing) => {
                            let first = existing.take();
                            *existing = Value::Array(vec![first, Value::String(value)]);
                        }
                        None => {
                            map.insert(key, Value::String(value));
                        }
                    }
                }
            }
            Err(error) => {
                tracing::debug!(target: "reqtap", %error, "cannot parse query string");
            }
        }
    }
    (raw, map)
}

/// Capture the request side under the options' axis decisions.
pub(crate) fn capture_request(
    options: &RequestLoggingOptions,
    snapshot: &RequestSnapshot,
    succeeded: bool,
) -> RequestContext {
    let (body_string, body) = capture_body(
        &snapshot.body,
        options.request_body_log_mode().should_log(succeeded),
        options.log_request_body_as_structured(),
        options.masks(),
        options.mask_format(),
        options.request_body_text_length_limit(),
    );
    let headers = capture_headers(
        &snapshot.headers,
        options.request_header_log_mode().should_log(succeeded),
        options.masks(),
        options.mask_format(),
    );
    let (query_string, query) = parse_query(snapshot.uri.query());

    RequestContext {
        method: snapshot.method.to_string(),
        scheme: snapshot.uri.scheme_str().unwrap_or_default().to_string(),
        host: snapshot.uri.host().unwrap_or_default().to_string(),
        path: snapshot.uri.path().to_string(),
        query_string,
        query,
        body_string,
        body,
        headers,
    }
}

/// Capture the response side (or the absence of one) under the options'
/// axis decisions.
pub(crate) fn capture_response(
    options: &RequestLoggingOptions,
    response: Option<&Response<Bytes>>,
    succeeded: bool,
    elapsed_ms: f64,
) -> ResponseContext {
    let empty = Bytes::new();
    let (body_string, body) = capture_body(
        response.map(|r| r.body()).unwrap_or(&empty),
        options.response_body_log_mode().should_log(succeeded),
        options.log_response_body_as_structured(),
        options.masks(),
        options.mask_format(),
        options.response_body_text_length_limit(),
    );
    let headers = match response {
        Some(response) => capture_headers(
            response.headers(),
            options.response_header_log_mode().should_log(succeeded),
            options.masks(),
            options.mask_format(),
        ),
        None => Map::new(),
    };

    ResponseContext {
        status_code: response.map(|r| r.status().as_u16()),
        is_succeed: succeeded,
        elapsed_milliseconds: elapsed_ms,
        body_string,
        body,
        headers,
    }
}
