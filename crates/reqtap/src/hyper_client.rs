//! Hyper-backed transport
//!
//! A convenience [`Transport`] over the hyper-util legacy client, speaking
//! plain HTTP. Responses are collected into a buffered body before they are
//! returned, which is what the interceptor's capture path expects. TLS is
//! intentionally out of scope here: wrap your own connector-equipped client
//! in a [`Transport`] implementation instead.

use crate::transport::{BoxError, Transport, TransportFuture};
use bytes::Bytes;
use http::{Request, Response};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use std::fmt;

/// Plain-HTTP transport backed by `hyper_util::client::legacy::Client`.
#[derive(Clone)]
pub struct HyperTransport {
    client: Client<HttpConnector, Full<Bytes>>,
}

impl fmt::Debug for HyperTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HyperTransport").finish()
    }
}

impl HyperTransport {
    /// Create a transport with a default client.
    pub fn new() -> Self {
        Self {
            client: Client::builder(TokioExecutor::new()).build_http(),
        }
    }
}

impl Default for HyperTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HyperTransport {
    fn send(&self, request: Request<Bytes>) -> TransportFuture {
        let client = self.client.clone();
        Box::pin(async move {
            let (parts, body) = request.into_parts();
            let request = Request::from_parts(parts, Full::new(body));
            let response: Response<Incoming> = client
                .request(request)
                .await
                .map_err(|e| Box::new(e) as BoxError)?;
            let (parts, body) = response.into_parts();
            let collected = body
                .collect()
                .await
                .map_err(|e| Box::new(e) as BoxError)?;
            Ok(Response::from_parts(parts, collected.to_bytes()))
        })
    }
}
