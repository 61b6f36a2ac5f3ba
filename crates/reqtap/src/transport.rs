//! Transport seam
//!
//! A [`Transport`] sends one buffered outbound request and resolves to a
//! buffered response or an error. The logging interceptor wraps any
//! transport and is itself a transport, so wrappers chain.

use bytes::Bytes;
use http::{Request, Response};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Boxed error type carried by transport outcomes.
///
/// Cancellation surfaces here too: a cancelled call resolves to whatever
/// error the wrapped transport reports, and is logged as a failure outcome.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Future returned by [`Transport::send`].
pub type TransportFuture =
    Pin<Box<dyn Future<Output = Result<Response<Bytes>, BoxError>> + Send + 'static>>;

/// An outbound HTTP transport over buffered bodies.
///
/// Implementations must be safely callable repeatedly and concurrently.
pub trait Transport: Send + Sync {
    /// Send one request.
    fn send(&self, request: Request<Bytes>) -> TransportFuture;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(&self, request: Request<Bytes>) -> TransportFuture {
        (**self).send(request)
    }
}

/// A [`Transport`] backed by a closure.
///
/// Built with [`transport_fn`].
#[derive(Debug, Clone)]
pub struct TransportFn<F> {
    f: F,
}

/// Adapt a closure into a [`Transport`].
///
/// ```rust
/// use bytes::Bytes;
/// use http::Response;
/// use reqtap::transport_fn;
///
/// let transport = transport_fn(|_request| async {
///     Ok(Response::builder().status(204).body(Bytes::new())?)
/// });
/// # let _ = transport;
/// ```
pub fn transport_fn<F, Fut>(f: F) -> TransportFn<F>
where
    F: Fn(Request<Bytes>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Response<Bytes>, BoxError>> + Send + 'static,
{
    TransportFn { f }
}

impl<F, Fut> Transport for TransportFn<F>
where
    F: Fn(Request<Bytes>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Response<Bytes>, BoxError>> + Send + 'static,
{
    fn send(&self, request: Request<Bytes>) -> TransportFuture {
        Box::pin((self.f)(request))
    }
}
