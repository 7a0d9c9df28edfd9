//! Request functions and type erasure.
//!
//! Every stage of a pipeline has the same shape: it takes a [`Request`] and
//! eventually yields a [`Response`]. Controllers, the functions a gate wraps,
//! the functions a gate returns, and the finished pipeline are all stored as
//! a [`BoxedEndpoint`] so they can be nested to any depth.
//!
//! ```text
//! |req| async { … }                          ← closure or async fn
//!        ↓ endpoint_fn(f)
//! Arc::new(FnEndpoint(f))                     ← heap-allocated wrapper
//!        ↓ stored as BoxedEndpoint = Arc<dyn Endpoint>
//! endpoint.call(req)  at request time         ← one vtable dispatch
//!        ↓
//! Box::pin(async { f(req).await.into_response() })
//! ```
//!
//! Endpoints are shared by every in-flight request on a route. They must be
//! stateless or synchronise their own state; the dispatcher holds no locks.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// A heap-allocated, type-erased future that resolves to a [`Response`].
pub type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// A request-processing function.
pub trait Endpoint: Send + Sync + 'static {
    fn call(&self, req: Request) -> BoxFuture;
}

/// A type-erased endpoint shared across concurrent requests.
pub type BoxedEndpoint = Arc<dyn Endpoint>;

/// Wraps an async closure or `async fn` as a [`BoxedEndpoint`].
///
/// ```rust
/// use gatehouse::{endpoint_fn, Request};
///
/// let hello = endpoint_fn(|_req: Request| async { "hello" });
/// ```
pub fn endpoint_fn<F, Fut, R>(f: F) -> BoxedEndpoint
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    Arc::new(FnEndpoint(f))
}

struct FnEndpoint<F>(F);

impl<F, Fut, R> Endpoint for FnEndpoint<F>
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_response() })
    }
}

#[cfg(test)]
mod tests {
    use http::{Method, StatusCode};

    use super::*;

    #[tokio::test]
    async fn closure_output_is_converted() {
        let ep = endpoint_fn(|req: Request| async move {
            if req.method() == Method::GET { StatusCode::NO_CONTENT } else { StatusCode::GONE }
        });
        let res = ep.call(Request::new(Method::GET, "/")).await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
    }
}
