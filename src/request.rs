//! Incoming HTTP request type.

use std::net::SocketAddr;

use bytes::Bytes;
use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::Method;
use http_body_util::{BodyExt, Limited};

/// Largest request body buffered for a pipeline. Larger bodies get `413`.
pub const MAX_BODY_BYTES: usize = 4 * 1024 * 1024;

/// Error from reading a request body, boxed as [`Limited`] reports it.
pub(crate) type BodyError = Box<dyn std::error::Error + Send + Sync>;

/// The request context handed to every gate and controller in a pipeline.
///
/// The body is collected before the pipeline runs, so gates can inspect it
/// without coordinating ownership of a stream.
pub struct Request {
    method: Method,
    path: String,
    query: Option<String>,
    headers: HeaderMap,
    body: Bytes,
    remote_addr: Option<SocketAddr>,
}

impl Request {
    /// Builds a request by hand. Mostly useful for driving a pipeline in tests.
    pub fn new(method: Method, path: &str) -> Self {
        let (path, query) = match path.split_once('?') {
            Some((p, q)) => (p.to_owned(), Some(q.to_owned())),
            None => (path.to_owned(), None),
        };
        Self {
            method,
            path,
            query,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            remote_addr: None,
        }
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Collects at most `limit` body bytes and captures everything a
    /// pipeline may look at. Exceeding `limit` fails with
    /// [`LengthLimitError`](http_body_util::LengthLimitError).
    pub(crate) async fn from_hyper<B>(
        req: hyper::Request<B>,
        remote_addr: SocketAddr,
        limit: usize,
    ) -> Result<Self, BodyError>
    where
        B: hyper::body::Body,
        B::Error: Into<BodyError>,
    {
        let (parts, body) = req.into_parts();
        let body = Limited::new(body, limit).collect().await?.to_bytes();
        Ok(Self {
            method: parts.method,
            path: parts.uri.path().to_owned(),
            query: parts.uri.query().map(str::to_owned),
            headers: parts.headers,
            body,
            remote_addr: Some(remote_addr),
        })
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn query(&self) -> Option<&str> { self.query.as_deref() }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }
    pub fn remote_addr(&self) -> Option<SocketAddr> { self.remote_addr }

    /// Case-insensitive header lookup. Values that are not visible ASCII are skipped.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_query_from_path() {
        let req = Request::new(Method::GET, "/first?name=gigi");
        assert_eq!(req.path(), "/first");
        assert_eq!(req.query(), Some("name=gigi"));
    }

    fn hyper_request(body: &'static str) -> hyper::Request<http_body_util::Full<Bytes>> {
        hyper::Request::builder()
            .method(Method::POST)
            .uri("/upload?x=1")
            .body(http_body_util::Full::new(Bytes::from_static(body.as_bytes())))
            .unwrap()
    }

    fn peer() -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], 4000))
    }

    #[tokio::test]
    async fn collects_bodies_within_the_limit() {
        let req = Request::from_hyper(hyper_request("hello"), peer(), 5).await.unwrap();
        assert_eq!(req.body(), b"hello");
        assert_eq!(req.query(), Some("x=1"));
        assert_eq!(req.remote_addr(), Some(peer()));
    }

    #[tokio::test]
    async fn oversized_body_is_a_length_limit_error() {
        let err = Request::from_hyper(hyper_request("hello!"), peer(), 5).await.err().unwrap();
        assert!(err.is::<http_body_util::LengthLimitError>());
    }

    #[test]
    fn header_lookup_ignores_case() {
        let req = Request::new(Method::POST, "/")
            .with_header(http::header::CONTENT_TYPE, HeaderValue::from_static("text/plain"))
            .with_body("hi");
        assert_eq!(req.header("Content-Type"), Some("text/plain"));
        assert_eq!(req.body(), b"hi");
        assert!(req.remote_addr().is_none());
    }
}
