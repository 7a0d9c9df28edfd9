//! Per-request tracing middleware.
//!
//! Opens an `http_request` span carrying method, path, and the params label,
//! then logs status and latency once the wrapped function has answered.
//! Declare it last on a route to time the whole chain.

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, info_span, Instrument};

use crate::capability::{Export, Gate, MiddlewareFactory};
use crate::endpoint::{BoxFuture, BoxedEndpoint, Endpoint};
use crate::module::Module;
use crate::request::Request;

pub const LOCATOR: &str = "plugins/middlewares/trace";

pub struct Trace;

impl MiddlewareFactory for Trace {
    fn pass(&self, params: &str) -> Gate {
        let label: Arc<str> = Arc::from(params);
        Gate::new(move |next| {
            Arc::new(Traced { label: Arc::clone(&label), next }) as BoxedEndpoint
        })
    }
}

struct Traced {
    label: Arc<str>,
    next: BoxedEndpoint,
}

impl Endpoint for Traced {
    fn call(&self, req: Request) -> BoxFuture {
        let span = info_span!(
            "http_request",
            label = %self.label,
            method = %req.method(),
            path = %req.path(),
        );
        let inner = span.in_scope(|| self.next.call(req));

        Box::pin(
            async move {
                let started = Instant::now();
                let res = inner.await;
                info!(
                    status = res.status().as_u16(),
                    latency_us = started.elapsed().as_micros() as u64,
                    "request served"
                );
                res
            }
            .instrument(span),
        )
    }
}

pub fn load() -> Module {
    Module::new().export("Middleware", Export::middleware(Trace))
}
