//! HTTP server, timeouts, and graceful shutdown.
//!
//! Startup is split in two so nothing is accepted before the route table is
//! complete:
//!
//! 1. [`Server::from_spec`] validates the bind address and timeouts.
//! 2. [`Server::listen`] binds the socket; [`Listener::serve`] then accepts
//!    connections against a finished [`Router`].
//!
//! # Timeouts
//!
//! | Setting | Bounds | On expiry |
//! |---|---|---|
//! | read | receiving request headers (HTTP/1 only) and the request body | connection closed |
//! | write | running the route's pipeline | connection closed, no response |
//!
//! A value of `0` disables the corresponding timeout. Bodies larger than
//! [`MAX_BODY_BYTES`] are refused with `413` whatever the timeouts.
//!
//! # Graceful shutdown
//!
//! On SIGTERM or Ctrl-C the server stops accepting, lets every in-flight
//! connection finish, and returns `Ok(())`.

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::StatusCode;
use http_body_util::{Full, LengthLimitError};
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo, TokioTimer};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::config::ServerSpec;
use crate::error::Error;
use crate::request::{MAX_BODY_BYTES, Request};
use crate::response::Response;
use crate::router::Router;

/// Read and write limits. `None` means unlimited.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Timeouts {
    pub read: Option<Duration>,
    pub write: Option<Duration>,
}

impl Timeouts {
    /// Parses the raw `readtimeout` / `writetimeout` seconds.
    pub fn parse(read: &str, write: &str) -> Result<Self, Error> {
        Ok(Self {
            read: seconds("readtimeout", read)?,
            write: seconds("writetimeout", write)?,
        })
    }
}

fn seconds(field: &'static str, raw: &str) -> Result<Option<Duration>, Error> {
    let secs: u64 = raw.parse().map_err(|_| Error::InvalidTimeout {
        field,
        value: raw.to_owned(),
    })?;
    Ok((secs > 0).then(|| Duration::from_secs(secs)))
}

/// A validated, not yet bound, server.
#[derive(Debug)]
pub struct Server {
    addr: String,
    timeouts: Timeouts,
}

impl Server {
    /// Validates the server section of the configuration.
    ///
    /// `:8080` is shorthand for every interface (`0.0.0.0:8080`).
    pub fn from_spec(spec: &ServerSpec) -> Result<Self, Error> {
        let timeouts = Timeouts::parse(&spec.read_timeout, &spec.write_timeout)?;
        let addr = match spec.bind_address.strip_prefix(':') {
            Some(port) => format!("0.0.0.0:{port}"),
            None => spec.bind_address.clone(),
        };
        Ok(Self { addr, timeouts })
    }

    /// Binds the listen address.
    pub async fn listen(self) -> Result<Listener, Error> {
        let listener = TcpListener::bind(self.addr.as_str()).await?;
        Ok(Listener { listener, timeouts: self.timeouts })
    }
}

/// A bound socket, ready to serve a finished route table.
pub struct Listener {
    listener: TcpListener,
    timeouts: Timeouts,
}

impl Listener {
    pub fn local_addr(&self) -> Result<SocketAddr, Error> {
        Ok(self.listener.local_addr()?)
    }

    /// Serves until SIGTERM or Ctrl-C, then drains in-flight connections.
    pub async fn serve(self, router: Router) -> Result<(), Error> {
        self.serve_with_shutdown(router, shutdown_signal()).await
    }

    /// Serves until `shutdown` resolves, then drains in-flight connections.
    ///
    /// A failure to accept is fatal: the error is returned and open
    /// connections are dropped.
    pub async fn serve_with_shutdown<S>(self, router: Router, shutdown: S) -> Result<(), Error>
    where
        S: Future<Output = ()>,
    {
        let addr = self.local_addr()?;
        let timeouts = self.timeouts;
        let router = Arc::new(router);

        info!(%addr, routes = router.len(), "gatehouse listening");

        let mut tasks = tokio::task::JoinSet::new();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;

                () = &mut shutdown => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = self.listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            return Err(Error::Listen(e));
                        }
                    };

                    let router = Arc::clone(&router);
                    let io = TokioIo::new(stream);

                    tasks.spawn(async move {
                        let svc = service_fn(move |req| {
                            let router = Arc::clone(&router);
                            async move { dispatch(router, timeouts, req, remote_addr).await }
                        });

                        let mut conn = ConnBuilder::new(TokioExecutor::new());
                        if let Some(limit) = timeouts.read {
                            conn.http1().timer(TokioTimer::new()).header_read_timeout(limit);
                        }
                        if let Err(e) = conn.serve_connection(io, svc).await {
                            warn!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        while tasks.join_next().await.is_some() {}

        info!("gatehouse stopped");
        Ok(())
    }
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Routes one request through its pipeline.
///
/// An `Err` makes hyper close the connection without answering; that is how
/// an exceeded timeout surfaces.
async fn dispatch(
    router: Arc<Router>,
    timeouts: Timeouts,
    req: hyper::Request<hyper::body::Incoming>,
    remote_addr: SocketAddr,
) -> Result<http::Response<Full<Bytes>>, io::Error> {
    let Some(pipeline) = router.lookup(req.uri().path()) else {
        return Ok(Response::error(StatusCode::NOT_FOUND).into_inner());
    };

    let req = match within(timeouts.read, Request::from_hyper(req, remote_addr, MAX_BODY_BYTES)).await? {
        Ok(req) => req,
        Err(e) if e.is::<LengthLimitError>() => {
            warn!(peer = %remote_addr, limit = MAX_BODY_BYTES, "request body too large");
            return Ok(Response::error(StatusCode::PAYLOAD_TOO_LARGE).into_inner());
        }
        Err(e) => {
            warn!(peer = %remote_addr, "cannot read request body: {e}");
            return Ok(Response::error(StatusCode::BAD_REQUEST).into_inner());
        }
    };

    let response = within(timeouts.write, pipeline.call(req)).await?;
    Ok(response.into_inner())
}

async fn within<F: Future>(limit: Option<Duration>, fut: F) -> io::Result<F::Output> {
    match limit {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "request timed out")),
        None => Ok(fut.await),
    }
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first SIGTERM or SIGINT (Ctrl-C only on non-Unix).
///
/// If a handler cannot be installed that signal is simply never observed.
pub(crate) async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("cannot install Ctrl-C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("cannot install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}
