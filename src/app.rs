//! Startup sequence.

use std::future::Future;

use tracing::info;

use crate::config::Config;
use crate::error::Error;
use crate::module::Resolver;
use crate::registrar;
use crate::server::{shutdown_signal, Server};

/// Starts the dispatcher and serves until SIGTERM or Ctrl-C.
pub async fn run(config: Config, resolver: &mut Resolver) -> Result<(), Error> {
    run_until(config, resolver, shutdown_signal()).await
}

/// Validates the server settings, builds every route, binds, and serves
/// until `shutdown` resolves.
///
/// Nothing is bound until every route has resolved, so a broken route
/// leaves the port closed.
pub async fn run_until<S>(config: Config, resolver: &mut Resolver, shutdown: S) -> Result<(), Error>
where
    S: Future<Output = ()>,
{
    let server = Server::from_spec(&config.server)?;
    let router = registrar::build_router(&config.routes, resolver)?;
    info!(routes = router.len(), "route table complete");

    server.listen().await?.serve_with_shutdown(router, shutdown).await
}
