//! # gatehouse
//!
//! A configuration-driven HTTP dispatcher. Each configured route names a
//! controller and an ordered list of middleware by *locator*; gatehouse
//! resolves them from the units compiled into the binary, folds the
//! middleware gates around the controller, and serves the resulting
//! pipeline on an exact path.
//!
//! ## Startup
//!
//! ```text
//! server.json + routes.json
//!        ↓ Config::load
//! Resolver ── controller / middleware lookups, each unit loaded once
//!        ↓ registrar::build_router
//! Router   ── one pipeline per path, all or nothing
//!        ↓ Server::from_spec → listen → serve
//! ```
//!
//! Every startup failure is an [`Error`]; nothing is served unless every
//! route resolved.
//!
//! ## Middleware order
//!
//! Gates are applied in declaration order, so the **last** declared
//! middleware runs **first**. See [`chain`].
//!
//! ## Writing a unit
//!
//! ```rust
//! use gatehouse::{Export, Gate, MiddlewareFactory, Module, Resolver};
//!
//! fn load() -> Module {
//!     Module::new().export("Middleware", Export::middleware(Noop))
//! }
//!
//! struct Noop;
//!
//! impl MiddlewareFactory for Noop {
//!     fn pass(&self, _params: &str) -> Gate {
//!         Gate::new(|next| next)
//!     }
//! }
//!
//! let mut resolver = Resolver::new().with_loader("units/noop", load);
//! assert!(resolver.middleware("units/noop").is_ok());
//! ```

mod capability;
mod endpoint;
mod error;
mod request;
mod response;
mod router;
mod server;

pub mod app;
pub mod chain;
pub mod config;
pub mod logging;
pub mod module;
pub mod plugins;
pub mod registrar;

pub use capability::{Capability, Controller, Export, Gate, MiddlewareFactory};
pub use config::{Config, MiddlewareSpec, RouteSpec, ServerSpec};
pub use endpoint::{endpoint_fn, BoxFuture, BoxedEndpoint, Endpoint};
pub use error::Error;
pub use module::{Module, ModuleDescriptor, Resolver, MODULES};
pub use request::{MAX_BODY_BYTES, Request};
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::{Listener, Server, Timeouts};
