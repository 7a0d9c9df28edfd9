//! Capability contracts a loadable unit can export.
//!
//! There are exactly two roles, and a unit declares which one each of its
//! symbols plays by the [`Export`] variant it stores:
//!
//! | Capability | Symbol | Operation |
//! |---|---|---|
//! | [`Capability::Controller`] | `"Controller"` | [`Controller::fire`] produces the response |
//! | [`Capability::Middleware`] | `"Middleware"` | [`MiddlewareFactory::pass`] turns a params blob into a [`Gate`] |

use std::fmt;
use std::sync::Arc;

use crate::endpoint::{BoxFuture, BoxedEndpoint, Endpoint};
use crate::request::Request;

/// Terminal request handler of a route.
pub trait Controller: Send + Sync + 'static {
    fn fire(&self, req: Request) -> BoxFuture;
}

/// Builds gates from the opaque `params` string configured on a route.
///
/// `pass` cannot fail. A gate that dislikes its params reports that at
/// request time by answering with an error response.
pub trait MiddlewareFactory: Send + Sync + 'static {
    fn pass(&self, params: &str) -> Gate;
}

/// A transformation from one request function to another.
///
/// A gate may call the function it wraps, call it conditionally, or answer
/// on its own without calling it at all.
#[derive(Clone)]
pub struct Gate(Arc<dyn Fn(BoxedEndpoint) -> BoxedEndpoint + Send + Sync>);

impl Gate {
    pub fn new<F>(wrap: F) -> Self
    where
        F: Fn(BoxedEndpoint) -> BoxedEndpoint + Send + Sync + 'static,
    {
        Self(Arc::new(wrap))
    }

    /// Wraps `next`, returning the function that now runs in its place.
    pub fn apply(&self, next: BoxedEndpoint) -> BoxedEndpoint {
        (self.0)(next)
    }
}

impl fmt::Debug for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Gate")
    }
}

/// Which contract a caller expects an export to satisfy.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Capability {
    Controller,
    Middleware,
}

impl Capability {
    /// The well-known symbol name a unit exports this capability under.
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Controller => "Controller",
            Self::Middleware => "Middleware",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Controller => "controller",
            Self::Middleware => "middleware factory",
        })
    }
}

/// A symbol exported by a loadable unit, tagged with its capability.
#[derive(Clone)]
pub enum Export {
    Controller(Arc<dyn Controller>),
    Middleware(Arc<dyn MiddlewareFactory>),
}

impl Export {
    pub fn controller(c: impl Controller) -> Self {
        Self::Controller(Arc::new(c))
    }

    pub fn middleware(m: impl MiddlewareFactory) -> Self {
        Self::Middleware(Arc::new(m))
    }

    pub fn capability(&self) -> Capability {
        match self {
            Self::Controller(_) => Capability::Controller,
            Self::Middleware(_) => Capability::Middleware,
        }
    }
}

/// Adapts a controller so it can sit at the bottom of a pipeline.
pub(crate) fn controller_endpoint(controller: Arc<dyn Controller>) -> BoxedEndpoint {
    Arc::new(ControllerEndpoint(controller))
}

struct ControllerEndpoint(Arc<dyn Controller>);

impl Endpoint for ControllerEndpoint {
    fn call(&self, req: Request) -> BoxFuture {
        self.0.fire(req)
    }
}
