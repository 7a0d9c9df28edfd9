//! Kubernetes health-check controllers.
//!
//! | Locator | Probe | Body |
//! |---|---|---|
//! | `plugins/controllers/healthz` | liveness | `ok` |
//! | `plugins/controllers/readyz` | readiness | `ready` |
//!
//! Readiness is only reachable once every route has been registered and the
//! listener is up, so a fixed answer is enough.

use crate::capability::{Controller, Export};
use crate::endpoint::BoxFuture;
use crate::module::Module;
use crate::request::Request;
use crate::response::Response;

pub const LIVENESS: &str = "plugins/controllers/healthz";
pub const READINESS: &str = "plugins/controllers/readyz";

pub struct Liveness;

impl Controller for Liveness {
    fn fire(&self, _req: Request) -> BoxFuture {
        Box::pin(async { Response::text("ok") })
    }
}

pub struct Readiness;

impl Controller for Readiness {
    fn fire(&self, _req: Request) -> BoxFuture {
        Box::pin(async { Response::text("ready") })
    }
}

pub fn load_liveness() -> Module {
    Module::new().export("Controller", Export::controller(Liveness))
}

pub fn load_readiness() -> Module {
    Module::new().export("Controller", Export::controller(Readiness))
}
