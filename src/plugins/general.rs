//! Greeting controller.

use crate::capability::{Controller, Export};
use crate::endpoint::BoxFuture;
use crate::module::Module;
use crate::request::Request;
use crate::response::Response;

pub const LOCATOR: &str = "plugins/controllers/general";

/// Answers every request with a fixed greeting.
pub struct General;

impl Controller for General {
    fn fire(&self, _req: Request) -> BoxFuture {
        Box::pin(async { Response::text("Hello FROM CONTROLLER PLUGIN!!!") })
    }
}

pub fn load() -> Module {
    Module::new().export("Controller", Export::controller(General))
}
