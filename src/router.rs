//! Exact-path route table.
//!
//! One pipeline per path, matched byte-for-byte against the request path,
//! whatever the method. Method policy belongs to the pipeline's gates.

use std::collections::HashMap;
use std::sync::Arc;

use crate::endpoint::BoxedEndpoint;
use crate::error::Error;

/// The route table handed to [`Listener::serve`](crate::Listener::serve).
///
/// Built once at startup and read-only afterwards.
#[derive(Default)]
pub struct Router {
    routes: HashMap<String, BoxedEndpoint>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches `pipeline` to `path`. A path can be registered only once.
    pub fn route(&mut self, path: &str, pipeline: BoxedEndpoint) -> Result<(), Error> {
        if self.routes.contains_key(path) {
            return Err(Error::DuplicateRoute { path: path.to_owned() });
        }
        self.routes.insert(path.to_owned(), pipeline);
        Ok(())
    }

    pub fn len(&self) -> usize { self.routes.len() }
    pub fn is_empty(&self) -> bool { self.routes.is_empty() }

    pub(crate) fn lookup(&self, path: &str) -> Option<BoxedEndpoint> {
        self.routes.get(path).map(Arc::clone)
    }
}
