//! Gate chains and pipeline folding.
//!
//! # Execution order
//!
//! [`build`] folds gates around the controller in declaration order:
//!
//! ```text
//! middlewares: [g1, g2, g3]
//! pipeline   = g3(g2(g1(controller)))
//! request    → g3 → g2 → g1 → controller
//! ```
//!
//! The **last** declared middleware is the outermost and sees the request
//! first; the first declared one runs immediately before the controller.
//! Existing route files depend on this order. Keep it.

use tracing::debug;

use crate::capability::Gate;
use crate::config::MiddlewareSpec;
use crate::endpoint::BoxedEndpoint;
use crate::error::Error;
use crate::module::Resolver;

/// Resolves each middleware spec and instantiates its gate with the spec's
/// params. The output preserves input order. The first failing spec aborts.
pub fn compose(specs: &[MiddlewareSpec], resolver: &mut Resolver) -> Result<Vec<Gate>, Error> {
    specs
        .iter()
        .map(|spec| {
            let factory = resolver.middleware(&spec.locator)?;
            debug!(locator = %spec.locator, params = %spec.params, "gate created");
            Ok(factory.pass(&spec.params))
        })
        .collect()
}

/// Wraps `handler` in each gate, in list order, and returns the outermost function.
pub fn build<I>(handler: BoxedEndpoint, gates: I) -> BoxedEndpoint
where
    I: IntoIterator<Item = Gate>,
{
    gates.into_iter().fold(handler, |current, gate| gate.apply(current))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use http::{Method, StatusCode};

    use super::*;
    use crate::capability::{Export, MiddlewareFactory};
    use crate::endpoint::endpoint_fn;
    use crate::module::Module;
    use crate::request::Request;
    use crate::response::Response;

    type Trail = Arc<Mutex<Vec<String>>>;

    fn recording_gate(name: &'static str, trail: &Trail) -> Gate {
        let trail = Arc::clone(trail);
        Gate::new(move |next: BoxedEndpoint| {
            let trail = Arc::clone(&trail);
            endpoint_fn(move |req: Request| {
                trail.lock().unwrap().push(name.to_owned());
                next.call(req)
            })
        })
    }

    fn recording_handler(trail: &Trail) -> BoxedEndpoint {
        let trail = Arc::clone(trail);
        endpoint_fn(move |_req: Request| {
            trail.lock().unwrap().push("handler".to_owned());
            async { Response::text("OK") }
        })
    }

    #[tokio::test]
    async fn last_declared_gate_runs_first() {
        let trail = Trail::default();
        let gates = ["g1", "g2", "g3"].map(|n| recording_gate(n, &trail));

        let pipeline = build(recording_handler(&trail), gates);
        let res = pipeline.call(Request::new(Method::GET, "/")).await;

        assert_eq!(res.body(), b"OK");
        assert_eq!(*trail.lock().unwrap(), ["g3", "g2", "g1", "handler"]);
    }

    #[tokio::test]
    async fn no_gates_is_the_handler_itself() {
        let trail = Trail::default();
        let handler = recording_handler(&trail);
        let pipeline = build(Arc::clone(&handler), Vec::new());

        assert!(Arc::ptr_eq(&pipeline, &handler));
        pipeline.call(Request::new(Method::GET, "/")).await;
        assert_eq!(*trail.lock().unwrap(), ["handler"]);
    }

    #[tokio::test]
    async fn short_circuiting_gate_hides_inner_stages() {
        let trail = Trail::default();
        let deny = Gate::new(|_next| endpoint_fn(|_req: Request| async { StatusCode::FORBIDDEN }));
        let gates = vec![recording_gate("inner", &trail), deny];

        let res = build(recording_handler(&trail), gates)
            .call(Request::new(Method::GET, "/"))
            .await;

        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        assert!(trail.lock().unwrap().is_empty());
    }

    struct Tag;

    impl MiddlewareFactory for Tag {
        fn pass(&self, params: &str) -> Gate {
            let tag = params.to_owned();
            Gate::new(move |next: BoxedEndpoint| {
                let tag = tag.clone();
                endpoint_fn(move |req: Request| {
                    let next = Arc::clone(&next);
                    let tag = tag.clone();
                    async move {
                        let inner = next.call(req).await;
                        let body = String::from_utf8_lossy(inner.body()).into_owned();
                        Response::text(format!("{tag}({body})"))
                    }
                })
            })
        }
    }

    fn tag_module() -> Module {
        Module::new().export("Middleware", Export::middleware(Tag))
    }

    fn spec(locator: &str, params: &str) -> MiddlewareSpec {
        MiddlewareSpec { locator: locator.to_owned(), params: params.to_owned() }
    }

    #[tokio::test]
    async fn compose_keeps_declaration_order_and_params() {
        let mut resolver = Resolver::empty().with_loader("units/tag", tag_module);
        let specs = [spec("units/tag", "a"), spec("units/tag", "b")];

        let gates = compose(&specs, &mut resolver).unwrap();
        let handler = endpoint_fn(|_req: Request| async { "h" });
        let res = build(handler, gates).call(Request::new(Method::GET, "/")).await;

        assert_eq!(res.body(), b"b(a(h))");
    }

    #[test]
    fn compose_stops_at_first_unresolvable_spec() {
        let mut resolver = Resolver::empty().with_loader("units/tag", tag_module);
        let specs = [spec("units/missing", ""), spec("units/tag", "a")];

        let err = compose(&specs, &mut resolver).unwrap_err();

        assert!(matches!(err, Error::ModuleNotFound { .. }));
        assert!(!resolver.is_loaded("units/tag"));
    }
}
