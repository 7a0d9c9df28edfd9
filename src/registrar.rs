//! Turns route specs into registered pipelines.

use tracing::info;

use crate::capability::controller_endpoint;
use crate::chain;
use crate::config::RouteSpec;
use crate::endpoint::BoxedEndpoint;
use crate::error::Error;
use crate::module::Resolver;
use crate::router::Router;

/// Resolves, composes, and builds one pipeline per route, in list order, and
/// hands each to `register`.
///
/// Any failure stops the walk immediately. Paths are passed through exactly
/// as configured, duplicates included; rejecting them is `register`'s call.
pub fn register<F>(routes: &[RouteSpec], resolver: &mut Resolver, mut register: F) -> Result<(), Error>
where
    F: FnMut(&str, BoxedEndpoint) -> Result<(), Error>,
{
    for route in routes {
        let controller = resolver.controller(&route.handler_locator)?;
        let gates = chain::compose(&route.middlewares, resolver)?;
        let pipeline = chain::build(controller_endpoint(controller), gates);

        register(&route.path, pipeline)?;
        info!(
            path = %route.path,
            controller = %route.handler_locator,
            middlewares = route.middlewares.len(),
            "route registered"
        );
    }
    Ok(())
}

/// Builds the complete route table, or nothing.
pub fn build_router(routes: &[RouteSpec], resolver: &mut Resolver) -> Result<Router, Error> {
    let mut router = Router::new();
    register(routes, resolver, |path, pipeline| router.route(path, pipeline))?;
    Ok(router)
}

#[cfg(test)]
mod tests {
    use http::{Method, StatusCode};

    use super::*;
    use crate::config::MiddlewareSpec;
    use crate::request::Request;

    fn route(path: &str, controller: &str, middlewares: &[(&str, &str)]) -> RouteSpec {
        RouteSpec {
            path: path.to_owned(),
            handler_locator: controller.to_owned(),
            middlewares: middlewares
                .iter()
                .map(|(l, p)| MiddlewareSpec { locator: (*l).to_owned(), params: (*p).to_owned() })
                .collect(),
        }
    }

    #[test]
    fn registers_in_list_order_and_passes_duplicates_through() {
        let routes = [
            route("/b", "plugins/controllers/general", &[]),
            route("/a", "plugins/controllers/healthz", &[]),
            route("/b", "plugins/controllers/readyz", &[]),
        ];
        let mut seen = Vec::new();

        register(&routes, &mut Resolver::new(), |path, _| {
            seen.push(path.to_owned());
            Ok(())
        })
        .unwrap();

        assert_eq!(seen, ["/b", "/a", "/b"]);
    }

    #[test]
    fn first_failure_aborts_remaining_routes() {
        let routes = [
            route("/ok", "plugins/controllers/general", &[]),
            route("/broken", "plugins/controllers/general", &[("plugins/middlewares/nope", "")]),
            route("/never", "plugins/controllers/general", &[]),
        ];
        let mut seen = Vec::new();

        let err = register(&routes, &mut Resolver::new(), |path, _| {
            seen.push(path.to_owned());
            Ok(())
        })
        .unwrap_err();

        assert!(matches!(err, Error::ModuleNotFound { locator } if locator == "plugins/middlewares/nope"));
        assert_eq!(seen, ["/ok"]);
    }

    #[test]
    fn router_refuses_duplicate_paths() {
        let routes = [
            route("/first", "plugins/controllers/general", &[]),
            route("/first", "plugins/controllers/general", &[]),
        ];
        let err = build_router(&routes, &mut Resolver::new()).err().unwrap();
        assert!(matches!(err, Error::DuplicateRoute { .. }));
    }

    #[tokio::test]
    async fn method_filtered_route_answers_per_method() {
        let routes = [route(
            "/first",
            "plugins/controllers/general",
            &[("plugins/middlewares/method.so", "GET|POST")],
        )];
        let router = build_router(&routes, &mut Resolver::new()).unwrap();
        let pipeline = router.lookup("/first").unwrap();

        let res = pipeline.call(Request::new(Method::GET, "/first")).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.body(), b"Hello FROM CONTROLLER PLUGIN!!!");

        let res = pipeline.call(Request::new(Method::DELETE, "/first")).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(res.body(), b"Bad Request");
    }
}
