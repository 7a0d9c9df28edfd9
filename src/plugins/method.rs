//! Method filter middleware.
//!
//! Params are `|`-separated method names, e.g. `GET|POST`. Requests whose
//! method matches one of them exactly (case-sensitive) go on down the chain;
//! everything else is answered with `400 Bad Request`.

use std::sync::Arc;

use http::StatusCode;

use crate::capability::{Export, Gate, MiddlewareFactory};
use crate::endpoint::{BoxFuture, BoxedEndpoint, Endpoint};
use crate::module::Module;
use crate::request::Request;
use crate::response::Response;

pub const LOCATOR: &str = "plugins/middlewares/method";

pub struct Method;

impl MiddlewareFactory for Method {
    fn pass(&self, params: &str) -> Gate {
        let accepted: Arc<[String]> = params.split('|').map(str::to_owned).collect();
        Gate::new(move |next| {
            Arc::new(MethodFilter { accepted: Arc::clone(&accepted), next }) as BoxedEndpoint
        })
    }
}

struct MethodFilter {
    accepted: Arc<[String]>,
    next: BoxedEndpoint,
}

impl Endpoint for MethodFilter {
    fn call(&self, req: Request) -> BoxFuture {
        if self.accepted.iter().any(|m| m == req.method().as_str()) {
            return self.next.call(req);
        }
        Box::pin(async { Response::error(StatusCode::BAD_REQUEST) })
    }
}

pub fn load() -> Module {
    Module::new().export("Middleware", Export::middleware(Method))
}

#[cfg(test)]
mod tests {
    use crate::endpoint::endpoint_fn;

    use super::*;

    fn filtered(params: &str) -> BoxedEndpoint {
        let handler = endpoint_fn(|_req: Request| async { "OK" });
        Method.pass(params).apply(handler)
    }

    #[tokio::test]
    async fn listed_methods_reach_the_handler() {
        let ep = filtered("GET|POST");
        for method in [http::Method::GET, http::Method::POST] {
            let res = ep.call(Request::new(method, "/")).await;
            assert_eq!(res.status(), StatusCode::OK);
            assert_eq!(res.body(), b"OK");
        }
    }

    #[tokio::test]
    async fn other_methods_get_bad_request() {
        let ep = filtered("GET|POST");
        for method in [http::Method::DELETE, http::Method::HEAD] {
            let res = ep.call(Request::new(method, "/")).await;
            assert_eq!(res.status(), StatusCode::BAD_REQUEST);
            assert_eq!(res.body(), b"Bad Request");
        }
    }

    #[tokio::test]
    async fn names_are_case_sensitive() {
        let res = filtered("get").call(Request::new(http::Method::GET, "/")).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn empty_params_accept_nothing() {
        let res = filtered("").call(Request::new(http::Method::GET, "/")).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
