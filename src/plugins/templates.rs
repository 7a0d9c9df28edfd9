//! Template-rendering controller.
//!
//! Reads `views/example.html` (relative to the working directory) on every
//! request and renders it with [`tera`], autoescaping on, exposing the page
//! data as `{{ name }}`. A missing or broken template is a `500`, logged, not
//! a startup failure.

use std::path::{Path, PathBuf};

use http::StatusCode;
use tera::{Context, Tera};
use tracing::error;

use crate::capability::{Controller, Export};
use crate::endpoint::BoxFuture;
use crate::module::Module;
use crate::request::Request;
use crate::response::Response;

pub const LOCATOR: &str = "plugins/controllers/templates";

pub struct Templates {
    template: PathBuf,
    name: &'static str,
}

impl Templates {
    pub fn new(template: impl AsRef<Path>, name: &'static str) -> Self {
        Self { template: template.as_ref().to_owned(), name }
    }
}

impl Controller for Templates {
    fn fire(&self, _req: Request) -> BoxFuture {
        let template = self.template.clone();
        let name = self.name;
        Box::pin(async move {
            let text = match tokio::fs::read_to_string(&template).await {
                Ok(text) => text,
                Err(e) => {
                    error!(template = %template.display(), "cannot read template: {e}");
                    return Response::error(StatusCode::INTERNAL_SERVER_ERROR);
                }
            };
            match render(&text, name) {
                Ok(page) => Response::html(page),
                Err(e) => {
                    error!(template = %template.display(), "cannot render template: {e}");
                    Response::error(StatusCode::INTERNAL_SERVER_ERROR)
                }
            }
        })
    }
}

fn render(template: &str, name: &str) -> tera::Result<String> {
    let mut ctx = Context::new();
    ctx.insert("name", name);
    Tera::one_off(template, &ctx, true)
}

pub fn load() -> Module {
    Module::new().export(
        "Controller",
        Export::controller(Templates::new("views/example.html", "Programmer")),
    )
}

#[cfg(test)]
mod tests {
    use http::Method;

    use super::*;

    #[test]
    fn escapes_the_substituted_value() {
        let page = render("<b>{{ name }}</b>", "<Tom & \"Jerry\">").unwrap();
        assert_eq!(page, "<b>&lt;Tom &amp; &quot;Jerry&quot;&gt;</b>");
    }

    #[test]
    fn spacing_inside_the_action_does_not_matter() {
        assert_eq!(render("<h1>{{name}}</h1>", "Programmer").unwrap(), "<h1>Programmer</h1>");
        assert_eq!(render("<h1>{{  name  }}</h1>", "Programmer").unwrap(), "<h1>Programmer</h1>");
    }

    #[test]
    fn syntax_errors_are_reported() {
        assert!(render("<h1>{{ name </h1>", "Programmer").is_err());
    }

    #[tokio::test]
    async fn renders_the_bundled_view() {
        let res = Templates::new("views/example.html", "Programmer")
            .fire(Request::new(Method::GET, "/"))
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = std::str::from_utf8(res.body()).unwrap();
        assert!(body.contains("Hello, Programmer!"));
        assert!(!body.contains("{{"));
    }

    #[tokio::test]
    async fn missing_template_is_a_server_error() {
        let res = Templates::new("views/missing.html", "x")
            .fire(Request::new(Method::GET, "/"))
            .await;
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
