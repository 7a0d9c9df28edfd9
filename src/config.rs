//! Server and route configuration.
//!
//! Two files drive a deployment. The server file:
//!
//! ```json
//! { "listento": ":8080", "readtimeout": "30", "writetimeout": "30" }
//! ```
//!
//! and the routes file, whose `middlewares` order is significant (see
//! [`chain`](crate::chain) for how it maps to execution order):
//!
//! ```json
//! { "endpoints": [
//!     { "path": "/first",
//!       "controller": "plugins/controllers/general.so",
//!       "middlewares": [ { "handler": "plugins/middlewares/method.so", "params": "GET|POST" } ] }
//! ] }
//! ```
//!
//! Either file may also be YAML; the format is picked from the extension.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

use crate::error::Error;

/// Listener settings. Timeouts stay raw text until the server parses them.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct ServerSpec {
    #[serde(rename = "listento")]
    pub bind_address: String,
    #[serde(rename = "readtimeout", deserialize_with = "raw_text")]
    pub read_timeout: String,
    #[serde(rename = "writetimeout", deserialize_with = "raw_text")]
    pub write_timeout: String,
}

/// The routes file.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
pub struct RoutesSpec {
    #[serde(default)]
    pub endpoints: Vec<RouteSpec>,
}

/// One exact path, its controller, and the middleware wrapped around it.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct RouteSpec {
    pub path: String,
    #[serde(rename = "controller")]
    pub handler_locator: String,
    #[serde(default)]
    pub middlewares: Vec<MiddlewareSpec>,
}

/// A middleware unit and the opaque params handed to its factory.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct MiddlewareSpec {
    #[serde(rename = "handler")]
    pub locator: String,
    #[serde(default)]
    pub params: String,
}

/// Everything needed to start the dispatcher.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    pub server: ServerSpec,
    pub routes: Vec<RouteSpec>,
}

impl Config {
    /// Reads the server file and the routes file.
    pub fn load(server: &Path, routes: &Path) -> Result<Self, Error> {
        let server: ServerSpec = load(server)?;
        let routes: RoutesSpec = load(routes)?;
        Ok(Self { server, routes: routes.endpoints })
    }
}

/// Encoding of a configuration file.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    /// `.yaml` / `.yml` are YAML; anything else is treated as JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Self::Yaml
            }
            _ => Self::Json,
        }
    }
}

/// Reads and decodes one configuration file.
pub fn load<T: DeserializeOwned>(path: &Path) -> Result<T, Error> {
    let text = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
        path: path.to_owned(),
        source,
    })?;
    parse(Format::from_path(path), &text, path)
}

/// Decodes configuration text. `origin` only labels errors.
pub fn parse<T: DeserializeOwned>(format: Format, text: &str, origin: &Path) -> Result<T, Error> {
    let decoded = match format {
        Format::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
        Format::Yaml => serde_yaml::from_str(text).map_err(|e| e.to_string()),
    };
    decoded.map_err(|message| Error::ConfigFormat { path: origin.to_owned(), message })
}

/// Accepts `"30"` as well as `30`, keeping the value as written.
fn raw_text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
    }

    Ok(match Raw::deserialize(d)? {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
    })
}
