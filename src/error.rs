//! Unified error type.

use std::path::PathBuf;

use thiserror::Error;

use crate::capability::Capability;

/// The error type returned by gatehouse's fallible operations.
///
/// Every variant is a startup-time failure: the process reports it once and
/// exits without serving. Request-level problems (a disallowed method, an
/// unknown path) are expressed as HTTP [`Response`](crate::Response) values
/// produced by the pipeline, never as `Error`s.
#[derive(Debug, Error)]
pub enum Error {
    /// A configuration file could not be read.
    #[error("cannot read configuration {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A configuration file was read but does not decode into the expected shape.
    #[error("malformed configuration {}: {message}", path.display())]
    ConfigFormat { path: PathBuf, message: String },

    /// No loadable unit is registered under the locator.
    #[error("module not found: {locator}")]
    ModuleNotFound { locator: String },

    /// The unit was loaded but does not export the well-known symbol.
    #[error("module {locator} does not export symbol `{symbol}`")]
    SymbolNotFound { locator: String, symbol: &'static str },

    /// The exported symbol exists but implements a different capability.
    #[error("module {locator}: `{symbol}` is a {found}, expected a {expected}")]
    CapabilityMismatch {
        locator: String,
        symbol: &'static str,
        expected: Capability,
        found: Capability,
    },

    /// A timeout value is not a non-negative integer number of seconds.
    #[error("invalid {field} `{value}`: expected a non-negative number of seconds")]
    InvalidTimeout { field: &'static str, value: String },

    /// Two routes claim the same path.
    #[error("path {path} is already registered")]
    DuplicateRoute { path: String },

    /// Binding the listen address or accepting a connection failed.
    #[error("listen: {0}")]
    Listen(#[from] std::io::Error),
}
