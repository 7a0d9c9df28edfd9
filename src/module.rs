//! Loadable units and the resolver that locates them.
//!
//! A unit is a `fn() -> Module` that builds its symbol table, registered
//! under a locator. Units shipped with gatehouse live in
//! [`plugins::BUILTIN`](crate::plugins::BUILTIN); other crates linked into
//! the binary contribute theirs to the [`MODULES`] distributed slice:
//!
//! ```rust,ignore
//! use gatehouse::{Export, Module, ModuleDescriptor, MODULES};
//! use linkme::distributed_slice;
//!
//! #[distributed_slice(MODULES)]
//! static GREETING: ModuleDescriptor = ModuleDescriptor {
//!     locator: "acme/controllers/greeting",
//!     load: || Module::new().export("Controller", Export::controller(Greeting)),
//! };
//! ```
//!
//! The [`Resolver`] caches every loaded unit by locator, so a unit shared by
//! many routes is loaded exactly once.

use std::collections::HashMap;
use std::sync::Arc;

use linkme::distributed_slice;
use tracing::debug;

use crate::capability::{Capability, Controller, Export, MiddlewareFactory};
use crate::error::Error;
use crate::plugins;

/// Builds a unit's symbol table. Called at most once per locator per resolver.
pub type LoadFn = fn() -> Module;

/// Static registration entry for a loadable unit.
pub struct ModuleDescriptor {
    pub locator: &'static str,
    pub load: LoadFn,
}

/// Units contributed by other crates linked into the binary.
#[distributed_slice]
pub static MODULES: [ModuleDescriptor];

/// A loaded unit: its exported symbols keyed by name.
#[derive(Default)]
pub struct Module {
    symbols: HashMap<&'static str, Export>,
}

impl Module {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an exported symbol. Returns `self` for chaining.
    pub fn export(mut self, symbol: &'static str, export: Export) -> Self {
        self.symbols.insert(symbol, export);
        self
    }

    pub fn lookup(&self, symbol: &str) -> Option<&Export> {
        self.symbols.get(symbol)
    }
}

/// Locates units by locator, loads them once, and hands out typed exports.
///
/// Resolution happens during the sequential startup phase, hence `&mut self`
/// and no interior locking.
pub struct Resolver {
    loaders: HashMap<String, LoadFn>,
    loaded: HashMap<String, Arc<Module>>,
}

impl Resolver {
    /// A resolver over the built-in units plus every unit in [`MODULES`].
    /// A [`MODULES`] entry replaces a built-in with the same locator.
    pub fn new() -> Self {
        plugins::BUILTIN
            .iter()
            .chain(MODULES.iter())
            .fold(Self::empty(), |r, d| r.with_loader(d.locator, d.load))
    }

    /// A resolver that knows no units.
    pub fn empty() -> Self {
        Self { loaders: HashMap::new(), loaded: HashMap::new() }
    }

    /// Registers (or replaces) the loader for `locator`.
    pub fn with_loader(mut self, locator: &str, load: LoadFn) -> Self {
        self.loaders.insert(normalize(locator).to_owned(), load);
        self
    }

    /// Whether the unit behind `locator` has already been loaded.
    pub fn is_loaded(&self, locator: &str) -> bool {
        self.loaded.contains_key(normalize(locator))
    }

    /// Returns the unit behind `locator`, loading it on first use.
    pub fn load(&mut self, locator: &str) -> Result<Arc<Module>, Error> {
        let key = normalize(locator);
        if let Some(module) = self.loaded.get(key) {
            return Ok(Arc::clone(module));
        }

        let load = self.loaders.get(key).copied().ok_or_else(|| Error::ModuleNotFound {
            locator: locator.to_owned(),
        })?;
        let module = Arc::new(load());
        debug!(locator = %key, symbols = module.symbols.len(), "module loaded");

        self.loaded.insert(key.to_owned(), Arc::clone(&module));
        Ok(module)
    }

    /// Loads `locator` and returns the export for `capability`'s well-known
    /// symbol, checking that it really implements that capability.
    pub fn resolve(&mut self, locator: &str, capability: Capability) -> Result<Export, Error> {
        let module = self.load(locator)?;
        let symbol = capability.symbol();
        let export = module.lookup(symbol).ok_or_else(|| Error::SymbolNotFound {
            locator: locator.to_owned(),
            symbol,
        })?;

        let found = export.capability();
        if found != capability {
            return Err(Error::CapabilityMismatch {
                locator: locator.to_owned(),
                symbol,
                expected: capability,
                found,
            });
        }
        Ok(export.clone())
    }

    pub fn controller(&mut self, locator: &str) -> Result<Arc<dyn Controller>, Error> {
        match self.resolve(locator, Capability::Controller)? {
            Export::Controller(c) => Ok(c),
            Export::Middleware(_) => unreachable!("capability checked by resolve"),
        }
    }

    pub fn middleware(&mut self, locator: &str) -> Result<Arc<dyn MiddlewareFactory>, Error> {
        match self.resolve(locator, Capability::Middleware)? {
            Export::Middleware(m) => Ok(m),
            Export::Controller(_) => unreachable!("capability checked by resolve"),
        }
    }
}

impl Default for Resolver {
    fn default() -> Self { Self::new() }
}

/// Strips a leading `./` and a trailing shared-object extension so locators
/// written as plugin file paths name the same unit.
fn normalize(locator: &str) -> &str {
    let locator = locator.trim_start_matches("./");
    [".so", ".dylib", ".dll"]
        .iter()
        .find_map(|ext| locator.strip_suffix(ext))
        .unwrap_or(locator)
}
