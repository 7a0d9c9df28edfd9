//! Built-in loadable units.
//!
//! Configuration may name them with or without the `.so` suffix.

use crate::module::ModuleDescriptor;

pub mod general;
pub mod health;
pub mod method;
pub mod templates;
pub mod trace;

/// Registration table for the units shipped with gatehouse.
pub static BUILTIN: &[ModuleDescriptor] = &[
    ModuleDescriptor { locator: general::LOCATOR, load: general::load },
    ModuleDescriptor { locator: templates::LOCATOR, load: templates::load },
    ModuleDescriptor { locator: health::LIVENESS, load: health::load_liveness },
    ModuleDescriptor { locator: health::READINESS, load: health::load_readiness },
    ModuleDescriptor { locator: method::LOCATOR, load: method::load },
    ModuleDescriptor { locator: trace::LOCATOR, load: trace::load },
];
