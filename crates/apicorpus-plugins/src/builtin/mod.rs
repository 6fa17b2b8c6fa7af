//! Built-in plugins.

pub mod converters;
pub mod validator;

use crate::registry::{PluginRegistry, RegistryError};
use crate::spec::PluginSpec;

use self::converters::{Family, PassThroughConverter};
use self::validator::StructuralValidator;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Register every built-in plugin.
pub fn register_builtins(reg: &mut PluginRegistry) -> Result<(), RegistryError> {
    reg.register_converter(
        PluginSpec::new("builtin.openapi_3", "OpenAPI 3 pass-through", VERSION)
            .format("openapi_3")
            .meta("family", "openapi"),
        Box::new(PassThroughConverter::new(Family::OpenApi3)),
    )?;
    reg.register_converter(
        PluginSpec::new("builtin.swagger_2", "Swagger 2 pass-through", VERSION)
            .format("swagger_2")
            .meta("family", "swagger"),
        Box::new(PassThroughConverter::new(Family::Swagger2)),
    )?;
    reg.register_converter(
        PluginSpec::new("builtin.json", "JSON (auto-detect)", VERSION).format("json"),
        Box::new(PassThroughConverter::new(Family::Detect)),
    )?;
    reg.register_validator(
        PluginSpec::new("builtin.structural", "Structural validator", VERSION),
        Box::new(StructuralValidator),
    )?;
    Ok(())
}

/// A registry holding only the built-in plugins.
pub fn builtin_registry() -> Result<PluginRegistry, RegistryError> {
    let mut reg = PluginRegistry::new();
    register_builtins(&mut reg)?;
    Ok(reg)
}
