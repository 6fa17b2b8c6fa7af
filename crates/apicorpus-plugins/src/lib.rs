//! apicorpus-plugins
//!
//! Conversion and validation are collaborators of the collection pipeline:
//! the pipeline only knows the [`Converter`] and [`Validator`] traits and
//! looks implementations up in a [`PluginRegistry`] by source format.
//!
//! Built-in plugins (behind the default `builtin` feature) cover documents
//! that are already OpenAPI 3 or Swagger 2 JSON and a structural validator.

pub mod plugin;
pub mod registry;
pub mod spec;

#[cfg(feature = "builtin")]
pub mod builtin;

pub use crate::plugin::{Converted, ConversionInput, Converter, ValidationReport, Validator};
pub use crate::registry::{PluginRegistry, RegistryError};
pub use crate::spec::{PluginId, PluginSpec};
