//! Pipeline Configuration Module
//!
//! Input paths, record layouts, the pool search term and output settings,
//! loaded from TOML.
//!
//! ## Loading Order
//!
//! 1. `PRODMAP_CONFIG` environment variable (path to TOML file)
//! 2. `prodmap.toml` in the current working directory
//! 3. Built-in defaults (the standard extract layouts)
//!
//! Command-line flags are applied on top with [`PipelineConfig::apply`].

mod pipeline_config;
pub mod defaults;
pub mod validation;

pub use pipeline_config::*;
