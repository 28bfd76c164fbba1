//! Pipeline Configuration - input paths, record layouts, filter and output
//!
//! Every section implements `Default` with the values the extracts are
//! normally delivered with, so a run with no config file still works
//! against the standard layout.

use super::defaults;
use crate::acquisition::{ControlLayout, HistoryLayout, HorizontalLayout, LocationLayout};
use crate::export::OutputFormat;
use crate::pipeline::summary::SeqYearOrder;
use crate::types::RadiusField;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for one pipeline run.
///
/// Load with `PipelineConfig::load()` which searches:
/// 1. `$PRODMAP_CONFIG` env var
/// 2. `./prodmap.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Paths of the four input extracts
    #[serde(default)]
    pub inputs: InputsConfig,

    /// Column layout of each input
    #[serde(default)]
    pub layout: LayoutConfig,

    /// Pool selection and row sequencing
    #[serde(default)]
    pub filter: FilterConfig,

    /// Metadata join behavior
    #[serde(default)]
    pub enrich: EnrichConfig,

    /// Output destinations and format
    #[serde(default)]
    pub output: OutputConfig,
}

impl PipelineConfig {
    /// Load configuration using the standard search order:
    /// 1. `$PRODMAP_CONFIG` environment variable
    /// 2. `./prodmap.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        // 1. Check env var
        if let Ok(path) = std::env::var(defaults::CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), pool = %config.filter.pool_search_term, "Loaded config from PRODMAP_CONFIG");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from PRODMAP_CONFIG, falling back");
                    }
                }
            } else {
                warn!(path = %path, "PRODMAP_CONFIG points to non-existent file, falling back");
            }
        }

        // 2. Check ./prodmap.toml
        let local = PathBuf::from(defaults::LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!(pool = %config.filter.pool_search_term, "Loaded config from ./prodmap.toml");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./prodmap.toml, using defaults");
                }
            }
        }

        // 3. Defaults
        info!("No prodmap.toml found, using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, inner) => ConfigError::Parse(path.to_path_buf(), inner),
            other => other,
        })
    }

    /// Parse and validate a TOML document.
    ///
    /// Unknown keys are logged as warnings; they never fail the load.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }
        let config: Self =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(PathBuf::new(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Reject impossible layouts; log suspicious values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (errors, warnings) = super::validation::validate_layouts(self);
        for w in &warnings {
            warn!("{}", w);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Apply command-line overrides on top of the loaded file.
    pub fn apply(&mut self, overrides: RunOverrides) {
        let RunOverrides {
            control,
            history,
            horizontal,
            locations,
            pool,
            summary,
            filtered,
            format,
            radius,
        } = overrides;
        if let Some(p) = control {
            self.inputs.control = p;
        }
        if let Some(p) = history {
            self.inputs.history = p;
        }
        if let Some(p) = horizontal {
            self.inputs.horizontal = p;
        }
        if let Some(p) = locations {
            self.inputs.locations = p;
        }
        if let Some(term) = pool {
            self.filter.pool_search_term = term;
        }
        if let Some(p) = summary {
            self.output.summary = p;
        }
        if filtered.is_some() {
            self.output.filtered = filtered;
        }
        if let Some(f) = format {
            self.output.format = f;
        }
        if let Some(r) = radius {
            self.output.radius = r;
        }
    }
}

/// Values given on the command line; `None` keeps the configured value.
#[derive(Debug, Clone, Default)]
pub struct RunOverrides {
    pub control: Option<PathBuf>,
    pub history: Option<PathBuf>,
    pub horizontal: Option<PathBuf>,
    pub locations: Option<PathBuf>,
    pub pool: Option<String>,
    pub summary: Option<PathBuf>,
    pub filtered: Option<PathBuf>,
    pub format: Option<OutputFormat>,
    pub radius: Option<RadiusField>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config I/O error ({}): {1}", .0.display())]
    Io(PathBuf, #[source] std::io::Error),
    #[error("Config parse error ({}): {1}", .0.display())]
    Parse(PathBuf, #[source] toml::de::Error),
    #[error("Config serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation failed:\n  - {}", .0.join("\n  - "))]
    Validation(Vec<String>),
}

// ============================================================================
// Sections
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputsConfig {
    /// Headerless well control extract
    pub control: PathBuf,
    /// Headerless production history extract
    pub history: PathBuf,
    /// Horizontal-well list with a header row
    pub horizontal: PathBuf,
    /// Bottom-hole location table with a header row
    pub locations: PathBuf,
}

impl Default for InputsConfig {
    fn default() -> Self {
        Self {
            control: PathBuf::from(defaults::CONTROL_PATH),
            history: PathBuf::from(defaults::HISTORY_PATH),
            horizontal: PathBuf::from(defaults::HORIZONTAL_PATH),
            locations: PathBuf::from(defaults::LOCATIONS_PATH),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub control: ControlLayout,
    pub history: HistoryLayout,
    pub horizontal: HorizontalLayout,
    pub locations: LocationLayout,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Case-sensitive substring matched against the pool name
    pub pool_search_term: String,
    pub seq_year_order: SeqYearOrder,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            pool_search_term: defaults::POOL_SEARCH_TERM.to_string(),
            seq_year_order: SeqYearOrder::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichConfig {
    /// Keep the first metadata row per key instead of fanning out
    pub dedupe_metadata: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub summary: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filtered: Option<PathBuf>,
    pub format: OutputFormat,
    pub radius: RadiusField,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            summary: PathBuf::from(defaults::SUMMARY_PATH),
            filtered: None,
            format: OutputFormat::default(),
            radius: RadiusField::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_default_layout_positions() {
        let c = PipelineConfig::default();
        assert_eq!(c.layout.control.well_identifier, 2);
        assert_eq!(c.layout.control.pool_name, 13);
        assert_eq!(c.layout.history.fluid_year, 3);
        assert_eq!(c.layout.history.slots.len(), 8);
        assert_eq!(c.layout.history.slots[7].volume, 167);
    }

    #[test]
    fn test_toml_roundtrip_preserves_values() {
        let mut c = PipelineConfig::default();
        c.filter.pool_search_term = "CARDIUM".to_string();
        c.output.filtered = Some(PathBuf::from("out/rows.csv"));
        c.output.format = OutputFormat::Json;
        let text = c.to_toml().unwrap();
        let back = PipelineConfig::from_toml_str(&text).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let c = PipelineConfig::from_toml_str(
            r#"
[filter]
pool_search_term = "BLUESKY"
seq_year_order = "fluid_year"
"#,
        )
        .unwrap();
        assert_eq!(c.filter.pool_search_term, "BLUESKY");
        assert_eq!(c.filter.seq_year_order, SeqYearOrder::FluidYear);
        assert_eq!(c.inputs, InputsConfig::default());
    }

    #[test]
    fn test_slots_parse_as_pairs() {
        let c = PipelineConfig::from_toml_str(
            r#"
[layout.history]
slots = [[10, 11], [12, 13]]
"#,
        )
        .unwrap();
        assert_eq!(c.layout.history.slots.len(), 2);
        assert_eq!(c.layout.history.slots[1].code, 12);
    }

    #[test]
    fn test_zero_position_rejected() {
        let err = PipelineConfig::from_toml_str("[layout.control]\npool_name = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("pool_name"));
    }

    #[test]
    fn test_overrides_replace_only_given_values() {
        let mut c = PipelineConfig::default();
        c.apply(RunOverrides {
            pool: Some("MANNVILLE".to_string()),
            format: Some(OutputFormat::Json),
            ..RunOverrides::default()
        });
        assert_eq!(c.filter.pool_search_term, "MANNVILLE");
        assert_eq!(c.output.format, OutputFormat::Json);
        assert_eq!(c.inputs, InputsConfig::default());
    }
}
