//! prodmap: Well Production Mapping Pipeline
//!
//! Turns provincial production extracts into a per-well, map-ready summary
//! for one pool or formation.
//!
//! ## Architecture
//!
//! - **Acquisition**: declarative column layouts and CSV readers for the four extracts
//! - **Pipeline**: fluid unpivot, reshape, metadata enrichment, pool filter and aggregation
//! - **Export**: CSV or JSON output for the map renderer
//! - **Config**: TOML configuration with unknown-key warnings

pub mod acquisition;
pub mod config;
pub mod export;
pub mod pipeline;
pub mod types;

// Re-export configuration
pub use config::{ConfigError, PipelineConfig, RunOverrides};

// Re-export commonly used types
pub use types::{
    BottomHole, EnrichedProductionRecord, FluidCategory, FluidVolumes, ProductionRecord,
    RadiusField, SequencedRecord, WellSummary,
};

// Re-export pipeline entry points
pub use acquisition::IngestError;
pub use export::{ExportError, OutputFormat};
pub use pipeline::{run, run_tables, InputTables, PipelineOutput, PipelineReport};
