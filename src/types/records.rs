//! Record types flowing through the production pipeline
//!
//! Raw records are what the readers decode from the extracts. Everything
//! downstream of reshape is immutable once produced; each stage builds a new
//! table rather than writing columns in place.

use super::fluid::FluidVolumes;
use serde::{Deserialize, Serialize};

// ============================================================================
// Raw Inputs
// ============================================================================

/// Kept attributes of one control-extract row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawControlRecord {
    /// Opaque fixed-width identifier, unique per well completion
    pub well_identifier: String,
    pub well_name: String,
    pub pool_code: String,
    /// Pool / formation name, already sanitized
    pub pool_name: String,
}

/// One `(fluid code, fluid volume)` slot pair of a history row.
///
/// An unused slot has no code.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FluidSlot {
    pub code: Option<i32>,
    pub volume: Option<f64>,
}

impl FluidSlot {
    pub const fn new(code: Option<i32>, volume: Option<f64>) -> Self {
        Self { code, volume }
    }
}

/// One history-extract row: a well's reporting year with its repeated slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawHistoryRecord {
    pub well_identifier: String,
    pub fluid_year: i32,
    /// Slots in declared column order
    pub slots: Vec<FluidSlot>,
}

/// A row of the horizontal-well list. Presence means horizontal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HorizontalWell {
    pub uwi: String,
}

/// Bottom-hole coordinates. Every component is nullable.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BottomHole {
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub easting: Option<f64>,
    pub northing: Option<f64>,
}

impl BottomHole {
    pub const fn is_empty(&self) -> bool {
        self.longitude.is_none()
            && self.latitude.is_none()
            && self.easting.is_none()
            && self.northing.is_none()
    }
}

/// A row of the bottom-hole location table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BottomHoleLocation {
    pub uwi: String,
    pub location: BottomHole,
}

// ============================================================================
// Reshaped / Enriched
// ============================================================================

/// Long-format production row produced by the reshaper.
///
/// Keyed by the raw well identifier: normalization to a UWI happens after
/// the control join.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionRecord {
    pub well_identifier: String,
    pub fluid_year: i32,
    pub volumes: FluidVolumes,
}

/// Production row after the control join and before UWI normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlJoinedRecord {
    pub production: ProductionRecord,
    pub well_name: Option<String>,
    pub pool_code: Option<String>,
    pub pool_name: Option<String>,
}

/// Fully enriched production row, keyed by `(uwi, fluid_year)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedProductionRecord {
    pub uwi: String,
    pub fluid_year: i32,
    pub volumes: FluidVolumes,
    pub well_name: Option<String>,
    pub pool_code: Option<String>,
    pub pool_name: Option<String>,
    /// `Some(true)` when listed as horizontal; `None` when no match.
    pub horizontal: Option<bool>,
    pub bottom_hole: BottomHole,
}

impl EnrichedProductionRecord {
    /// An absent flag reads as not horizontal.
    pub const fn is_horizontal(&self) -> bool {
        matches!(self.horizontal, Some(true))
    }
}

/// Filtered row with its per-well sequential year index (1-based).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequencedRecord {
    pub seq_year: u32,
    pub record: EnrichedProductionRecord,
}

// ============================================================================
// Summary
// ============================================================================

/// Which normalized radius the map renderer sizes markers by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RadiusField {
    #[default]
    Oil,
    Gas,
    LiquidGas,
}

impl std::fmt::Display for RadiusField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Oil => f.write_str("oil"),
            Self::Gas => f.write_str("gas"),
            Self::LiquidGas => f.write_str("liquid_gas"),
        }
    }
}

impl std::str::FromStr for RadiusField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "oil" => Ok(Self::Oil),
            "gas" => Ok(Self::Gas),
            "liquid_gas" | "liquid-gas" | "lpg" => Ok(Self::LiquidGas),
            other => Err(format!("unknown radius field '{other}' (expected oil, gas or liquid_gas)")),
        }
    }
}

/// Per-well summary within a pool match, ready for map rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WellSummary {
    pub uwi: String,
    pub well_name: Option<String>,
    pub pool_name: Option<String>,
    pub horizontal: Option<bool>,
    pub year_min: i32,
    pub year_max: i32,
    pub oil_prod: Option<f64>,
    pub gas_prod: Option<f64>,
    pub liquid_gas_prod: Option<f64>,
    /// Per-component minimum across the well's rows
    pub bottom_hole: BottomHole,
    pub rad_oil: Option<f64>,
    pub rad_gas: Option<f64>,
    pub rad_liquid_gas: Option<f64>,
}

impl WellSummary {
    pub const fn radius(&self, field: RadiusField) -> Option<f64> {
        match field {
            RadiusField::Oil => self.rad_oil,
            RadiusField::Gas => self.rad_gas,
            RadiusField::LiquidGas => self.rad_liquid_gas,
        }
    }

    /// Popup text shown by the map renderer for this well.
    pub fn popup(&self) -> String {
        fn vol(v: Option<f64>) -> String {
            v.map_or_else(|| "n/a".to_string(), |x| format!("{x:.1}"))
        }
        format!(
            "UWI: {} | Years: {}-{} | Oil: {} | Gas: {} | Liquid gas: {}",
            self.uwi,
            self.year_min,
            self.year_max,
            vol(self.oil_prod),
            vol(self.gas_prod),
            vol(self.liquid_gas_prod),
        )
    }
}
