//! Declarative record layouts for the four input extracts
//!
//! The control and history extracts are headerless: their columns are
//! addressed by fixed 1-indexed positions. Those positions live here, in
//! one place, as data. Readers only ever ask a layout for a [`ColumnSpec`]
//! and never hard-code a position themselves.
//!
//! The two metadata CSVs carry a header row and are addressed by column name.

use crate::config::defaults;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// Column Descriptors
// ============================================================================

/// Value type stored in a positional column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    Integer,
    Decimal,
}

/// One positional column: name used in diagnostics, 1-indexed position, type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: String,
    pub position: usize,
    pub kind: ValueKind,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, position: usize, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            position,
            kind,
        }
    }

    /// 0-based index into a decoded record. Position 0 is rejected by
    /// validation; it saturates here rather than underflowing.
    pub const fn index(&self) -> usize {
        self.position.saturating_sub(1)
    }
}

/// A layout that can describe its positional columns.
pub trait PositionalLayout {
    fn columns(&self) -> Vec<ColumnSpec>;

    /// Highest referenced position; a record shorter than this is malformed.
    fn max_position(&self) -> usize {
        self.columns().iter().map(|c| c.position).max().unwrap_or(0)
    }

    /// Collect structural problems (zero or repeated positions).
    fn check_positions(&self, section: &str, errors: &mut Vec<String>) {
        let mut seen: HashMap<usize, String> = HashMap::new();
        for col in self.columns() {
            if col.position == 0 {
                errors.push(format!(
                    "layout.{section}.{} position must be >= 1 (positions are 1-indexed)",
                    col.name
                ));
                continue;
            }
            if let Some(prev) = seen.insert(col.position, col.name.clone()) {
                errors.push(format!(
                    "layout.{section}: position {} used by both {prev} and {}",
                    col.position, col.name
                ));
            }
        }
    }
}

// ============================================================================
// Control Extract
// ============================================================================

/// Positions of the kept columns in the control extract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlLayout {
    pub delimiter: char,
    /// Strip surrounding whitespace from every field before decoding
    pub trim: bool,
    pub well_identifier: usize,
    pub well_name: usize,
    pub pool_code: usize,
    pub pool_name: usize,
}

impl Default for ControlLayout {
    fn default() -> Self {
        Self {
            delimiter: '\t',
            trim: true,
            well_identifier: 2,
            well_name: 3,
            pool_code: 12,
            pool_name: 13,
        }
    }
}

impl ControlLayout {
    pub fn well_identifier_col(&self) -> ColumnSpec {
        ColumnSpec::new("well_identifier", self.well_identifier, ValueKind::Text)
    }

    pub fn well_name_col(&self) -> ColumnSpec {
        ColumnSpec::new("well_name", self.well_name, ValueKind::Text)
    }

    pub fn pool_code_col(&self) -> ColumnSpec {
        ColumnSpec::new("pool_code", self.pool_code, ValueKind::Text)
    }

    pub fn pool_name_col(&self) -> ColumnSpec {
        ColumnSpec::new("pool_name", self.pool_name, ValueKind::Text)
    }
}

impl PositionalLayout for ControlLayout {
    fn columns(&self) -> Vec<ColumnSpec> {
        vec![
            self.well_identifier_col(),
            self.well_name_col(),
            self.pool_code_col(),
            self.pool_name_col(),
        ]
    }
}

// ============================================================================
// History Extract
// ============================================================================

/// Positions of one `(fluid code, fluid volume)` slot pair.
///
/// Serialized as a two-element array: `[code, volume]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[usize; 2]", into = "[usize; 2]")]
pub struct SlotColumns {
    pub code: usize,
    pub volume: usize,
}

impl From<[usize; 2]> for SlotColumns {
    fn from([code, volume]: [usize; 2]) -> Self {
        Self { code, volume }
    }
}

impl From<SlotColumns> for [usize; 2] {
    fn from(s: SlotColumns) -> Self {
        [s.code, s.volume]
    }
}

/// Positions of the kept columns in the history extract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryLayout {
    pub delimiter: char,
    pub trim: bool,
    pub well_identifier: usize,
    pub fluid_year: usize,
    /// Repeated slot pairs, in the order the unpivot visits them
    pub slots: Vec<SlotColumns>,
}

impl Default for HistoryLayout {
    fn default() -> Self {
        Self {
            delimiter: '\t',
            trim: true,
            well_identifier: 2,
            fluid_year: 3,
            slots: defaults::HISTORY_SLOT_POSITIONS
                .iter()
                .map(|&pair| SlotColumns::from(pair))
                .collect(),
        }
    }
}

impl HistoryLayout {
    pub fn well_identifier_col(&self) -> ColumnSpec {
        ColumnSpec::new("well_identifier", self.well_identifier, ValueKind::Text)
    }

    pub fn fluid_year_col(&self) -> ColumnSpec {
        ColumnSpec::new("fluid_year", self.fluid_year, ValueKind::Integer)
    }

    /// Code and volume column specs for slot `n` (0-based).
    pub fn slot_cols(&self, n: usize) -> Option<(ColumnSpec, ColumnSpec)> {
        let slot = self.slots.get(n)?;
        Some((
            ColumnSpec::new(format!("slot{}_code", n + 1), slot.code, ValueKind::Integer),
            ColumnSpec::new(format!("slot{}_volume", n + 1), slot.volume, ValueKind::Decimal),
        ))
    }
}

impl PositionalLayout for HistoryLayout {
    fn columns(&self) -> Vec<ColumnSpec> {
        let mut cols = vec![self.well_identifier_col(), self.fluid_year_col()];
        for n in 0..self.slots.len() {
            if let Some((code, volume)) = self.slot_cols(n) {
                cols.push(code);
                cols.push(volume);
            }
        }
        cols
    }
}

// ============================================================================
// Header-Named CSVs
// ============================================================================

/// Header names in the horizontal-well list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HorizontalLayout {
    pub delimiter: char,
    pub uwi_column: String,
}

impl Default for HorizontalLayout {
    fn default() -> Self {
        Self {
            delimiter: ',',
            uwi_column: "Well Uwi Formatted".to_string(),
        }
    }
}

/// Header names in the bottom-hole location table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationLayout {
    pub delimiter: char,
    pub uwi_column: String,
    pub longitude_column: String,
    pub latitude_column: String,
    pub easting_column: String,
    pub northing_column: String,
}

impl Default for LocationLayout {
    fn default() -> Self {
        Self {
            delimiter: ',',
            uwi_column: "UWI".to_string(),
            longitude_column: "BH_Long".to_string(),
            latitude_column: "BH_Lat".to_string(),
            easting_column: "BH_Easting".to_string(),
            northing_column: "BH_Northing".to_string(),
        }
    }
}

impl LocationLayout {
    pub fn required_columns(&self) -> [&str; 5] {
        [
            self.uwi_column.as_str(),
            self.longitude_column.as_str(),
            self.latitude_column.as_str(),
            self.easting_column.as_str(),
            self.northing_column.as_str(),
        ]
    }
}
