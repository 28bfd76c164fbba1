//! System-wide default constants.
//!
//! Fixed positions, default paths and radius constants in one place.
//! Grouped by subsystem for easy discovery.

// ============================================================================
// Configuration Search
// ============================================================================

/// Environment variable naming a config file.
pub const CONFIG_ENV_VAR: &str = "PRODMAP_CONFIG";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "prodmap.toml";

// ============================================================================
// Inputs
// ============================================================================

pub const CONTROL_PATH: &str = "data/control.txt";
pub const HISTORY_PATH: &str = "data/history.txt";
pub const HORIZONTAL_PATH: &str = "data/horizontal.csv";
pub const LOCATIONS_PATH: &str = "data/bottom_hole.csv";

/// `(code, volume)` column positions of the eight history slots, 1-indexed.
pub const HISTORY_SLOT_POSITIONS: [[usize; 2]; 8] = [
    [54, 55],
    [70, 71],
    [86, 87],
    [102, 103],
    [118, 119],
    [134, 135],
    [150, 151],
    [166, 167],
];

/// Slot counts above this are accepted with a warning.
pub const EXPECTED_MAX_SLOTS: usize = 8;

// ============================================================================
// Filter
// ============================================================================

pub const POOL_SEARCH_TERM: &str = "VIKING";

// ============================================================================
// Output
// ============================================================================

pub const SUMMARY_PATH: &str = "out/well_summary.csv";
pub const FILTERED_PATH: &str = "out/filtered.csv";

/// Upper end of the normalized radius range.
pub const RADIUS_SCALE: f64 = 1000.0;

/// Added to `min(radius) / 2` for wells with no oil.
pub const OIL_ABSENT_RADIUS_OFFSET: f64 = 1.0;

/// Added to `min(radius) / 2` for wells with no gas.
pub const GAS_ABSENT_RADIUS_OFFSET: f64 = 0.0;

/// Added to `min(radius) / 2` for wells with no liquid gas.
pub const LIQUID_GAS_ABSENT_RADIUS_OFFSET: f64 = 0.0;
