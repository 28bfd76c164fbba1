//! Config validation: unknown-key detection with Levenshtein suggestions
//! and layout consistency checks.
//!
//! Two-pass parse approach: first deserialize raw TOML into `toml::Value`,
//! walk the key tree, compare against known field names, and emit warnings
//! with "did you mean?" suggestions. Then proceed with normal serde
//! deserialization. Warnings never break existing configs.

use super::defaults::EXPECTED_MAX_SLOTS;
use super::PipelineConfig;
use crate::acquisition::PositionalLayout;
use std::collections::HashSet;

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, ", did you mean '{s}'?")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Returns the complete set of valid dotted key paths for `PipelineConfig`.
///
/// Maintained by hand to match the structs in `pipeline_config.rs` and the
/// layouts in `acquisition::layout`.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [inputs]
        "inputs",
        "inputs.control",
        "inputs.history",
        "inputs.horizontal",
        "inputs.locations",
        // [layout]
        "layout",
        "layout.control",
        "layout.control.delimiter",
        "layout.control.trim",
        "layout.control.well_identifier",
        "layout.control.well_name",
        "layout.control.pool_code",
        "layout.control.pool_name",
        "layout.history",
        "layout.history.delimiter",
        "layout.history.trim",
        "layout.history.well_identifier",
        "layout.history.fluid_year",
        "layout.history.slots",
        "layout.horizontal",
        "layout.horizontal.delimiter",
        "layout.horizontal.uwi_column",
        "layout.locations",
        "layout.locations.delimiter",
        "layout.locations.uwi_column",
        "layout.locations.longitude_column",
        "layout.locations.latitude_column",
        "layout.locations.easting_column",
        "layout.locations.northing_column",
        // [filter]
        "filter",
        "filter.pool_search_term",
        "filter.seq_year_order",
        // [enrich]
        "enrich",
        "enrich.dedupe_metadata",
        // [output]
        "output",
        "output.summary",
        "output.filtered",
        "output.format",
        "output.radius",
    ];
    keys.iter().copied().collect()
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively walks a `toml::Value` tree and collects all dotted key paths.
///
/// For example, a table `{ a = { b = 1, c = 2 } }` yields:
/// `["a", "a.b", "a.c"]`
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

/// Compute the Levenshtein edit distance between two strings.
fn levenshtein(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    let b_len = b_chars.len();
    if a.is_empty() {
        return b_len;
    }
    if b_len == 0 {
        return a.chars().count();
    }

    let mut prev: Vec<usize> = (0..=b_len).collect();
    let mut curr = vec![0; b_len + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_len]
}

/// Suggest the closest known key for an unknown key, if within edit distance 3.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    known
        .iter()
        .map(|&k| (k, levenshtein(unknown, k)))
        .filter(|&(_, d)| d <= 3)
        .min_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)))
        .map(|(k, _)| k.to_string())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Parse a raw TOML string and return warnings for any unknown config keys.
///
/// This does NOT fail on unknown keys, it only warns.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    // parse errors are reported by serde later
    let Ok(value) = raw_toml.parse::<toml::Value>() else {
        return Vec::new();
    };

    let known = known_config_keys();
    walk_toml_keys(&value, "")
        .into_iter()
        .filter(|key| !known.contains(key.as_str()))
        .map(|key| ValidationWarning {
            suggestion: suggest_correction(&key, &known),
            message: format!("Unknown config key '{key}'"),
            field: key,
        })
        .collect()
}

// ============================================================================
// Layout Validation
// ============================================================================

fn check_delimiter(section: &str, delimiter: char, errors: &mut Vec<String>) {
    if !delimiter.is_ascii() {
        errors.push(format!(
            "layout.{section}.delimiter = {delimiter:?} must be a single ASCII character"
        ));
    }
}

fn check_column_name(field: &str, name: &str, errors: &mut Vec<String>) {
    if name.trim().is_empty() {
        errors.push(format!("{field} must not be empty"));
    }
}

/// Validate layouts and filter values on a parsed `PipelineConfig`.
///
/// Returns (errors, warnings). Errors are layouts no extract could satisfy
/// and stop the run; warnings are unusual but workable.
pub fn validate_layouts(config: &PipelineConfig) -> (Vec<String>, Vec<ValidationWarning>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let layout = &config.layout;

    layout.control.check_positions("control", &mut errors);
    layout.history.check_positions("history", &mut errors);

    check_delimiter("control", layout.control.delimiter, &mut errors);
    check_delimiter("history", layout.history.delimiter, &mut errors);
    check_delimiter("horizontal", layout.horizontal.delimiter, &mut errors);
    check_delimiter("locations", layout.locations.delimiter, &mut errors);

    check_column_name(
        "layout.horizontal.uwi_column",
        &layout.horizontal.uwi_column,
        &mut errors,
    );
    for (field, name) in [
        ("uwi_column", &layout.locations.uwi_column),
        ("longitude_column", &layout.locations.longitude_column),
        ("latitude_column", &layout.locations.latitude_column),
        ("easting_column", &layout.locations.easting_column),
        ("northing_column", &layout.locations.northing_column),
    ] {
        check_column_name(&format!("layout.locations.{field}"), name, &mut errors);
    }

    if layout.history.slots.is_empty() {
        errors.push("layout.history.slots must list at least one [code, volume] pair".to_string());
    } else if layout.history.slots.len() > EXPECTED_MAX_SLOTS {
        warnings.push(ValidationWarning {
            field: "layout.history.slots".to_string(),
            message: format!(
                "layout.history.slots has {} pairs; history extracts normally carry {EXPECTED_MAX_SLOTS}",
                layout.history.slots.len()
            ),
            suggestion: None,
        });
    }

    if config.filter.pool_search_term.is_empty() {
        warnings.push(ValidationWarning {
            field: "filter.pool_search_term".to_string(),
            message: "filter.pool_search_term is empty; every pool will match".to_string(),
            suggestion: None,
        });
    }

    (errors, warnings)
}

// ============================================================================
// Tests
// ============================================================================
