//! Pool filter and per-well aggregation
//!
//! Selects the rows whose pool name contains a search term, numbers each
//! well's rows, and rolls every well up into a [`WellSummary`] carrying
//! three min-max normalized marker radii.
//!
//! Radius rules, per fluid and independently:
//!
//! - `radius = (value - min) / (max - min) * 1000` over wells with a value
//! - a well with no value gets `min(radius) / 2 + offset`, where the offset
//!   is 1 for oil and 0 for gas and liquid gas
//! - when every well has the same value the range is zero and the radii are
//!   NaN; this is reported, not corrected, and wells with no value get a
//!   NaN fallback as well

use crate::config::defaults::{
    GAS_ABSENT_RADIUS_OFFSET, LIQUID_GAS_ABSENT_RADIUS_OFFSET, OIL_ABSENT_RADIUS_OFFSET,
    RADIUS_SCALE,
};
use crate::types::{
    BottomHole, EnrichedProductionRecord, RawControlRecord, SequencedRecord, WellSummary,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{info, warn};

// ============================================================================
// Options
// ============================================================================

/// How `seq_year` is assigned within a well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeqYearOrder {
    /// Order rows appear in after filtering
    #[default]
    Appearance,
    /// Ascending fluid year, ties kept in appearance order
    FluidYear,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryOptions {
    pub seq_year_order: SeqYearOrder,
}

// ============================================================================
// Normalization Outcome
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizationOutcome {
    #[default]
    Normal,
    /// max == min; radii are non-finite
    Degenerate,
    /// No well had a value for this fluid
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct FluidNormalization {
    pub outcome: NormalizationOutcome,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Absent radii replaced by the fallback rule
    pub replaced: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct NormalizationReport {
    pub oil: FluidNormalization,
    pub gas: FluidNormalization,
    pub liquid_gas: FluidNormalization,
}

/// Filtered long table, per-well summaries and normalization outcomes.
#[derive(Debug, Clone, Default)]
pub struct PoolSummary {
    pub filtered: Vec<SequencedRecord>,
    pub wells: Vec<WellSummary>,
    pub normalization: NormalizationReport,
}

// ============================================================================
// Filter + Sequence
// ============================================================================

/// Case-sensitive, unanchored substring match on pool name.
pub fn matches_pool(record: &EnrichedProductionRecord, pattern: &str) -> bool {
    record
        .pool_name
        .as_deref()
        .is_some_and(|name| name.contains(pattern))
}

/// Distinct pool names in the control extract with their row counts,
/// optionally limited to names containing `contains`.
pub fn pool_counts(control: &[RawControlRecord], contains: Option<&str>) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for c in control {
        if contains.is_none_or(|term| c.pool_name.contains(term)) {
            *counts.entry(c.pool_name.as_str()).or_insert(0) += 1;
        }
    }
    counts
        .into_iter()
        .map(|(name, n)| (name.to_string(), n))
        .collect()
}

pub fn filter_pool(records: &[EnrichedProductionRecord], pattern: &str) -> Vec<EnrichedProductionRecord> {
    records
        .iter()
        .filter(|r| matches_pool(r, pattern))
        .cloned()
        .collect()
}

/// Number each well's rows 1..n. Output keeps the input row order.
pub fn sequence(records: Vec<EnrichedProductionRecord>, order: SeqYearOrder) -> Vec<SequencedRecord> {
    let mut seq = vec![0u32; records.len()];
    match order {
        SeqYearOrder::Appearance => {
            let mut counters: HashMap<&str, u32> = HashMap::new();
            for (i, r) in records.iter().enumerate() {
                let n = counters.entry(r.uwi.as_str()).or_insert(0);
                *n += 1;
                seq[i] = *n;
            }
        }
        SeqYearOrder::FluidYear => {
            let mut by_well: HashMap<&str, Vec<usize>> = HashMap::new();
            for (i, r) in records.iter().enumerate() {
                by_well.entry(r.uwi.as_str()).or_default().push(i);
            }
            for rows in by_well.values_mut() {
                rows.sort_by_key(|&i| records[i].fluid_year);
                for (n, &i) in (1u32..).zip(rows.iter()) {
                    seq[i] = n;
                }
            }
        }
    }
    records
        .into_iter()
        .zip(seq)
        .map(|(record, seq_year)| SequencedRecord { seq_year, record })
        .collect()
}

// ============================================================================
// Aggregation
// ============================================================================

/// Sum of present values; `None` when every input is absent.
pub fn sum_present(values: impl IntoIterator<Item = Option<f64>>) -> Option<f64> {
    values
        .into_iter()
        .flatten()
        .fold(None, |acc, v| Some(acc.unwrap_or(0.0) + v))
}

fn min_present(acc: Option<f64>, v: Option<f64>) -> Option<f64> {
    match (acc, v) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

#[derive(Debug, Default)]
struct WellAcc {
    year_min: i32,
    year_max: i32,
    oil: Option<f64>,
    gas: Option<f64>,
    liquid_gas: Option<f64>,
    bottom_hole: BottomHole,
    horizontal: Option<bool>,
    well_name: Option<String>,
    pool_name: Option<String>,
}

impl WellAcc {
    fn new(r: &EnrichedProductionRecord) -> Self {
        Self {
            year_min: r.fluid_year,
            year_max: r.fluid_year,
            ..Self::default()
        }
    }

    fn add(&mut self, r: &EnrichedProductionRecord) {
        self.year_min = self.year_min.min(r.fluid_year);
        self.year_max = self.year_max.max(r.fluid_year);
        self.oil = sum_present([self.oil, r.volumes.oil()]);
        self.gas = sum_present([self.gas, r.volumes.gas()]);
        self.liquid_gas = sum_present([self.liquid_gas, r.volumes.liquid_gas()]);

        let bh = &mut self.bottom_hole;
        bh.longitude = min_present(bh.longitude, r.bottom_hole.longitude);
        bh.latitude = min_present(bh.latitude, r.bottom_hole.latitude);
        bh.easting = min_present(bh.easting, r.bottom_hole.easting);
        bh.northing = min_present(bh.northing, r.bottom_hole.northing);

        if r.is_horizontal() {
            self.horizontal = Some(true);
        }
        if self.well_name.is_none() {
            self.well_name.clone_from(&r.well_name);
        }
        if self.pool_name.is_none() {
            self.pool_name.clone_from(&r.pool_name);
        }
    }
}

/// Min-max normalize to `[0, RADIUS_SCALE]`, then fill absent radii with
/// `min(radius) / 2 + absent_offset`.
#[allow(clippy::float_cmp)]
pub fn normalize_radii(values: &[Option<f64>], absent_offset: f64) -> (Vec<Option<f64>>, FluidNormalization) {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    let mut report = FluidNormalization::default();
    if present.is_empty() {
        report.outcome = NormalizationOutcome::Empty;
        return (vec![None; values.len()], report);
    }

    let min = present.iter().copied().fold(f64::INFINITY, f64::min);
    let max = present.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    report.min = Some(min);
    report.max = Some(max);
    if max == min {
        report.outcome = NormalizationOutcome::Degenerate;
    }

    let mut radii: Vec<Option<f64>> = values
        .iter()
        .map(|v| v.map(|x| (x - min) / (max - min) * RADIUS_SCALE))
        .collect();

    let fallback = radii
        .iter()
        .flatten()
        .copied()
        .reduce(|a, b| if a.is_nan() || b.is_nan() { f64::NAN } else { a.min(b) })
        .map(|m| m / 2.0 + absent_offset);

    if let Some(fill) = fallback {
        for r in radii.iter_mut().filter(|r| r.is_none()) {
            *r = Some(fill);
            report.replaced += 1;
        }
    }
    (radii, report)
}

/// Roll filtered rows up into one summary per UWI, ordered by UWI.
pub fn summarize(filtered: &[SequencedRecord]) -> (Vec<WellSummary>, NormalizationReport) {
    let mut wells: BTreeMap<&str, WellAcc> = BTreeMap::new();
    for s in filtered {
        let r = &s.record;
        wells
            .entry(r.uwi.as_str())
            .or_insert_with(|| WellAcc::new(r))
            .add(r);
    }

    let oil: Vec<Option<f64>> = wells.values().map(|w| w.oil).collect();
    let gas: Vec<Option<f64>> = wells.values().map(|w| w.gas).collect();
    let liquid_gas: Vec<Option<f64>> = wells.values().map(|w| w.liquid_gas).collect();
    let (rad_oil, oil_norm) = normalize_radii(&oil, OIL_ABSENT_RADIUS_OFFSET);
    let (rad_gas, gas_norm) = normalize_radii(&gas, GAS_ABSENT_RADIUS_OFFSET);
    let (rad_lg, lg_norm) = normalize_radii(&liquid_gas, LIQUID_GAS_ABSENT_RADIUS_OFFSET);

    let summaries = wells
        .into_iter()
        .enumerate()
        .map(|(i, (uwi, w))| WellSummary {
            uwi: uwi.to_string(),
            well_name: w.well_name,
            pool_name: w.pool_name,
            horizontal: w.horizontal,
            year_min: w.year_min,
            year_max: w.year_max,
            oil_prod: w.oil,
            gas_prod: w.gas,
            liquid_gas_prod: w.liquid_gas,
            bottom_hole: w.bottom_hole,
            rad_oil: rad_oil[i],
            rad_gas: rad_gas[i],
            rad_liquid_gas: rad_lg[i],
        })
        .collect();

    (
        summaries,
        NormalizationReport {
            oil: oil_norm,
            gas: gas_norm,
            liquid_gas: lg_norm,
        },
    )
}

/// Filter by pool term, sequence, and summarize.
pub fn filter_and_summarize(
    enriched: &[EnrichedProductionRecord],
    pattern: &str,
    options: SummaryOptions,
) -> PoolSummary {
    let filtered = sequence(filter_pool(enriched, pattern), options.seq_year_order);
    let (wells, normalization) = summarize(&filtered);

    for (fluid, n) in [
        ("oil", normalization.oil),
        ("gas", normalization.gas),
        ("liquid_gas", normalization.liquid_gas),
    ] {
        match n.outcome {
            NormalizationOutcome::Degenerate => warn!(
                fluid,
                wells = wells.len(),
                "Zero production range; radii are not finite"
            ),
            NormalizationOutcome::Empty if !wells.is_empty() => {
                warn!(fluid, "No well reports this fluid; radii absent");
            }
            _ => {}
        }
    }
    info!(
        pattern,
        rows = filtered.len(),
        wells = wells.len(),
        "Filtered pool and summarized wells"
    );

    PoolSummary {
        filtered,
        wells,
        normalization,
    }
}
