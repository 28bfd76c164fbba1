//! Production Mapping Pipeline
//!
//! ```text
//! STAGE 1: Ingest       control, history, horizontal list, bottom-hole table
//! STAGE 2: Reshape      wide history slots -> one row per (well, year)
//! STAGE 3: Enrich       control join -> UWI normalization -> horizontal join -> location join
//! STAGE 4: Summarize    pool filter -> seq_year -> per-well totals and radii
//! STAGE 5: Export       well summary (+ optional filtered rows)
//! ```
//!
//! Stages 2-4 are pure functions of the loaded tables ([`run_tables`]);
//! only ingest touches the filesystem. Data-quality conditions never stop a
//! run; they are counted in [`PipelineReport`].

pub mod enrich;
pub mod reshape;
pub mod summary;
pub mod unpivot;
pub mod uwi;

use crate::acquisition::{self, HistoryTable, IngestError, LocationTable};
use crate::config::PipelineConfig;
use crate::types::{HorizontalWell, RawControlRecord, SequencedRecord, WellSummary};
use enrich::EnrichOptions;
use serde::Serialize;
use summary::{NormalizationReport, SummaryOptions};
use tracing::info;

// ============================================================================
// Report
// ============================================================================

/// Repeated join keys per metadata source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DuplicateKeys {
    pub control: usize,
    pub horizontal: usize,
    pub locations: usize,
}

/// Named counters for every lenient data-quality condition in a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PipelineReport {
    pub history_rows: usize,
    pub control_rows: usize,
    pub horizontal_rows: usize,
    pub location_rows: usize,
    /// Fluid codes outside the known category set
    pub unmapped_codes: usize,
    /// Slots that overwrote an earlier slot with the same code
    pub duplicate_code_overwrites: usize,
    /// Numeric cells that failed to parse and were treated as absent
    pub unparsed_values: usize,
    pub control_unmatched: usize,
    pub horizontal_matches: usize,
    pub location_unmatched: usize,
    pub duplicate_keys: DuplicateKeys,
    /// Extra rows produced by one-to-many joins
    pub fanout_rows: usize,
    pub enriched_rows: usize,
    pub filtered_rows: usize,
    pub wells: usize,
    pub normalization: NormalizationReport,
}

impl std::fmt::Display for PipelineReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Pipeline: {} history rows -> {} enriched -> {} in pool, {} wells ({} unmapped codes, {} overwrites, {} fan-out rows)",
            self.history_rows,
            self.enriched_rows,
            self.filtered_rows,
            self.wells,
            self.unmapped_codes,
            self.duplicate_code_overwrites,
            self.fanout_rows
        )
    }
}

// ============================================================================
// Orchestration
// ============================================================================

/// The four input tables as read from disk.
#[derive(Debug, Clone, Default)]
pub struct InputTables {
    pub control: Vec<RawControlRecord>,
    pub history: HistoryTable,
    pub horizontal: Vec<HorizontalWell>,
    pub locations: LocationTable,
}

#[derive(Debug, Clone, Default)]
pub struct PipelineOutput {
    pub filtered: Vec<SequencedRecord>,
    pub wells: Vec<WellSummary>,
    pub report: PipelineReport,
}

/// Read all four inputs named by the config.
pub fn load_inputs(config: &PipelineConfig) -> Result<InputTables, IngestError> {
    let (inputs, layout) = (&config.inputs, &config.layout);
    Ok(InputTables {
        control: acquisition::read_control(&inputs.control, &layout.control)?,
        history: acquisition::read_history(&inputs.history, &layout.history)?,
        horizontal: acquisition::read_horizontal(&inputs.horizontal, &layout.horizontal)?,
        locations: acquisition::read_locations(&inputs.locations, &layout.locations)?,
    })
}

/// Reshape, enrich and summarize already-loaded tables.
pub fn run_tables(tables: &InputTables, config: &PipelineConfig) -> PipelineOutput {
    let reshaped = reshape::reshape(&tables.history.records);
    let unmapped_codes = reshaped.unmapped_codes;
    let duplicate_code_overwrites = reshaped.duplicate_codes;

    let enriched = enrich::enrich(
        reshaped.records,
        &tables.control,
        &tables.horizontal,
        &tables.locations.records,
        EnrichOptions {
            dedupe_metadata: config.enrich.dedupe_metadata,
        },
    );

    let pool = summary::filter_and_summarize(
        &enriched.records,
        &config.filter.pool_search_term,
        SummaryOptions {
            seq_year_order: config.filter.seq_year_order,
        },
    );

    let stats = enriched.stats;
    let report = PipelineReport {
        history_rows: tables.history.records.len(),
        control_rows: tables.control.len(),
        horizontal_rows: tables.horizontal.len(),
        location_rows: tables.locations.records.len(),
        unmapped_codes,
        duplicate_code_overwrites,
        unparsed_values: tables.history.unparsed_values + tables.locations.unparsed_values,
        control_unmatched: stats.control.unmatched,
        horizontal_matches: stats.horizontal.matched,
        location_unmatched: stats.locations.unmatched,
        duplicate_keys: DuplicateKeys {
            control: stats.control.duplicate_keys,
            horizontal: stats.horizontal.duplicate_keys,
            locations: stats.locations.duplicate_keys,
        },
        fanout_rows: stats.fanout_rows(),
        enriched_rows: enriched.records.len(),
        filtered_rows: pool.filtered.len(),
        wells: pool.wells.len(),
        normalization: pool.normalization,
    };
    info!("{}", report);

    PipelineOutput {
        filtered: pool.filtered,
        wells: pool.wells,
        report,
    }
}

/// Load inputs and run every stage up to export.
pub fn run(config: &PipelineConfig) -> Result<PipelineOutput, IngestError> {
    let tables = load_inputs(config)?;
    Ok(run_tables(&tables, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BottomHole, BottomHoleLocation, FluidSlot, RawHistoryRecord};

    const RAW: &str = "0455051206000";
    const UWI: &str = "00/06-12-045-05W5/0";

    fn tables() -> InputTables {
        InputTables {
            control: vec![RawControlRecord {
                well_identifier: RAW.to_string(),
                well_name: "TEST 6-12".to_string(),
                pool_code: "0580".to_string(),
                pool_name: "VIKING A".to_string(),
            }],
            history: HistoryTable {
                records: vec![
                    RawHistoryRecord {
                        well_identifier: RAW.to_string(),
                        fluid_year: 2001,
                        slots: vec![
                            FluidSlot::new(Some(51), Some(5.0)),
                            FluidSlot::new(Some(999), Some(1.0)),
                        ],
                    },
                    RawHistoryRecord {
                        well_identifier: RAW.to_string(),
                        fluid_year: 2002,
                        slots: vec![FluidSlot::new(Some(51), Some(3.0))],
                    },
                ],
                unparsed_values: 1,
            },
            horizontal: vec![],
            locations: LocationTable {
                records: vec![BottomHoleLocation {
                    uwi: UWI.to_string(),
                    location: BottomHole {
                        longitude: Some(-114.1),
                        latitude: Some(53.2),
                        easting: None,
                        northing: None,
                    },
                }],
                unparsed_values: 0,
            },
        }
    }

    #[test]
    fn report_counts_every_stage() {
        let out = run_tables(&tables(), &PipelineConfig::default());
        let r = &out.report;
        assert_eq!(r.history_rows, 2);
        assert_eq!(r.enriched_rows, 2);
        assert_eq!(r.filtered_rows, 2);
        assert_eq!(r.wells, 1);
        assert_eq!(r.unmapped_codes, 1);
        assert_eq!(r.unparsed_values, 1);
        assert_eq!(r.control_unmatched, 0);
        assert_eq!(r.horizontal_matches, 0);
        assert_eq!(r.location_unmatched, 0);
        assert_eq!(r.fanout_rows, 0);
    }

    #[test]
    fn pool_term_excludes_everything_when_unmatched() {
        let mut config = PipelineConfig::default();
        config.filter.pool_search_term = "viking".to_string();
        let out = run_tables(&tables(), &config);
        assert!(out.wells.is_empty());
        assert_eq!(out.report.enriched_rows, 2);
    }

    #[test]
    fn report_display_is_one_line() {
        let out = run_tables(&tables(), &PipelineConfig::default());
        assert!(!out.report.to_string().contains('\n'));
    }
}
