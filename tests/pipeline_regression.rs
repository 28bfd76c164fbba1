//! Pipeline Regression Tests
//!
//! Runs the full pipeline over small extracts written into a temp directory:
//! fixed-position control and history files, a horizontal-well list and a
//! bottom-hole table. Asserts on the per-well summary, the report counters
//! and the exported files.

use prodmap::config::PipelineConfig;
use prodmap::pipeline::summary::NormalizationOutcome;
use prodmap::{export, pipeline, IngestError, OutputFormat, RadiusField};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const RAW_A: &str = "0455051206000";
const UWI_A: &str = "00/06-12-045-05W5/0";
const RAW_B: &str = "0465052307000";
const UWI_B: &str = "00/07-23-046-05W5/0";

/// One headerless control line with the kept columns at 2, 3, 12, 13.
fn control_line(id: &str, name: &str, pool_code: &str, pool_name: &str) -> String {
    let mut cols = vec![String::from("x"); 13];
    cols[1] = id.to_string();
    cols[2] = name.to_string();
    cols[11] = pool_code.to_string();
    cols[12] = pool_name.to_string();
    cols.join("\t")
}

/// One headerless history line, 167 columns wide, with `(code, volume)`
/// written into the leading slots.
fn history_line(id: &str, year: i32, slots: &[(&str, &str)]) -> String {
    const SLOT_POSITIONS: [usize; 8] = [54, 70, 86, 102, 118, 134, 150, 166];
    let mut cols = vec![String::new(); 167];
    cols[0] = "H".to_string();
    cols[1] = id.to_string();
    cols[2] = year.to_string();
    for (&(code, volume), &pos) in slots.iter().zip(SLOT_POSITIONS.iter()) {
        cols[pos - 1] = code.to_string();
        cols[pos] = volume.to_string();
    }
    cols.join("\t")
}

struct Fixture {
    dir: TempDir,
    config: PipelineConfig,
}

impl Fixture {
    fn new(control: &[String], history: &[String], horizontal: &str, locations: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let write = |name: &str, body: &str| -> PathBuf {
            let p = dir.path().join(name);
            std::fs::write(&p, body).unwrap();
            p
        };
        let mut config = PipelineConfig::default();
        config.inputs.control = write("control.txt", &(control.join("\n") + "\n"));
        config.inputs.history = write("history.txt", &(history.join("\n") + "\n"));
        config.inputs.horizontal = write("horizontal.csv", horizontal);
        config.inputs.locations = write("bottom_hole.csv", locations);
        config.output.summary = dir.path().join("out/summary.csv");
        Self { dir, config }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

fn standard() -> Fixture {
    Fixture::new(
        &[control_line(RAW_A, "TEST 6-12", "0580", "VIKING A")],
        &[
            history_line(RAW_A, 2001, &[("51", "120.5"), ("2", "800")]),
            history_line(RAW_A, 2002, &[("51", "80.0"), ("6", "15")]),
        ],
        "Well Uwi Formatted,Operator\n00/01-01-001-01W4/0,ACME\n",
        "UWI,BH_Long,BH_Lat,BH_Easting,BH_Northing\n00/06-12-045-05W5/0,-114.65,52.86,312000.5,5860000.25\n",
    )
}

// ============================================================================
// End-to-End
// ============================================================================

#[test]
fn single_well_end_to_end() {
    let fx = standard();
    let out = pipeline::run(&fx.config).unwrap();

    assert_eq!(out.wells.len(), 1);
    let w = &out.wells[0];
    assert_eq!(w.uwi, UWI_A);
    assert_eq!(w.year_min, 2001);
    assert_eq!(w.year_max, 2002);
    assert!((w.oil_prod.unwrap() - 200.5).abs() < 1e-9);
    assert!((w.gas_prod.unwrap() - 800.0).abs() < 1e-9);
    assert_eq!(w.liquid_gas_prod, None);
    assert_eq!(w.bottom_hole.longitude, Some(-114.65));
    assert_eq!(w.bottom_hole.latitude, Some(52.86));
    assert_ne!(w.horizontal, Some(true));
    assert_eq!(w.pool_name.as_deref(), Some("VIKING A"));

    // A single well has a zero range: the radius is reported as degenerate
    assert_eq!(out.report.normalization.oil.outcome, NormalizationOutcome::Degenerate);
    assert_eq!(out.report.normalization.liquid_gas.outcome, NormalizationOutcome::Empty);
}

#[test]
fn two_wells_produce_finite_radii() {
    let fx = Fixture::new(
        &[
            control_line(RAW_A, "A", "0580", "VIKING A"),
            control_line(RAW_B, "B", "0580", "VIKING B"),
        ],
        &[
            history_line(RAW_A, 2001, &[("51", "100")]),
            history_line(RAW_B, 2001, &[("51", "300"), ("16", "7")]),
            history_line(RAW_B, 2002, &[("2", "50")]),
        ],
        &format!("Well Uwi Formatted\n{UWI_B}\n"),
        "UWI,BH_Long,BH_Lat,BH_Easting,BH_Northing\n",
    );
    let out = pipeline::run(&fx.config).unwrap();
    assert_eq!(out.wells.len(), 2);

    let a = out.wells.iter().find(|w| w.uwi == UWI_A).unwrap();
    let b = out.wells.iter().find(|w| w.uwi == UWI_B).unwrap();
    assert!((a.rad_oil.unwrap() - 0.0).abs() < 1e-9);
    assert!((b.rad_oil.unwrap() - 1000.0).abs() < 1e-9);
    assert!(a.rad_oil.unwrap().is_finite() && b.rad_oil.unwrap().is_finite());
    assert_eq!(b.horizontal, Some(true));
    assert_eq!(a.horizontal, None);

    // Well A has no gas; only B does, so gas is degenerate and A's fallback
    // gas radius is derived from NaN.
    assert_eq!(out.report.normalization.gas.outcome, NormalizationOutcome::Degenerate);
    assert!(a.rad_gas.unwrap().is_nan());
    assert_eq!(out.report.normalization.gas.replaced, 1);

    assert_eq!(out.report.horizontal_matches, 2);
    assert_eq!(out.report.location_unmatched, 3);
}

#[test]
fn pool_filter_is_case_sensitive_end_to_end() {
    let mut fx = standard();
    fx.config.filter.pool_search_term = "viking".to_string();
    let out = pipeline::run(&fx.config).unwrap();
    assert!(out.wells.is_empty());
    assert!(out.filtered.is_empty());
    assert_eq!(out.report.enriched_rows, 2);
}

#[test]
fn unmatched_control_rows_never_reach_the_summary() {
    let fx = Fixture::new(
        &[control_line(RAW_A, "A", "0580", "VIKING A")],
        &[
            history_line(RAW_A, 2001, &[("51", "1")]),
            history_line(RAW_B, 2001, &[("51", "1")]),
        ],
        "Well Uwi Formatted\n",
        "UWI,BH_Long,BH_Lat,BH_Easting,BH_Northing\n",
    );
    let out = pipeline::run(&fx.config).unwrap();
    assert_eq!(out.report.control_unmatched, 1);
    assert_eq!(out.wells.len(), 1);
    assert_eq!(out.wells[0].uwi, UWI_A);
}

#[test]
fn duplicate_location_rows_fan_out_unless_deduped() {
    let locations = format!(
        "UWI,BH_Long,BH_Lat,BH_Easting,BH_Northing\n{UWI_A},-114.0,52.0,,\n{UWI_A},-115.0,51.0,,\n"
    );
    let mut fx = Fixture::new(
        &[control_line(RAW_A, "A", "0580", "VIKING A")],
        &[history_line(RAW_A, 2001, &[("51", "10")])],
        "Well Uwi Formatted\n",
        &locations,
    );

    let out = pipeline::run(&fx.config).unwrap();
    assert_eq!(out.filtered.len(), 2);
    assert_eq!(out.report.fanout_rows, 1);
    assert_eq!(out.report.duplicate_keys.locations, 1);
    // Fan-out doubles the summed volume
    assert!((out.wells[0].oil_prod.unwrap() - 20.0).abs() < 1e-9);
    assert_eq!(out.wells[0].bottom_hole.longitude, Some(-115.0));

    fx.config.enrich.dedupe_metadata = true;
    let out = pipeline::run(&fx.config).unwrap();
    assert_eq!(out.filtered.len(), 1);
    assert!((out.wells[0].oil_prod.unwrap() - 10.0).abs() < 1e-9);
    assert_eq!(out.wells[0].bottom_hole.longitude, Some(-114.0));
}

#[test]
fn seq_year_follows_row_order() {
    let fx = Fixture::new(
        &[control_line(RAW_A, "A", "0580", "VIKING A")],
        &[
            history_line(RAW_A, 2003, &[("51", "1")]),
            history_line(RAW_A, 2001, &[("51", "1")]),
            history_line(RAW_A, 2002, &[("51", "1")]),
        ],
        "Well Uwi Formatted\n",
        "UWI,BH_Long,BH_Lat,BH_Easting,BH_Northing\n",
    );
    let out = pipeline::run(&fx.config).unwrap();
    let pairs: Vec<(i32, u32)> = out
        .filtered
        .iter()
        .map(|s| (s.record.fluid_year, s.seq_year))
        .collect();
    assert_eq!(pairs, vec![(2003, 1), (2001, 2), (2002, 3)]);
}

#[test]
fn unmapped_and_unparsed_values_are_counted_not_fatal() {
    let fx = Fixture::new(
        &[control_line(RAW_A, "A", "0580", "VIKING A")],
        &[history_line(RAW_A, 2001, &[("999", "5"), ("51", "abc"), ("2", "2"), ("2", "3")])],
        "Well Uwi Formatted\n",
        "UWI,BH_Long,BH_Lat,BH_Easting,BH_Northing\n",
    );
    let out = pipeline::run(&fx.config).unwrap();
    assert_eq!(out.report.unmapped_codes, 1);
    assert_eq!(out.report.unparsed_values, 1);
    assert_eq!(out.report.duplicate_code_overwrites, 1);
    assert_eq!(out.wells[0].oil_prod, None);
    assert!((out.wells[0].gas_prod.unwrap() - 3.0).abs() < 1e-9);
}

// ============================================================================
// Fatal Input Errors
// ============================================================================

#[test]
fn missing_input_names_the_input() {
    let mut fx = standard();
    fx.config.inputs.horizontal = fx.path("does_not_exist.csv");
    let err = pipeline::run(&fx.config).unwrap_err();
    assert!(matches!(err, IngestError::Open { .. }));
    assert!(err.to_string().starts_with("horizontal input"));
}

#[test]
fn short_history_record_names_the_position() {
    let mut fx = standard();
    let short = format!("H\t{RAW_A}\t2001\t51\t5\n");
    std::fs::write(&fx.config.inputs.history, short).unwrap();
    fx.config.filter.pool_search_term = "VIKING".to_string();
    let err = pipeline::run(&fx.config).unwrap_err();
    match err {
        IngestError::ShortRecord { position, found, .. } => {
            assert_eq!(position, 54);
            assert_eq!(found, 5);
        }
        other => panic!("expected ShortRecord, got {other:?}"),
    }
}

#[test]
fn missing_location_header_is_fatal() {
    let fx = standard();
    std::fs::write(&fx.config.inputs.locations, "UWI,Long,Lat\n").unwrap();
    let err = pipeline::run(&fx.config).unwrap_err();
    assert!(matches!(err, IngestError::MissingHeader { ref column, .. } if column == "BH_Long"));
}

// ============================================================================
// Export
// ============================================================================

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

#[test]
fn exported_csv_has_one_row_per_well() {
    let fx = standard();
    let out = pipeline::run(&fx.config).unwrap();
    export::write_summary(
        &fx.config.output.summary,
        OutputFormat::Csv,
        RadiusField::Oil,
        &out.wells,
        &fx.config.filter.pool_search_term,
        &out.report,
    )
    .unwrap();
    let text = read(&fx.config.output.summary);
    assert_eq!(text.lines().count(), 2);
    assert!(text.contains(UWI_A));
    assert!(text.contains("Years: 2001-2002"));
}

#[test]
fn exported_json_filtered_rows_carry_seq_year() {
    let fx = standard();
    let out = pipeline::run(&fx.config).unwrap();
    let path = fx.path("out/filtered.json");
    export::write_filtered(&path, OutputFormat::Json, &out.filtered).unwrap();
    let v: serde_json::Value = serde_json::from_str(&read(&path)).unwrap();
    let rows = v.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["seq_year"], 1);
    assert_eq!(rows[1]["seq_year"], 2);
    assert_eq!(rows[0]["uwi"], UWI_A);
    assert_eq!(rows[1]["water"], 15.0);
}
