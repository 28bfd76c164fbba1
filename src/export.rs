//! Writers for the map-ready well summary and the filtered long table
//!
//! CSV rows are flat: nested coordinates are spread into columns and absent
//! values are written as empty cells. JSON output wraps the summary rows in
//! an envelope carrying the run metadata and [`PipelineReport`]; non-finite
//! radii serialize as `null` there.

use crate::pipeline::PipelineReport;
use crate::types::{RadiusField, SequencedRecord, WellSummary};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Csv => f.write_str("csv"),
            Self::Json => f.write_str("json"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown output format '{other}' (expected csv or json)")),
        }
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("cannot write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV output failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON output failed: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Row Shapes
// ============================================================================

/// One map marker.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryRow<'a> {
    pub uwi: &'a str,
    pub well_name: Option<&'a str>,
    pub pool_name: Option<&'a str>,
    pub horizontal: Option<bool>,
    pub year_min: i32,
    pub year_max: i32,
    pub oil_prod: Option<f64>,
    pub gas_prod: Option<f64>,
    pub liquid_gas_prod: Option<f64>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub easting: Option<f64>,
    pub northing: Option<f64>,
    pub rad_oil: Option<f64>,
    pub rad_gas: Option<f64>,
    pub rad_liquid_gas: Option<f64>,
    /// Radius selected by `output.radius`
    pub radius: Option<f64>,
    pub popup: String,
}

impl<'a> SummaryRow<'a> {
    pub fn new(well: &'a WellSummary, radius: RadiusField) -> Self {
        Self {
            uwi: &well.uwi,
            well_name: well.well_name.as_deref(),
            pool_name: well.pool_name.as_deref(),
            horizontal: well.horizontal,
            year_min: well.year_min,
            year_max: well.year_max,
            oil_prod: well.oil_prod,
            gas_prod: well.gas_prod,
            liquid_gas_prod: well.liquid_gas_prod,
            longitude: well.bottom_hole.longitude,
            latitude: well.bottom_hole.latitude,
            easting: well.bottom_hole.easting,
            northing: well.bottom_hole.northing,
            rad_oil: well.rad_oil,
            rad_gas: well.rad_gas,
            rad_liquid_gas: well.rad_liquid_gas,
            radius: well.radius(radius),
            popup: well.popup(),
        }
    }
}

/// One filtered production row.
#[derive(Debug, Clone, Serialize)]
pub struct FilteredRow<'a> {
    pub uwi: &'a str,
    pub seq_year: u32,
    pub fluid_year: i32,
    pub gas: Option<f64>,
    pub water: Option<f64>,
    pub liquid_gas: Option<f64>,
    pub oil: Option<f64>,
    pub propane: Option<f64>,
    pub butane: Option<f64>,
    pub well_name: Option<&'a str>,
    pub pool_code: Option<&'a str>,
    pub pool_name: Option<&'a str>,
    pub horizontal: Option<bool>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub easting: Option<f64>,
    pub northing: Option<f64>,
}

impl<'a> From<&'a SequencedRecord> for FilteredRow<'a> {
    fn from(s: &'a SequencedRecord) -> Self {
        let r = &s.record;
        Self {
            uwi: &r.uwi,
            seq_year: s.seq_year,
            fluid_year: r.fluid_year,
            gas: r.volumes.gas(),
            water: r.volumes.water(),
            liquid_gas: r.volumes.liquid_gas(),
            oil: r.volumes.oil(),
            propane: r.volumes.propane(),
            butane: r.volumes.butane(),
            well_name: r.well_name.as_deref(),
            pool_code: r.pool_code.as_deref(),
            pool_name: r.pool_name.as_deref(),
            horizontal: r.horizontal,
            longitude: r.bottom_hole.longitude,
            latitude: r.bottom_hole.latitude,
            easting: r.bottom_hole.easting,
            northing: r.bottom_hole.northing,
        }
    }
}

/// JSON envelope around the summary rows.
#[derive(Debug, Serialize)]
pub struct SummaryDocument<'a> {
    pub generated_at: DateTime<Utc>,
    pub pool_search_term: &'a str,
    pub radius_field: RadiusField,
    pub report: &'a PipelineReport,
    pub wells: Vec<SummaryRow<'a>>,
}

// ============================================================================
// Writers
// ============================================================================

fn create(path: &Path) -> Result<BufWriter<File>, ExportError> {
    let io_err = |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    File::create(path).map(BufWriter::new).map_err(io_err)
}

fn write_csv_rows<W: Write, T: Serialize>(out: W, rows: &[T]) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(out);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Write the per-well summary as CSV rows.
pub fn write_summary_csv<W: Write>(
    out: W,
    radius: RadiusField,
    wells: &[WellSummary],
) -> Result<(), ExportError> {
    let rows: Vec<SummaryRow<'_>> = wells.iter().map(|w| SummaryRow::new(w, radius)).collect();
    write_csv_rows(out, &rows)
}

/// Write the per-well summary as a JSON document.
pub fn write_summary_json<W: Write>(
    out: W,
    radius: RadiusField,
    wells: &[WellSummary],
    pool_search_term: &str,
    report: &PipelineReport,
) -> Result<(), ExportError> {
    let doc = SummaryDocument {
        generated_at: Utc::now(),
        pool_search_term,
        radius_field: radius,
        report,
        wells: wells.iter().map(|w| SummaryRow::new(w, radius)).collect(),
    };
    serde_json::to_writer_pretty(out, &doc)?;
    Ok(())
}

/// Write the summary file in the configured format.
pub fn write_summary(
    path: &Path,
    format: OutputFormat,
    radius: RadiusField,
    wells: &[WellSummary],
    pool_search_term: &str,
    report: &PipelineReport,
) -> Result<(), ExportError> {
    let mut out = create(path)?;
    match format {
        OutputFormat::Csv => write_summary_csv(&mut out, radius, wells)?,
        OutputFormat::Json => {
            write_summary_json(&mut out, radius, wells, pool_search_term, report)?;
        }
    }
    out.flush().map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), %format, %radius, wells = wells.len(), "Wrote well summary");
    Ok(())
}

/// Write the filtered long table in the configured format.
pub fn write_filtered(
    path: &Path,
    format: OutputFormat,
    records: &[SequencedRecord],
) -> Result<(), ExportError> {
    let rows: Vec<FilteredRow<'_>> = records.iter().map(FilteredRow::from).collect();
    let mut out = create(path)?;
    match format {
        OutputFormat::Csv => write_csv_rows(&mut out, &rows)?,
        OutputFormat::Json => serde_json::to_writer_pretty(&mut out, &rows)?,
    }
    out.flush().map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), %format, rows = rows.len(), "Wrote filtered records");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BottomHole;

    fn well(uwi: &str, oil: Option<f64>, rad: Option<f64>) -> WellSummary {
        WellSummary {
            uwi: uwi.to_string(),
            well_name: Some("TEST 1".to_string()),
            pool_name: Some("VIKING A".to_string()),
            horizontal: None,
            year_min: 2001,
            year_max: 2004,
            oil_prod: oil,
            gas_prod: None,
            liquid_gas_prod: None,
            bottom_hole: BottomHole {
                longitude: Some(-114.5),
                latitude: Some(53.25),
                easting: None,
                northing: None,
            },
            rad_oil: rad,
            rad_gas: Some(0.0),
            rad_liquid_gas: None,
        }
    }

    #[test]
    fn csv_has_header_and_empty_cells_for_absent() {
        let mut buf = Vec::new();
        write_summary_csv(&mut buf, RadiusField::Oil, &[well("00/06-12-045-05W5/0", Some(8.0), Some(1000.0))])
            .unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("uwi,well_name,pool_name,horizontal,year_min,year_max"));
        assert!(header.ends_with("rad_liquid_gas,radius,popup"));
        let row = lines.next().unwrap();
        assert!(row.starts_with("00/06-12-045-05W5/0,TEST 1,VIKING A,,2001,2004,8.0,,"));
        assert!(row.contains("-114.5,53.25,,"));
    }

    #[test]
    fn selected_radius_column_follows_field() {
        let w = well("w", Some(1.0), Some(12.5));
        assert_eq!(SummaryRow::new(&w, RadiusField::Oil).radius, Some(12.5));
        assert_eq!(SummaryRow::new(&w, RadiusField::Gas).radius, Some(0.0));
        assert_eq!(SummaryRow::new(&w, RadiusField::LiquidGas).radius, None);
    }

    #[test]
    fn json_envelope_carries_metadata_and_null_for_nan() {
        let mut buf = Vec::new();
        write_summary_json(
            &mut buf,
            RadiusField::Gas,
            &[well("w", Some(1.0), Some(f64::NAN))],
            "VIKING",
            &PipelineReport::default(),
        )
        .unwrap();
        let v: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(v["pool_search_term"], "VIKING");
        assert_eq!(v["radius_field"], "gas");
        assert!(v["generated_at"].is_string());
        assert!(v["report"].is_object());
        assert_eq!(v["wells"][0]["uwi"], "w");
        assert!(v["wells"][0]["rad_oil"].is_null());
        assert!(v["wells"][0]["popup"].as_str().unwrap().contains("Years: 2001-2004"));
    }

    #[test]
    fn write_summary_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/summary.csv");
        write_summary(
            &path,
            OutputFormat::Csv,
            RadiusField::Oil,
            &[well("w", None, Some(1.0))],
            "VIKING",
            &PipelineReport::default(),
        )
        .unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn format_parses_case_insensitively() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
