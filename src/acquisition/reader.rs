//! Readers for the control, history, horizontal-well and location extracts
//!
//! Every reader has a path form (opens the file, maps failures to
//! [`IngestError::Open`]) and a `*_from_reader` form over any `io::Read`,
//! which is what the tests drive.
//!
//! Data-quality problems inside a well-formed file are never fatal: empty or
//! non-numeric cells decode as absent and are counted. Only a missing file,
//! a broken CSV stream, a record shorter than a referenced position, a
//! missing named header, or an unreadable fluid year stop the run.

use super::layout::{
    ColumnSpec, ControlLayout, HistoryLayout, HorizontalLayout, LocationLayout, PositionalLayout,
    ValueKind,
};
use crate::types::{
    BottomHole, BottomHoleLocation, FluidSlot, HorizontalWell, RawControlRecord, RawHistoryRecord,
};
use csv::{ReaderBuilder, StringRecord, Trim};
use regex::Regex;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;
use tracing::{debug, info};

// ============================================================================
// Errors
// ============================================================================

/// Which of the four inputs a record or failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputKind {
    Control,
    History,
    Horizontal,
    Locations,
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Control => "control",
            Self::History => "history",
            Self::Horizontal => "horizontal",
            Self::Locations => "locations",
        })
    }
}

/// Unrecoverable ingest failures
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("{input} input: cannot open {}: {source}", path.display())]
    Open {
        input: InputKind,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{input} input: read failed: {source}")]
    Csv {
        input: InputKind,
        source: csv::Error,
    },

    #[error(
        "{input} input, line {line}: column '{column}' expects position {position} but the record has only {found} fields"
    )]
    ShortRecord {
        input: InputKind,
        line: u64,
        column: String,
        position: usize,
        found: usize,
    },

    #[error("{input} input: missing header column '{column}'")]
    MissingHeader { input: InputKind, column: String },

    #[error("{input} input: delimiter {delimiter:?} is not a single-byte character")]
    InvalidDelimiter { input: InputKind, delimiter: char },

    #[error("history input, line {line}: fluid year '{value}' is not an integer")]
    InvalidYear { line: u64, value: String },
}

// ============================================================================
// Cell Decoding
// ============================================================================

/// A decoded numeric cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell<T> {
    Value(T),
    /// Empty, whitespace-only or `NA`
    Absent,
    /// Present but not a number of the expected type
    Unparsed,
}

impl<T> Cell<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Value(v) => Some(v),
            Self::Absent | Self::Unparsed => None,
        }
    }

    pub const fn is_unparsed(&self) -> bool {
        matches!(self, Self::Unparsed)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Cell<U> {
        match self {
            Self::Value(v) => Cell::Value(f(v)),
            Self::Absent => Cell::Absent,
            Self::Unparsed => Cell::Unparsed,
        }
    }
}

/// A positional field decoded as its column's [`ValueKind`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Field<'a> {
    Text(&'a str),
    Integer(Cell<i32>),
    Decimal(Cell<f64>),
}

impl Field<'_> {
    /// Integer view. A decimal column never reads as an integer.
    pub fn integer(self) -> Cell<i32> {
        match self {
            Self::Integer(c) => c,
            Self::Text(raw) => decode_i32(raw),
            Self::Decimal(_) => Cell::Unparsed,
        }
    }

    pub fn decimal(self) -> Cell<f64> {
        match self {
            Self::Decimal(c) => c,
            Self::Integer(c) => c.map(f64::from),
            Self::Text(raw) => decode_f64(raw),
        }
    }
}

/// Decode a raw field according to the column's declared kind.
pub fn decode_field<'a>(col: &ColumnSpec, raw: &'a str) -> Field<'a> {
    match col.kind {
        ValueKind::Text => Field::Text(raw),
        ValueKind::Integer => Field::Integer(decode_i32(raw)),
        ValueKind::Decimal => Field::Decimal(decode_f64(raw)),
    }
}

fn is_missing(raw: &str) -> bool {
    let t = raw.trim();
    t.is_empty() || t.eq_ignore_ascii_case("na")
}

/// Parse an integer code. Extracts sometimes carry codes as `51.0`.
pub fn decode_i32(raw: &str) -> Cell<i32> {
    if is_missing(raw) {
        return Cell::Absent;
    }
    let t = raw.trim();
    if let Ok(v) = t.parse::<i32>() {
        return Cell::Value(v);
    }
    match t.parse::<f64>() {
        #[allow(clippy::cast_possible_truncation)]
        Ok(v) if v.fract() == 0.0 && v.abs() <= f64::from(i32::MAX) => Cell::Value(v as i32),
        _ => Cell::Unparsed,
    }
}

pub fn decode_f64(raw: &str) -> Cell<f64> {
    if is_missing(raw) {
        return Cell::Absent;
    }
    match raw.trim().parse::<f64>() {
        Ok(v) => Cell::Value(v),
        Err(_) => Cell::Unparsed,
    }
}

/// Keep ASCII letters, digits, `,` `;` `.` `_` `-` and space; drop the rest.
pub fn sanitize_pool_name(raw: &str) -> String {
    static DISALLOWED: OnceLock<Regex> = OnceLock::new();
    let re = DISALLOWED.get_or_init(|| {
        Regex::new(r"[^A-Za-z0-9,;._ \-]").expect("pool-name pattern is a valid regex")
    });
    re.replace_all(raw, "").into_owned()
}

/// Positional view over one headerless record.
struct Row<'a> {
    input: InputKind,
    line: u64,
    record: &'a StringRecord,
}

impl<'a> Row<'a> {
    fn new(input: InputKind, record: &'a StringRecord) -> Self {
        let line = record.position().map_or(0, |p| p.line());
        Self {
            input,
            line,
            record,
        }
    }

    fn field(&self, col: &ColumnSpec) -> Result<&'a str, IngestError> {
        self.record
            .get(col.index())
            .ok_or_else(|| IngestError::ShortRecord {
                input: self.input,
                line: self.line,
                column: col.name.clone(),
                position: col.position,
                found: self.record.len(),
            })
    }

    fn decode(&self, col: &ColumnSpec) -> Result<Field<'a>, IngestError> {
        Ok(decode_field(col, self.field(col)?))
    }

    /// Fail fast when the record cannot reach the layout's furthest column.
    fn ensure_width(&self, layout: &impl PositionalLayout) -> Result<(), IngestError> {
        let max = layout.max_position();
        if self.record.len() >= max {
            return Ok(());
        }
        let col = layout
            .columns()
            .into_iter()
            .find(|c| c.position > self.record.len())
            .unwrap_or_else(|| ColumnSpec::new("?", max, ValueKind::Text));
        Err(IngestError::ShortRecord {
            input: self.input,
            line: self.line,
            column: col.name,
            position: col.position,
            found: self.record.len(),
        })
    }
}

fn delimiter_byte(input: InputKind, delimiter: char) -> Result<u8, IngestError> {
    if delimiter.is_ascii() {
        Ok(delimiter as u8)
    } else {
        Err(IngestError::InvalidDelimiter { input, delimiter })
    }
}

fn open(input: InputKind, path: &Path) -> Result<File, IngestError> {
    File::open(path).map_err(|source| IngestError::Open {
        input,
        path: path.to_path_buf(),
        source,
    })
}

fn headerless<R: Read>(
    input: InputKind,
    rdr: R,
    delimiter: char,
    trim: bool,
) -> Result<csv::Reader<R>, IngestError> {
    Ok(ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .delimiter(delimiter_byte(input, delimiter)?)
        .trim(if trim { Trim::All } else { Trim::None })
        .from_reader(rdr))
}

fn headed<R: Read>(input: InputKind, rdr: R, delimiter: char) -> Result<csv::Reader<R>, IngestError> {
    Ok(ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter_byte(input, delimiter)?)
        .trim(Trim::All)
        .from_reader(rdr))
}

fn header_index(
    input: InputKind,
    headers: &StringRecord,
    column: &str,
) -> Result<usize, IngestError> {
    headers
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| IngestError::MissingHeader {
            input,
            column: column.to_string(),
        })
}

// ============================================================================
// Control Extract
// ============================================================================

/// Load the control extract.
pub fn read_control(path: &Path, layout: &ControlLayout) -> Result<Vec<RawControlRecord>, IngestError> {
    let records = read_control_from_reader(open(InputKind::Control, path)?, layout)?;
    info!(input = %InputKind::Control, path = %path.display(), rows = records.len(), "Loaded control extract");
    Ok(records)
}

pub fn read_control_from_reader<R: Read>(
    rdr: R,
    layout: &ControlLayout,
) -> Result<Vec<RawControlRecord>, IngestError> {
    let input = InputKind::Control;
    let mut reader = headerless(input, rdr, layout.delimiter, layout.trim)?;
    let (id_col, name_col, code_col, pool_col) = (
        layout.well_identifier_col(),
        layout.well_name_col(),
        layout.pool_code_col(),
        layout.pool_name_col(),
    );

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|source| IngestError::Csv { input, source })?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        let row = Row::new(input, &record);
        row.ensure_width(layout)?;

        records.push(RawControlRecord {
            well_identifier: row.field(&id_col)?.to_string(),
            well_name: row.field(&name_col)?.to_string(),
            pool_code: row.field(&code_col)?.to_string(),
            pool_name: sanitize_pool_name(row.field(&pool_col)?),
        });
    }
    Ok(records)
}

// ============================================================================
// History Extract
// ============================================================================

/// History rows plus the count of numeric cells that failed to parse.
#[derive(Debug, Clone, Default)]
pub struct HistoryTable {
    pub records: Vec<RawHistoryRecord>,
    pub unparsed_values: usize,
}

/// Load the history extract.
pub fn read_history(path: &Path, layout: &HistoryLayout) -> Result<HistoryTable, IngestError> {
    let table = read_history_from_reader(open(InputKind::History, path)?, layout)?;
    info!(
        input = %InputKind::History,
        path = %path.display(),
        rows = table.records.len(),
        slots = layout.slots.len(),
        unparsed = table.unparsed_values,
        "Loaded history extract"
    );
    Ok(table)
}

pub fn read_history_from_reader<R: Read>(
    rdr: R,
    layout: &HistoryLayout,
) -> Result<HistoryTable, IngestError> {
    let input = InputKind::History;
    let mut reader = headerless(input, rdr, layout.delimiter, layout.trim)?;
    let id_col = layout.well_identifier_col();
    let year_col = layout.fluid_year_col();
    let slot_cols: Vec<(ColumnSpec, ColumnSpec)> =
        (0..layout.slots.len()).filter_map(|n| layout.slot_cols(n)).collect();

    let mut table = HistoryTable::default();
    for result in reader.records() {
        let record = result.map_err(|source| IngestError::Csv { input, source })?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        let row = Row::new(input, &record);
        row.ensure_width(layout)?;

        let raw_year = row.field(&year_col)?;
        let fluid_year = raw_year
            .trim()
            .parse::<i32>()
            .map_err(|_| IngestError::InvalidYear {
                line: row.line,
                value: raw_year.to_string(),
            })?;

        let mut slots = Vec::with_capacity(slot_cols.len());
        for (code_col, volume_col) in &slot_cols {
            let code = row.decode(code_col)?.integer();
            let volume = row.decode(volume_col)?.decimal();
            if code.is_unparsed() || volume.is_unparsed() {
                debug!(line = row.line, column = %code_col.name, "Unparsed slot value treated as absent");
                table.unparsed_values += usize::from(code.is_unparsed()) + usize::from(volume.is_unparsed());
            }
            slots.push(FluidSlot::new(code.into_option(), volume.into_option()));
        }

        table.records.push(RawHistoryRecord {
            well_identifier: row.field(&id_col)?.to_string(),
            fluid_year,
            slots,
        });
    }
    Ok(table)
}

// ============================================================================
// Horizontal-Well List
// ============================================================================

pub fn read_horizontal(path: &Path, layout: &HorizontalLayout) -> Result<Vec<HorizontalWell>, IngestError> {
    let wells = read_horizontal_from_reader(open(InputKind::Horizontal, path)?, layout)?;
    info!(input = %InputKind::Horizontal, path = %path.display(), rows = wells.len(), "Loaded horizontal-well list");
    Ok(wells)
}

pub fn read_horizontal_from_reader<R: Read>(
    rdr: R,
    layout: &HorizontalLayout,
) -> Result<Vec<HorizontalWell>, IngestError> {
    let input = InputKind::Horizontal;
    let mut reader = headed(input, rdr, layout.delimiter)?;
    let headers = reader
        .headers()
        .map_err(|source| IngestError::Csv { input, source })?
        .clone();
    let uwi_idx = header_index(input, &headers, &layout.uwi_column)?;

    let mut wells = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|source| IngestError::Csv { input, source })?;
        match record.get(uwi_idx) {
            Some(uwi) if !uwi.is_empty() => wells.push(HorizontalWell {
                uwi: uwi.to_string(),
            }),
            _ => {}
        }
    }
    Ok(wells)
}

// ============================================================================
// Bottom-Hole Locations
// ============================================================================

/// Location rows plus the count of coordinate cells that failed to parse.
#[derive(Debug, Clone, Default)]
pub struct LocationTable {
    pub records: Vec<BottomHoleLocation>,
    pub unparsed_values: usize,
}

pub fn read_locations(path: &Path, layout: &LocationLayout) -> Result<LocationTable, IngestError> {
    let table = read_locations_from_reader(open(InputKind::Locations, path)?, layout)?;
    info!(
        input = %InputKind::Locations,
        path = %path.display(),
        rows = table.records.len(),
        unparsed = table.unparsed_values,
        "Loaded bottom-hole locations"
    );
    Ok(table)
}

pub fn read_locations_from_reader<R: Read>(
    rdr: R,
    layout: &LocationLayout,
) -> Result<LocationTable, IngestError> {
    let input = InputKind::Locations;
    let mut reader = headed(input, rdr, layout.delimiter)?;
    let headers = reader
        .headers()
        .map_err(|source| IngestError::Csv { input, source })?
        .clone();
    let [uwi_idx, lon_idx, lat_idx, east_idx, north_idx] = {
        let cols = layout.required_columns();
        [
            header_index(input, &headers, cols[0])?,
            header_index(input, &headers, cols[1])?,
            header_index(input, &headers, cols[2])?,
            header_index(input, &headers, cols[3])?,
            header_index(input, &headers, cols[4])?,
        ]
    };

    let mut table = LocationTable::default();
    for result in reader.records() {
        let record = result.map_err(|source| IngestError::Csv { input, source })?;
        let Some(uwi) = record.get(uwi_idx).filter(|u| !u.is_empty()) else {
            continue;
        };

        let mut coord = |idx: usize| {
            let cell = decode_f64(record.get(idx).unwrap_or(""));
            if cell.is_unparsed() {
                table.unparsed_values += 1;
            }
            cell.into_option()
        };
        let location = BottomHole {
            longitude: coord(lon_idx),
            latitude: coord(lat_idx),
            easting: coord(east_idx),
            northing: coord(north_idx),
        };

        table.records.push(BottomHoleLocation {
            uwi: uwi.to_string(),
            location,
        });
    }
    Ok(table)
}
