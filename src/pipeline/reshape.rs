//! Record reshaper: wide history rows -> long production table
//!
//! One output row per input row, in input order. Duplicate `(well, year)`
//! keys pass through untouched. The raw well identifier is kept as-is;
//! normalization happens after the control join.

use super::unpivot::{unpivot_row, Unpivoted};
use crate::types::{ProductionRecord, RawHistoryRecord};
use rayon::prelude::*;
use tracing::{info, warn};

/// Reshaped table plus unpivot counters summed over all rows.
#[derive(Debug, Clone, Default)]
pub struct Reshaped {
    pub records: Vec<ProductionRecord>,
    pub unmapped_codes: usize,
    pub duplicate_codes: usize,
}

/// Reshape history rows into production records.
pub fn reshape(history: &[RawHistoryRecord]) -> Reshaped {
    let rows: Vec<(ProductionRecord, Unpivoted)> = history
        .par_iter()
        .map(|row| {
            let out = unpivot_row(&row.slots);
            (
                ProductionRecord {
                    well_identifier: row.well_identifier.clone(),
                    fluid_year: row.fluid_year,
                    volumes: out.volumes,
                },
                out,
            )
        })
        .collect();

    let mut reshaped = Reshaped {
        records: Vec::with_capacity(rows.len()),
        ..Reshaped::default()
    };
    for (record, out) in rows {
        reshaped.unmapped_codes += out.unmapped_codes;
        reshaped.duplicate_codes += out.duplicate_codes;
        reshaped.records.push(record);
    }

    if reshaped.duplicate_codes > 0 {
        warn!(
            overwrites = reshaped.duplicate_codes,
            "Repeated fluid codes within a row; later slot kept"
        );
    }
    info!(
        rows = reshaped.records.len(),
        unmapped_codes = reshaped.unmapped_codes,
        "Reshaped history into production records"
    );
    reshaped
}
