//! Metadata enricher
//!
//! Four steps, in this order:
//!
//! 1. left-join production to control on the raw well identifier
//! 2. normalize the raw identifier to a UWI (the raw id is dropped)
//! 3. left-join the horizontal-well list on UWI
//! 4. left-join bottom-hole locations on UWI
//!
//! Joins are exact string matches. A key with several metadata rows fans
//! the production row out, one copy per match, unless `dedupe_metadata` is
//! set, in which case the first row per key is used. Either way the
//! duplicate keys and extra rows are counted in [`EnrichStats`].

use super::uwi;
use crate::types::{
    BottomHole, BottomHoleLocation, ControlJoinedRecord, EnrichedProductionRecord, HorizontalWell,
    ProductionRecord, RawControlRecord,
};
use std::collections::HashMap;
use tracing::{info, warn};

/// Join options.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnrichOptions {
    /// Keep only the first metadata row per key before joining
    pub dedupe_metadata: bool,
}

/// Per-source join counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct JoinStats {
    /// Left rows with at least one match
    pub matched: usize,
    /// Left rows with no match
    pub unmatched: usize,
    /// Metadata keys that appear more than once
    pub duplicate_keys: usize,
    /// Rows added by one-to-many matches
    pub fanout_rows: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct EnrichStats {
    pub control: JoinStats,
    pub horizontal: JoinStats,
    pub locations: JoinStats,
}

impl EnrichStats {
    pub const fn fanout_rows(&self) -> usize {
        self.control.fanout_rows + self.horizontal.fanout_rows + self.locations.fanout_rows
    }
}

#[derive(Debug, Clone, Default)]
pub struct Enriched {
    pub records: Vec<EnrichedProductionRecord>,
    pub stats: EnrichStats,
}

/// Metadata rows grouped by key, preserving first-seen order within a key.
struct KeyIndex<'a, T> {
    rows: HashMap<&'a str, Vec<&'a T>>,
    duplicate_keys: usize,
}

impl<'a, T> KeyIndex<'a, T> {
    fn build(items: &'a [T], key: impl Fn(&'a T) -> &'a str, dedupe: bool) -> Self {
        let mut rows: HashMap<&'a str, Vec<&'a T>> = HashMap::with_capacity(items.len());
        for item in items {
            rows.entry(key(item)).or_default().push(item);
        }
        let duplicate_keys = rows.values().filter(|v| v.len() > 1).count();
        if dedupe {
            for matches in rows.values_mut() {
                matches.truncate(1);
            }
        }
        Self {
            rows,
            duplicate_keys,
        }
    }

    fn get(&self, key: &str) -> &[&'a T] {
        self.rows.get(key).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Left join: every left row yields one output per match, or one with `None`.
fn left_join<L, R, O>(
    left: Vec<L>,
    index: &KeyIndex<'_, R>,
    key: impl Fn(&L) -> &str,
    combine: impl Fn(&L, Option<&R>) -> O,
) -> (Vec<O>, JoinStats) {
    let mut out = Vec::with_capacity(left.len());
    let mut stats = JoinStats {
        duplicate_keys: index.duplicate_keys,
        ..JoinStats::default()
    };
    for row in &left {
        let matches = index.get(key(row));
        if matches.is_empty() {
            stats.unmatched += 1;
            out.push(combine(row, None));
        } else {
            stats.matched += 1;
            stats.fanout_rows += matches.len() - 1;
            out.extend(matches.iter().map(|m| combine(row, Some(*m))));
        }
    }
    (out, stats)
}

/// Step 1: attach control attributes on the raw well identifier.
pub fn join_control(
    production: Vec<ProductionRecord>,
    control: &[RawControlRecord],
    options: EnrichOptions,
) -> (Vec<ControlJoinedRecord>, JoinStats) {
    let index = KeyIndex::build(control, |c| c.well_identifier.as_str(), options.dedupe_metadata);
    left_join(
        production,
        &index,
        |p| p.well_identifier.as_str(),
        |p, c| ControlJoinedRecord {
            production: p.clone(),
            well_name: c.map(|c| c.well_name.clone()),
            pool_code: c.map(|c| c.pool_code.clone()),
            pool_name: c.map(|c| c.pool_name.clone()),
        },
    )
}

/// Step 2: replace the raw identifier with its UWI.
pub fn normalize_identifiers(joined: Vec<ControlJoinedRecord>) -> Vec<EnrichedProductionRecord> {
    joined
        .into_iter()
        .map(|j| EnrichedProductionRecord {
            uwi: uwi::normalize(&j.production.well_identifier),
            fluid_year: j.production.fluid_year,
            volumes: j.production.volumes,
            well_name: j.well_name,
            pool_code: j.pool_code,
            pool_name: j.pool_name,
            horizontal: None,
            bottom_hole: BottomHole::default(),
        })
        .collect()
}

/// Step 3: flag horizontal wells. No match leaves the flag absent.
pub fn join_horizontal(
    records: Vec<EnrichedProductionRecord>,
    horizontal: &[HorizontalWell],
    options: EnrichOptions,
) -> (Vec<EnrichedProductionRecord>, JoinStats) {
    let index = KeyIndex::build(horizontal, |h| h.uwi.as_str(), options.dedupe_metadata);
    left_join(
        records,
        &index,
        |r| r.uwi.as_str(),
        |r, h| EnrichedProductionRecord {
            horizontal: h.map(|_| true),
            ..r.clone()
        },
    )
}

/// Step 4: attach bottom-hole coordinates.
pub fn join_locations(
    records: Vec<EnrichedProductionRecord>,
    locations: &[BottomHoleLocation],
    options: EnrichOptions,
) -> (Vec<EnrichedProductionRecord>, JoinStats) {
    let index = KeyIndex::build(locations, |l| l.uwi.as_str(), options.dedupe_metadata);
    left_join(
        records,
        &index,
        |r| r.uwi.as_str(),
        |r, l| EnrichedProductionRecord {
            bottom_hole: l.map(|l| l.location).unwrap_or_default(),
            ..r.clone()
        },
    )
}

/// Run all four enrichment steps.
pub fn enrich(
    production: Vec<ProductionRecord>,
    control: &[RawControlRecord],
    horizontal: &[HorizontalWell],
    locations: &[BottomHoleLocation],
    options: EnrichOptions,
) -> Enriched {
    let input_rows = production.len();
    let (joined, control_stats) = join_control(production, control, options);
    let normalized = normalize_identifiers(joined);
    let (flagged, horizontal_stats) = join_horizontal(normalized, horizontal, options);
    let (records, location_stats) = join_locations(flagged, locations, options);

    let stats = EnrichStats {
        control: control_stats,
        horizontal: horizontal_stats,
        locations: location_stats,
    };

    for (source, s) in [
        ("control", control_stats),
        ("horizontal", horizontal_stats),
        ("locations", location_stats),
    ] {
        if s.duplicate_keys > 0 {
            warn!(
                source,
                duplicate_keys = s.duplicate_keys,
                fanout_rows = s.fanout_rows,
                deduped = options.dedupe_metadata,
                "Metadata has repeated join keys"
            );
        }
    }
    info!(
        input_rows,
        output_rows = records.len(),
        control_unmatched = control_stats.unmatched,
        horizontal_matches = horizontal_stats.matched,
        location_unmatched = location_stats.unmatched,
        "Enriched production records"
    );

    Enriched { records, stats }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FluidVolumes;

    const RAW: &str = "0455051206000";
    const UWI: &str = "00/06-12-045-05W5/0";

    fn production(id: &str, year: i32) -> ProductionRecord {
        ProductionRecord {
            well_identifier: id.to_string(),
            fluid_year: year,
            volumes: FluidVolumes::absent(),
        }
    }

    fn control(id: &str, pool: &str) -> RawControlRecord {
        RawControlRecord {
            well_identifier: id.to_string(),
            well_name: format!("WELL {id}"),
            pool_code: "0100".to_string(),
            pool_name: pool.to_string(),
        }
    }

    fn location(uwi: &str, lon: f64) -> BottomHoleLocation {
        BottomHoleLocation {
            uwi: uwi.to_string(),
            location: BottomHole {
                longitude: Some(lon),
                latitude: Some(52.0),
                easting: None,
                northing: None,
            },
        }
    }

    #[test]
    fn unmatched_rows_are_kept_with_absent_metadata() {
        let out = enrich(
            vec![production(RAW, 2001), production("9999999999999", 2001)],
            &[control(RAW, "VIKING A")],
            &[],
            &[],
            EnrichOptions::default(),
        );
        assert_eq!(out.records.len(), 2);
        assert_eq!(out.records[0].uwi, UWI);
        assert_eq!(out.records[0].pool_name.as_deref(), Some("VIKING A"));
        assert_eq!(out.records[1].pool_name, None);
        assert_eq!(out.records[1].horizontal, None);
        assert!(out.records[1].bottom_hole.is_empty());
        assert_eq!(out.stats.control.unmatched, 1);
    }

    #[test]
    fn row_count_preserved_with_unique_metadata() {
        let production: Vec<_> = (2000..2010).map(|y| production(RAW, y)).collect();
        let out = enrich(
            production,
            &[control(RAW, "CARDIUM")],
            &[HorizontalWell { uwi: UWI.to_string() }],
            &[location(UWI, -114.0)],
            EnrichOptions::default(),
        );
        assert_eq!(out.records.len(), 10);
        assert!(out.records.iter().all(|r| r.horizontal == Some(true)));
        assert!(out.records.iter().all(|r| r.bottom_hole.longitude == Some(-114.0)));
    }

    #[test]
    fn duplicate_metadata_fans_out_rows() {
        let out = enrich(
            vec![production(RAW, 2001)],
            &[control(RAW, "VIKING A"), control(RAW, "VIKING B")],
            &[],
            &[location(UWI, -114.0), location(UWI, -115.0)],
            EnrichOptions::default(),
        );
        assert_eq!(out.records.len(), 4);
        assert_eq!(out.stats.control.duplicate_keys, 1);
        assert_eq!(out.stats.fanout_rows(), 1 + 2);
    }

    #[test]
    fn dedupe_keeps_first_metadata_row() {
        let out = enrich(
            vec![production(RAW, 2001)],
            &[control(RAW, "VIKING A"), control(RAW, "VIKING B")],
            &[HorizontalWell { uwi: UWI.to_string() }, HorizontalWell { uwi: UWI.to_string() }],
            &[location(UWI, -114.0), location(UWI, -115.0)],
            EnrichOptions { dedupe_metadata: true },
        );
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].pool_name.as_deref(), Some("VIKING A"));
        assert_eq!(out.records[0].bottom_hole.longitude, Some(-114.0));
        assert_eq!(out.stats.horizontal.duplicate_keys, 1);
        assert_eq!(out.stats.fanout_rows(), 0);
    }

    #[test]
    fn horizontal_join_uses_normalized_uwi_not_raw_id() {
        let out = enrich(
            vec![production(RAW, 2001)],
            &[],
            &[HorizontalWell { uwi: RAW.to_string() }],
            &[],
            EnrichOptions::default(),
        );
        assert_eq!(out.records[0].horizontal, None);
    }

    #[test]
    fn join_keys_are_case_sensitive() {
        let (joined, stats) = join_control(
            vec![production("abc", 2001)],
            &[control("ABC", "X")],
            EnrichOptions::default(),
        );
        assert_eq!(joined[0].pool_name, None);
        assert_eq!(stats.unmatched, 1);
    }
}
