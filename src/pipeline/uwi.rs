//! Unique Well Identifier normalization
//!
//! The extracts carry a 13-character positional well id:
//!
//! ```text
//! position  1-3   4    5-6   7-8   9-10  11-12  13
//!           TWP   MER  RGE   SEC   LSD   LE     ES
//! ```
//!
//! which reassembles into the conventional dashed form
//! `LE/LSD-SEC-TWP-RGE W MER/ES`, e.g. `0455051206000` -> `00/06-12-045-05W5/0`.
//!
//! No validation is done. Short input yields truncated segments, never an error.

/// Characters `start..=end` (1-indexed, inclusive), clamped to the input.
fn segment(chars: &[char], start: usize, end: usize) -> String {
    let from = start.saturating_sub(1).min(chars.len());
    let to = end.min(chars.len());
    chars[from..to.max(from)].iter().collect()
}

/// Normalize a raw positional well identifier into a UWI string.
pub fn normalize(raw: &str) -> String {
    let chars: Vec<char> = raw.chars().collect();
    format!(
        "{}/{}-{}-{}-{}W{}/{}",
        segment(&chars, 11, 12),
        segment(&chars, 9, 10),
        segment(&chars, 7, 8),
        segment(&chars, 1, 3),
        segment(&chars, 5, 6),
        segment(&chars, 4, 4),
        segment(&chars, 13, 13),
    )
}
