//! Fluid unpivot: repeated `(code, volume)` slots -> one volume per category
//!
//! A pure per-row reduction. Slots are visited in declared column order and,
//! for each slot, categories in declared enumeration order. A matching slot
//! overwrites the category's volume (including with an absent volume), so
//! when two slots carry the same code the later one wins. Codes matching no
//! category are dropped.
//!
//! The overwrite rule is deliberate and must not become a sum; the number of
//! overwrites is reported so duplicated codes are visible.

use crate::types::{FluidCategory, FluidSlot, FluidVolumes};

/// Result of unpivoting one row.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Unpivoted {
    pub volumes: FluidVolumes,
    /// Slots with a code outside the known category set
    pub unmapped_codes: usize,
    /// Slots that overwrote a category already set earlier in the row
    pub duplicate_codes: usize,
    matched: [bool; 6],
}

impl Unpivoted {
    fn assign(mut self, category: FluidCategory, volume: Option<f64>) -> Self {
        if self.matched[category.index()] {
            self.duplicate_codes += 1;
        }
        self.matched[category.index()] = true;
        self.volumes = self.volumes.with(category, volume);
        self
    }

    fn absorb(self, slot: &FluidSlot) -> Self {
        let Some(code) = slot.code else {
            return self;
        };
        let (next, hit) = FluidCategory::ALL
            .into_iter()
            .fold((self, false), |(acc, hit), category| {
                if code == category.code() {
                    (acc.assign(category, slot.volume), true)
                } else {
                    (acc, hit)
                }
            });
        if hit {
            next
        } else {
            Self {
                unmapped_codes: next.unmapped_codes + 1,
                ..next
            }
        }
    }
}

/// Unpivot a row's slots, keeping the data-quality counters.
pub fn unpivot_row(slots: &[FluidSlot]) -> Unpivoted {
    slots.iter().fold(Unpivoted::default(), Unpivoted::absorb)
}

/// Unpivot a row's slots into six category volumes.
pub fn unpivot(slots: &[FluidSlot]) -> FluidVolumes {
    unpivot_row(slots).volumes
}
