//! Fluid categories and their canonical record codes

use serde::{Deserialize, Serialize};
use std::fmt;

/// A produced substance as encoded in the history extract.
///
/// Each category is bound to exactly one canonical code. Codes outside this
/// set carry fluids the pipeline does not track and are dropped on unpivot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FluidCategory {
    Gas,
    Water,
    LiquidPetroleumGas,
    Oil,
    Propane,
    Butane,
}

impl FluidCategory {
    /// Declared enumeration order. Unpivot visits categories in this order.
    pub const ALL: [Self; 6] = [
        Self::Gas,
        Self::Water,
        Self::LiquidPetroleumGas,
        Self::Oil,
        Self::Propane,
        Self::Butane,
    ];

    /// Canonical fluid code in the history extract.
    pub const fn code(self) -> i32 {
        match self {
            Self::Gas => 2,
            Self::Water => 6,
            Self::LiquidPetroleumGas => 16,
            Self::Oil => 51,
            Self::Propane => 53,
            Self::Butane => 54,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.code() == code)
    }

    /// Position of this category inside [`FluidVolumes`].
    pub const fn index(self) -> usize {
        match self {
            Self::Gas => 0,
            Self::Water => 1,
            Self::LiquidPetroleumGas => 2,
            Self::Oil => 3,
            Self::Propane => 4,
            Self::Butane => 5,
        }
    }

    pub const fn column_name(self) -> &'static str {
        match self {
            Self::Gas => "gas",
            Self::Water => "water",
            Self::LiquidPetroleumGas => "liquid_gas",
            Self::Oil => "oil",
            Self::Propane => "propane",
            Self::Butane => "butane",
        }
    }
}

impl fmt::Display for FluidCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// One nullable volume per [`FluidCategory`].
///
/// Always holds exactly six entries. An absent volume is `None`, never zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FluidVolumes([Option<f64>; 6]);

impl FluidVolumes {
    pub const fn absent() -> Self {
        Self([None; 6])
    }

    pub const fn get(&self, category: FluidCategory) -> Option<f64> {
        self.0[category.index()]
    }

    pub fn set(&mut self, category: FluidCategory, volume: Option<f64>) {
        self.0[category.index()] = volume;
    }

    /// Builder form of [`set`](Self::set), used by the unpivot fold.
    #[must_use]
    pub fn with(mut self, category: FluidCategory, volume: Option<f64>) -> Self {
        self.0[category.index()] = volume;
        self
    }

    /// Iterate `(category, volume)` pairs in declared order.
    pub fn iter(&self) -> impl Iterator<Item = (FluidCategory, Option<f64>)> + '_ {
        FluidCategory::ALL.into_iter().map(|c| (c, self.get(c)))
    }

    pub fn gas(&self) -> Option<f64> {
        self.get(FluidCategory::Gas)
    }

    pub fn water(&self) -> Option<f64> {
        self.get(FluidCategory::Water)
    }

    pub fn liquid_gas(&self) -> Option<f64> {
        self.get(FluidCategory::LiquidPetroleumGas)
    }

    pub fn oil(&self) -> Option<f64> {
        self.get(FluidCategory::Oil)
    }

    pub fn propane(&self) -> Option<f64> {
        self.get(FluidCategory::Propane)
    }

    pub fn butane(&self) -> Option<f64> {
        self.get(FluidCategory::Butane)
    }
}
