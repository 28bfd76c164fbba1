//! Data model for the production pipeline

mod fluid;
mod records;

pub use fluid::{FluidCategory, FluidVolumes};
pub use records::*;
