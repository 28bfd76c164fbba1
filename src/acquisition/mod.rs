//! Input acquisition
//!
//! Decodes the four regulatory extracts into raw records. Column positions
//! and header names come from declarative layouts; the readers are generic
//! over any `io::Read`.

pub mod layout;
pub mod reader;

pub use layout::{
    ColumnSpec, ControlLayout, HistoryLayout, HorizontalLayout, LocationLayout, PositionalLayout,
    SlotColumns, ValueKind,
};
pub use reader::{
    read_control, read_history, read_horizontal, read_locations, sanitize_pool_name, HistoryTable,
    IngestError, InputKind, LocationTable,
};
