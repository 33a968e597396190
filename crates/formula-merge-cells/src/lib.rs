//! `formula-merge-cells` implements merged cell regions for the grid and keeps
//! keyboard-driven selections consistent with them.
//!
//! - [`MergedRegions`] is the registry of merged rectangles, keyed by anchor cell.
//! - [`TransformCursor`] rewrites single-step selection moves so a selection never
//!   covers part of a merged region.
//! - [`MergeCells`] wires both into a grid through the [`GridPlugin`] hooks.

mod address;
pub mod cli;
pub mod grid;
mod merge;
mod merge_cells;
pub mod plugin;
mod selection;
mod settings;
mod transform;

pub use address::{CellDelta, CellRef, Range};
pub use grid::{CellView, Grid};
pub use merge::{MergeError, MergedRegion, MergedRegions};
pub use merge_cells::{
    MergeCells, MergeOutcome, SpanProperties, DEFAULT_SHORTCUT, ITEM_MERGE_CELLS,
    LABEL_MERGE_CELLS, LABEL_UNMERGE_CELLS,
};
pub use plugin::{CellRenderer, ContextMenu, GridPlugin, KeyDisposition, KeyEvent, MenuItem};
pub use selection::SelectionRange;
pub use settings::MergeCellsSetting;
pub use transform::TransformCursor;
