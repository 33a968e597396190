use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{CellRef, Range};

/// Errors surfaced by merge/unmerge operations and merge configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeError {
    #[error("cell {cell} is not part of a merged region")]
    NotMerged { cell: CellRef },
    #[error("merged region at {anchor} has an invalid span ({rowspan}x{colspan})")]
    InvalidSpan {
        anchor: CellRef,
        rowspan: u32,
        colspan: u32,
    },
    #[error("merged region {requested} overlaps existing merged region {existing}")]
    Overlap { existing: Range, requested: Range },
    #[error("merged cells are disabled")]
    Disabled,
}

/// A rectangular block of cells presented as a single cell.
///
/// The region is keyed by its anchor (top-left) cell. A span of `1` on an axis
/// means the region is not merged along that axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MergedRegion {
    pub row: u32,
    pub col: u32,
    pub rowspan: u32,
    pub colspan: u32,
}

impl MergedRegion {
    pub const fn new(anchor: CellRef, rowspan: u32, colspan: u32) -> Self {
        Self {
            row: anchor.row,
            col: anchor.col,
            rowspan,
            colspan,
        }
    }

    /// Builds the region covering `range`, anchored at its top-left cell.
    pub const fn from_range(range: Range) -> Self {
        Self::new(range.start, range.height(), range.width())
    }

    #[inline]
    pub const fn anchor(&self) -> CellRef {
        CellRef::new(self.row, self.col)
    }

    /// Last covered row (inclusive).
    #[inline]
    pub const fn end_row(&self) -> u32 {
        self.row.saturating_add(self.rowspan.saturating_sub(1))
    }

    /// Last covered column (inclusive).
    #[inline]
    pub const fn end_col(&self) -> u32 {
        self.col.saturating_add(self.colspan.saturating_sub(1))
    }

    /// The covered rectangle.
    pub const fn range(&self) -> Range {
        Range::new(self.anchor(), CellRef::new(self.end_row(), self.end_col()))
    }

    #[inline]
    pub const fn contains(&self, cell: CellRef) -> bool {
        self.row <= cell.row
            && cell.row <= self.end_row()
            && self.col <= cell.col
            && cell.col <= self.end_col()
    }

    #[inline]
    pub const fn is_anchor(&self, cell: CellRef) -> bool {
        self.row == cell.row && self.col == cell.col
    }

    /// Returns an error if either span is zero or runs past the last addressable cell.
    pub fn validate(&self) -> Result<(), MergeError> {
        let fits = |start: u32, span: u32| span > 0 && start.checked_add(span - 1).is_some();
        if !fits(self.row, self.rowspan) || !fits(self.col, self.colspan) {
            return Err(MergeError::InvalidSpan {
                anchor: self.anchor(),
                rowspan: self.rowspan,
                colspan: self.colspan,
            });
        }
        Ok(())
    }
}

/// Registry of merged regions for a single grid.
///
/// Lookups are linear scans in insertion order. The registry does not check that
/// regions are pairwise disjoint: callers of [`MergedRegions::upsert`] own that
/// precondition. If it is violated, [`MergedRegions::find`] returns the first
/// matching record.
///
/// Serializes as a plain list of `{row, col, rowspan, colspan}` records, the same
/// shape accepted by merge configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MergedRegions {
    regions: Vec<MergedRegion>,
}

impl MergedRegions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the region whose rectangle contains `cell`.
    #[must_use]
    pub fn find(&self, cell: CellRef) -> Option<&MergedRegion> {
        self.regions.iter().find(|region| region.contains(cell))
    }

    /// Replaces the record anchored at the same cell as `region`, or appends it.
    pub fn upsert(&mut self, region: MergedRegion) {
        match self
            .regions
            .iter_mut()
            .find(|existing| existing.is_anchor(region.anchor()))
        {
            Some(existing) => *existing = region,
            None => self.regions.push(region),
        }
    }

    /// Removes the record anchored exactly at `anchor`.
    ///
    /// A covered non-anchor cell does not match; resolve it with [`Self::find`]
    /// first.
    pub fn remove(&mut self, anchor: CellRef) -> Option<MergedRegion> {
        let idx = self
            .regions
            .iter()
            .position(|region| region.is_anchor(anchor))?;
        Some(self.regions.remove(idx))
    }

    /// Regions sharing at least one cell with `range`, in insertion order.
    pub fn overlapping(&self, range: Range) -> impl Iterator<Item = &MergedRegion> + '_ {
        self.regions
            .iter()
            .filter(move |region| region.range().intersects(&range))
    }

    pub fn iter(&self) -> impl Iterator<Item = &MergedRegion> + '_ {
        self.regions.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

impl FromIterator<MergedRegion> for MergedRegions {
    fn from_iter<T: IntoIterator<Item = MergedRegion>>(iter: T) -> Self {
        let mut out = MergedRegions::new();
        for region in iter {
            out.upsert(region);
        }
        out
    }
}

impl<'a> IntoIterator for &'a MergedRegions {
    type Item = &'a MergedRegion;
    type IntoIter = std::slice::Iter<'a, MergedRegion>;

    fn into_iter(self) -> Self::IntoIter {
        self.regions.iter()
    }
}
