use core::fmt;

use serde::{Deserialize, Serialize};

/// A reference to a single cell within a grid.
///
/// Rows and columns are **0-indexed**; [`fmt::Display`] renders the cell in A1
/// notation (`row = 0, col = 0` is `A1`).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellRef {
    /// 0-indexed row.
    pub row: u32,
    /// 0-indexed column.
    pub col: u32,
}

impl CellRef {
    /// Construct a new [`CellRef`].
    #[inline]
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Moves the cell by `delta`.
    ///
    /// Returns `None` when the result falls before row/column `0` or past `u32::MAX`;
    /// the grid's own upper bounds are not checked here.
    pub fn offset(self, delta: CellDelta) -> Option<Self> {
        let row = u32::try_from(i64::from(self.row).checked_add(delta.row)?).ok()?;
        let col = u32::try_from(i64::from(self.col).checked_add(delta.col)?).ok()?;
        Some(Self { row, col })
    }

    /// Convert to A1 notation (e.g. `A1`, `BC32`).
    pub fn to_a1(self) -> String {
        let mut out = column_letters(self.col);
        out.push_str(&(u64::from(self.row) + 1).to_string());
        out
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1())
    }
}

/// A requested single-step movement of a selection corner.
///
/// Keyboard navigation produces deltas such as `(1, 0)` (down) or `(0, -1)`
/// (left); merge-aware transforms may widen them to jump over merged regions.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellDelta {
    pub row: i64,
    pub col: i64,
}

impl CellDelta {
    pub const ZERO: CellDelta = CellDelta { row: 0, col: 0 };

    #[inline]
    pub const fn new(row: i64, col: i64) -> Self {
        Self { row, col }
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.row == 0 && self.col == 0
    }
}

impl fmt::Display for CellDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:+}, {:+})", self.row, self.col)
    }
}

/// A rectangular region within a grid.
///
/// The range is inclusive and always normalized such that:
/// - `start.row <= end.row`
/// - `start.col <= end.col`
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub start: CellRef,
    pub end: CellRef,
}

impl Range {
    /// Construct a new range from any two opposite corners.
    pub const fn new(a: CellRef, b: CellRef) -> Self {
        let start_row = if a.row <= b.row { a.row } else { b.row };
        let end_row = if a.row <= b.row { b.row } else { a.row };
        let start_col = if a.col <= b.col { a.col } else { b.col };
        let end_col = if a.col <= b.col { b.col } else { a.col };
        Self {
            start: CellRef::new(start_row, start_col),
            end: CellRef::new(end_row, end_col),
        }
    }

    /// Returns true if `cell` lies within this range.
    #[inline]
    pub const fn contains(&self, cell: CellRef) -> bool {
        cell.row >= self.start.row
            && cell.row <= self.end.row
            && cell.col >= self.start.col
            && cell.col <= self.end.col
    }

    /// Returns true if every cell of `other` lies within this range.
    #[inline]
    pub const fn contains_range(&self, other: &Range) -> bool {
        self.contains(other.start) && self.contains(other.end)
    }

    /// Returns true if the two ranges share at least one cell.
    #[inline]
    pub const fn intersects(&self, other: &Range) -> bool {
        self.start.row <= other.end.row
            && other.start.row <= self.end.row
            && self.start.col <= other.end.col
            && other.start.col <= self.end.col
    }

    /// Number of columns in the range.
    #[inline]
    pub const fn width(&self) -> u32 {
        self.end.col - self.start.col + 1
    }

    /// Number of rows in the range.
    #[inline]
    pub const fn height(&self) -> u32 {
        self.end.row - self.start.row + 1
    }

    /// Returns true if the range is exactly one cell.
    #[inline]
    pub const fn is_single_cell(&self) -> bool {
        self.start.row == self.end.row && self.start.col == self.end.col
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single_cell() {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}:{}", self.start, self.end)
        }
    }
}

/// Bijective base-26 column name (`0 -> A`, `25 -> Z`, `26 -> AA`).
fn column_letters(col: u32) -> String {
    let mut n = u64::from(col) + 1;
    let mut out = Vec::<char>::new();
    while n > 0 {
        let rem = ((n - 1) % 26) as u8;
        out.push(char::from(b'A' + rem));
        n = (n - 1) / 26;
    }
    out.iter().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a1_display() {
        assert_eq!(CellRef::new(0, 0).to_a1(), "A1");
        assert_eq!(CellRef::new(31, 54).to_a1(), "BC32");
        assert_eq!(CellRef::new(0, 25).to_string(), "Z1");
        assert_eq!(CellRef::new(9, 26).to_string(), "AA10");
    }

    #[test]
    fn offset_rejects_negative_coordinates() {
        let cell = CellRef::new(0, 3);
        assert_eq!(cell.offset(CellDelta::new(2, -1)), Some(CellRef::new(2, 2)));
        assert_eq!(cell.offset(CellDelta::new(-1, 0)), None);
        assert_eq!(cell.offset(CellDelta::new(0, -4)), None);
    }

    #[test]
    fn range_normalizes_and_intersects() {
        let r = Range::new(CellRef::new(3, 4), CellRef::new(1, 2));
        assert_eq!(r.start, CellRef::new(1, 2));
        assert_eq!(r.end, CellRef::new(3, 4));
        assert_eq!((r.height(), r.width()), (3, 3));
        assert_eq!(r.to_string(), "C2:E4");

        let touching = Range::new(CellRef::new(3, 4), CellRef::new(5, 5));
        let apart = Range::new(CellRef::new(0, 5), CellRef::new(0, 9));
        assert!(r.intersects(&touching));
        assert!(!r.intersects(&apart));
        assert!(r.contains_range(&Range::new(CellRef::new(2, 3), CellRef::new(3, 4))));
        assert!(!r.contains_range(&touching));
    }
}
