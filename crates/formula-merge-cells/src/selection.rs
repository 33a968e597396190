use serde::{Deserialize, Serialize};

use crate::{CellRef, Range};

/// The grid's current selection.
///
/// `highlight` is the fixed anchor of the selection gesture (the cell keyboard
/// focus sits on). `from` and `to` are opposite corners of the selected rectangle;
/// they are not ordered, use [`SelectionRange::top_left`] and
/// [`SelectionRange::bottom_right`] for normalized corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionRange {
    pub highlight: CellRef,
    pub from: CellRef,
    pub to: CellRef,
}

impl SelectionRange {
    /// A one-cell selection at `cell`.
    pub const fn single(cell: CellRef) -> Self {
        Self {
            highlight: cell,
            from: cell,
            to: cell,
        }
    }

    pub const fn new(highlight: CellRef, from: CellRef, to: CellRef) -> Self {
        Self {
            highlight,
            from,
            to,
        }
    }

    /// True when `from` and `to` are the same cell.
    #[inline]
    pub fn is_single(&self) -> bool {
        self.from == self.to
    }

    pub fn top_left(&self) -> CellRef {
        CellRef::new(self.from.row.min(self.to.row), self.from.col.min(self.to.col))
    }

    pub fn bottom_right(&self) -> CellRef {
        CellRef::new(self.from.row.max(self.to.row), self.from.col.max(self.to.col))
    }

    /// The selected rectangle.
    pub fn range(&self) -> Range {
        Range::new(self.from, self.to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_are_normalized() {
        let sel = SelectionRange::new(
            CellRef::new(4, 1),
            CellRef::new(4, 1),
            CellRef::new(2, 3),
        );
        assert!(!sel.is_single());
        assert_eq!(sel.top_left(), CellRef::new(2, 1));
        assert_eq!(sel.bottom_right(), CellRef::new(4, 3));
        assert_eq!(sel.range().to_string(), "B3:D5");
    }

    #[test]
    fn single_is_one_cell() {
        let sel = SelectionRange::single(CellRef::new(7, 7));
        assert!(sel.is_single());
        assert!(sel.range().is_single_cell());
    }
}
