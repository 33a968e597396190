//! Minimal in-memory grid that drives a [`GridPlugin`] through its hook points.
//!
//! It owns the selection and applies the (possibly rewritten) movement deltas the
//! same way an interactive grid widget does, clamped to the grid's dimensions.

use serde::Serialize;

use crate::plugin::{CellRenderer, ContextMenu, GridPlugin, KeyDisposition, KeyEvent};
use crate::{CellDelta, CellRef, SelectionRange};

/// Render state of one cell after the plugins ran.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CellView {
    pub rowspan: Option<u32>,
    pub colspan: Option<u32>,
    pub hidden: bool,
}

impl CellRenderer for CellView {
    fn set_span(&mut self, rowspan: u32, colspan: u32) {
        self.rowspan = Some(rowspan);
        self.colspan = Some(colspan);
    }

    fn hide(&mut self) {
        self.hidden = true;
    }

    fn clear_span(&mut self) {
        self.rowspan = None;
        self.colspan = None;
    }
}

#[derive(Debug, Clone)]
pub struct Grid<P> {
    rows: u32,
    cols: u32,
    selection: SelectionRange,
    plugin: P,
    render_count: u64,
}

impl<P: GridPlugin> Grid<P> {
    /// A `rows x cols` grid with `A1` selected. Zero dimensions are raised to 1.
    pub fn new(rows: u32, cols: u32, plugin: P) -> Self {
        Self {
            rows: rows.max(1),
            cols: cols.max(1),
            selection: SelectionRange::single(CellRef::new(0, 0)),
            plugin,
            render_count: 0,
        }
    }

    pub fn selection(&self) -> &SelectionRange {
        &self.selection
    }

    pub fn plugin(&self) -> &P {
        &self.plugin
    }

    /// Number of full re-renders requested by plugins.
    pub fn render_count(&self) -> u64 {
        self.render_count
    }

    fn clamp(&self, cell: CellRef) -> CellRef {
        CellRef::new(cell.row.min(self.rows - 1), cell.col.min(self.cols - 1))
    }

    /// Applies `delta` to `cell`, clamping at the grid edges.
    fn offset_clamped(&self, cell: CellRef, delta: CellDelta) -> CellRef {
        let row = (i64::from(cell.row) + delta.row).clamp(0, i64::from(self.rows - 1));
        let col = (i64::from(cell.col) + delta.col).clamp(0, i64::from(self.cols - 1));
        // Both values are within `0..rows`/`0..cols` after clamping.
        CellRef::new(
            u32::try_from(row).unwrap_or_default(),
            u32::try_from(col).unwrap_or_default(),
        )
    }

    /// Mouse click on `cell`.
    pub fn select_cell(&mut self, cell: CellRef) {
        self.select_range(cell, cell);
    }

    /// Mouse drag from `from` to `to`.
    pub fn select_range(&mut self, from: CellRef, to: CellRef) {
        let from = self.clamp(from);
        let to = self.clamp(to);
        self.plugin.on_range_start(from);
        self.selection = SelectionRange::new(from, from, to);
        self.plugin.on_range_end(to);
    }

    /// Arrow key: moves the highlight one step, collapsing the selection.
    pub fn move_highlight(&mut self, delta: CellDelta) -> CellRef {
        let current = self.selection.highlight;
        let delta = self.plugin.on_step_start(current, delta);
        let mut next = self.offset_clamped(current, delta);
        if current.offset(delta) != Some(next) {
            next = self.plugin.on_step_clamped(next);
        }
        self.selection = SelectionRange::single(next);
        next
    }

    /// Shift + arrow key: moves the selection's active corner one step.
    pub fn extend_selection(&mut self, delta: CellDelta) -> SelectionRange {
        let mut selection = self.selection;
        let delta = self.plugin.on_step_end(&mut selection, delta);
        selection.from = self.clamp(selection.from);
        selection.to = self.offset_clamped(selection.to, delta);
        self.selection = selection;
        selection
    }

    pub fn key_down(&mut self, key: &KeyEvent) -> KeyDisposition {
        let disposition = self.plugin.on_before_key_down(key, &self.selection);
        if disposition == KeyDisposition::Handled {
            self.render_count += 1;
        }
        disposition
    }

    pub fn context_menu(&self) -> ContextMenu {
        let mut menu = ContextMenu::default();
        self.plugin.on_context_menu(&mut menu, &self.selection);
        menu
    }

    pub fn menu_action(&mut self, id: &str) -> bool {
        let handled = self.plugin.on_menu_action(id, &self.selection);
        if handled {
            self.render_count += 1;
        }
        handled
    }

    /// Renders every cell, row-major.
    pub fn render(&self) -> Vec<Vec<CellView>> {
        (0..self.rows)
            .map(|row| {
                (0..self.cols)
                    .map(|col| self.render_cell(CellRef::new(row, col)))
                    .collect()
            })
            .collect()
    }

    pub fn render_cell(&self, cell: CellRef) -> CellView {
        let mut view = CellView::default();
        self.plugin.on_render(&mut view, cell);
        view
    }
}
