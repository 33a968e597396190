//! Hook points a grid widget exposes to its features.
//!
//! A host grid owns one or more [`GridPlugin`] implementors and calls the hooks at
//! fixed points of its input/render cycle. Every hook has a no-op default so a
//! feature only implements what it cares about.

use crate::{CellDelta, CellRef, SelectionRange};

/// A key press as seen by the grid before default handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: char,
    pub ctrl: bool,
    /// Cmd on macOS.
    pub meta: bool,
    pub alt: bool,
    pub shift: bool,
}

impl KeyEvent {
    pub const fn new(key: char) -> Self {
        Self {
            key,
            ctrl: false,
            meta: false,
            alt: false,
            shift: false,
        }
    }

    pub const fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub const fn with_meta(mut self) -> Self {
        self.meta = true;
        self
    }

    pub const fn with_alt(mut self) -> Self {
        self.alt = true;
        self
    }

    pub const fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    /// Ctrl or Cmd held, without Alt (the `CmdOrCtrl+<key>` accelerator shape).
    pub const fn is_cmd_or_ctrl(&self) -> bool {
        (self.ctrl || self.meta) && !self.alt
    }
}

/// Result of [`GridPlugin::on_before_key_down`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDisposition {
    /// Continue with the grid's default key handling.
    Ignored,
    /// The plugin consumed the key; skip default handling and re-render.
    Handled,
}

/// Per-cell render sink handed to [`GridPlugin::on_render`].
pub trait CellRenderer {
    fn set_span(&mut self, rowspan: u32, colspan: u32);
    fn hide(&mut self);
    fn clear_span(&mut self);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuItem {
    Separator,
    Action {
        id: &'static str,
        label: String,
        enabled: bool,
    },
}

/// Context menu under construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextMenu {
    pub items: Vec<MenuItem>,
}

impl ContextMenu {
    pub fn push_separator(&mut self) {
        self.items.push(MenuItem::Separator);
    }

    pub fn push_action(&mut self, id: &'static str, label: impl Into<String>, enabled: bool) {
        self.items.push(MenuItem::Action {
            id,
            label: label.into(),
            enabled,
        });
    }

    /// Label of the action with `id`, if present.
    pub fn label(&self, id: &str) -> Option<&str> {
        self.items.iter().find_map(|item| match item {
            MenuItem::Action {
                id: item_id, label, ..
            } if *item_id == id => Some(label.as_str()),
            _ => None,
        })
    }
}

pub trait GridPlugin {
    /// Called before the grid handles a key press.
    fn on_before_key_down(
        &mut self,
        _key: &KeyEvent,
        _selection: &SelectionRange,
    ) -> KeyDisposition {
        KeyDisposition::Ignored
    }

    /// Called before the highlight cell moves by `delta`; returns the delta to apply.
    fn on_step_start(&mut self, _current: CellRef, delta: CellDelta) -> CellDelta {
        delta
    }

    /// Called when the grid edge clamped a highlight step short of its target;
    /// returns the cell the highlight should rest on instead of `cell`.
    fn on_step_clamped(&self, cell: CellRef) -> CellRef {
        cell
    }

    /// Called before the selection's active corner moves by `delta`.
    ///
    /// The plugin may rewrite `selection`; the returned delta is then applied to
    /// `selection.to` by the grid.
    fn on_step_end(&mut self, _selection: &mut SelectionRange, delta: CellDelta) -> CellDelta {
        delta
    }

    /// A mouse-driven selection starts at `cell`.
    fn on_range_start(&mut self, _cell: CellRef) {}

    /// A mouse-driven selection ends at `cell`.
    fn on_range_end(&mut self, _cell: CellRef) {}

    /// Called after a cell has been rendered.
    fn on_render(&self, _renderer: &mut dyn CellRenderer, _cell: CellRef) {}

    /// Lets the plugin add entries to the context menu.
    fn on_context_menu(&self, _menu: &mut ContextMenu, _selection: &SelectionRange) {}

    /// A context menu action was chosen. Returns true if the plugin handled `id`.
    fn on_menu_action(&mut self, _id: &str, _selection: &SelectionRange) -> bool {
        false
    }
}
