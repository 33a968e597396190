use crate::plugin::{CellRenderer, ContextMenu, GridPlugin, KeyDisposition, KeyEvent};
use crate::{
    CellDelta, CellRef, MergeCellsSetting, MergeError, MergedRegion, MergedRegions,
    SelectionRange, TransformCursor,
};

/// Context menu id of the merge/unmerge toggle.
pub const ITEM_MERGE_CELLS: &str = "merge-cells";
pub const LABEL_MERGE_CELLS: &str = "Merge cells";
pub const LABEL_UNMERGE_CELLS: &str = "Unmerge cells";

/// Default accelerator key, used together with Ctrl or Cmd.
pub const DEFAULT_SHORTCUT: char = 'm';

/// How a cell should be drawn given the merged regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanProperties {
    /// The cell anchors a merged region and spans it.
    Anchor { rowspan: u32, colspan: u32 },
    /// The cell is covered by a region anchored elsewhere.
    Hidden,
    /// Not merged.
    Plain,
}

/// What [`MergeCells::merge_or_unmerge`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Merged(MergedRegion),
    Unmerged(MergedRegion),
    /// The selection was a single cell; nothing to merge.
    Unchanged,
}

/// The merged-cells feature of one grid: the region registry plus the keyboard
/// transform memory.
#[derive(Debug, Clone)]
pub struct MergeCells {
    regions: MergedRegions,
    cursor: TransformCursor,
    shortcut: char,
}

impl Default for MergeCells {
    fn default() -> Self {
        Self::new()
    }
}

impl MergeCells {
    #[must_use]
    pub fn new() -> Self {
        Self {
            regions: MergedRegions::new(),
            cursor: TransformCursor::new(),
            shortcut: DEFAULT_SHORTCUT,
        }
    }

    /// Builds the feature from the grid's `mergeCells` setting.
    ///
    /// Configured regions must have non-zero spans and must not overlap each other.
    pub fn from_setting(setting: &MergeCellsSetting) -> Result<Self, MergeError> {
        if !setting.is_enabled() {
            return Err(MergeError::Disabled);
        }
        Self::with_regions(setting.regions().iter().copied())
    }

    /// Loads initial regions, validating spans and pairwise overlap.
    pub fn with_regions(
        regions: impl IntoIterator<Item = MergedRegion>,
    ) -> Result<Self, MergeError> {
        let mut out = Self::new();
        for region in regions {
            region.validate()?;
            let requested = region.range();
            if let Some(existing) = out
                .regions
                .overlapping(requested)
                .find(|existing| existing.anchor() != region.anchor())
            {
                return Err(MergeError::Overlap {
                    existing: existing.range(),
                    requested,
                });
            }
            out.regions.upsert(region);
        }
        log::debug!("loaded {} merged regions", out.regions.len());
        Ok(out)
    }

    #[must_use]
    pub fn with_shortcut(mut self, key: char) -> Self {
        self.shortcut = key;
        self
    }

    pub fn regions(&self) -> &MergedRegions {
        &self.regions
    }

    pub fn cursor(&self) -> &TransformCursor {
        &self.cursor
    }

    /// Records for save/export, in the configuration shape.
    #[must_use]
    pub fn to_setting(&self) -> MergeCellsSetting {
        MergeCellsSetting::Regions(self.regions.iter().copied().collect())
    }

    /// True when the selection covers more than one cell.
    #[must_use]
    pub fn can_merge(&self, selection: &SelectionRange) -> bool {
        !selection.is_single()
    }

    /// Merges the selected rectangle into one region anchored at its top-left cell.
    ///
    /// Single-cell selections are ignored. The caller must ensure the rectangle does
    /// not overlap an existing region other than one anchored at the same cell (which
    /// is replaced).
    pub fn merge_range(&mut self, selection: &SelectionRange) -> Option<MergedRegion> {
        if !self.can_merge(selection) {
            return None;
        }
        let region = MergedRegion::from_range(selection.range());
        self.regions.upsert(region);
        log::debug!("merged {}", region.range());
        Some(region)
    }

    /// Removes the region covering `cell`.
    pub fn unmerge(&mut self, cell: CellRef) -> Result<MergedRegion, MergeError> {
        let anchor = self
            .regions
            .find(cell)
            .map(MergedRegion::anchor)
            .ok_or(MergeError::NotMerged { cell })?;
        let region = self
            .regions
            .remove(anchor)
            .ok_or(MergeError::NotMerged { cell })?;
        log::debug!("unmerged {}", region.range());
        Ok(region)
    }

    /// Unmerges the region under the selection's highlight cell, or merges the
    /// selection if the highlight is not merged.
    pub fn merge_or_unmerge(&mut self, selection: &SelectionRange) -> MergeOutcome {
        if let Ok(region) = self.unmerge(selection.highlight) {
            return MergeOutcome::Unmerged(region);
        }
        match self.merge_range(selection) {
            Some(region) => MergeOutcome::Merged(region),
            None => MergeOutcome::Unchanged,
        }
    }

    #[must_use]
    pub fn is_merged(&self, cell: CellRef) -> bool {
        self.regions.find(cell).is_some()
    }

    /// How the cell at `cell` should be drawn. Depends only on the registry.
    #[must_use]
    pub fn span_properties(&self, cell: CellRef) -> SpanProperties {
        match self.regions.find(cell) {
            Some(region) if region.is_anchor(cell) => SpanProperties::Anchor {
                rowspan: region.rowspan,
                colspan: region.colspan,
            },
            Some(_) => SpanProperties::Hidden,
            None => SpanProperties::Plain,
        }
    }

    pub fn apply_span_properties(&self, renderer: &mut dyn CellRenderer, cell: CellRef) {
        match self.span_properties(cell) {
            SpanProperties::Anchor { rowspan, colspan } => renderer.set_span(rowspan, colspan),
            SpanProperties::Hidden => renderer.hide(),
            SpanProperties::Plain => renderer.clear_span(),
        }
    }

    /// See [`TransformCursor::transform_start`].
    pub fn transform_start(&mut self, current: CellRef, delta: CellDelta) -> CellDelta {
        self.cursor.transform_start(&self.regions, current, delta)
    }

    /// See [`TransformCursor::transform_end`].
    pub fn transform_end(&mut self, selection: &mut SelectionRange, delta: CellDelta) -> CellDelta {
        self.cursor.transform_end(&self.regions, selection, delta)
    }

    fn is_shortcut(&self, key: &KeyEvent) -> bool {
        key.is_cmd_or_ctrl() && key.key.eq_ignore_ascii_case(&self.shortcut)
    }
}

impl GridPlugin for MergeCells {
    fn on_before_key_down(&mut self, key: &KeyEvent, selection: &SelectionRange) -> KeyDisposition {
        if !self.is_shortcut(key) {
            return KeyDisposition::Ignored;
        }
        self.merge_or_unmerge(selection);
        KeyDisposition::Handled
    }

    fn on_step_start(&mut self, current: CellRef, delta: CellDelta) -> CellDelta {
        self.transform_start(current, delta)
    }

    fn on_step_clamped(&self, cell: CellRef) -> CellRef {
        self.regions.find(cell).map_or(cell, MergedRegion::anchor)
    }

    fn on_step_end(&mut self, selection: &mut SelectionRange, delta: CellDelta) -> CellDelta {
        self.transform_end(selection, delta)
    }

    fn on_range_start(&mut self, _cell: CellRef) {
        self.cursor.begin_gesture();
    }

    fn on_range_end(&mut self, _cell: CellRef) {
        self.cursor.end_gesture();
    }

    fn on_render(&self, renderer: &mut dyn CellRenderer, cell: CellRef) {
        self.apply_span_properties(renderer, cell);
    }

    fn on_context_menu(&self, menu: &mut ContextMenu, selection: &SelectionRange) {
        let label = if self.is_merged(selection.highlight) {
            LABEL_UNMERGE_CELLS
        } else {
            LABEL_MERGE_CELLS
        };
        menu.push_separator();
        menu.push_action(ITEM_MERGE_CELLS, label, true);
    }

    fn on_menu_action(&mut self, id: &str, selection: &SelectionRange) -> bool {
        if id != ITEM_MERGE_CELLS {
            return false;
        }
        self.merge_or_unmerge(selection);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Range;
    use pretty_assertions::assert_eq;

    fn selection(from: (u32, u32), to: (u32, u32)) -> SelectionRange {
        let from = CellRef::new(from.0, from.1);
        SelectionRange::new(from, from, CellRef::new(to.0, to.1))
    }

    #[test]
    fn merge_range_anchors_at_top_left() {
        let mut merge = MergeCells::new();
        // Selection dragged from bottom-right to top-left.
        let sel = selection((3, 4), (1, 2));

        let region = merge.merge_range(&sel).expect("merged");
        assert_eq!(region, MergedRegion::new(CellRef::new(1, 2), 3, 3));
        assert_eq!(
            merge.regions().find(CellRef::new(3, 4)).map(MergedRegion::range),
            Some(Range::new(CellRef::new(1, 2), CellRef::new(3, 4)))
        );
    }

    #[test]
    fn merge_range_ignores_single_cell() {
        let mut merge = MergeCells::new();
        assert!(!merge.can_merge(&selection((2, 2), (2, 2))));
        assert_eq!(merge.merge_range(&selection((2, 2), (2, 2))), None);
        assert!(merge.regions().is_empty());
    }

    #[test]
    fn unmerge_resolves_covered_cell_to_anchor() {
        let mut merge = MergeCells::new();
        merge.merge_range(&selection((0, 0), (1, 1)));

        assert_eq!(
            merge.unmerge(CellRef::new(1, 1)),
            Ok(MergedRegion::new(CellRef::new(0, 0), 2, 2))
        );
        assert_eq!(
            merge.unmerge(CellRef::new(1, 1)),
            Err(MergeError::NotMerged {
                cell: CellRef::new(1, 1)
            })
        );
    }

    #[test]
    fn merge_or_unmerge_toggles() {
        let mut merge = MergeCells::new();
        let sel = selection((0, 0), (0, 2));

        let merged = merge.merge_or_unmerge(&sel);
        assert_eq!(
            merged,
            MergeOutcome::Merged(MergedRegion::new(CellRef::new(0, 0), 1, 3))
        );
        assert_eq!(
            merge.merge_or_unmerge(&sel),
            MergeOutcome::Unmerged(MergedRegion::new(CellRef::new(0, 0), 1, 3))
        );
        assert!(merge.regions().is_empty());
        assert_eq!(
            merge.merge_or_unmerge(&selection((5, 5), (5, 5))),
            MergeOutcome::Unchanged
        );
    }

    #[test]
    fn span_properties_per_cell() {
        let merge =
            MergeCells::with_regions([MergedRegion::new(CellRef::new(1, 1), 2, 3)]).unwrap();

        assert_eq!(
            merge.span_properties(CellRef::new(1, 1)),
            SpanProperties::Anchor {
                rowspan: 2,
                colspan: 3
            }
        );
        assert_eq!(
            merge.span_properties(CellRef::new(2, 3)),
            SpanProperties::Hidden
        );
        assert_eq!(
            merge.span_properties(CellRef::new(0, 1)),
            SpanProperties::Plain
        );
    }

    #[test]
    fn with_regions_rejects_overlap_and_zero_span() {
        let overlap = MergeCells::with_regions([
            MergedRegion::new(CellRef::new(0, 0), 2, 2),
            MergedRegion::new(CellRef::new(1, 1), 2, 2),
        ])
        .unwrap_err();
        assert_eq!(
            overlap,
            MergeError::Overlap {
                existing: Range::new(CellRef::new(0, 0), CellRef::new(1, 1)),
                requested: Range::new(CellRef::new(1, 1), CellRef::new(2, 2)),
            }
        );

        assert!(matches!(
            MergeCells::with_regions([MergedRegion::new(CellRef::new(0, 0), 1, 0)]),
            Err(MergeError::InvalidSpan { .. })
        ));
    }

    #[test]
    fn disabled_setting_is_not_constructed() {
        assert_eq!(
            MergeCells::from_setting(&MergeCellsSetting::Enabled(false)).unwrap_err(),
            MergeError::Disabled
        );
        let merge = MergeCells::from_setting(&MergeCellsSetting::Enabled(true)).unwrap();
        assert!(merge.regions().is_empty());
    }

    #[test]
    fn shortcut_requires_cmd_or_ctrl_without_alt() {
        let mut merge = MergeCells::new();
        let sel = selection((0, 0), (1, 0));

        assert_eq!(
            merge.on_before_key_down(&KeyEvent::new('m'), &sel),
            KeyDisposition::Ignored
        );
        assert_eq!(
            merge.on_before_key_down(&KeyEvent::new('m').with_ctrl().with_alt(), &sel),
            KeyDisposition::Ignored
        );
        assert!(merge.regions().is_empty());

        assert_eq!(
            merge.on_before_key_down(&KeyEvent::new('M').with_meta(), &sel),
            KeyDisposition::Handled
        );
        assert!(merge.is_merged(CellRef::new(1, 0)));
    }

    #[test]
    fn from_setting_rejects_regions_running_off_the_sheet() {
        let json = r#"[{"row": 4294967295, "col": 0, "rowspan": 2, "colspan": 1}]"#;
        let setting: MergeCellsSetting = serde_json::from_str(json).unwrap();
        assert!(matches!(
            MergeCells::from_setting(&setting),
            Err(MergeError::InvalidSpan { rowspan: 2, .. })
        ));
    }

    #[test]
    fn clamped_step_rests_on_the_covering_anchor() {
        let merge =
            MergeCells::with_regions([MergedRegion::new(CellRef::new(2, 2), 2, 2)]).unwrap();
        assert_eq!(merge.on_step_clamped(CellRef::new(3, 3)), CellRef::new(2, 2));
        assert_eq!(merge.on_step_clamped(CellRef::new(3, 4)), CellRef::new(3, 4));
    }
}
