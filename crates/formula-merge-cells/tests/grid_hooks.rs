use formula_merge_cells::{
    CellRef, CellView, Grid, KeyDisposition, KeyEvent, MenuItem, MergeCells, MergedRegion,
    ITEM_MERGE_CELLS, LABEL_MERGE_CELLS, LABEL_UNMERGE_CELLS,
};
use pretty_assertions::assert_eq;

fn view(rowspan: Option<u32>, colspan: Option<u32>, hidden: bool) -> CellView {
    CellView {
        rowspan,
        colspan,
        hidden,
    }
}

#[test]
fn ctrl_m_toggles_the_selection_and_requests_a_render() {
    let mut grid = Grid::new(4, 4, MergeCells::new());
    grid.select_range(CellRef::new(1, 1), CellRef::new(2, 2));

    assert_eq!(
        grid.key_down(&KeyEvent::new('m').with_ctrl()),
        KeyDisposition::Handled
    );
    assert_eq!(grid.render_count(), 1);
    assert_eq!(
        grid.plugin().regions().iter().copied().collect::<Vec<_>>(),
        vec![MergedRegion::new(CellRef::new(1, 1), 2, 2)]
    );

    assert_eq!(
        grid.key_down(&KeyEvent::new('m').with_meta()),
        KeyDisposition::Handled
    );
    assert!(grid.plugin().regions().is_empty());

    // Other keys fall through to the grid.
    assert_eq!(
        grid.key_down(&KeyEvent::new('c').with_ctrl()),
        KeyDisposition::Ignored
    );
    assert_eq!(grid.render_count(), 2);
}

#[test]
fn custom_shortcut() {
    let mut grid = Grid::new(4, 4, MergeCells::new().with_shortcut('j'));
    grid.select_range(CellRef::new(0, 0), CellRef::new(0, 1));

    assert_eq!(
        grid.key_down(&KeyEvent::new('m').with_ctrl()),
        KeyDisposition::Ignored
    );
    assert_eq!(
        grid.key_down(&KeyEvent::new('j').with_ctrl().with_shift()),
        KeyDisposition::Handled
    );
    assert_eq!(grid.plugin().regions().len(), 1);
}

#[test]
fn render_spans_anchor_and_hides_covered_cells() {
    let merge = MergeCells::with_regions([MergedRegion::new(CellRef::new(0, 1), 2, 2)]).unwrap();
    let grid = Grid::new(3, 3, merge);

    let plain = CellView::default();
    assert_eq!(
        grid.render(),
        vec![
            vec![plain, view(Some(2), Some(2), false), view(None, None, true)],
            vec![plain, view(None, None, true), view(None, None, true)],
            vec![plain, plain, plain],
        ]
    );
}

#[test]
fn context_menu_offers_merge_or_unmerge() {
    let mut grid = Grid::new(4, 4, MergeCells::new());
    grid.select_range(CellRef::new(0, 0), CellRef::new(1, 0));

    let menu = grid.context_menu();
    assert_eq!(menu.items.first(), Some(&MenuItem::Separator));
    assert_eq!(menu.label(ITEM_MERGE_CELLS), Some(LABEL_MERGE_CELLS));

    assert!(grid.menu_action(ITEM_MERGE_CELLS));
    assert_eq!(
        grid.context_menu().label(ITEM_MERGE_CELLS),
        Some(LABEL_UNMERGE_CELLS)
    );

    assert!(!grid.menu_action("copy"));
    assert!(grid.menu_action(ITEM_MERGE_CELLS));
    assert!(grid.plugin().regions().is_empty());
}

#[test]
fn merging_a_single_cell_changes_nothing() {
    let mut grid = Grid::new(4, 4, MergeCells::new());
    grid.select_cell(CellRef::new(3, 3));

    assert_eq!(
        grid.key_down(&KeyEvent::new('m').with_ctrl()),
        KeyDisposition::Handled
    );
    assert!(grid.plugin().regions().is_empty());
}
