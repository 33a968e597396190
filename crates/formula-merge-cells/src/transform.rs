//! Merge-aware keyboard selection.
//!
//! Keyboard navigation moves the selection one step at a time and only reports a
//! delta. [`TransformCursor`] rewrites those deltas (and, when resizing, the selected
//! rectangle) so a selection never covers part of a merged region:
//!
//! - moving the highlight into a merged region lands on the region's anchor cell,
//!   and moving out of it continues from the far edge;
//! - resizing the selection swallows a merged region the new edge would cut through,
//!   or releases it entirely when shrinking.

use crate::{CellDelta, CellRef, MergedRegion, MergedRegions, SelectionRange};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Row,
    Col,
}

impl Axis {
    #[inline]
    const fn idx(self) -> usize {
        match self {
            Axis::Row => 0,
            Axis::Col => 1,
        }
    }

    #[inline]
    const fn other(self) -> Axis {
        match self {
            Axis::Row => Axis::Col,
            Axis::Col => Axis::Row,
        }
    }
}

/// Which wall of the selection moves along the resized axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Wall {
    /// Top or left.
    Start,
    /// Bottom or right.
    End,
}

/// `[row, col]` in signed coordinates; candidate edges may fall before row/col 0.
type Point = [i64; 2];

fn point(cell: CellRef) -> Point {
    [i64::from(cell.row), i64::from(cell.col)]
}

fn cell_at(p: Point) -> Option<CellRef> {
    Some(CellRef::new(
        u32::try_from(p[0]).ok()?,
        u32::try_from(p[1]).ok()?,
    ))
}

fn clamp_coord(v: i64) -> u32 {
    u32::try_from(v.max(0)).unwrap_or(u32::MAX)
}

fn region_at(regions: &MergedRegions, p: Point) -> Option<&MergedRegion> {
    cell_at(p).and_then(|cell| regions.find(cell))
}

/// Inclusive rectangle snapshot used while resolving a resize step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Rect {
    start: Point,
    end: Point,
}

impl Rect {
    fn of_selection(selection: &SelectionRange) -> Self {
        Self {
            start: point(selection.top_left()),
            end: point(selection.bottom_right()),
        }
    }

    fn of_region(region: &MergedRegion) -> Self {
        Self {
            start: [i64::from(region.row), i64::from(region.col)],
            end: [i64::from(region.end_row()), i64::from(region.end_col())],
        }
    }

    fn with_start(mut self, axis: Axis, v: i64) -> Self {
        self.start[axis.idx()] = v;
        self
    }

    fn with_end(mut self, axis: Axis, v: i64) -> Self {
        self.end[axis.idx()] = v;
        self
    }

    fn union(self, other: Rect) -> Self {
        Self {
            start: [
                self.start[0].min(other.start[0]),
                self.start[1].min(other.start[1]),
            ],
            end: [self.end[0].max(other.end[0]), self.end[1].max(other.end[1])],
        }
    }

    fn contains_point(&self, p: Point) -> bool {
        (0..2).all(|i| self.start[i] <= p[i] && p[i] <= self.end[i])
    }

    fn contains(&self, other: &Rect) -> bool {
        self.contains_point(other.start) && self.contains_point(other.end)
    }

    fn intersects(&self, other: &Rect) -> bool {
        (0..2).all(|i| self.start[i] <= other.end[i] && other.start[i] <= self.end[i])
    }

    /// True when `other` shares cells with `self` without lying entirely inside it.
    fn partially_covers(&self, other: &Rect) -> bool {
        self.intersects(other) && !self.contains(other)
    }

    fn corners(&self) -> (CellRef, CellRef) {
        (
            CellRef::new(clamp_coord(self.start[0]), clamp_coord(self.start[1])),
            CellRef::new(clamp_coord(self.end[0]), clamp_coord(self.end[1])),
        )
    }
}

/// Per-grid memory for merge-aware keyboard navigation.
///
/// Only meaningful within one continuous keyboard traversal: the host must call
/// [`TransformCursor::begin_gesture`] / [`TransformCursor::end_gesture`] whenever a
/// mouse-driven selection starts or ends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformCursor {
    /// Where the highlight would have been before it snapped onto a region anchor.
    last_desired: Option<CellRef>,
    /// Most recent active-corner target of a resize step.
    last_cell: Option<CellRef>,
}

impl TransformCursor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn last_desired(&self) -> Option<CellRef> {
        self.last_desired
    }

    #[must_use]
    pub fn last_cell(&self) -> Option<CellRef> {
        self.last_cell
    }

    /// A new (mouse-driven) selection gesture started.
    pub fn begin_gesture(&mut self) {
        self.last_desired = None;
        self.last_cell = None;
    }

    /// A (mouse-driven) selection gesture finished.
    pub fn end_gesture(&mut self) {
        self.last_desired = None;
    }

    /// Corrects a single-step move of the highlight cell.
    ///
    /// The returned delta never lands inside a merged region except on its anchor.
    /// Entering a region from below or from the right snaps onto the anchor. Moving
    /// further down/right from the anchor jumps past the whole span, and stepping out
    /// along the other axis restores the coordinate remembered before the snap. If
    /// either of those lands inside another region, the step snaps to that anchor.
    pub fn transform_start(
        &mut self,
        regions: &MergedRegions,
        current: CellRef,
        delta: CellDelta,
    ) -> CellDelta {
        let cur = point(current);
        let mut d: Point = [delta.row, delta.col];

        match region_at(regions, [cur[0] + d[0], cur[1] + d[1]]) {
            Some(region) => {
                let block = Rect::of_region(region);
                self.snap_axis(Axis::Row, cur, &block, &mut d);
                self.snap_axis(Axis::Col, cur, &block, &mut d);
            }
            None => {
                if let Some(memory) = self.last_desired.take() {
                    let memory = point(memory);
                    if d[1] == 0 {
                        d[1] = memory[1] - cur[1];
                    } else if d[0] == 0 {
                        d[0] = memory[0] - cur[0];
                    }
                    log::trace!("left merged region, restored {memory:?}");
                }
            }
        }

        // A jump past a span or a restored coordinate can end inside another region.
        let landing = [cur[0] + d[0], cur[1] + d[1]];
        if let Some(region) = region_at(regions, landing) {
            let anchor = [i64::from(region.row), i64::from(region.col)];
            if landing != anchor {
                if self.last_desired.is_none() {
                    self.last_desired = cell_at(landing);
                }
                d = [anchor[0] - cur[0], anchor[1] - cur[1]];
                log::trace!("landed inside {}, snapped to its anchor", region.range());
            }
        }

        let corrected = CellDelta::new(d[0], d[1]);
        if corrected != delta {
            log::trace!("start transform at {current}: {delta} -> {corrected}");
        }
        corrected
    }

    fn snap_axis(&mut self, axis: Axis, cur: Point, block: &Rect, d: &mut Point) {
        let i = axis.idx();
        let anchor = block.start[i];

        if cur[i] > anchor {
            // Entering from below/right. The row pass always records the target; the
            // column pass keeps whatever the row pass stored.
            if axis == Axis::Row || self.last_desired.is_none() {
                self.last_desired = cell_at([cur[0] + d[0], cur[1] + d[1]]);
            }
            d[i] = anchor - cur[i];
        } else if cur[i] == anchor && d[i] > 0 {
            d[i] += block.end[i] - block.start[i];
        } else if d[i] == 0 {
            if let Some(memory) = self.last_desired.take() {
                d[i] = point(memory)[i] - cur[i];
            }
        }
    }

    /// Corrects a single-step move of the selection's active corner.
    ///
    /// `selection` is rewritten in place to the resized rectangle; the returned delta
    /// is always zero so the host must not re-apply the request to `selection.to`.
    pub fn transform_end(
        &mut self,
        regions: &MergedRegions,
        selection: &mut SelectionRange,
        delta: CellDelta,
    ) -> CellDelta {
        let current = selection.to;
        let highlight_region = regions.find(selection.highlight).copied();

        if let Some(region) = highlight_region {
            if selection.is_single() {
                let block = region.range();
                selection.from = block.start;
                selection.to = block.end;
            }
        }
        if selection.is_single() {
            selection.from = selection.highlight;
            selection.to = selection.highlight;
        }

        if !delta.is_zero() {
            let highlight = point(selection.highlight);
            let highlight_block = highlight_region.as_ref().map(Rect::of_region);
            let mut rect = Rect::of_selection(selection);
            for (axis, step) in [(Axis::Col, delta.col), (Axis::Row, delta.row)] {
                rect = resize_axis(regions, rect, axis, step, highlight, highlight_block);
            }
            let (from, to) = rect.corners();
            selection.from = from;
            selection.to = to;
        }

        self.last_cell = current.offset(delta);
        CellDelta::ZERO
    }
}

fn resize_axis(
    regions: &MergedRegions,
    rect: Rect,
    axis: Axis,
    step: i64,
    highlight: Point,
    highlight_block: Option<Rect>,
) -> Rect {
    if step == 0 {
        return rect;
    }
    let i = axis.idx();
    let alt = axis.other().idx();
    let h = highlight[i];
    let span = highlight_block.map_or(0, |b| b.end[i] - b.start[i]);

    // The far wall moves when the selection already reaches past the highlight's
    // own block; otherwise the candidate edge is measured from the near wall.
    let edge = if rect.end[i] > h + span {
        rect.end[i] + step
    } else {
        rect.start[i] + step
    };
    let expanding = (step < 0 && edge < h) || (step > 0 && edge > h);
    let wall = if expanding == (step > 0) {
        Wall::End
    } else {
        Wall::Start
    };
    log::trace!(
        "resize {axis:?} by {step}: edge {edge}, {} {wall:?} wall",
        if expanding { "expanding" } else { "shrinking" }
    );

    let mut next = match (wall, expanding) {
        (Wall::End, true) => rect.with_end(axis, rect.end[i].max(edge)),
        (Wall::End, false) => rect.with_end(axis, rect.end[i].min(edge).max(rect.start[i])),
        (Wall::Start, true) => rect.with_start(axis, rect.start[i].min(edge)),
        (Wall::Start, false) => rect.with_start(axis, rect.start[i].max(edge).min(rect.end[i])),
    };

    let mut along = rect.start[alt];
    while along <= next.end[alt] {
        let mut p = [0; 2];
        p[i] = edge;
        p[alt] = along;
        match region_at(regions, p) {
            Some(region) => {
                let block = Rect::of_region(region);
                next = fit_edge_region(next, block, axis, wall, expanding, edge, highlight);
                along = block.end[alt] + 1;
            }
            None => along += 1,
        }
    }

    settle(regions, next, axis, wall, !expanding, highlight)
}

/// Resolves one merged region found on the candidate edge.
fn fit_edge_region(
    rect: Rect,
    block: Rect,
    axis: Axis,
    wall: Wall,
    expanding: bool,
    edge: i64,
    highlight: Point,
) -> Rect {
    let i = axis.idx();
    if expanding {
        let mut grown = rect.union(block);
        if wall == Wall::End && block.start[i] < edge {
            // The edge is already inside the region: step past its far side.
            grown.end[i] = grown.end[i].max(block.end[i] + 1);
        }
        log::trace!("swallowed merged region {block:?}");
        return grown;
    }

    if !rect.intersects(&block) {
        return rect;
    }
    let released = match wall {
        Wall::Start if block.start[i] < edge => Some(rect.with_start(axis, block.end[i] + 1)),
        Wall::End if block.end[i] > edge => Some(rect.with_end(axis, block.start[i] - 1)),
        _ => None,
    };
    match released {
        Some(released) if released.contains_point(highlight) => {
            log::trace!("released merged region {block:?}");
            released
        }
        _ => rect.union(block),
    }
}

/// Removes any partial overlap with merged regions left after the edge pass.
///
/// Regions are visited in anchor order and the scan restarts after every change.
/// While shrinking, a region straddling the moving wall is released; anything else
/// is swallowed, and once something has been swallowed the rest of the pass only
/// grows the rectangle.
fn settle(
    regions: &MergedRegions,
    mut rect: Rect,
    axis: Axis,
    wall: Wall,
    mut shrinking: bool,
    highlight: Point,
) -> Rect {
    let i = axis.idx();
    loop {
        let Some(block) = regions
            .iter()
            .map(Rect::of_region)
            .filter(|block| rect.partially_covers(block))
            .min_by_key(|block| block.start)
        else {
            return rect;
        };

        if shrinking {
            let released = match wall {
                Wall::End if block.start[i] <= rect.end[i] && rect.end[i] < block.end[i] => {
                    Some(rect.with_end(axis, block.start[i] - 1))
                }
                Wall::Start if block.start[i] < rect.start[i] && rect.start[i] <= block.end[i] => {
                    Some(rect.with_start(axis, block.end[i] + 1))
                }
                _ => None,
            };
            if let Some(released) = released.filter(|r| r.contains_point(highlight)) {
                rect = released;
                continue;
            }
            shrinking = false;
        }
        rect = rect.union(block);
    }
}
