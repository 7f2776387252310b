//! Pure region math: from a scroll snapshot to the block of cells worth rendering.
//!
//! The pipeline is `viewport` → `fit_region` → `snap_region`. [`plan`] runs all of it and keeps
//! the intermediate results around for debug overlays.

use crate::geom::{Dimensions, Geom, Span};
use crate::{Block, Extent, Region, ScrollSnapshot};

/// The visible box grown by `overflow` on every side and clipped to the world.
///
/// A negative `overflow` shrinks the box instead; its size never drops below zero.
pub fn viewport(scroll: &ScrollSnapshot, overflow: f64, world: Dimensions) -> Geom {
    let visible = scroll.visible();
    let horizontal = visible
        .horizontal()
        .margin(overflow)
        .clip(Span::new(0.0, world.width.max(0.0)));
    let vertical = visible
        .vertical()
        .margin(overflow)
        .clip(Span::new(0.0, world.height.max(0.0)));
    Geom::from_spans(horizontal, vertical)
}

/// Index range `[start, end)` of the items overlapping `span`, where item `i` is `size(i)`
/// pixels long and items are laid out back to back from zero.
pub fn fit_span(span: Span, count: usize, size: impl Fn(usize) -> f64) -> (usize, usize) {
    if count == 0 || span.is_empty() {
        return (0, 0);
    }

    let mut offset = 0.0;
    let mut i = 0;
    while i < count {
        let next = offset + size(i).max(0.0);
        if next > span.start {
            break;
        }
        offset = next;
        i += 1;
    }
    let start = i;

    let end_edge = span.end();
    while i < count && offset < end_edge {
        offset += size(i).max(0.0);
        i += 1;
    }
    (start, i)
}

/// Cells of `extent` overlapping `viewport`.
pub fn fit_region(
    viewport: Geom,
    extent: Extent,
    col_width: &dyn Fn(usize) -> f64,
    row_height: &dyn Fn(usize) -> f64,
) -> Region {
    let (left, right) = fit_span(viewport.horizontal(), extent.cols, col_width);
    let (top, bottom) = fit_span(viewport.vertical(), extent.rows, row_height);
    Region::from_ranges(left..right, top..bottom)
}

/// Rounds the start of `region` down and its end up to multiples of `block`, clipped to
/// `extent`. An empty region stays empty.
pub fn snap_region(region: Region, block: Block, extent: Extent) -> Region {
    if region.is_empty() {
        return Region::EMPTY;
    }
    if block.cols == 0 || block.rows == 0 {
        vwarn!(?block, "snap_region: zero block size clamped to 1");
    }
    let (cols, rows) = (block.cols.max(1), block.rows.max(1));

    let left = region.left / cols * cols;
    let right = (region.right().div_ceil(cols) * cols).min(extent.cols);
    let top = region.top / rows * rows;
    let bottom = (region.bottom().div_ceil(rows) * rows).min(extent.rows);
    Region::from_ranges(left..right, top..bottom)
}

/// Total pixel size of every column and row.
pub fn world_dimensions(
    extent: Extent,
    col_width: &dyn Fn(usize) -> f64,
    row_height: &dyn Fn(usize) -> f64,
) -> Dimensions {
    Dimensions::new(
        sum_sizes(0..extent.cols, col_width),
        sum_sizes(0..extent.rows, row_height),
    )
}

/// Pixel offset and size of `region` inside the world.
pub fn region_geometry(
    region: Region,
    col_width: &dyn Fn(usize) -> f64,
    row_height: &dyn Fn(usize) -> f64,
) -> Geom {
    Geom::new(
        sum_sizes(0..region.left, col_width),
        sum_sizes(0..region.top, row_height),
        sum_sizes(region.columns(), col_width),
        sum_sizes(region.rows(), row_height),
    )
}

fn sum_sizes(range: core::ops::Range<usize>, size: &dyn Fn(usize) -> f64) -> f64 {
    // Starts from +0.0; an empty `f64` sum is -0.0.
    range.fold(0.0, |acc, i| acc + size(i).max(0.0))
}

/// Everything derived from one measurement: world size, viewport, the fitted region, the snapped
/// region and its pixel geometry.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Plan {
    pub extent: Extent,
    pub world: Dimensions,
    pub viewport: Geom,
    pub fitted: Region,
    pub region: Region,
    pub geometry: Geom,
}

pub fn plan(
    extent: Extent,
    scroll: &ScrollSnapshot,
    overflow: f64,
    block: Block,
    col_width: &dyn Fn(usize) -> f64,
    row_height: &dyn Fn(usize) -> f64,
) -> Plan {
    let world = world_dimensions(extent, col_width, row_height);
    let viewport = viewport(scroll, overflow, world);
    let fitted = fit_region(viewport, extent, col_width, row_height);
    let region = snap_region(fitted, block, extent);
    let geometry = region_geometry(region, col_width, row_height);
    vtrace!(?fitted, ?region, "plan: region computed");
    Plan {
        extent,
        world,
        viewport,
        fitted,
        region,
        geometry,
    }
}
