use core::ops::Range;

/// Size of a dataset in index units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Extent {
    pub cols: usize,
    pub rows: usize,
}

impl Extent {
    pub const fn new(cols: usize, rows: usize) -> Self {
        Self { cols, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.cols == 0 || self.rows == 0
    }
}

/// A rectangular window of cells, in index units.
///
/// `left..right()` are the visible columns, `top..bottom()` the visible rows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Region {
    pub left: usize,
    pub top: usize,
    pub width: usize,
    pub height: usize,
}

impl Region {
    pub const EMPTY: Self = Self {
        left: 0,
        top: 0,
        width: 0,
        height: 0,
    };

    pub const fn new(left: usize, top: usize, width: usize, height: usize) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn from_ranges(cols: Range<usize>, rows: Range<usize>) -> Self {
        Self::new(
            cols.start,
            rows.start,
            cols.end.saturating_sub(cols.start),
            rows.end.saturating_sub(rows.start),
        )
    }

    pub fn right(&self) -> usize {
        self.left + self.width
    }

    pub fn bottom(&self) -> usize {
        self.top + self.height
    }

    pub fn columns(&self) -> Range<usize> {
        self.left..self.right()
    }

    pub fn rows(&self) -> Range<usize> {
        self.top..self.bottom()
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn contains(&self, x: usize, y: usize) -> bool {
        self.columns().contains(&x) && self.rows().contains(&y)
    }
}

/// Snapping granularity for regions, in cells per axis.
///
/// Coarser blocks mean the region changes less often while scrolling, at the cost of rendering
/// a few extra cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Block {
    pub cols: usize,
    pub rows: usize,
}

impl Block {
    pub const fn new(cols: usize, rows: usize) -> Self {
        Self { cols, rows }
    }

    pub const fn uniform(size: usize) -> Self {
        Self::new(size, size)
    }
}

impl Default for Block {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

/// How much work cells are asked to do.
///
/// `Shallow` is used while the user is actively scrolling; `Full` once scrolling has settled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RenderMode {
    Shallow,
    #[default]
    Full,
}

impl RenderMode {
    pub fn is_full(self) -> bool {
        self == RenderMode::Full
    }
}
